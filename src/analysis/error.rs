//! Error taxonomy for experiment log parsing.
//!
//! Only `MalformedRegistry` and `UnreadableLog` ever reach the caller; the
//! per-record variants are recovered locally, logged and counted in
//! [`Diagnostics`](super::types::Diagnostics).

use std::path::PathBuf;

use super::metric::Metric;
use super::types::NodeId;

/// Errors that can occur while reading node logs
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed node registry: {reason}")]
    MalformedRegistry { reason: String },

    #[error("Unknown peer address '{addr}' in {metric} record")]
    UnknownPeerAddress { addr: String, metric: Metric },

    #[error("Record truncated after {pairs} metric pair(s)")]
    TruncatedRecord { pairs: usize },

    #[error("Unreadable log for node {node_id}: {}", path.display())]
    UnreadableLog {
        node_id: NodeId,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ParseError::MalformedRegistry {
            reason: reason.into(),
        }
    }
}
