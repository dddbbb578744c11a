//! Cross-node attribution of root-side reports.
//!
//! The root logs how many uplink packets it received from each peer
//! (`rx_up`) and how many downlink packets it sent to each peer (`tx_down`).
//! Those counters belong to the peer's row, so the root's stream routes them
//! to the node named by the address carried in the record. Two layouts occur:
//!
//! ```text
//! HCK rx_up 12 from 3 3 (4 9768) a_seq 5 asn 1a len 64 | ...   firmware
//! HCK rx_up 12 fe80::3 |                                         compact
//! ```

use super::error::ParseError;
use super::metric::Metric;
use super::registry::NodeRegistry;

/// Direction keywords that precede `<id> <addr>` in firmware records
const PEER_KEYWORDS: [&str; 2] = ["from", "to"];

/// Whether a root-side metric describes a peer rather than the root
pub fn is_cross_attributed(metric: Metric) -> bool {
    matches!(metric, Metric::RxUp | Metric::TxDown)
}

/// The peer address token of a pair whose name sits at `position`
pub fn peer_address<'a>(tokens: &[&'a str], position: usize) -> Option<&'a str> {
    let after_value = *tokens.get(position + 2)?;
    let addr = if PEER_KEYWORDS.contains(&after_value) {
        *tokens.get(position + 4)?
    } else {
        after_value
    };
    (!addr.is_empty() && addr != super::tokenizer::RECORD_END).then_some(addr)
}

/// Resolve the table index of the peer a root-side pair belongs to
pub fn resolve_peer(
    registry: &NodeRegistry,
    metric: Metric,
    tokens: &[&str],
    position: usize,
) -> Result<usize, ParseError> {
    let addr = peer_address(tokens, position).unwrap_or_default();
    registry
        .peer_index(addr)
        .ok_or_else(|| ParseError::UnknownPeerAddress {
            addr: addr.to_string(),
            metric,
        })
}
