//! Log file access for experiment iterations.
//!
//! Locates each node's log by naming convention, streams it line by line and
//! folds it into the metric accumulator, non-root nodes first and the root
//! last.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};

use super::accumulator::MetricAccumulator;
use super::derived::{derive_table, DerivedStat};
use super::error::ParseError;
use super::registry::NodeRegistry;
use super::types::*;

/// Default log naming convention
pub const DEFAULT_FILE_PATTERN: &str = "log-{iter}-{id}.txt";

/// Lines of a log, decoded lossily so stray bytes never abort a read
pub struct LogLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LogLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
        }
    }
}

impl<R: BufRead> Iterator for LogLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                    self.buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Where the logs of one experiment iteration live
#[derive(Debug, Clone)]
pub struct LogLayout {
    pub dir: PathBuf,
    pub pattern: String,
    pub iteration: String,
}

impl LogLayout {
    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>, iteration: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
            iteration: iteration.into(),
        }
    }

    /// Path of a node's log, e.g. `log-3-12.txt` for iteration 3, node 12
    pub fn path_for(&self, node_id: NodeId) -> PathBuf {
        let name = self
            .pattern
            .replace("{iter}", &self.iteration)
            .replace("{id}", &node_id.to_string());
        self.dir.join(name)
    }
}

fn open_log(path: &Path) -> io::Result<BufReader<File>> {
    let file = File::open(path)?;
    Ok(BufReader::with_capacity(64 * 1024, file))
}

/// Read the node registry from the log of any node in the iteration
pub fn load_registry(layout: &LogLayout, any_id: NodeId) -> Result<NodeRegistry> {
    let path = layout.path_for(any_id);
    let reader = open_log(&path)
        .with_context(|| format!("Failed to open registry log: {}", path.display()))?;
    let registry = NodeRegistry::from_reader(reader)
        .with_context(|| format!("Failed to read node registry from {}", path.display()))?;

    log::info!(
        "Registry from {}: root {} ({}), {} non-root nodes",
        path.display(),
        registry.root().id,
        registry.root().addr,
        registry.non_root().len()
    );
    Ok(registry)
}

/// Fold one node's log into the accumulator
fn parse_node_log(
    accumulator: &mut MetricAccumulator<'_>,
    index: usize,
    node_id: NodeId,
    path: &Path,
) -> std::result::Result<usize, ParseError> {
    let unreadable = |source| ParseError::UnreadableLog {
        node_id,
        path: path.to_path_buf(),
        source,
    };
    let reader = open_log(path).map_err(unreadable)?;
    accumulator.ingest_reader(index, reader).map_err(unreadable)
}

/// Parse every node log of an iteration.
///
/// An unreadable log only costs that node its contribution: the failure is
/// logged and recorded in the diagnostics, and the remaining nodes are still
/// processed.
pub fn parse_all_logs(registry: &NodeRegistry, layout: &LogLayout) -> AccumulatedTables {
    log::info!("Parsing logs for {} nodes...", registry.node_count());

    let mut accumulator = MetricAccumulator::new(registry);
    for index in registry.processing_order() {
        let Some(node) = registry.node(index) else {
            continue;
        };
        let path = layout.path_for(node.id);

        match parse_node_log(&mut accumulator, index, node.id, &path) {
            Ok(lines) => {
                log::debug!(
                    "Parsed node {}: {} lines, {} phase at end of log",
                    node.id,
                    lines,
                    accumulator.phase_of(index)
                );
            }
            Err(e) => {
                log::warn!("{}", e);
                accumulator.mark_unreadable(node.id);
            }
        }
    }

    let tables = accumulator.finish();
    log::info!(
        "Parsed {} nodes, data period {}",
        registry.node_count(),
        if tables.data.is_some() { "present" } else { "not reached" }
    );
    tables
}

/// Run the full pipeline for one iteration: registry, accumulation, derivation
pub fn analyze_experiment(
    layout: &LogLayout,
    any_id: NodeId,
    columns: &[DerivedStat],
) -> Result<ExperimentReport> {
    let registry = load_registry(layout, any_id)?;
    let tables = parse_all_logs(&registry, layout);

    let bootstrap = derive_table(Phase::Bootstrap, &registry, &tables.bootstrap, columns);
    let data = tables
        .data
        .as_ref()
        .map(|data| derive_table(Phase::Data, &registry, data, columns));

    let diagnostics = tables.diagnostics;
    if !diagnostics.is_clean() {
        log::warn!(
            "Dropped {} unknown-peer and {} truncated records; unreadable logs: {:?}",
            diagnostics.unknown_peer_records,
            diagnostics.truncated_records,
            diagnostics.unreadable_logs
        );
    }

    Ok(ExperimentReport {
        metadata: ReportMetadata {
            generated_at: chrono::Utc::now().to_rfc3339(),
            iteration: layout.iteration.clone(),
            log_dir: layout.dir.display().to_string(),
            root_id: registry.root().id,
            node_count: registry.node_count(),
        },
        nodes: registry.nodes().to_vec(),
        bootstrap,
        data,
        diagnostics,
    })
}
