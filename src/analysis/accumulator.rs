//! Phase-aware metric accumulation.
//!
//! Each node stream starts in the bootstrap period and moves to the data
//! period at its first `reset_log` marker. Values are kept per node and per
//! phase with latest-wins semantics. The data tables only record what was
//! written after the reset; [`MetricAccumulator::finish`] seeds them with
//! the carry-over subset of the final bootstrap tables, so root-side reports
//! folded after a peer's own log still reach that peer's seed.

use std::io::BufRead;

use log::{debug, warn};

use super::attribution;
use super::error::ParseError;
use super::log_parser::LogLines;
use super::metric::Metric;
use super::registry::NodeRegistry;
use super::tokenizer::{Entry, MetricRecord};
use super::types::*;

/// Per-node accumulation state
#[derive(Debug, Clone)]
struct NodeState {
    phase: Phase,
    bootstrap: RawTable,
    /// Writes observed during the data period only
    data: RawTable,
}

impl NodeState {
    fn new(node: &Node) -> Self {
        Self {
            phase: Phase::Bootstrap,
            bootstrap: RawTable::for_node(node),
            data: RawTable::new(),
        }
    }

    fn table_mut(&mut self, phase: Phase) -> &mut RawTable {
        match phase {
            Phase::Bootstrap => &mut self.bootstrap,
            Phase::Data => &mut self.data,
        }
    }
}

/// Folds node log streams into per-node, per-phase raw tables
pub struct MetricAccumulator<'r> {
    registry: &'r NodeRegistry,
    nodes: Vec<NodeState>,
    diagnostics: Diagnostics,
}

impl<'r> MetricAccumulator<'r> {
    pub fn new(registry: &'r NodeRegistry) -> Self {
        Self {
            registry,
            nodes: registry.nodes().iter().map(NodeState::new).collect(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Current phase of the node at `index`
    pub fn phase_of(&self, index: usize) -> Phase {
        self.nodes
            .get(index)
            .map(|n| n.phase)
            .unwrap_or(Phase::Bootstrap)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Fold a whole log stream for the node at `index`. Returns lines read.
    ///
    /// The stream is committed only if it reads to the end. On a read error
    /// every table and counter is restored to its state before the stream,
    /// including peer rows written through root-side reports.
    pub fn ingest_reader<R: BufRead>(&mut self, index: usize, reader: R) -> std::io::Result<usize> {
        let checkpoint = (self.nodes.clone(), self.diagnostics.clone());
        match self.fold_stream(index, reader) {
            Ok(count) => Ok(count),
            Err(e) => {
                (self.nodes, self.diagnostics) = checkpoint;
                Err(e)
            }
        }
    }

    fn fold_stream<R: BufRead>(&mut self, index: usize, reader: R) -> std::io::Result<usize> {
        let mut count = 0;
        for line in LogLines::new(reader) {
            self.ingest_line(index, &line?);
            count += 1;
        }
        Ok(count)
    }

    /// Fold a single log line for the node at `index`
    pub fn ingest_line(&mut self, index: usize, line: &str) {
        if index >= self.nodes.len() {
            return;
        }
        let Some(record) = MetricRecord::parse(line) else {
            return;
        };
        let phase = self.nodes[index].phase;

        for entry in record.entries() {
            match entry {
                Entry::Reset => self.observe_reset(index),
                Entry::Truncated { pairs } => {
                    self.diagnostics.truncated_records += 1;
                    debug!("{}: {}", ParseError::TruncatedRecord { pairs }, line);
                }
                Entry::Pair {
                    name,
                    value,
                    position,
                } => {
                    let Some(metric) = Metric::from_name(name) else {
                        continue;
                    };
                    // Identity comes from the registry only.
                    if matches!(metric, Metric::Id | Metric::Addr) {
                        continue;
                    }

                    if index == ROOT_INDEX && attribution::is_cross_attributed(metric) {
                        match attribution::resolve_peer(self.registry, metric, record.tokens(), position) {
                            Ok(target) => {
                                self.store(target, phase, metric, RawValue::Token(value.to_string()))
                            }
                            Err(e) => {
                                self.diagnostics.unknown_peer_records += 1;
                                warn!("Skipping root record: {}", e);
                            }
                        }
                        // A peer report owns the rest of its record.
                        break;
                    }

                    let raw = if metric == Metric::LastParent {
                        match self.registry.resolve_parent(value) {
                            Ok(parent) => RawValue::Parent(parent),
                            Err(e) => {
                                self.diagnostics.unknown_peer_records += 1;
                                warn!("Skipping parent of node {}: {}", self.node_id(index), e);
                                continue;
                            }
                        }
                    } else {
                        RawValue::Token(value.to_string())
                    };
                    self.store(index, phase, metric, raw);
                }
            }
        }
    }

    /// Mark a node whose log could not be read
    pub fn mark_unreadable(&mut self, node_id: NodeId) {
        if !self.diagnostics.unreadable_logs.contains(&node_id) {
            self.diagnostics.unreadable_logs.push(node_id);
        }
    }

    /// Seed and assemble the final per-phase tables
    pub fn finish(self) -> AccumulatedTables {
        let any_reset = self.nodes.iter().any(|n| n.phase == Phase::Data);

        let data = any_reset.then(|| {
            self.nodes
                .iter()
                .map(|n| {
                    let mut table = n.bootstrap.carry_over();
                    table.overlay(&n.data);
                    table
                })
                .collect::<Vec<_>>()
        });
        let bootstrap = self.nodes.into_iter().map(|n| n.bootstrap).collect::<Vec<_>>();

        AccumulatedTables {
            bootstrap,
            data,
            diagnostics: self.diagnostics,
        }
    }

    fn observe_reset(&mut self, index: usize) {
        let state = &mut self.nodes[index];
        if state.phase == Phase::Bootstrap {
            debug!("Node {} entered the data period", self.registry.nodes()[index].id);
            state.phase = Phase::Data;
        }
    }

    fn store(&mut self, index: usize, phase: Phase, metric: Metric, value: RawValue) {
        self.nodes[index].table_mut(phase).set(metric, value);
    }

    fn node_id(&self, index: usize) -> NodeId {
        self.registry.nodes()[index].id
    }
}
