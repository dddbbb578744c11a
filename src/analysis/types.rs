//! Core data types for experiment log analysis.

use std::collections::HashMap;
use std::fmt;

use serde::{Serialize, Serializer};

use super::derived::DerivedStat;
use super::metric::{Metric, CARRY_OVER};

/// Numeric node id as assigned by the testbed deployment
pub type NodeId = u32;

/// Position of the root in every per-node table
pub const ROOT_INDEX: usize = 0;

/// A node declared in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub addr: String,
}

/// Measurement phase of a node's log stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Before the node's reset marker: network formation
    Bootstrap,
    /// After the reset marker: steady-state measurement
    Data,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Bootstrap => write!(f, "bootstrap"),
            Phase::Data => write!(f, "data"),
        }
    }
}

/// Latest observed value of a metric
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Value token copied verbatim from the log record
    Token(String),
    /// Resolved `lastP` reference; `None` when the node had no parent
    Parent(Option<NodeId>),
}

impl RawValue {
    /// Numeric reading used by formulas. Non-numeric tokens read as zero.
    pub fn as_f64(&self) -> f64 {
        match self {
            RawValue::Token(token) => token
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0),
            RawValue::Parent(parent) => parent.map(f64::from).unwrap_or(0.0),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Token(token) => write!(f, "{}", token),
            RawValue::Parent(Some(id)) => write!(f, "{}", id),
            RawValue::Parent(None) => write!(f, "0"),
        }
    }
}

/// Metric name to latest raw value, for one node in one phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    values: HashMap<Metric, RawValue>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table pre-populated with a node's registry identity
    pub fn for_node(node: &Node) -> Self {
        let mut table = Self::new();
        table.set(Metric::Id, RawValue::Token(node.id.to_string()));
        table.set(Metric::Addr, RawValue::Token(node.addr.clone()));
        table
    }

    /// Store a value, replacing any earlier one (latest wins)
    pub fn set(&mut self, metric: Metric, value: RawValue) {
        self.values.insert(metric, value);
    }

    pub fn get(&self, metric: Metric) -> Option<&RawValue> {
        self.values.get(&metric)
    }

    /// Numeric value of a metric; unset metrics read as zero
    pub fn number(&self, metric: Metric) -> f64 {
        self.get(metric).map(RawValue::as_f64).unwrap_or(0.0)
    }

    /// Display form of a metric; unset metrics read as `0`
    pub fn text(&self, metric: Metric) -> String {
        self.get(metric)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "0".to_string())
    }

    /// The subset of this table that seeds the next phase
    pub fn carry_over(&self) -> Self {
        let values = CARRY_OVER
            .iter()
            .filter_map(|m| self.values.get(m).map(|v| (*m, v.clone())))
            .collect();
        Self { values }
    }

    /// Apply every value of `later` on top of this table
    pub fn overlay(&mut self, later: &RawTable) {
        for (metric, value) in &later.values {
            self.values.insert(*metric, value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One output value of the derived table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Pass-through raw value
    Text(String),
    /// Computed statistic, already rounded
    Number(f64),
    /// Statistic whose denominator accumulated to zero
    NaN,
}

impl Cell {
    pub fn is_nan(&self) -> bool {
        matches!(self, Cell::NaN)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => write!(f, "{}", text),
            Cell::Number(n) => write!(f, "{:.2}", n),
            Cell::NaN => write!(f, "NaN"),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(text) => serializer.serialize_str(text),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::NaN => serializer.serialize_str("NaN"),
        }
    }
}

/// Derived statistics of one node for one phase
#[derive(Debug, Clone, Serialize)]
pub struct DerivedRow {
    pub node_id: NodeId,
    pub cells: Vec<Cell>,
}

/// Ordered derived rows for one phase, root first
#[derive(Debug, Clone, Serialize)]
pub struct PhaseTable {
    pub phase: Phase,
    pub columns: Vec<DerivedStat>,
    pub rows: Vec<DerivedRow>,
}

impl PhaseTable {
    /// Look up a single cell by node id and column
    pub fn cell(&self, node_id: NodeId, column: DerivedStat) -> Option<&Cell> {
        let col = self.columns.iter().position(|c| *c == column)?;
        self.rows
            .iter()
            .find(|row| row.node_id == node_id)
            .and_then(|row| row.cells.get(col))
    }
}

/// Raw per-node tables once every stream has been folded
#[derive(Debug, Clone)]
pub struct AccumulatedTables {
    /// Indexed by registry position
    pub bootstrap: Vec<RawTable>,
    /// Seeded and overlaid data tables; `None` when no node saw a reset
    pub data: Option<Vec<RawTable>>,
    pub diagnostics: Diagnostics,
}

/// Records dropped or logs skipped during a run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    pub unknown_peer_records: usize,
    pub truncated_records: usize,
    pub unreadable_logs: Vec<NodeId>,
}

impl Diagnostics {
    pub fn is_clean(&self) -> bool {
        self.unknown_peer_records == 0
            && self.truncated_records == 0
            && self.unreadable_logs.is_empty()
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub iteration: String,
    pub log_dir: String,
    pub root_id: NodeId,
    pub node_count: usize,
}

/// Complete analysis output of one experiment iteration
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub metadata: ReportMetadata,
    pub nodes: Vec<Node>,
    pub bootstrap: PhaseTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PhaseTable>,
    pub diagnostics: Diagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_value_wins() {
        let mut table = RawTable::new();
        table.set(Metric::TxUp, RawValue::Token("10".into()));
        table.set(Metric::TxUp, RawValue::Token("15".into()));
        assert_eq!(table.number(Metric::TxUp), 15.0);
        assert_eq!(table.text(Metric::TxUp), "15");
    }

    #[test]
    fn test_unset_and_non_numeric_read_as_zero() {
        let mut table = RawTable::new();
        assert_eq!(table.number(Metric::IpQloss), 0.0);
        assert_eq!(table.text(Metric::IpQloss), "0");

        table.set(Metric::Rdt, RawValue::Token("1a2b".into()));
        assert_eq!(table.number(Metric::Rdt), 0.0);
        assert_eq!(table.text(Metric::Rdt), "1a2b");
    }

    #[test]
    fn test_carry_over_keeps_only_cumulative_metrics() {
        let node = Node { id: 2, addr: "2".into() };
        let mut table = RawTable::for_node(&node);
        table.set(Metric::TxUp, RawValue::Token("15".into()));
        table.set(Metric::LastParent, RawValue::Parent(Some(1)));
        table.set(Metric::HopDSum, RawValue::Token("300".into()));

        let seed = table.carry_over();
        assert_eq!(seed.len(), 4);
        assert_eq!(seed.text(Metric::Id), "2");
        assert_eq!(seed.number(Metric::TxUp), 15.0);
        assert_eq!(seed.get(Metric::LastParent), Some(&RawValue::Parent(Some(1))));
        assert!(seed.get(Metric::HopDSum).is_none());
    }

    #[test]
    fn test_overlay_replaces_seeded_values() {
        let mut seed = RawTable::new();
        seed.set(Metric::TxUp, RawValue::Token("15".into()));
        seed.set(Metric::RxUp, RawValue::Token("2".into()));

        let mut later = RawTable::new();
        later.set(Metric::TxUp, RawValue::Token("3".into()));
        seed.overlay(&later);

        assert_eq!(seed.number(Metric::TxUp), 3.0);
        assert_eq!(seed.number(Metric::RxUp), 2.0);
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(Cell::Number(13.333).to_string(), "13.33");
        assert_eq!(Cell::Number(50.0).to_string(), "50.00");
        assert_eq!(Cell::NaN.to_string(), "NaN");
        assert_eq!(Cell::Text("fe80::2".into()).to_string(), "fe80::2");
        assert_eq!(RawValue::Parent(None).to_string(), "0");
    }

    #[test]
    fn test_cell_serialization() {
        let cells = vec![Cell::Text("a".into()), Cell::Number(1.5), Cell::NaN];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"["a",1.5,"NaN"]"#);
    }
}
