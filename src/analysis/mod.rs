//! Experiment log analysis for RPL/TSCH testbed runs.
//!
//! Builds the node registry, folds every node's log into per-phase raw
//! metric tables and derives the per-node statistics tables.

pub mod types;
pub mod error;
pub mod metric;
pub mod tokenizer;
pub mod registry;
pub mod attribution;
pub mod accumulator;
pub mod derived;
pub mod log_parser;
pub mod report;

pub use types::*;
pub use error::ParseError;
pub use metric::{Metric, CARRY_OVER};
pub use registry::NodeRegistry;
pub use accumulator::MetricAccumulator;
pub use derived::{derive_table, DerivedStat, DEFAULT_COLUMNS};
pub use log_parser::{analyze_experiment, load_registry, parse_all_logs, LogLayout};
pub use report::{generate_json_report, generate_text_report, print_report};
