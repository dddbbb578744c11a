//! # iotlab-metrics - Per-node metrics from RPL/TSCH testbed experiments
//!
//! Every node of a testbed deployment prints tagged metric records (`HCK ...`)
//! into its serial log. This library folds those logs into per-node raw
//! metric tables and derives delivery ratios, queue and link losses, hop
//! depth, subtree size, duty cycle and TSCH schedule statistics.
//!
//! ## Measurement phases
//!
//! Each node log is split by its `reset_log` marker into a bootstrap period
//! (network formation) and a data period (steady state). Both phases are
//! reported independently; cumulative packet counters and the last parent
//! carry over from the bootstrap period into the data period.
//!
//! ## Architecture
//!
//! - `analysis::registry`: node table from the `HCK-NODE` declarations
//! - `analysis::tokenizer`: `HCK` record recognition and pair walking
//! - `analysis::accumulator`: phase-aware latest-wins accumulation
//! - `analysis::attribution`: routing root-side peer reports to the peer
//! - `analysis::derived`: derived statistic formulas
//! - `analysis::log_parser`: log file access and the analysis pipeline
//! - `analysis::report`: tab-separated and JSON output
//! - `config`: YAML configuration
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use iotlab_metrics::analysis::{self, LogLayout, DEFAULT_COLUMNS};
//!
//! let layout = LogLayout::new("results", "log-{iter}-{id}.txt", "1");
//! let report = analysis::analyze_experiment(&layout, 1, &DEFAULT_COLUMNS)?;
//! analysis::print_report(&report);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Per-record anomalies are recovered and counted in the run diagnostics.
//! Registry corruption and file access failures are reported through
//! `color_eyre` with context.

pub mod analysis;
pub mod config;
