use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::path::PathBuf;

use iotlab_metrics::analysis::{self, types::NodeId, LogLayout};
use iotlab_metrics::config::{self, Config};

/// Per-node network metrics from RPL/TSCH testbed experiment logs
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Experiment iteration, substituted for {iter} in log file names
    iter: String,

    /// Id of any node whose log carries the HCK-NODE declarations
    any_id: NodeId,

    /// Directory holding the per-node logs (overrides the config file)
    #[arg(short, long)]
    log_dir: Option<PathBuf>,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write the report as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Also write the tab-separated report to this path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    if let Some(dir) = &args.log_dir {
        config.log_dir = dir.clone();
    }
    let columns = config
        .column_selection()
        .wrap_err("Invalid column selection")?;

    info!("Iteration: {}", args.iter);
    info!("Registry node: {}", args.any_id);
    info!("Log directory: {:?}", config.log_dir);

    let layout = LogLayout::new(&config.log_dir, &config.file_pattern, &args.iter);
    let report = analysis::analyze_experiment(&layout, args.any_id, &columns)?;

    analysis::print_report(&report);

    if let Some(path) = &args.output {
        analysis::generate_text_report(&report, path)?;
    }
    if let Some(path) = &args.json {
        analysis::generate_json_report(&report, path)?;
    }

    info!("Analysis completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["iotlab-metrics", "3", "12"]);

        assert_eq!(args.iter, "3");
        assert_eq!(args.any_id, 12);
        assert!(args.log_dir.is_none());
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn test_output_args() {
        let args = Args::parse_from([
            "iotlab-metrics",
            "1",
            "1",
            "--log-dir",
            "results",
            "--json",
            "report.json",
        ]);

        assert_eq!(args.log_dir, Some(PathBuf::from("results")));
        assert_eq!(args.json, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn test_any_id_must_be_numeric() {
        assert!(Args::try_parse_from(["iotlab-metrics", "1", "root"]).is_err());
    }
}
