//! Report generation for experiment metrics.
//!
//! Renders the per-phase tables as tab-separated text and writes the full
//! report as JSON.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};

use super::types::*;

/// Render one phase table: a header row then one row per node
pub fn render_table(table: &PhaseTable) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(table.rows.len() + 1);

    let header: Vec<&str> = table.columns.iter().map(|c| c.name()).collect();
    lines.push(header.join("\t"));

    for row in &table.rows {
        let cells: Vec<String> = row.cells.iter().map(|c| c.to_string()).collect();
        lines.push(cells.join("\t"));
    }

    lines.join("\n")
}

/// Render the node registry summary
pub fn render_node_info(report: &ExperimentReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("----- node info -----".to_string());
    if let Some((root, non_root)) = report.nodes.split_first() {
        lines.push(format!("root id: {}", root.id));
        lines.push(format!("root addr: {}", root.addr));
        let ids: Vec<String> = non_root.iter().map(|n| n.id.to_string()).collect();
        let addrs: Vec<&str> = non_root.iter().map(|n| n.addr.as_str()).collect();
        lines.push(format!("non-root ids: [{}]", ids.join(", ")));
        lines.push(format!("non-root addr: [{}]", addrs.join(", ")));
    }
    lines.join("\n")
}

/// Render the whole report as text: node info, then each phase
pub fn render_report(report: &ExperimentReport) -> String {
    let mut sections: Vec<String> = Vec::new();

    sections.push(render_node_info(report));
    sections.push(format!(
        "----- bootstrap period -----\n{}",
        render_table(&report.bootstrap)
    ));
    match &report.data {
        Some(data) => sections.push(format!("----- data period -----\n{}", render_table(data))),
        None => sections.push("----- in bootstrap period -----".to_string()),
    }

    let mut text = sections.join("\n\n");
    text.push('\n');
    text
}

/// Generate JSON report
pub fn generate_json_report(report: &ExperimentReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

/// Generate tab-separated text report
pub fn generate_text_report(report: &ExperimentReport, output_path: &Path) -> Result<()> {
    fs::write(output_path, render_report(report))
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print the report to stdout
pub fn print_report(report: &ExperimentReport) {
    print!("{}", render_report(report));

    let d = &report.diagnostics;
    if !d.is_clean() {
        println!();
        println!("----- diagnostics -----");
        println!("unknown peer records: {}", d.unknown_peer_records);
        println!("truncated records: {}", d.truncated_records);
        if !d.unreadable_logs.is_empty() {
            let ids: Vec<String> = d.unreadable_logs.iter().map(|id| id.to_string()).collect();
            println!("unreadable logs: {}", ids.join(", "));
        }
    }
}
