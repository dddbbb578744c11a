use std::fs;
use std::path::Path;

use tempfile::TempDir;

use iotlab_metrics::analysis::{
    analyze_experiment, load_registry, parse_all_logs, Cell, DerivedStat, LogLayout, Metric,
    DEFAULT_COLUMNS,
};

const PATTERN: &str = "log-{iter}-{id}.txt";
const ROOT: usize = 0;

fn write_log(dir: &Path, id: u32, lines: &[&str]) {
    let mut content = String::new();
    for line in lines {
        content.push_str("1614.201;m3-");
        content.push_str(&id.to_string());
        content.push_str(";[INFO: App       ] ");
        content.push_str(line);
        content.push('\n');
    }
    fs::write(dir.join(format!("log-1-{}.txt", id)), content).unwrap();
}

fn registry_lines() -> Vec<&'static str> {
    vec![
        "HCK-NODE root 1 fe80::1",
        "HCK-NODE non_root 2 fe80::2",
        "HCK-NODE end",
    ]
}

/// Root (1, fe80::1) and one peer (2, fe80::2) with a reset in both logs
fn two_node_experiment() -> TempDir {
    let dir = TempDir::new().unwrap();

    let mut root = registry_lines();
    root.extend([
        "HCK rx_up 2 fe80::2 |",
        "HCK reset_log at 1a2b |",
        "HCK rx_up 1 fe80::2 |",
    ]);
    write_log(dir.path(), 1, &root);

    let mut peer = registry_lines();
    peer.extend([
        "HCK tx_up 10 | ",
        "HCK tx_up 15 rx_up 2 |",
        "HCK reset_log at 1a2b |",
        "HCK tx_up 3 rx_up 1 |",
    ]);
    write_log(dir.path(), 2, &peer);

    dir
}

#[test]
fn test_bootstrap_and_data_delivery_ratios() {
    let dir = two_node_experiment();
    let layout = LogLayout::new(dir.path(), PATTERN, "1");
    let report = analyze_experiment(&layout, 2, &DEFAULT_COLUMNS).unwrap();

    assert_eq!(report.metadata.node_count, 2);
    assert_eq!(report.metadata.root_id, 1);
    assert!(report.diagnostics.is_clean());

    let bootstrap = &report.bootstrap;
    assert_eq!(bootstrap.rows[0].node_id, 1);
    assert_eq!(bootstrap.rows[1].node_id, 2);
    assert_eq!(bootstrap.cell(2, DerivedStat::TxUp), Some(&Cell::Text("15".into())));
    assert_eq!(bootstrap.cell(2, DerivedStat::UplinkPdr), Some(&Cell::Number(13.33)));
    assert!(bootstrap.cell(2, DerivedStat::DownlinkPdr).unwrap().is_nan());
    assert!(bootstrap.cell(1, DerivedStat::UplinkPdr).unwrap().is_nan());

    let data = report.data.as_ref().expect("both logs contain a reset");
    // tx_up is seeded with 15, then overwritten by the post-reset record
    assert_eq!(data.cell(2, DerivedStat::TxUp), Some(&Cell::Text("3".into())));
    assert_eq!(data.cell(2, DerivedStat::UplinkPdr), Some(&Cell::Number(33.33)));
    assert_eq!(data.cell(2, DerivedStat::Addr), Some(&Cell::Text("fe80::2".into())));
}

#[test]
fn test_carry_over_without_post_reset_records() {
    let dir = TempDir::new().unwrap();
    let mut root = registry_lines();
    root.extend(["HCK rx_up 4 fe80::2 |", "HCK ip_enq 9 |", "HCK reset_log at 5 |"]);
    write_log(dir.path(), 1, &root);
    write_log(
        dir.path(),
        2,
        &["HCK tx_up 8 lastP fe80::1 ps 2 hopD_sum 6 hopD_cnt 3 |", "HCK reset_log at 5 |"],
    );

    let layout = LogLayout::new(dir.path(), PATTERN, "1");
    let registry = load_registry(&layout, 1).unwrap();
    let tables = parse_all_logs(&registry, &layout);
    let data = tables.data.unwrap();

    for metric in [Metric::Id, Metric::Addr, Metric::TxUp, Metric::RxUp, Metric::LastParent] {
        assert_eq!(data[1].get(metric), tables.bootstrap[1].get(metric), "{}", metric);
    }
    assert_eq!(data[1].number(Metric::RxUp), 4.0);
    assert!(data[1].get(Metric::ParentSwitches).is_none());
    assert!(data[1].get(Metric::HopDSum).is_none());
    assert!(data[ROOT].get(Metric::IpEnq).is_none());
    assert_eq!(tables.bootstrap[ROOT].number(Metric::IpEnq), 9.0);
}

#[test]
fn test_no_reset_means_no_data_table() {
    let dir = TempDir::new().unwrap();
    let mut root = registry_lines();
    root.push("HCK tx_down 3 to 2 fe80::2 |");
    write_log(dir.path(), 1, &root);
    write_log(dir.path(), 2, &["HCK rx_down 3 |"]);

    let layout = LogLayout::new(dir.path(), PATTERN, "1");
    let report = analyze_experiment(&layout, 1, &DEFAULT_COLUMNS).unwrap();

    assert!(report.data.is_none());
    assert_eq!(
        report.bootstrap.cell(2, DerivedStat::DownlinkPdr),
        Some(&Cell::Number(100.0))
    );
    assert_eq!(report.bootstrap.cell(2, DerivedStat::Pdr), Some(&Cell::Number(100.0)));
}

#[test]
fn test_anomalies_are_counted_and_skipped() {
    let dir = TempDir::new().unwrap();
    let mut root = registry_lines();
    root.extend(["HCK rx_up 4 fe80::77 |", "HCK ip_ok 2 ip_err |"]);
    write_log(dir.path(), 1, &root);
    // node 2 has no log at all

    let layout = LogLayout::new(dir.path(), PATTERN, "1");
    let report = analyze_experiment(&layout, 1, &DEFAULT_COLUMNS).unwrap();

    assert_eq!(report.diagnostics.unknown_peer_records, 1);
    assert_eq!(report.diagnostics.truncated_records, 1);
    assert_eq!(report.diagnostics.unreadable_logs, vec![2]);
    assert_eq!(report.bootstrap.cell(2, DerivedStat::Id), Some(&Cell::Text("2".into())));
    assert!(report.bootstrap.cell(2, DerivedStat::UplinkPdr).unwrap().is_nan());
}

#[test]
fn test_malformed_registry_is_fatal() {
    let dir = TempDir::new().unwrap();
    write_log(dir.path(), 1, &["HCK-NODE root 1 fe80::1", "HCK tx_up 1 |"]);

    let layout = LogLayout::new(dir.path(), PATTERN, "1");
    assert!(analyze_experiment(&layout, 1, &DEFAULT_COLUMNS).is_err());
}
