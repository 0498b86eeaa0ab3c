//! End-to-end smoke tests for the `pt-backtest` binary.

use assert_cmd::Command;
use predicates::prelude::*;

const CSV: &str = "timestamp,open,high,low,close,volume\n\
    2024-01-02T14:30:00Z,100,105,99,102,1000\n\
    2024-01-02T14:31:00Z,102,108,101,106,1200\n";

fn backtest() -> Command {
    Command::cargo_bin("pt-backtest").expect("binary builds")
}

#[test]
fn runs_a_session_and_writes_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("SPY_2024-01-02_2024-01-31.csv");
    std::fs::write(&data, CSV).unwrap();
    let out = dir.path().join("results.json");

    backtest()
        .current_dir(dir.path())
        .args([
            "--symbol",
            "SPY",
            "--start",
            "2024-01-02",
            "--end",
            "2024-01-31",
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("results.json"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["numTrades"], 2);
    assert_eq!(report["state"]["cash"], "100005.000000");
    assert_eq!(report["state"]["sharesHeld"], "0.000000");
    assert_eq!(report["state"]["openPositions"], 0);
    assert_eq!(report["averageNumPositions"], 0);
}

#[test]
fn missing_data_file_points_at_the_expected_path() {
    let dir = tempfile::tempdir().unwrap();

    backtest()
        .current_dir(dir.path())
        .args(["--symbol", "SPY", "--start", "2024-01-02", "--end", "2024-01-31"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("SPY_2024-01-02_2024-01-31.csv"));
}

#[test]
fn rejects_a_non_decimal_cash_amount() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("SPY_2024-01-02_2024-01-31.csv");
    std::fs::write(&data, CSV).unwrap();

    backtest()
        .current_dir(dir.path())
        .args([
            "--symbol",
            "SPY",
            "--start",
            "2024-01-02",
            "--end",
            "2024-01-31",
            "--cash",
            "lots",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--cash"));
}

#[test]
fn explicit_data_flag_overrides_the_derived_name() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("whatever.csv");
    std::fs::write(&data, CSV).unwrap();
    let out = dir.path().join("r.json");

    backtest()
        .current_dir(dir.path())
        .args([
            "--symbol",
            "SPY",
            "--start",
            "2024-01-02",
            "--end",
            "2024-01-31",
            "--data",
            data.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert!(out.exists());
}

#[test]
fn rsi_strategy_is_selectable() {
    // Too few bars to seed the indicator: the session runs and reports
    // zero trades.
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("SPY_2024-01-02_2024-01-31.csv");
    std::fs::write(&data, CSV).unwrap();
    let out = dir.path().join("r.json");

    backtest()
        .current_dir(dir.path())
        .args([
            "--symbol",
            "SPY",
            "--start",
            "2024-01-02",
            "--end",
            "2024-01-31",
            "--strategy",
            "rsi-bullish",
            "--out",
            out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["numTrades"], 0);
    assert_eq!(report["state"]["cash"], "100000.000000");
}
