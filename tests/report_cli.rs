//! E2E tests for the report, validate, rules and schema commands

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::io::Write;
use std::process::{Command, Output, Stdio};

fn eqtax(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_eqtax"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test the formatted report for the worked examples
#[test]
fn report_basic_table() {
    let output = eqtax(&["report", "tests/data/basic.csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("EQUITY CAPITAL GAINS TAX"));
    assert!(stdout.contains("STCG"));
    assert!(stdout.contains("LTCG"));
    assert!(stdout.contains("67.50"));
    assert!(stdout.contains("14312.50"));
    // short term loss is not floored
    assert!(stdout.contains("-30.00"));
    assert!(stdout.contains("Disposals:      4 (3 short term, 1 long term)"));
    assert!(!stdout.contains("could not be processed"));
}

/// Test that bad rows are reported and skipped without stopping the run
#[test]
fn report_skips_bad_rows() {
    let output = eqtax(&["report", "tests/data/mixed_errors.csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);

    assert!(stdout.contains("2 row(s) could not be processed"));
    assert!(stdout.contains("row 2: invalid date 'not-a-date' for 'purchase date'"));
    assert!(stdout.contains("row 4: missing value for 'sell price'"));
    // month first dates and grouped digits in row 3
    assert!(stdout.contains("2024-08-01"));
    assert!(stdout.contains("14312.50"));
}

/// Test JSON output structure
#[test]
fn report_json_output() {
    let output = eqtax(&["report", "tests/data/mixed_errors.csv", "--json"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(json["results"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["errors"].as_array().map(Vec::len), Some(2));
    assert_eq!(json["results"][0]["gain_type"], "ShortTerm");
    assert_eq!(json["results"][1]["gain_type"], "LongTerm");
    assert_eq!(json["errors"][0]["row"], 2);
    assert_eq!(json["errors"][0]["type"], "InvalidDate");
    assert_eq!(json["totals"]["long_term_count"], 1);
}

/// Test totals too large to sum are reported as unavailable, not a crash
#[test]
fn report_totals_unavailable() {
    let output = eqtax(&["report", "tests/data/large_amounts.csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("Disposals:      21"));
    assert!(stdout.contains("Totals unavailable"));

    let output = eqtax(&["report", "tests/data/large_amounts.csv", "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["results"].as_array().map(Vec::len), Some(21));
    assert!(json["totals"].is_null());
}

/// Test reading transactions from an Excel workbook
#[test]
fn report_from_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let headers = [
        "Notes",
        " purchase DATE",
        "Sell Date ",
        "PURCHASE PRICE",
        "Sell Price",
        "Brokerage & Other Charges",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }

    let purchase = ExcelDateTime::from_ymd(2023, 1, 1).unwrap();
    let sell = ExcelDateTime::from_ymd(2023, 6, 1).unwrap();
    sheet.write_string(1, 0, "date cells").unwrap();
    sheet.write_datetime_with_format(1, 1, &purchase, &date_format).unwrap();
    sheet.write_datetime_with_format(1, 2, &sell, &date_format).unwrap();
    sheet.write_number(1, 3, 1000).unwrap();
    sheet.write_number(1, 4, 1500).unwrap();
    sheet.write_number(1, 5, 50).unwrap();

    sheet.write_string(2, 0, "text cells").unwrap();
    sheet.write_string(2, 1, "2022-01-01").unwrap();
    sheet.write_string(2, 2, "2024-08-01").unwrap();
    sheet.write_string(2, 3, "10,000").unwrap();
    sheet.write_number(2, 4, 250000).unwrap();
    sheet.write_number(2, 5, 500).unwrap();
    workbook.save(&path).unwrap();

    let output = eqtax(&["report", path.to_str().unwrap(), "--json"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["errors"].as_array().map(Vec::len), Some(0));

    let first = &json["results"][0];
    assert_eq!(first["row"], 1);
    assert_eq!(first["purchase_date"], "2023-01-01");
    assert_eq!(first["sell_date"], "2023-06-01");
    assert_eq!(first["holding_period_days"], 151);
    assert_eq!(first["tax_amount"], "67.5");

    let second = &json["results"][1];
    assert_eq!(second["row"], 2);
    assert_eq!(second["gain_type"], "LongTerm");
    assert_eq!(second["tax_amount"], "14312.5");
}

/// Test a missing column stops the run before any row is processed
#[test]
fn report_missing_columns() {
    let output = eqtax(&["report", "tests/data/missing_columns.csv"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("missing required column(s): sell price, brokerage & other charges"));
}

/// Test reading CSV piped to stdin
#[test]
fn report_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_eqtax"))
        .args(["report", "--json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("Failed to execute command");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(include_bytes!("data/clean.csv"))
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("\"tax_amount\": \"14312.5\""));
}

/// Test the Excel export contains the report columns and one row per result
#[test]
fn report_exports_xlsx() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.xlsx");
    let output = eqtax(&[
        "report",
        "tests/data/mixed_errors.csv",
        "-o",
        path.to_str().unwrap(),
    ]);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let mut workbook = open_workbook_auto(&path).unwrap();
    let range = workbook.worksheet_range("Tax Results").unwrap();
    let rows: Vec<_> = range.rows().collect();
    assert_eq!(rows.len(), 3);

    let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
    assert_eq!(
        header,
        vec![
            "Purchase Date",
            "Sell Date",
            "Type",
            "Net Gain",
            "Taxable Gain",
            "Rate (%)",
            "Tax Amount"
        ]
    );
    assert_eq!(rows[1][2], Data::String("STCG".to_string()));
    assert_eq!(rows[2][6], Data::Float(14312.5));
}

/// Test the CSV export
#[test]
fn report_exports_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.csv");
    let output = eqtax(&["report", "tests/data/clean.csv", "-o", path.to_str().unwrap()]);

    assert!(output.status.success(), "Command failed: {:?}", output);

    let csv = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "2023-01-01,2023-06-01,STCG,450,450,15,67.5");
    assert_eq!(lines[2], "2022-01-01,2024-08-01,LTCG,239500,114500,12.5,14312.5");
}

/// Test a custom rate schedule changes the rate applied
#[test]
fn report_with_custom_rules() {
    let default = eqtax(&["report", "tests/data/after_2025.csv", "--json"]);
    let custom = eqtax(&[
        "report",
        "tests/data/after_2025.csv",
        "--rules",
        "tests/data/rules.toml",
        "--json",
    ]);

    assert!(default.status.success(), "Command failed: {:?}", default);
    assert!(custom.status.success(), "Command failed: {:?}", custom);

    let default: serde_json::Value = serde_json::from_slice(&default.stdout).unwrap();
    let custom: serde_json::Value = serde_json::from_slice(&custom.stdout).unwrap();
    assert_eq!(default["results"][0]["rate"], "20");
    assert_eq!(custom["results"][0]["rate"], "25");
}

/// Test validate lists warnings but only fails on them with --strict
#[test]
fn validate_reports_warnings() {
    let output = eqtax(&["validate", "tests/data/basic.csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("2 issue(s) found"));
    assert!(stdout.contains("Row 3 [warning] SellBeforePurchase"));
    assert!(stdout.contains("Row 4 [warning] NegativeShortTermTax"));

    let strict = eqtax(&["validate", "tests/data/basic.csv", "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
}

/// Test validate exits non-zero on row errors
#[test]
fn validate_reports_errors() {
    let output = eqtax(&["validate", "tests/data/mixed_errors.csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Row 2 [error] InvalidDate"));
    assert!(stdout.contains("Row 4 [error] MissingValue"));
}

/// Test validate succeeds on clean input
#[test]
fn validate_clean_input() {
    let output = eqtax(&["validate", "tests/data/clean.csv"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("No issues found"));
}

/// Test the rules command shows the configured regimes
#[test]
fn rules_table() {
    let output = eqtax(&["rules", "-r", "tests/data/rules.toml"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("baseline"));
    assert!(stdout.contains("2024-07-23"));
    assert!(stdout.contains("2025-04-01"));
    assert!(stdout.contains("more than 365 days"));
}

/// Test the default rules print as TOML
#[test]
fn rules_toml() {
    let output = eqtax(&["rules", "--toml"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert!(stdout.contains("effective_from = \"2024-07-23\""));
    assert!(stdout.contains("[[regime]]"));
}

/// Test the CSV header output
#[test]
fn schema_csv_header() {
    let output = eqtax(&["schema", "csv-header"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(
        stdout.trim(),
        "purchase date,sell date,purchase price,sell price,brokerage & other charges"
    );
}
