use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn script_mode_runs_basic_flow() {
    let home = tempdir().unwrap();
    let export_path = home.path().join("export.json");
    let input = format!(
        "income 5000 2025-01\nbudget Rent 2000 2025-01\nspend 450 Groceries 2025-01-10 weekly shop\nperiod 2025-01-15\nsummary\nexport {}\nsave demo\nexit\n",
        export_path.display()
    );

    let mut cmd = Command::cargo_bin("pocket_ledger_cli").unwrap();
    cmd.env("POCKET_LEDGER_HOME", home.path())
        .env("POCKET_LEDGER_CLI_SCRIPT", "1")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("total budgeted"))
        .stdout(contains("saved book `demo`"));

    let json = std::fs::read_to_string(&export_path).unwrap();
    assert!(json.contains("budgetData"));
    assert!(json.contains("Groceries"));
}

#[test]
fn script_mode_reports_errors_without_aborting() {
    let home = tempdir().unwrap();
    let input = "spend -5 Rent\nincome 1000 2025-02\nexit\n";

    let mut cmd = Command::cargo_bin("pocket_ledger_cli").unwrap();
    cmd.env("POCKET_LEDGER_HOME", home.path())
        .env("POCKET_LEDGER_CLI_SCRIPT", "1")
        .write_stdin(input)
        .assert()
        .success()
        .stderr(contains("amount must be positive"))
        .stdout(contains("income for 2025-02 set to"));
}
