use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn saver(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("saver").unwrap();
    cmd.env("BUDGET_SAVER_DATA_DIR", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn init(dir: &TempDir) {
    saver(dir).arg("init").assert().success();
}

#[test]
fn init_creates_default_categories() {
    let dir = TempDir::new().unwrap();

    saver(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transport"))
        .stdout(predicate::str::contains("Savings"));

    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("ledger.json").exists());

    saver(&dir)
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Investment"));
}

#[test]
fn allocation_moves_money_from_pool() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    saver(&dir)
        .args(["txn", "add", "income", "1000", "--date", "2025-01-01"])
        .assert()
        .success();
    saver(&dir)
        .args(["category", "allocate", "Savings", "300", "--date", "2025-01-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pool: €700.00"));

    saver(&dir)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pool:           €700.00"))
        .stdout(predicate::str::contains("Grand total:    €1000.00"));
}

#[test]
fn over_allocation_fails_and_changes_nothing() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    saver(&dir)
        .args(["txn", "add", "income", "100", "--date", "2025-01-01"])
        .assert()
        .success();
    saver(&dir)
        .args(["category", "allocate", "Travel", "150", "--date", "2025-01-02"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pool"));

    saver(&dir)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pool:           €100.00"));
}

#[test]
fn unknown_category_is_an_error() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    saver(&dir)
        .args(["category", "show", "Groceries"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Groceries"));
}

#[test]
fn transactions_list_filters_by_kind() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    saver(&dir)
        .args([
            "txn", "add", "expense", "12.50", "--date", "2025-03-04", "--note", "Lunch",
        ])
        .assert()
        .success();

    saver(&dir)
        .args(["txn", "list", "--kind", "expense"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lunch"))
        .stdout(predicate::str::contains("€12.50"));
}

#[test]
fn rates_convert() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    saver(&dir)
        .args(["rates", "convert", "100", "EUR", "USD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("$108.00"));
}

#[test]
fn export_csv_to_file() {
    let dir = TempDir::new().unwrap();
    init(&dir);
    let output = dir.path().join("export.csv");

    saver(&dir)
        .args(["txn", "add", "income", "50", "--date", "2025-02-01"])
        .assert()
        .success();
    saver(&dir)
        .args(["export", "csv", "-o"])
        .arg(&output)
        .assert()
        .success();

    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.starts_with("All Transactions"));
    assert!(contents.contains("2025-02-01,income,,Pool,50.00,EUR"));
    assert!(contents.contains("TOTAL,EUR,50.00,0.00,,50.00"));
}

#[test]
fn audit_records_changes() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    saver(&dir)
        .args(["category", "rename", "Others", "Misc"])
        .assert()
        .success();

    saver(&dir)
        .args(["audit", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UPDATE Category"))
        .stdout(predicate::str::contains("Misc"));
}

#[test]
fn expense_categories_spend_from_pool() {
    let dir = TempDir::new().unwrap();
    init(&dir);

    saver(&dir)
        .args(["txn", "add", "income", "1000", "--date", "2025-01-01"])
        .assert()
        .success();
    saver(&dir)
        .args(["txn", "add", "expense", "450", "-c", "Housing", "--date", "2025-01-02"])
        .assert()
        .success();
    saver(&dir)
        .args(["category", "allocate", "Housing", "10", "--date", "2025-01-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expense category"));

    saver(&dir)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pool:           €550.00"));
    saver(&dir)
        .args(["category", "create", "Groceries", "--expense"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created expense category: Groceries"));
}
