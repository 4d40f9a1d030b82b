//! End-to-end tests of the `cifra` binary against a temporary data directory

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cifra(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cifra").unwrap();
    cmd.env("CIFRA_DATA_DIR", dir.path())
        .env_remove("CIFRA_EMAIL")
        .env_remove("CIFRA_LOG");
    cmd
}

fn login_and_setup(dir: &TempDir) {
    cifra(dir)
        .args(["login", "--email", "ana@example.com", "--full-name", "Ana García"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as Ana García"))
        .stdout(predicate::str::contains("cifra setup"));

    cifra(dir)
        .args(["setup", "--salary", "50000", "--salary-type", "fijo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile configured."));
}

#[test]
fn test_landing_then_setup_then_dashboard() {
    let dir = TempDir::new().unwrap();

    cifra(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("cifra login"));

    cifra(&dir)
        .args(["login", "--email", "ana@example.com"])
        .assert()
        .success();
    cifra(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("cifra setup"));

    cifra(&dir)
        .args(["setup", "--name", "Ana", "--salary", "50000", "--salary-type", "fijo"])
        .assert()
        .success();
    cifra(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Hola, Ana"))
        .stdout(predicate::str::contains("Total gastado"));
}

#[test]
fn test_commands_require_sign_in() {
    let dir = TempDir::new().unwrap();

    cifra(&dir)
        .args(["expense", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_add_and_list_expense() {
    let dir = TempDir::new().unwrap();
    login_and_setup(&dir);

    cifra(&dir)
        .args([
            "expense",
            "add",
            "Supermercado",
            "5000",
            "--category",
            "alimentación",
            "--type",
            "fijo",
            "--payment",
            "cash",
            "--month",
            "2026-10",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Supermercado to octubre 2026"))
        .stdout(predicate::str::contains("Salary: 10.0%"));

    cifra(&dir)
        .args(["expense", "list", "--month", "2026-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supermercado"))
        .stdout(predicate::str::contains("Alimentación"))
        .stdout(predicate::str::contains("$ 5.000"));

    cifra(&dir)
        .args(["expense", "list", "--month", "2026-10", "--search", "nafta"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses found."));
}

#[test]
fn test_unknown_category_is_rejected() {
    let dir = TempDir::new().unwrap();
    login_and_setup(&dir);

    cifra(&dir)
        .args(["expense", "add", "Pizza", "1500", "--category", "Comida"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Category not found: Comida"));
}

#[test]
fn test_new_month_is_listed_and_selected() {
    let dir = TempDir::new().unwrap();
    login_and_setup(&dir);

    cifra(&dir)
        .args(["month", "new", "2031-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("enero 2031"));

    cifra(&dir)
        .args(["month", "current"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2031-01"));

    cifra(&dir)
        .args(["month", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2031-01"));
}

#[test]
fn test_category_in_use_cannot_be_deleted() {
    let dir = TempDir::new().unwrap();
    login_and_setup(&dir);

    cifra(&dir)
        .args(["expense", "add", "Colectivo", "700", "--category", "Transporte"])
        .assert()
        .success();

    cifra(&dir)
        .args(["category", "delete", "Transporte"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is used by 1 expense(s)"));

    cifra(&dir)
        .args(["category", "delete", "Ropa"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted category: Ropa"));
}

#[test]
fn test_export_import_round_trip() {
    let dir = TempDir::new().unwrap();
    login_and_setup(&dir);
    let backup = dir.path().join("backup.json");

    cifra(&dir)
        .args(["expense", "add", "Alquiler", "250000", "--category", "Vivienda", "--month", "2026-09"])
        .assert()
        .success();
    cifra(&dir)
        .args(["export", "--output"])
        .arg(&backup)
        .assert()
        .success();

    let json = std::fs::read_to_string(&backup).unwrap();
    assert!(json.contains("\"nombre\": \"Alquiler\""));
    assert!(json.contains("\"2026-09\""));

    cifra(&dir)
        .args(["month", "delete", "2026-09"])
        .assert()
        .success();
    cifra(&dir)
        .args(["expense", "list", "--month", "2026-09"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No expenses found."));

    cifra(&dir)
        .arg("import")
        .arg(&backup)
        .assert()
        .success()
        .stdout(predicate::str::contains("septiembre 2026: 1 expense(s)"));
    cifra(&dir)
        .args(["expense", "list", "--month", "2026-09"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alquiler"));
}

#[test]
fn test_malformed_import_fails() {
    let dir = TempDir::new().unwrap();
    login_and_setup(&dir);
    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();

    cifra(&dir)
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Import error"));
}

#[test]
fn test_logout_clears_session() {
    let dir = TempDir::new().unwrap();
    login_and_setup(&dir);

    cifra(&dir)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out."));
    cifra(&dir)
        .arg("whoami")
        .assert()
        .failure();
}
