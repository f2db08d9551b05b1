use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/ledger.csv");

    cmd.assert()
        .success()
        .stdout("account,balance,debt\nBANK,2,0\nalice,69,0\nbob,159,150\n");

    Ok(())
}

#[test]
fn test_cli_fee_override() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "kind, account, target, amount").unwrap();
    writeln!(file, "open, alice, ,").unwrap();
    writeln!(file, "deposit, alice, , 100").unwrap();

    let mut cmd = Command::new(cargo_bin!("bank-ledger"));
    cmd.arg(file.path()).arg("--fee").arg("0");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("BANK,0,0"))
        .stdout(predicate::str::contains("alice,100,0"));
}

#[test]
fn test_cli_config_file() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, r#"{{ "fee": "2", "max_debt": "100" }}"#).unwrap();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "kind, account, target, amount").unwrap();
    writeln!(file, "open, alice, ,").unwrap();
    writeln!(file, "deposit, alice, , 10").unwrap();
    writeln!(file, "take_loan, alice, , 150").unwrap(); // over the cap, rejected

    let mut cmd = Command::new(cargo_bin!("bank-ledger"));
    cmd.arg(file.path()).arg("--config").arg(config.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Credit limit exceeded"))
        .stdout(predicate::str::contains("BANK,2,0"))
        .stdout(predicate::str::contains("alice,8,0"));
}

#[test]
fn test_cli_rejects_invalid_config() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "kind, account, target, amount").unwrap();

    let mut cmd = Command::new(cargo_bin!("bank-ledger"));
    cmd.arg(file.path()).arg("--max-retries").arg("0");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("max_retries"));
}

#[test]
fn test_cli_survives_balance_overflow() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "kind, account, target, amount").unwrap();
    writeln!(file, "open, alice, ,").unwrap();
    writeln!(file, "take_loan, alice, , 79228162514264337593543950335").unwrap();
    writeln!(file, "take_loan, alice, , 1").unwrap();

    let mut cmd = Command::new(cargo_bin!("bank-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("overflows"))
        .stdout(predicate::str::contains(
            "alice,79228162514264337593543950335,79228162514264337593543950335",
        ));
}

#[test]
fn test_cli_transfer_without_target_is_skipped() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "kind, account, target, amount").unwrap();
    writeln!(file, "open, alice, ,").unwrap();
    writeln!(file, "deposit, alice, , 10").unwrap();
    writeln!(file, "transfer, alice, , 5").unwrap();

    let mut cmd = Command::new(cargo_bin!("bank-ledger"));
    cmd.arg(file.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Transfer from `alice` names no recipient"))
        .stdout(predicate::str::contains("alice,9,0"));
}
