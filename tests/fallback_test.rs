use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "kind, account, target, amount").unwrap();
    writeln!(csv, "open, alice, ,").unwrap();
    writeln!(csv, "deposit, alice, , 100").unwrap();

    let mut cmd = Command::new(cargo_bin!("bank-ledger"));
    cmd.arg(csv.path()).arg("--db-path").arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("'storage-rocksdb' feature is not enabled"))
        .stdout(predicate::str::contains("alice,99,0"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "kind, account, target, amount").unwrap();
    writeln!(csv, "open, alice, ,").unwrap();
    writeln!(csv, "deposit, alice, , 100").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("bank-ledger"));
    cmd.arg(csv.path()).arg("--db-path").arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("WARN").not());
}
