use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn interactive_session_searches_and_exports() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("people.csv");
    fs::write(
        &file,
        "Name,City\nAlice Smith,New York\nBob Johnson,Newark\nCarol King,Boston\n",
    )
    .unwrap();
    let export_base = tmp.path().join("hits");

    let script = format!(
        "columns\nsearch new -i -c City\nexport {}\nbogus\nquit\n",
        export_base.display()
    );

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&file).arg("--interactive").write_stdin(script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Loaded 3 rows and 2 columns"))
        .stdout(predicate::str::contains(" 1. Name"))
        .stdout(predicate::str::contains("Found 2 results"))
        .stdout(predicate::str::contains("Exported 2 rows"))
        .stdout(predicate::str::contains("Unknown command"))
        .stdout(predicate::str::contains("Goodbye!"));

    // No extension given, so the export defaults to .xlsx.
    assert!(tmp.path().join("hits.xlsx").exists());
}

#[test]
fn interactive_errors_do_not_end_the_session() {
    let tmp = tempdir().unwrap();
    let file = tmp.path().join("people.csv");
    fs::write(&file, "Name\nAlice\n").unwrap();

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg("--interactive")
        .write_stdin(format!(
            "search Alice\nexport out.csv\nload {}\nsearch ( -r\nsearch Alice\n",
            file.display()
        ));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("no file loaded"))
        .stdout(predicate::str::contains("no results to export"))
        .stdout(predicate::str::contains("Invalid regex pattern"))
        .stdout(predicate::str::contains("Found 1 results"));
}
