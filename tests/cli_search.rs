use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

const PEOPLE_CSV: &str = "\
ID,Name,City,Score
1,Alice Smith,New York,95
2,Bob Johnson,Los Angeles,87
3,Charlie Brown,Chicago,92
4,Diana Prince,Houston,88
5,Eve Wilson,Phoenix,94
";

fn write_people(dir: &Path) -> PathBuf {
    let path = dir.join("people.csv");
    fs::write(&path, PEOPLE_CSV).unwrap();
    path
}

#[test]
fn one_shot_search_prints_matches() {
    let tmp = tempdir().unwrap();
    let file = write_people(tmp.path());

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&file).args(["-s", "alice", "-i", "-c", "Name"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Loaded 5 rows and 4 columns"))
        .stdout(predicate::str::contains("Found 1 results"))
        .stdout(predicate::str::contains("Alice Smith"));
}

#[test]
fn default_search_is_case_sensitive() {
    let tmp = tempdir().unwrap();
    let file = write_people(tmp.path());

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&file).args(["-s", "alice", "-c", "Name"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Found 0 results"))
        .stdout(predicate::str::contains("No matches found"));
}

#[test]
fn default_columns_are_the_first_two() {
    let tmp = tempdir().unwrap();
    let file = write_people(tmp.path());

    // "Chicago" lives in the third column, so it is not searched by default.
    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&file).args(["-s", "Chicago"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("In columns: ID, Name"))
        .stdout(predicate::str::contains("Found 0 results"));
}

#[test]
fn invalid_column_fails_with_available_list() {
    let tmp = tempdir().unwrap();
    let file = write_people(tmp.path());

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&file).args(["-s", "x", "-c", "Nope"]);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Available columns: ID, Name, City, Score"))
        .stderr(predicate::str::contains("Invalid columns: Nope"));
}

#[test]
fn invalid_regex_fails_cleanly() {
    let tmp = tempdir().unwrap();
    let file = write_people(tmp.path());

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&file).args(["-s", "(oops", "-r", "-c", "Name"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid regex pattern"));
}

#[test]
fn max_results_caps_rows_and_export_writes_them() {
    let tmp = tempdir().unwrap();
    let file = write_people(tmp.path());
    let out = tmp.path().join("hits.csv");

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&file)
        .args(["-s", "o", "-c", "Name", "City", "-m", "2", "-o"])
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Found 5 results"))
        .stdout(predicate::str::contains("Returning the first 2"))
        .stdout(predicate::str::contains("Exported 2 rows"));

    let written = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "ID,Name,City,Score");
    assert!(lines[1].starts_with("1,Alice Smith"));
    assert!(lines[2].starts_with("2,Bob Johnson"));
}

#[test]
fn export_with_unknown_extension_fails() {
    let tmp = tempdir().unwrap();
    let file = write_people(tmp.path());

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&file)
        .args(["-s", "Alice", "-c", "Name", "-o"])
        .arg(tmp.path().join("hits.json"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported export format: .json"));
}

#[test]
fn pattern_preset_searches_as_regex() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("contacts.csv");
    fs::write(
        &path,
        "Name,Contact\nAlice,alice@example.com\nBob,555-123-4567\nCarol,none\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&path).args(["-p", "phone_us", "-c", "Contact"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Found 1 results"))
        .stdout(predicate::str::contains("555-123-4567"));
}

#[test]
fn missing_file_is_reported() {
    let tmp = tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(tmp.path().join("absent.csv")).args(["-s", "x"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn unsupported_input_is_reported() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("notes.txt");
    fs::write(&path, "hello").unwrap();

    let mut cmd = cargo_bin_cmd!("sheet-search-cli");
    cmd.arg(&path).args(["-s", "x"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format: .txt"));
}
