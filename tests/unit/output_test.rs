use askdb::error::AskError;
use askdb::output::{print_empty_notice, print_error, print_result, print_sql, write_file};

#[test]
fn write_file_creates_file_with_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.toon");

    write_file("[1]{id}:\n  1\n", &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[1]{id}:\n  1\n");
}

#[test]
fn write_file_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.toon");
    std::fs::write(&path, "old contents that are longer").unwrap();

    write_file("new", &path).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
}

#[test]
fn write_file_missing_parent_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("rows.toon");

    let err = write_file("x", &path).unwrap_err();

    assert!(matches!(err, AskError::Io(_)));
    assert!(err.to_string().contains("parent directory does not exist"), "Got: {}", err);
}

#[test]
fn print_functions_do_not_panic() {
    print_result("[0]{id}:\n");
    print_result("no trailing newline");
    print_sql("SELECT *\nFROM customers");
    print_error(&AskError::Unanswerable);
    print_empty_notice();
}
