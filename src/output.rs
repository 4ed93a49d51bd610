use crate::error::AskError;
use crate::format;
use std::path::Path;

/// Print TOON result to stdout.
pub fn print_result(toon_string: &str) {
    print!("{}", toon_string);
    if !toon_string.ends_with('\n') {
        println!();
    }
}

/// Print the generated statement as a TOON `sql:` line.
pub fn print_sql(sql: &str) {
    println!("{}", format::to_toon_kv(&[("sql", &sql.replace('\n', " "))]));
}

/// Print error to stderr in the contract format: error: <category>: <message>
pub fn print_error(err: &AskError) {
    eprintln!("error: {}", err);
}

/// Print a notice to stderr when a query returned nothing.
pub fn print_empty_notice() {
    eprintln!("note: query returned no rows");
}

/// Write TOON string to a file.
pub fn write_file(toon_string: &str, path: &Path) -> Result<(), AskError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(AskError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("parent directory does not exist: {}", parent.display()),
        )));
    }
    std::fs::write(path, toon_string)?;
    Ok(())
}
