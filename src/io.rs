//! File helpers for reading LaTeX sources and writing the annotated result.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

/// Read a UTF-8 source file, dropping a leading byte-order mark.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid UTF-8.
pub fn read_text(path: &Path) -> io::Result<String> {
    let text = fs::read_to_string(path)?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Write `text` to `path`, or to standard output when no path is given.
///
/// # Errors
/// Returns an error if writing fails.
pub fn write_output(path: Option<&Path>, text: &str) -> io::Result<()> {
    match path {
        Some(path) => fs::write(path, text),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()
        }
    }
}
