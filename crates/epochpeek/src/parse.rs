use std::io::{Read, Write};

use anyhow::{Context, Result};
use epochpeek_parser::inspect;

/// Reads all of `reader`, replacing invalid UTF-8 rather than failing.
pub fn read_text<R: Read>(mut reader: R) -> Result<String> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).context("Failed to read text")?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes the first timestamp in `text` to `out`.
///
/// Returns whether a timestamp was found. On a miss nothing is written to
/// `out`; with `explain` the rejection reason goes to `err`.
pub fn run<O: Write, E: Write>(
    text: &str,
    explain: bool,
    out: &mut O,
    err: &mut E,
) -> Result<bool> {
    match inspect(text) {
        Ok(extraction) => {
            writeln!(out, "{}", extraction.to_iso8601())?;
            Ok(true)
        }
        Err(rejection) => {
            if explain {
                writeln!(err, "{rejection}")?;
            }
            Ok(false)
        }
    }
}
