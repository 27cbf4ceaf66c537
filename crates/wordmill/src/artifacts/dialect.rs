//! # Artifact CSV Dialect
//!
//! Comma-separated, RFC-4180 style. A field is quoted iff it contains a
//! comma, a double quote, a newline, or is empty/whitespace-only; internal
//! quotes are doubled. Numeric fields are never quoted on output but are
//! tolerated quoted on input.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::errors::WMResult;

/// How loaders treat a possible header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Detect a header from the documented column names.
    #[default]
    Auto,

    /// The first row is a header.
    Present,

    /// Every row is data.
    Absent,
}

/// Column tokens that mark a row as a header under [`HeaderMode::Auto`].
const HEADER_WORDS: &[&str] = &["token", "count", "repetitions", "word", "embedding", "seed"];

/// Whether `record` looks like one of the documented header rows.
///
/// Heuristic, and inherently lossy; callers that know the file shape
/// should pass [`HeaderMode::Present`] or [`HeaderMode::Absent`] instead.
pub fn looks_like_header(record: &csv::StringRecord) -> bool {
    record
        .iter()
        .any(|field| HEADER_WORDS.contains(&field.trim().to_ascii_lowercase().as_str()))
}

/// Whether `mode` consumes `record` as a header.
pub fn is_header(
    mode: HeaderMode,
    record: &csv::StringRecord,
) -> bool {
    match mode {
        HeaderMode::Present => true,
        HeaderMode::Absent => false,
        HeaderMode::Auto => looks_like_header(record),
    }
}

fn needs_quoting(field: &str) -> bool {
    field.is_empty()
        || field.chars().all(char::is_whitespace)
        || field.contains([',', '"', '\n', '\r'])
}

/// Write one text field in the artifact dialect.
pub fn write_field<W: Write>(
    writer: &mut W,
    field: &str,
) -> std::io::Result<()> {
    if needs_quoting(field) {
        writer.write_all(b"\"")?;
        writer.write_all(field.replace('"', "\"\"").as_bytes())?;
        writer.write_all(b"\"")
    } else {
        writer.write_all(field.as_bytes())
    }
}

/// Open a tolerant record reader over an artifact file. Quoted numerics
/// and ragged rows are accepted; rows are trimmed.
pub fn open_reader(path: &Path) -> WMResult<csv::Reader<File>> {
    Ok(csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Caps per-file parse warnings so a corrupt file cannot flood the log.
#[derive(Debug)]
pub struct WarnBudget {
    remaining: usize,
    suppressed: bool,
}

impl WarnBudget {
    /// A budget of `limit` warnings.
    pub fn new(limit: usize) -> Self {
        Self {
            remaining: limit,
            suppressed: false,
        }
    }

    /// Emit one warning if the budget allows; the first call past the
    /// budget logs a single suppression notice.
    pub fn warn<F>(
        &mut self,
        message: F,
    ) where
        F: FnOnce() -> String,
    {
        if self.remaining > 0 {
            self.remaining -= 1;
            log::warn!("{}", message());
        } else if !self.suppressed {
            self.suppressed = true;
            log::warn!("further parse warnings suppressed");
        }
    }
}
