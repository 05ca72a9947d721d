use std::mem::take;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use feedscrape_core::ScrapedPost;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

pub const CSV_HEADER: &str = "name,text";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub post_count: usize,
    pub path: PathBuf,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("missing `name,text` header")]
    MissingHeader,
    #[error("unterminated quoted field")]
    UnterminatedQuote,
    #[error("row {row} has {found} fields, expected 2")]
    FieldCount { row: usize, found: usize },
}

/// A `name,text` pair read back from an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub name: String,
    pub text: String,
}

/// `facebook_group_posts_<YYYY-MM-DD>.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("facebook_group_posts_{}.csv", date.format("%Y-%m-%d"))
}

/// Header plus one row per post in collection order. Every field is quoted
/// and embedded quotes are doubled.
pub fn encode_csv(posts: &[ScrapedPost]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + posts.len() * 64);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for post in posts {
        push_quoted(&mut out, post.name());
        out.push(',');
        push_quoted(&mut out, post.text());
        out.push('\n');
    }
    out
}

fn push_quoted(out: &mut String, field: &str) {
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
}

/// Parses an export back into rows. Quote-aware, tolerant of CRLF.
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>, CsvError> {
    let mut records = split_records(text)?.into_iter();
    match records.next() {
        Some(header) if header == ["name", "text"] => {}
        _ => return Err(CsvError::MissingHeader),
    }
    records
        .enumerate()
        .map(|(index, mut fields)| {
            if fields.len() != 2 {
                return Err(CsvError::FieldCount {
                    row: index + 1,
                    found: fields.len(),
                });
            }
            let text = fields.pop().unwrap_or_default();
            let name = fields.pop().unwrap_or_default();
            Ok(CsvRow { name, text })
        })
        .collect()
}

fn split_records(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => record.push(take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(take(&mut field));
                records.push(take(&mut record));
            }
            _ => field.push(ch),
        }
    }
    if in_quotes {
        return Err(CsvError::UnterminatedQuote);
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

/// Writes the posts to `dir/export_filename(date)`.
pub fn write_csv_export(
    dir: &Path,
    posts: &[ScrapedPost],
    date: NaiveDate,
) -> Result<ExportSummary, ExportError> {
    if posts.is_empty() {
        return Err(ExportError::Empty);
    }
    let writer = AtomicFileWriter::new(dir.to_path_buf());
    let path = writer.write(&export_filename(date), encode_csv(posts))?;
    Ok(ExportSummary {
        post_count: posts.len(),
        path,
    })
}
