use std::borrow::Cow;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::model::{CombinedRecord, PersonRecord};

/// One delimited-text field. Text is always quoted, numbers never.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<'a> {
    Text(Cow<'a, str>),
    Int(usize),
}

fn text<'a>(s: impl Into<Cow<'a, str>>) -> Cell<'a> {
    Cell::Text(s.into())
}

pub trait CsvRecord {
    const HEADER: &'static [&'static str];

    fn cells(&self) -> Vec<Cell<'_>>;
}

impl CsvRecord for CombinedRecord {
    const HEADER: &'static [&'static str] = &[
        "Page",
        "Bayanne Full Name",
        "Surname",
        "Given Names",
        "First Name",
        "Middle Names",
        "Middle Name Count",
        "Birth Info",
        "Birth Place",
        "Bayanne ID",
        "SP Results Count",
        "SP Death Location",
        "SP Death Year",
        "SP Match Reason",
        "SP Search URL",
        "SP Error",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            Cell::Int(self.page as usize),
            text(&self.full_name),
            text(&self.surname),
            text(&self.given_names),
            text(&self.first_name),
            text(&self.middle_names),
            Cell::Int(self.middle_name_count),
            text(&self.birth_info),
            text(&self.birth_place),
            text(&self.id),
            Cell::Int(self.sp_result_count),
            text(&self.sp_location),
            text(&self.sp_death_year),
            text(&self.sp_match_reason),
            text(&self.sp_search_url),
            text(&self.sp_error),
        ]
    }
}

impl CsvRecord for PersonRecord {
    const HEADER: &'static [&'static str] = &[
        "Full Name",
        "Surname",
        "Given Names",
        "First Name",
        "Middle Names",
        "Middle Name Count",
        "Database ID",
        "Birth Information",
        "Birth Place",
        "Row Index",
    ];

    fn cells(&self) -> Vec<Cell<'_>> {
        vec![
            text(&self.full_name),
            text(&self.surname),
            text(&self.given_names),
            text(self.first_name()),
            text(self.middle_names()),
            Cell::Int(self.middle_name_count),
            text(&self.id),
            text(&self.birth_info),
            text(&self.birth_place),
            Cell::Int(self.row_index),
        ]
    }
}

pub fn write_row<W: Write>(mut w: W, cells: &[Cell]) -> io::Result<()> {
    let mut first = true;
    for cell in cells {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        match cell {
            Cell::Text(s) => write!(w, "\"{}\"", s.replace('"', "\"\""))?,
            Cell::Int(n) => write!(w, "{}", n)?,
        }
    }
    writeln!(w)
}

fn write_header<W: Write>(mut w: W, header: &[&str]) -> io::Result<()> {
    writeln!(w, "{}", header.join(","))
}

/// Create (or truncate) `path` and write header plus rows.
pub fn write_csv<R: CsvRecord>(path: &Path, records: &[R]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    write_header(&mut w, R::HEADER)?;
    for r in records {
        write_row(&mut w, &r.cells())?;
    }
    w.flush().with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = records.len(), "Wrote CSV");
    Ok(())
}

/// Append rows to `path`, writing the header first only if the file is new
/// or empty.
pub fn append_csv<R: CsvRecord>(path: &Path, records: &[R]) -> Result<()> {
    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut w = BufWriter::new(file);
    if is_new {
        write_header(&mut w, R::HEADER)?;
        info!(path = %path.display(), "Created results CSV");
    }
    for r in records {
        write_row(&mut w, &r.cells())?;
    }
    w.flush().with_context(|| format!("Failed to append to {}", path.display()))?;
    info!(path = %path.display(), rows = records.len(), "Appended records");
    Ok(())
}

/// Pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    w.flush()?;
    info!(path = %path.display(), "Wrote JSON");
    Ok(())
}
