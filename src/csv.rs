//! Minimal CSV reader for marker logs.
//!
//! Quote handling is a simple toggle: a `"` flips the in-quotes state and a
//! `,` only separates fields outside quotes. Quote characters stay in the
//! field text and `""` is not treated as an escaped quote. Marker labels
//! exported by review tools rely on this exact behavior, so it is not
//! RFC 4180.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// One data row keyed by header name.
pub type Row = HashMap<String, String>;

/// A parsed CSV document: header names plus data rows.
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl CsvTable {
    /// Parse CSV text.
    ///
    /// The first line of the trimmed text is the header. Blank lines after
    /// it are skipped. Cells are matched to headers by position; short rows
    /// get empty strings for the missing trailing columns and surplus cells
    /// are dropped.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let mut lines = trimmed.split('\n');

        let header_line = match lines.next() {
            Some(line) if !trimmed.is_empty() => line,
            _ => return Err(Error::EmptyInput),
        };
        let headers = split_fields(header_line);

        let rows = lines
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let values = split_fields(line);
                let mut row = Row::with_capacity(headers.len());
                for (i, header) in headers.iter().enumerate() {
                    let value = values.get(i).cloned().unwrap_or_default();
                    row.insert(header.clone(), value);
                }
                row
            })
            .collect();

        Ok(Self { headers, rows })
    }

    /// Header names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in file order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the table, returning its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the header contains `name`.
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    /// All values of one column, in row order.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .iter()
            .map(move |row| row.get(name).map(String::as_str).unwrap_or(""))
    }
}

/// Split one line into trimmed fields, honoring quote toggling.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}
