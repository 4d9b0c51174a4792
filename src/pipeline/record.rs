//! Raw record source
//!
//! Reads a delimited file with a header row into loosely-typed records.
//! A record that cannot be decoded at all (bad encoding, broken quoting) is
//! skipped and counted; rows that decode but miss columns flow through the
//! pipeline and are rejected there with a precise reason.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::warn;

use crate::error::Result;

/// One input row: column name to raw textual value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { fields }
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Raw value of a column, if the column exists in this record
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(|s| s.as_str())
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }
}

/// Parsed input file: decoded records plus a count of undecodable rows
#[derive(Debug)]
pub struct RecordSource {
    records: Vec<RawRecord>,
    skipped: usize,
}

impl RecordSource {
    /// Read a CSV file with headers
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    /// Read CSV data from any reader. Short rows are tolerated: missing
    /// trailing columns simply do not appear in the record.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (idx, result) in rdr.records().enumerate() {
            let row = match result {
                Ok(row) => row,
                Err(err) => {
                    // Header is row 1, so the first data row is row 2.
                    warn!(row = idx + 2, error = %err, "skipping undecodable record");
                    skipped += 1;
                    continue;
                }
            };

            let mut record = RawRecord::new();
            for (col, header) in headers.iter().enumerate() {
                if let Some(value) = row.get(col) {
                    record.insert(header, value);
                }
            }
            records.push(record);
        }

        Ok(Self { records, skipped })
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RawRecord> {
        self.records
    }

    /// Rows that could not be decoded at all
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
