// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Untyped CSV table with column-level operations.
//!
//! The results file has an open-ended set of feature columns, so rows are kept
//! as raw strings until the required columns have been validated. Column
//! operations never touch cell contents, they only project.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use crate::error::DataError;

/// A header row plus string cells. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from already-split data. Short rows are padded with empty
    /// cells, long rows are truncated.
    #[must_use]
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Read a CSV file from disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read CSV from any reader. Header names are normalized the same way the
    /// upstream export tooling names them: blank names become `Unnamed: {i}`
    /// and repeats gain a `.1`, `.2`, ... suffix.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = normalize_headers(csv_reader.headers()?.iter());
        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!("Read {} rows x {} columns", rows.len(), headers.len());
        Ok(Self::new(headers, rows))
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Keep only rows whose `column` equals `value`.
    ///
    /// Returns the missing column name when `column` does not exist.
    pub fn select_rows_where(self, column: &str, value: &str) -> Result<Self, String> {
        let Some(idx) = self.column_index(column) else {
            return Err(column.to_string());
        };
        let rows = self
            .rows
            .into_iter()
            .filter(|row| row[idx] == value)
            .collect();
        Ok(Self {
            headers: self.headers,
            rows,
        })
    }

    /// Remove the named columns. Names that are not present are skipped.
    #[must_use]
    pub fn drop_columns(self, names: &[&str]) -> Self {
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|h| !names.contains(&h.as_str()))
            .collect();

        let headers = self
            .headers
            .into_iter()
            .zip(&keep)
            .filter_map(|(h, &k)| k.then_some(h))
            .collect();
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&keep)
                    .filter_map(|(cell, &k)| k.then_some(cell))
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// Rename columns according to `(from, to)` pairs. Columns without an
    /// entry keep their names.
    #[must_use]
    pub fn rename_columns(mut self, renames: &[(&str, &str)]) -> Self {
        let map: HashMap<&str, &str> = renames.iter().copied().collect();
        for header in &mut self.headers {
            if let Some(to) = map.get(header.as_str()) {
                *header = (*to).to_string();
            }
        }
        self
    }

    /// Names from `required` that are not columns of this table, in the order given.
    #[must_use]
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| (*name).to_string())
            .collect()
    }
}

fn normalize_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();

    for (i, name) in raw.enumerate() {
        let base = if name.is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.to_string()
        };

        // Keep suffixing until the name is unused, so `a,a,a.1` gives `a.1.1`
        let mut header = base;
        let mut count = seen.get(&header).copied().unwrap_or(0);
        while count > 0 {
            seen.insert(header.clone(), count + 1);
            header = format!("{header}.{count}");
            count = seen.get(&header).copied().unwrap_or(0);
        }
        seen.insert(header.clone(), count + 1);
        headers.push(header);
    }

    headers
}
