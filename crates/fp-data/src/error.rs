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

//! Error types for the loading and selection stages.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a load. Any of these means nothing downstream renders.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing columns: {}", format_missing(.missing))]
    Schema { missing: Vec<String> },

    #[error("no rows labelled '{label}' in the source file")]
    EmptySubset { label: String },

    #[error("none of the {dropped} '{label}' rows has a numeric confidence")]
    NoUsableConfidence { label: String, dropped: usize },

    #[error("failed to encode GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_missing(missing: &[String]) -> String {
    let quoted: Vec<String> = missing.iter().map(|m| format!("'{m}'")).collect();
    format!("[{}]", quoted.join(", "))
}

/// The filtered view holds no records; the map falls back to its default view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no airports match the selected confidence range")]
pub struct EmptySelection;

/// A selection key that is not present in the current filtered view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no data for airport '{key}' in the current filter")]
pub struct LookupMiss {
    pub key: String,
}
