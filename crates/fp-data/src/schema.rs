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

//! Fixed column contract of the classification results file.
//!
//! The upstream export carries bookkeeping columns that are meaningless on the
//! dashboard, and a handful of feature columns with terse or awkward names.
//! Everything here is applied in order: label selection, exclusion, rename,
//! then validation against [`REQUIRED_COLUMNS`].

/// Column holding the classification outcome tag.
pub const LABEL_COLUMN: &str = "label";

/// The only label the dashboard visualizes.
pub const FALSE_POSITIVE_LABEL: &str = "false_positive";

pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const IATA: &str = "IATA";
pub const CONFIDENCE: &str = "confidence";
pub const NAME: &str = "name";
pub const CITY: &str = "city";
pub const COUNTRY: &str = "country";

/// Columns dropped before anything else sees the table. Absent ones are ignored.
pub const EXCLUDED_COLUMNS: &[&str] = &[
    "Unnamed: 0",
    "Probabilities",
    "Predicted Class",
    "True Class",
    "Incidents",
    "Origin Count",
    "Transit Count",
    "Destination Count",
    "Seizure Count",
    "Incident Counts",
    "Binary Incident Observed",
    "Binary Origin Observed",
    "Binary Destination Observed",
    "Binary Transit Observed",
    "Source",
    "Type",
];

/// Source column name to display label, applied after exclusion.
pub const COLUMN_RENAMES: &[(&str, &str)] = &[
    ("degree_full", "Degree Centrality (Full Flight Network)"),
    ("between_full", "Between Centrality (Full Flight Network)"),
    ("close_full", "Closeness Centrality (Full Flight Network)"),
    ("eigen_full", "Eigenvector Centrality (Full Flight Network)"),
    ("pr_full", "PageRank Centrality (Full Flight Network)"),
    ("degree_in_full", "Degree-In Centrality (Full Flight Network)"),
    ("degree_out_full", "Degree-Out Centrality (Full Flight Network)"),
    (
        "NON-RENEWABLE\nNON-RENEWABLE RESOURCE CRIMES",
        "Non-Renewable Resource Crimes",
    ),
];

/// Columns that must exist once exclusion and renaming are done.
pub const REQUIRED_COLUMNS: &[&str] = &[LATITUDE, LONGITUDE, IATA, CONFIDENCE, NAME, CITY, COUNTRY];

/// Columns the detail panel never lists as features. The first three fields
/// of the panel (city, country, confidence) are rendered separately.
pub const DETAIL_HIDDEN_COLUMNS: &[&str] = &[
    LATITUDE,
    LONGITUDE,
    IATA,
    CONFIDENCE,
    NAME,
    CITY,
    COUNTRY,
    LABEL_COLUMN,
];

/// Cell values the CSV export uses for missing data.
const NULL_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Whether a raw cell should be treated as missing.
#[must_use]
pub fn is_null(value: &str) -> bool {
    NULL_TOKENS.contains(&value.trim())
}

/// Parse a numeric cell, rejecting nulls and non-finite values.
#[must_use]
pub fn parse_finite(value: &str) -> Option<f64> {
    if is_null(value) {
        return None;
    }
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Turn a column name into a panel label: underscores become spaces, then
/// every alphabetic run starts upper-case and continues lower-case.
///
/// `degree_in_full` becomes `Degree In Full`, `NON-RENEWABLE` becomes
/// `Non-Renewable`, and `2nd_hub` becomes `2Nd Hub`.
#[must_use]
pub fn prettify_column(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for ch in name.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
