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

//! Airport dropdown entries.
//!
//! Each entry carries its IATA code as the key the UI binds to. The
//! `"name (IATA)"` label is only for display and is never parsed back, so
//! airport names containing parentheses cannot confuse the lookup.

use std::collections::HashSet;

use crate::filter::FilteredView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorEntry {
    /// IATA code.
    pub key: String,
    /// `"{name} ({IATA})"`
    pub label: String,
}

/// One entry per distinct IATA code in the view (first record wins),
/// sorted by label.
#[must_use]
pub fn build_selector(view: &FilteredView<'_>) -> Vec<SelectorEntry> {
    let mut seen = HashSet::new();
    let mut entries: Vec<SelectorEntry> = view
        .records()
        .filter(|r| seen.insert(r.iata.clone()))
        .map(|r| SelectorEntry {
            key: r.iata.clone(),
            label: r.display_label(),
        })
        .collect();
    entries.sort_by(|a, b| a.label.cmp(&b.label));
    entries
}

/// Pull the IATA code out of a `"name (IATA)"` label: the text after the last
/// `(`, minus a trailing `)`. Input without parentheses is taken as a bare code.
#[must_use]
pub fn iata_from_label(label: &str) -> &str {
    let label = label.trim();
    match label.rfind('(') {
        Some(open) => {
            let code = &label[open + 1..];
            code.strip_suffix(')').unwrap_or(code).trim()
        }
        None => label,
    }
}
