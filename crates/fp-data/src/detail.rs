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

//! Per-airport feature listing for the detail panel.

use crate::error::LookupMiss;
use crate::filter::FilteredView;
use crate::schema::{self, DETAIL_HIDDEN_COLUMNS};

/// A labelled value in the detail panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailField {
    pub label: String,
    pub value: String,
}

/// Everything the detail panel shows for one airport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirportDetail {
    pub iata: String,
    /// `"Features for {name} ({IATA})"`
    pub title: String,
    pub city: String,
    pub country: String,
    /// Two-decimal confidence.
    pub confidence: String,
    /// Remaining columns with a value, prettified, in file order.
    pub features: Vec<DetailField>,
}

impl AirportDetail {
    /// Look up the first record with IATA code `key` in the current view.
    pub fn lookup(view: &FilteredView<'_>, key: &str) -> Result<Self, LookupMiss> {
        let record = view.find(key).ok_or_else(|| LookupMiss {
            key: key.to_string(),
        })?;

        let features = record
            .fields
            .iter()
            .filter(|(column, _)| !DETAIL_HIDDEN_COLUMNS.contains(&column.as_str()))
            .filter(|(_, value)| !schema::is_null(value))
            .map(|(column, value)| DetailField {
                label: schema::prettify_column(column),
                value: value.trim().to_string(),
            })
            .collect();

        Ok(Self {
            iata: record.iata.clone(),
            title: format!("Features for {}", record.display_label()),
            city: record.city.clone(),
            country: record.country.clone(),
            confidence: format!("{:.2}", record.confidence),
            features,
        })
    }

    /// City, country and confidence, followed by the feature fields.
    #[must_use]
    pub fn all_fields(&self) -> Vec<DetailField> {
        let mut fields = vec![
            DetailField {
                label: "City".to_string(),
                value: self.city.clone(),
            },
            DetailField {
                label: "Country".to_string(),
                value: self.country.clone(),
            },
            DetailField {
                label: "Model Confidence".to_string(),
                value: self.confidence.clone(),
            },
        ];
        fields.extend(self.features.iter().cloned());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::filter::{filter, ConfidenceRange};

    const CSV: &str = "\
Unnamed: 0,label,IATA,name,city,country,latitude,longitude,confidence,degree_full,crime_count,notes,Source
0,false_positive,ABC,Alpha Intl,Alphaville,Aland,1,2,0.456,0.12,7,,x
1,false_positive,ZZZ,Stale Airport,Z,Z,1,2,0.1,0.5,NaN,hub,y
";

    #[test]
    fn test_detail_fields() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let view = filter(&ds, ConfidenceRange::full(&ds));
        let detail = AirportDetail::lookup(&view, "ABC").unwrap();

        assert_eq!(detail.title, "Features for Alpha Intl (ABC)");
        assert_eq!(detail.city, "Alphaville");
        assert_eq!(detail.country, "Aland");
        assert_eq!(detail.confidence, "0.46");
        assert_eq!(
            detail.features,
            vec![
                DetailField {
                    label: "Degree Centrality (Full Flight Network)".to_string(),
                    value: "0.12".to_string(),
                },
                DetailField {
                    label: "Crime Count".to_string(),
                    value: "7".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_nulls_are_skipped() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let view = filter(&ds, ConfidenceRange::full(&ds));
        let detail = AirportDetail::lookup(&view, "ZZZ").unwrap();
        let labels: Vec<&str> = detail.features.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, ["Degree Centrality (Full Flight Network)", "Notes"]);
    }

    #[test]
    fn test_stale_selection_is_a_lookup_miss() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let view = filter(&ds, ConfidenceRange::new(0.4, 0.5));
        let err = AirportDetail::lookup(&view, "ZZZ").unwrap_err();
        assert_eq!(
            err,
            LookupMiss {
                key: "ZZZ".to_string()
            }
        );
    }

    #[test]
    fn test_all_fields_order() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let view = filter(&ds, ConfidenceRange::full(&ds));
        let detail = AirportDetail::lookup(&view, "ABC").unwrap();
        let labels: Vec<String> = detail.all_fields().into_iter().map(|f| f.label).collect();
        assert_eq!(
            labels,
            [
                "City",
                "Country",
                "Model Confidence",
                "Degree Centrality (Full Flight Network)",
                "Crime Count",
            ]
        );
    }
}
