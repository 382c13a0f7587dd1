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

//! GeoJSON export of a filtered view.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::dataset::AirportRecord;
use crate::error::DataError;
use crate::filter::FilteredView;
use crate::schema::{self, LATITUDE, LONGITUDE};

#[derive(Debug, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    kind: &'static str,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    pub geometry: Point,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct Point {
    #[serde(rename = "type")]
    kind: &'static str,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl Feature {
    /// `None` for records without finite coordinates.
    #[must_use]
    pub fn from_record(record: &AirportRecord) -> Option<Self> {
        let (latitude, longitude) = record.position()?;

        let properties = record
            .fields
            .iter()
            .filter(|(column, _)| column != LATITUDE && column != LONGITUDE)
            .map(|(column, value)| (column.clone(), cell_value(value)))
            .collect();

        Some(Self {
            kind: "Feature",
            geometry: Point {
                kind: "Point",
                coordinates: [longitude, latitude],
            },
            properties,
        })
    }
}

impl FeatureCollection {
    #[must_use]
    pub fn from_view(view: &FilteredView<'_>) -> Self {
        Self {
            kind: "FeatureCollection",
            features: view.records().filter_map(Feature::from_record).collect(),
        }
    }

    /// Write pretty-printed JSON to `path`, returning the feature count.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<usize, DataError> {
        let path = path.as_ref();
        let io_err = |source| DataError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(io_err)?;

        info!("Exported {} features to {}", self.features.len(), path.display());
        Ok(self.features.len())
    }
}

fn cell_value(raw: &str) -> Value {
    if schema::is_null(raw) {
        return Value::Null;
    }
    schema::parse_finite(raw)
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(raw.to_string()), Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::filter::{filter, ConfidenceRange};

    #[test]
    fn test_feature_collection_shape() {
        let csv = "label,IATA,name,city,country,latitude,longitude,confidence,hub\n\
                   false_positive,ABC,Alpha,A,A,10.5,-20.25,0.5,\n\
                   false_positive,NOP,Nowhere,N,N,,3,0.6,yes\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        let fc = FeatureCollection::from_view(&filter(&ds, ConfidenceRange::full(&ds)));
        let json = serde_json::to_value(&fc).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        let features = json["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);

        let feature = &features[0];
        assert_eq!(feature["type"], "Feature");
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"], serde_json::json!([-20.25, 10.5]));
        assert_eq!(feature["properties"]["IATA"], "ABC");
        assert_eq!(feature["properties"]["confidence"], 0.5);
        assert_eq!(feature["properties"]["hub"], Value::Null);
        assert!(feature["properties"].get("latitude").is_none());
        assert!(feature["properties"].get("longitude").is_none());
    }

    #[test]
    fn test_write_to_file() {
        let ds = crate::dataset::tests::scenario();
        let fc = FeatureCollection::from_view(&filter(&ds, ConfidenceRange::full(&ds)));
        let path = std::env::temp_dir().join(format!("fp_data_export_{}.geojson", std::process::id()));

        assert_eq!(fc.write_to(&path).unwrap(), 2);
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["features"].as_array().map(Vec::len), Some(2));

        let _ = std::fs::remove_file(&path);
    }
}
