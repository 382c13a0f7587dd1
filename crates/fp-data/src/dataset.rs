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

//! Typed false-positive airport records and the memoized loader.
//!
//! Loading is a pure function of the file contents: read, keep the
//! false-positive rows, drop and rename columns, validate, then type each row.
//! [`DatasetCache`] avoids repeating that work while the file is unchanged.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use log::{debug, info, warn};

use crate::error::DataError;
use crate::schema::{
    self, CITY, COLUMN_RENAMES, CONFIDENCE, COUNTRY, EXCLUDED_COLUMNS, FALSE_POSITIVE_LABEL, IATA,
    LABEL_COLUMN, LATITUDE, LONGITUDE, NAME, REQUIRED_COLUMNS,
};
use crate::table::RawTable;

/// One false-positive airport.
#[derive(Debug, Clone, PartialEq)]
pub struct AirportRecord {
    pub iata: String,
    pub name: String,
    pub city: String,
    pub country: String,
    /// `None` when the cell is missing or not a finite number.
    pub latitude: Option<f64>,
    /// `None` when the cell is missing or not a finite number.
    pub longitude: Option<f64>,
    pub confidence: f64,
    /// Every column of the normalized table, in file order, with its raw cell.
    pub fields: Vec<(String, String)>,
}

impl AirportRecord {
    /// Map position, only when both coordinates are finite.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }

    /// Dropdown label, `"{name} ({IATA})"`.
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.name, self.iata)
    }

    /// Raw cell of a column by its post-rename name.
    #[must_use]
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// Row counts gathered while loading, shown in the status log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Data rows in the file.
    pub source_rows: usize,
    /// Rows carrying the false-positive label.
    pub subset_rows: usize,
    /// False-positive rows dropped for a null or non-numeric confidence.
    pub dropped_confidence: usize,
    /// Records kept without a finite latitude/longitude.
    pub missing_position: usize,
}

/// The normalized false-positive subset.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<AirportRecord>,
    columns: Vec<String>,
    min_confidence: f64,
    max_confidence: f64,
    report: LoadReport,
}

impl Dataset {
    /// Run the whole loading stage on a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let dataset = Self::from_table(RawTable::from_path(path)?)?;
        info!(
            "Loaded {} false-positive airports from {}",
            dataset.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Run the whole loading stage on CSV from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        Self::from_table(RawTable::from_reader(reader)?)
    }

    /// Normalize and type an already-read table.
    pub fn from_table(table: RawTable) -> Result<Self, DataError> {
        let source_rows = table.len();
        let subset = table
            .select_rows_where(LABEL_COLUMN, FALSE_POSITIVE_LABEL)
            .map_err(|missing| DataError::Schema {
                missing: vec![missing],
            })?;

        let normalized = subset
            .drop_columns(EXCLUDED_COLUMNS)
            .rename_columns(COLUMN_RENAMES);

        let missing = normalized.missing_columns(REQUIRED_COLUMNS);
        if !missing.is_empty() {
            return Err(DataError::Schema { missing });
        }

        if normalized.is_empty() {
            return Err(DataError::EmptySubset {
                label: FALSE_POSITIVE_LABEL.to_string(),
            });
        }

        let mut report = LoadReport {
            source_rows,
            subset_rows: normalized.len(),
            ..LoadReport::default()
        };

        let idx = |name: &str| normalized.column_index(name).unwrap_or_default();
        let (iata, name, city, country) = (idx(IATA), idx(NAME), idx(CITY), idx(COUNTRY));
        let (lat, lon, conf) = (idx(LATITUDE), idx(LONGITUDE), idx(CONFIDENCE));

        let mut records = Vec::with_capacity(normalized.len());
        for row in normalized.rows() {
            let Some(confidence) = schema::parse_finite(&row[conf]) else {
                warn!(
                    "Skipping {} ({}): confidence '{}' is not a number",
                    row[name], row[iata], row[conf]
                );
                report.dropped_confidence += 1;
                continue;
            };

            let record = AirportRecord {
                iata: row[iata].clone(),
                name: row[name].clone(),
                city: row[city].clone(),
                country: row[country].clone(),
                latitude: schema::parse_finite(&row[lat]),
                longitude: schema::parse_finite(&row[lon]),
                confidence,
                fields: normalized
                    .headers()
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect(),
            };

            if record.position().is_none() {
                debug!("{} has no usable coordinates", record.display_label());
                report.missing_position += 1;
            }
            records.push(record);
        }

        let (min_confidence, max_confidence) = records
            .iter()
            .map(|r| r.confidence)
            .fold(None, |acc: Option<(f64, f64)>, c| match acc {
                None => Some((c, c)),
                Some((lo, hi)) => Some((lo.min(c), hi.max(c))),
            })
            .ok_or_else(|| DataError::NoUsableConfidence {
                label: FALSE_POSITIVE_LABEL.to_string(),
                dropped: report.dropped_confidence,
            })?;

        Ok(Self {
            records,
            columns: normalized.headers().to_vec(),
            min_confidence,
            max_confidence,
            report,
        })
    }

    #[must_use]
    pub fn records(&self) -> &[AirportRecord] {
        &self.records
    }

    /// Post-rename column names, in file order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Observed `(min, max)` confidence of the whole subset.
    #[must_use]
    pub fn confidence_bounds(&self) -> (f64, f64) {
        (self.min_confidence, self.max_confidence)
    }

    #[must_use]
    pub fn report(&self) -> LoadReport {
        self.report
    }
}

/// Identity of a file on disk, used to decide whether a cached load is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Result<Self, DataError> {
        let metadata = fs::metadata(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

/// Memoizes [`Dataset::load`] on file path, modification time and size.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<(FileStamp, Arc<Dataset>)>,
    /// File identity of the last load that failed.
    failed: Option<FileStamp>,
    loads: usize,
}

impl DatasetCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, reloading when the file changed.
    pub fn get_or_load<P: AsRef<Path>>(&mut self, path: P) -> Result<Arc<Dataset>, DataError> {
        let path = path.as_ref();
        let stamp = FileStamp::of(path)?;

        if let Some((cached, dataset)) = &self.entry {
            if *cached == stamp {
                return Ok(Arc::clone(dataset));
            }
            info!("{} changed on disk, reloading", path.display());
        }

        self.loads += 1;
        match Dataset::load(path) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                self.entry = Some((stamp, Arc::clone(&dataset)));
                self.failed = None;
                Ok(dataset)
            }
            Err(e) => {
                self.failed = Some(stamp);
                Err(e)
            }
        }
    }

    /// True when the last load of `path` failed and the file has not changed
    /// since, so reading it again would fail the same way.
    pub fn unchanged_since_failure<P: AsRef<Path>>(&self, path: P) -> bool {
        let Some(failed) = &self.failed else {
            return false;
        };
        FileStamp::of(path.as_ref()).is_ok_and(|stamp| stamp == *failed)
    }

    /// Forget the cached dataset so the next call reads the file again.
    pub fn invalidate(&mut self) {
        self.entry = None;
        self.failed = None;
    }

    /// Number of times a file was actually read.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const SCENARIO_CSV: &str = "\
,label,IATA,name,city,country,latitude,longitude,confidence,Predicted Class,degree_full
0,false_positive,ABC,Alpha Intl,Alphaville,Aland,10.0,20.0,0.2,1,0.5
1,false_positive,XYZ,Xylo Field,Xylo,Xland,30.0,40.0,0.9,1,0.7
2,true_positive,TTT,True Port,Trueton,Tland,50.0,60.0,0.95,1,0.9
";

    pub(crate) fn scenario() -> Dataset {
        Dataset::from_reader(SCENARIO_CSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_only_false_positives_are_kept() {
        let ds = scenario();
        assert_eq!(ds.len(), 2);
        assert!(ds.records().iter().all(|r| r.iata != "TTT"));
        assert_eq!(
            ds.report(),
            LoadReport {
                source_rows: 3,
                subset_rows: 2,
                dropped_confidence: 0,
                missing_position: 0,
            }
        );
    }

    #[test]
    fn test_excluded_and_renamed_columns() {
        let ds = scenario();
        let columns = ds.columns();
        assert!(!columns.iter().any(|c| c == "Unnamed: 0"));
        assert!(!columns.iter().any(|c| c == "Predicted Class"));
        assert!(!columns.iter().any(|c| c == "degree_full"));
        assert!(columns
            .iter()
            .any(|c| c == "Degree Centrality (Full Flight Network)"));

        let abc = &ds.records()[0];
        assert_eq!(abc.field("Degree Centrality (Full Flight Network)"), Some("0.5"));
        assert_eq!(abc.field("degree_full"), None);
    }

    #[test]
    fn test_confidence_bounds() {
        let ds = scenario();
        assert_eq!(ds.confidence_bounds(), (0.2, 0.9));
    }

    #[test]
    fn test_missing_required_columns() {
        let csv = "label,IATA,name,confidence\nfalse_positive,ABC,Alpha,0.5\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        match err {
            DataError::Schema { missing } => {
                assert_eq!(missing, ["latitude", "longitude", "city", "country"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_label_column() {
        let csv = "IATA,name\nABC,Alpha\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::Schema { ref missing } if missing == &["label"]));
    }

    #[test]
    fn test_excluded_column_not_in_fields() {
        let csv = "label,IATA,name,city,country,latitude,longitude,confidence,Source\n\
                   false_positive,ABC,A,B,C,1,2,0.5,x\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert!(ds.records()[0].field("Source").is_none());
    }

    #[test]
    fn test_empty_subset_is_an_error() {
        let csv = "label,IATA,name,city,country,latitude,longitude,confidence\n\
                   true_positive,ABC,A,B,C,1,2,0.5\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::EmptySubset { .. }));
    }

    #[test]
    fn test_bad_confidence_rows_are_dropped() {
        let csv = "label,IATA,name,city,country,latitude,longitude,confidence\n\
                   false_positive,ABC,A,B,C,1,2,\n\
                   false_positive,DEF,D,E,F,1,2,0.4\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.report().dropped_confidence, 1);
        assert_eq!(ds.confidence_bounds(), (0.4, 0.4));
    }

    #[test]
    fn test_all_confidences_unusable() {
        let csv = "label,IATA,name,city,country,latitude,longitude,confidence\n\
                   false_positive,ABC,A,B,C,1,2,\n\
                   false_positive,DEF,D,E,F,1,2,high\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::NoUsableConfidence { dropped: 2, .. }));
    }

    #[test]
    fn test_nan_latitude_is_kept_without_position() {
        let csv = "label,IATA,name,city,country,latitude,longitude,confidence\n\
                   false_positive,ABC,A,B,C,NaN,2,0.5\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].latitude, None);
        assert_eq!(ds.records()[0].position(), None);
        assert_eq!(ds.report().missing_position, 1);
    }

    fn temp_csv(tag: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "fp_data_{}_{}.csv",
            tag,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_cache_reuses_unchanged_file() {
        let path = temp_csv("reuse", SCENARIO_CSV);
        let mut cache = DatasetCache::new();

        let first = cache.get_or_load(&path).unwrap();
        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_cache_reloads_after_change() {
        let path = temp_csv("change", SCENARIO_CSV);
        let mut cache = DatasetCache::new();
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 2);

        // A different length changes the stamp even on coarse mtime filesystems.
        let extra = format!("{SCENARIO_CSV}3,false_positive,QQQ,Q,Q,Q,1.0,1.0,0.5,1,0.1\n");
        fs::write(&path, extra).unwrap();
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 3);
        assert_eq!(cache.load_count(), 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_cache_invalidate() {
        let path = temp_csv("invalidate", SCENARIO_CSV);
        let mut cache = DatasetCache::new();
        cache.get_or_load(&path).unwrap();
        cache.invalidate();
        cache.get_or_load(&path).unwrap();
        assert_eq!(cache.load_count(), 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_cache_remembers_failed_file() {
        let bad = "label,IATA,name\nfalse_positive,ABC,A\n";
        let path = temp_csv("failed", bad);
        let mut cache = DatasetCache::new();

        assert!(!cache.unchanged_since_failure(&path));
        assert!(matches!(cache.get_or_load(&path), Err(DataError::Schema { .. })));
        assert!(cache.unchanged_since_failure(&path));

        fs::write(&path, SCENARIO_CSV).unwrap();
        assert!(!cache.unchanged_since_failure(&path));
        assert_eq!(cache.get_or_load(&path).unwrap().len(), 2);
        assert!(!cache.unchanged_since_failure(&path));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let mut cache = DatasetCache::new();
        let err = cache
            .get_or_load("/definitely/not/here/false_positives_and_negatives.csv")
            .unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
