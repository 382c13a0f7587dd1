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

//! Data layer for the false-positive airport map.
//!
//! This library turns the classifier's results CSV into everything the
//! dashboard draws. Each stage is a pure function of its inputs and can be
//! used on its own:
//!
//! - **Loading**: [`RawTable`] reads the file, [`Dataset`] selects the
//!   false-positive rows, drops and renames columns and validates the schema.
//!   [`DatasetCache`] memoizes the load on file identity.
//! - **Filtering**: [`filter`] narrows a dataset to a [`ConfidenceRange`].
//! - **Map layout**: [`MapLayer`] places colored markers using a
//!   [`ColorScale`] anchored on the whole dataset.
//! - **Details**: [`build_selector`] lists the airports of a view and
//!   [`AirportDetail`] collects the fields of one of them.
//!
//! # Example
//!
//! ```
//! use fp_data::{build_selector, filter, AirportDetail, ColorScale, ConfidenceRange, Dataset, MapLayer};
//!
//! let csv = "label,IATA,name,city,country,latitude,longitude,confidence\n\
//!            false_positive,ABC,Alpha,Aville,Aland,10.0,20.0,0.2\n\
//!            false_positive,XYZ,Xylo,Xville,Xland,30.0,40.0,0.9\n";
//! let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
//!
//! let view = filter(&dataset, ConfidenceRange::new(0.5, 1.0));
//! let (min, max) = dataset.confidence_bounds();
//! let layer = MapLayer::build(&view, &ColorScale::new(min, max));
//! assert_eq!(layer.markers.len(), 1);
//!
//! let entries = build_selector(&view);
//! let detail = AirportDetail::lookup(&view, &entries[0].key).unwrap();
//! assert_eq!(detail.confidence, "0.90");
//! ```

pub mod color;
pub mod dataset;
pub mod detail;
pub mod error;
pub mod filter;
pub mod geojson;
pub mod render;
pub mod schema;
pub mod selector;
pub mod table;

pub use color::{ColorScale, Rgb};
pub use dataset::{AirportRecord, Dataset, DatasetCache, LoadReport};
pub use detail::{AirportDetail, DetailField};
pub use error::{DataError, EmptySelection, LookupMiss};
pub use filter::{filter, ConfidenceRange, FilteredView, STEP};
pub use geojson::FeatureCollection;
pub use render::{MapLayer, Marker, MarkerPopup, DEFAULT_CENTER, DEFAULT_ZOOM};
pub use selector::{build_selector, iata_from_label, SelectorEntry};
pub use table::RawTable;
