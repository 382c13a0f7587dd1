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

//! Marker layout for the map.
//!
//! Produces everything the map widget needs to draw one pass: the initial view
//! center and one styled marker per positioned record. No drawing happens here.

use log::debug;

use crate::color::{ColorScale, Rgb};
use crate::dataset::AirportRecord;
use crate::error::EmptySelection;
use crate::filter::FilteredView;

/// Marker circle radius in screen pixels.
pub const MARKER_RADIUS: f32 = 6.0;

/// Marker fill opacity.
pub const MARKER_FILL_OPACITY: f32 = 0.8;

/// View used when there is nothing to center on.
pub const DEFAULT_CENTER: (f64, f64) = (20.0, 0.0);

/// Initial zoom level of the world map.
pub const DEFAULT_ZOOM: f32 = 2.0;

/// Median of the finite values, averaging the middle pair for even counts.
#[must_use]
pub fn median(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    finite.sort_by(f64::total_cmp);
    let mid = finite.len() / 2;
    if finite.len() % 2 == 0 {
        Some((finite[mid - 1] + finite[mid]) / 2.0)
    } else {
        Some(finite[mid])
    }
}

/// Summary shown when a marker is clicked.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPopup {
    pub name: String,
    pub city: String,
    pub country: String,
    pub iata: String,
    /// Two-decimal confidence.
    pub confidence: String,
}

impl MarkerPopup {
    #[must_use]
    pub fn for_record(record: &AirportRecord) -> Self {
        Self {
            name: record.name.clone(),
            city: record.city.clone(),
            country: record.country.clone(),
            iata: record.iata.clone(),
            confidence: format!("{:.2}", record.confidence),
        }
    }

    /// Label/value lines under the bold name.
    #[must_use]
    pub fn lines(&self) -> [(&'static str, &str); 4] {
        [
            ("City", self.city.as_str()),
            ("Country", self.country.as_str()),
            ("IATA", self.iata.as_str()),
            ("Model Confidence", self.confidence.as_str()),
        ]
    }
}

/// One circle marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f32,
    /// Border and fill share the confidence color.
    pub color: Rgb,
    pub fill_opacity: f32,
    pub popup: MarkerPopup,
}

/// Everything drawn on the map for one filter setting.
#[derive(Debug, Clone, PartialEq)]
pub struct MapLayer {
    /// Median position of the positioned records.
    pub center: Option<(f64, f64)>,
    pub markers: Vec<Marker>,
    /// Records left off the map for lack of finite coordinates.
    pub skipped: usize,
}

impl MapLayer {
    #[must_use]
    pub fn build(view: &FilteredView<'_>, scale: &ColorScale) -> Self {
        let mut markers = Vec::with_capacity(view.len());
        let mut skipped = 0;

        for record in view.records() {
            let Some((latitude, longitude)) = record.position() else {
                debug!("No marker for {}: missing coordinates", record.display_label());
                skipped += 1;
                continue;
            };
            markers.push(Marker {
                latitude,
                longitude,
                radius: MARKER_RADIUS,
                color: scale.color(record.confidence),
                fill_opacity: MARKER_FILL_OPACITY,
                popup: MarkerPopup::for_record(record),
            });
        }

        let center = median(markers.iter().map(|m| m.latitude))
            .zip(median(markers.iter().map(|m| m.longitude)));

        Self {
            center,
            markers,
            skipped,
        }
    }

    /// Where to center the initial view, or [`EmptySelection`] when no marker
    /// could be placed.
    pub fn view_center(&self) -> Result<(f64, f64), EmptySelection> {
        self.center.ok_or(EmptySelection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::tests::scenario;
    use crate::dataset::Dataset;
    use crate::filter::{filter, ConfidenceRange};

    #[test]
    fn test_median() {
        assert_eq!(median([3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median([4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median([f64::NAN, 5.0]), Some(5.0));
        assert_eq!(median(std::iter::empty()), None);
        assert_eq!(median([f64::NAN]), None);
    }

    #[test]
    fn test_markers_and_center() {
        let ds = scenario();
        let (min, max) = ds.confidence_bounds();
        let layer = MapLayer::build(&filter(&ds, ConfidenceRange::full(&ds)), &ColorScale::new(min, max));

        assert_eq!(layer.markers.len(), 2);
        assert_eq!(layer.center, Some((20.0, 30.0)));
        assert_eq!(layer.skipped, 0);

        let abc = &layer.markers[0];
        assert_eq!(abc.radius, MARKER_RADIUS);
        assert_eq!(abc.fill_opacity, MARKER_FILL_OPACITY);
        assert_eq!(abc.popup.iata, "ABC");
        assert_eq!(abc.popup.confidence, "0.20");
    }

    #[test]
    fn test_color_independent_of_filter() {
        let ds = scenario();
        let (min, max) = ds.confidence_bounds();
        let scale = ColorScale::new(min, max);

        let wide = MapLayer::build(&filter(&ds, ConfidenceRange::new(0.0, 1.0)), &scale);
        let narrow = MapLayer::build(&filter(&ds, ConfidenceRange::new(0.5, 1.0)), &scale);

        let xyz_wide = wide.markers.iter().find(|m| m.popup.iata == "XYZ").unwrap();
        let xyz_narrow = narrow.markers.iter().find(|m| m.popup.iata == "XYZ").unwrap();
        assert_eq!(xyz_wide.color, xyz_narrow.color);
    }

    #[test]
    fn test_empty_view_has_no_center() {
        let ds = scenario();
        let layer = MapLayer::build(&filter(&ds, ConfidenceRange::new(0.0, 0.1)), &ColorScale::new(0.2, 0.9));
        assert!(layer.markers.is_empty());
        assert_eq!(layer.view_center(), Err(EmptySelection));
    }

    #[test]
    fn test_nan_latitude_is_skipped() {
        let csv = "label,IATA,name,city,country,latitude,longitude,confidence\n\
                   false_positive,AAA,A,A,A,NaN,5.0,0.5\n\
                   false_positive,BBB,B,B,B,10.0,20.0,0.6\n";
        let ds = Dataset::from_reader(csv.as_bytes()).unwrap();
        let layer = MapLayer::build(&filter(&ds, ConfidenceRange::full(&ds)), &ColorScale::new(0.5, 0.6));

        assert_eq!(layer.markers.len(), 1);
        assert_eq!(layer.skipped, 1);
        assert_eq!(layer.view_center(), Ok((10.0, 20.0)));
    }

    #[test]
    fn test_popup_lines() {
        let ds = scenario();
        let popup = MarkerPopup::for_record(&ds.records()[1]);
        assert_eq!(
            popup.lines(),
            [
                ("City", "Xylo"),
                ("Country", "Xland"),
                ("IATA", "XYZ"),
                ("Model Confidence", "0.90"),
            ]
        );
    }
}
