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

//! Confidence interval filter.

use crate::dataset::{AirportRecord, Dataset};

/// Slider granularity for both ends of the interval.
pub const STEP: f64 = 0.01;

/// Closed confidence interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceRange {
    pub lo: f64,
    pub hi: f64,
}

impl ConfidenceRange {
    #[must_use]
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// The full observed range of a dataset.
    #[must_use]
    pub fn full(dataset: &Dataset) -> Self {
        let (lo, hi) = dataset.confidence_bounds();
        Self { lo, hi }
    }

    /// Clamp both ends into `bounds` and keep `lo <= hi`. When the ends are
    /// crossed the upper end follows the lower one.
    #[must_use]
    pub fn clamped(self, bounds: (f64, f64)) -> Self {
        let (min, max) = bounds;
        let lo = self.lo.clamp(min, max);
        let hi = self.hi.clamp(min, max).max(lo);
        Self { lo, hi }
    }

    /// Inclusive on both ends.
    #[must_use]
    pub fn contains(&self, confidence: f64) -> bool {
        self.lo <= confidence && confidence <= self.hi
    }
}

/// Records of a dataset that fall inside a [`ConfidenceRange`], in file order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    #[must_use]
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn records(&self) -> impl Iterator<Item = &'a AirportRecord> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// First record with the given IATA code.
    #[must_use]
    pub fn find(&self, iata: &str) -> Option<&'a AirportRecord> {
        self.records().find(|r| r.iata == iata)
    }
}

/// Narrow `dataset` to the records whose confidence lies in `range`.
#[must_use]
pub fn filter(dataset: &Dataset, range: ConfidenceRange) -> FilteredView<'_> {
    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| range.contains(r.confidence))
        .map(|(i, _)| i)
        .collect();
    FilteredView { dataset, indices }
}
