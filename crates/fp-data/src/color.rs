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

//! Confidence to marker color mapping.

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb`
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Sequential light-to-dark red ramp (ColorBrewer "Reds"), evenly spaced.
const REDS: [(f64, f64, f64); 9] = [
    (255.0, 245.0, 240.0), // #fff5f0
    (254.0, 224.0, 210.0), // #fee0d2
    (252.0, 187.0, 161.0), // #fcbba1
    (252.0, 146.0, 114.0), // #fc9272
    (251.0, 106.0, 74.0),  // #fb6a4a
    (239.0, 59.0, 44.0),   // #ef3b2c
    (203.0, 24.0, 29.0),   // #cb181d
    (165.0, 15.0, 21.0),   // #a50f15
    (103.0, 0.0, 13.0),    // #67000d
];

/// Linear map from a confidence value onto the red ramp.
///
/// The anchors are the confidence bounds of the whole dataset, not of the
/// current filter, so a given confidence always gets the same color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Position of `value` between the anchors, clamped to `[0, 1]`.
    /// A zero-width range maps everything to 0.
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !value.is_finite() {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn color(&self, value: f64) -> Rgb {
        ramp(self.normalize(value))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "t is clamped to [0, 1] so the segment index and channels stay in range"
)]
fn ramp(t: f64) -> Rgb {
    let segments = (REDS.len() - 1) as f64;
    let pos = t.clamp(0.0, 1.0) * segments;
    let i = (pos.floor() as usize).min(REDS.len() - 2);
    let local = pos - i as f64;

    let (r1, g1, b1) = REDS[i];
    let (r2, g2, b2) = REDS[i + 1];
    let lerp = |a: f64, b: f64| (a + (b - a) * local).round() as u8;

    Rgb(lerp(r1, r2), lerp(g1, g2), lerp(b1, b2))
}
