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

//! Filter sidebar: confidence range sliders and file actions.

use eframe::egui;
use fp_data::{filter, ConfidenceRange, Dataset, STEP};

/// File action requested from the sidebar this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarAction {
    OpenCsv,
    Reload,
    ExportGeoJson,
    ToggleStatus,
}

/// Draw the filter controls. `dataset` is `None` while nothing is loaded.
pub fn show(
    ui: &mut egui::Ui,
    range: &mut ConfidenceRange,
    dataset: Option<&Dataset>,
) -> Option<SidebarAction> {
    let mut action = None;

    ui.heading("Filters");
    ui.add_space(8.0);

    let mut shown = 0;
    if let Some(dataset) = dataset {
        let bounds = dataset.confidence_bounds();
        ui.label(egui::RichText::new("Model Confidence Range").strong());
        confidence_sliders(ui, range, bounds);

        // Counted after the sliders so the text matches this frame's range
        let (count, total) = counts(dataset, *range);
        shown = count;

        ui.add_space(4.0);
        ui.label(format!("{:.2} to {:.2}", range.lo, range.hi));
        ui.label(
            egui::RichText::new(format!("Showing {count} of {total} airports"))
                .color(egui::Color32::GRAY),
        );

        if ui
            .small_button("Reset range")
            .on_hover_text("Select the full observed range")
            .clicked()
        {
            *range = ConfidenceRange::new(bounds.0, bounds.1);
        }
    } else {
        ui.label(egui::RichText::new("No dataset loaded").italics());
    }

    ui.add_space(12.0);
    ui.separator();
    ui.add_space(4.0);

    ui.vertical_centered_justified(|ui| {
        if ui.button("Open CSV…").clicked() {
            action = Some(SidebarAction::OpenCsv);
        }
        if ui.button("Reload").on_hover_text("Read the file again").clicked() {
            action = Some(SidebarAction::Reload);
        }
        if ui
            .add_enabled(shown > 0, egui::Button::new("Export GeoJSON…"))
            .on_hover_text("Save the airports currently on the map")
            .clicked()
        {
            action = Some(SidebarAction::ExportGeoJson);
        }
        if ui.button("Status log").clicked() {
            action = Some(SidebarAction::ToggleStatus);
        }
    });

    action
}

fn confidence_sliders(ui: &mut egui::Ui, range: &mut ConfidenceRange, bounds: (f64, f64)) {
    let (min, max) = bounds;

    // A single observed value leaves nothing to slide over
    if max <= min {
        ui.label(format!("All airports have confidence {min:.2}"));
        *range = ConfidenceRange::new(min, max);
        return;
    }

    let mut lo = range.lo;
    let mut hi = range.hi;
    // min_decimals only affects display; the value stays on `min + k * STEP`
    let lo_changed = ui
        .add(egui::Slider::new(&mut lo, min..=max).step_by(STEP).min_decimals(2).text("Minimum"))
        .changed();
    let hi_changed = ui
        .add(egui::Slider::new(&mut hi, min..=max).step_by(STEP).min_decimals(2).text("Maximum"))
        .changed();

    if lo_changed || hi_changed {
        *range = adjust_range(lo, hi, hi_changed && !lo_changed, bounds);
    }
}

/// Keep `lo <= hi` after a slider move; the handle being dragged wins.
/// Handles within half a step of either end land exactly on the observed
/// bound, which is rarely a multiple of the step.
fn adjust_range(lo: f64, hi: f64, moved_hi: bool, bounds: (f64, f64)) -> ConfidenceRange {
    let (min, max) = bounds;
    let snap = |v: f64| {
        if v <= min + STEP / 2.0 {
            min
        } else if v >= max - STEP / 2.0 {
            max
        } else {
            v
        }
    };
    let (lo, hi) = (snap(lo), snap(hi));

    let (lo, hi) = match (lo > hi, moved_hi) {
        (true, true) => (hi, hi),
        (true, false) => (lo, lo),
        (false, _) => (lo, hi),
    };
    ConfidenceRange::new(lo, hi).clamped(bounds)
}

/// Airports inside `range`, and in the whole dataset.
fn counts(dataset: &Dataset, range: ConfidenceRange) -> (usize, usize) {
    (filter(dataset, range).len(), dataset.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "label,IATA,name,city,country,latitude,longitude,confidence\n\
                       false_positive,LOW,Low,L,L,1,1,0.127\n\
                       false_positive,MID,Mid,M,M,2,2,0.5\n\
                       false_positive,TOP,Top,T,T,3,3,0.987\n";

    #[test]
    fn test_adjust_range_keeps_order() {
        let bounds = (0.2, 0.9);

        let r = adjust_range(0.6, 0.4, false, bounds);
        assert_eq!((r.lo, r.hi), (0.6, 0.6));

        let r = adjust_range(0.6, 0.4, true, bounds);
        assert_eq!((r.lo, r.hi), (0.4, 0.4));

        let r = adjust_range(0.3, 0.8, false, bounds);
        assert_eq!((r.lo, r.hi), (0.3, 0.8));
    }

    #[test]
    fn test_slider_ends_reach_observed_bounds() {
        let bounds = (0.127, 0.987);

        // Values a two-decimal slider lands on at its far ends
        let r = adjust_range(0.13, 0.98, false, bounds);
        assert_eq!((r.lo, r.hi), bounds);

        // Values stepped from the lower bound
        let r = adjust_range(0.127, 0.127 + 86.0 * STEP, true, bounds);
        assert_eq!((r.lo, r.hi), bounds);

        let r = adjust_range(0.123, 0.983, false, (0.123, 0.987));
        assert_eq!((r.lo, r.hi), (0.123, 0.987));
    }

    #[test]
    fn test_full_slider_range_keeps_extreme_airports() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        let bounds = ds.confidence_bounds();

        let r = adjust_range(0.13, 0.98, false, bounds);
        assert_eq!(counts(&ds, r), (3, 3));
    }

    #[test]
    fn test_counts_follow_range() {
        let ds = Dataset::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(counts(&ds, ConfidenceRange::new(0.4, 0.6)), (1, 3));
        assert_eq!(counts(&ds, ConfidenceRange::new(0.9, 0.95)), (0, 3));
    }
}
