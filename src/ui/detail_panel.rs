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

//! Airport dropdown and the collapsible feature listing under the map.

use eframe::egui;
use fp_data::{AirportDetail, FilteredView, SelectorEntry};

pub const NO_DATA_MESSAGE: &str = "No data for the selected airport in the current filter.";

/// Text shown in the closed dropdown for the current key.
fn selected_text<'a>(entries: &'a [SelectorEntry], selected: Option<&'a str>) -> &'a str {
    match selected {
        Some(key) => entries
            .iter()
            .find(|e| e.key == key)
            .map_or(key, |e| e.label.as_str()),
        None => "",
    }
}

/// Draw the selector and the detail of the selected airport. `selected` holds
/// an IATA code and may name an airport that is no longer in `view`.
pub fn show(
    ui: &mut egui::Ui,
    view: &FilteredView<'_>,
    entries: &[SelectorEntry],
    selected: &mut Option<String>,
) {
    ui.heading("Airport Feature Details");
    ui.add_space(4.0);

    if entries.is_empty() {
        ui.label(egui::RichText::new("No airports in the current filter.").italics());
        return;
    }

    let current = selected_text(entries, selected.as_deref()).to_string();
    ui.label("Select an airport to view full features");
    egui::ComboBox::from_id_salt("airport_selector")
        .selected_text(current)
        .width(ui.available_width().min(480.0))
        .height(400.0)
        .show_ui(ui, |ui| {
            for entry in entries {
                let is_selected = selected.as_deref() == Some(entry.key.as_str());
                if ui.selectable_label(is_selected, &entry.label).clicked() {
                    *selected = Some(entry.key.clone());
                }
            }
        });

    ui.add_space(6.0);

    let Some(key) = selected.as_deref() else {
        return;
    };

    match AirportDetail::lookup(view, key) {
        Ok(detail) => show_detail(ui, &detail),
        Err(miss) => {
            log::debug!("{miss}");
            ui.label(egui::RichText::new(NO_DATA_MESSAGE).color(egui::Color32::from_rgb(70, 110, 160)));
        }
    }
}

fn show_detail(ui: &mut egui::Ui, detail: &AirportDetail) {
    egui::CollapsingHeader::new(&detail.title)
        .id_salt(("airport_detail", &detail.iata))
        .default_open(false)
        .show(ui, |ui| {
            egui::Grid::new(("airport_detail_grid", &detail.iata))
                .num_columns(2)
                .striped(true)
                .spacing([16.0, 4.0])
                .show(ui, |ui| {
                    for field in detail.all_fields() {
                        ui.label(egui::RichText::new(format!("{}:", field.label)).strong());
                        ui.label(field.value);
                        ui.end_row();
                    }
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<SelectorEntry> {
        vec![SelectorEntry {
            key: "ABC".to_string(),
            label: "Alpha (ABC)".to_string(),
        }]
    }

    #[test]
    fn test_selected_text_uses_label() {
        assert_eq!(selected_text(&entries(), Some("ABC")), "Alpha (ABC)");
    }

    #[test]
    fn test_stale_key_shown_verbatim() {
        assert_eq!(selected_text(&entries(), Some("XYZ")), "XYZ");
        assert_eq!(selected_text(&entries(), None), "");
    }
}
