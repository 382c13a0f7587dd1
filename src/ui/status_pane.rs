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

use eframe::egui;

use crate::status::{StatusLevel, StatusLog};

const MAX_VISIBLE_LINES: f32 = 8.0;
const LINE_HEIGHT: f32 = 14.0;
const MAX_MESSAGE_LEN: usize = 60;

#[derive(Debug)]
pub struct StatusPane {
    pub visible: bool,
    pub collapsed: bool,
}

impl StatusPane {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            collapsed: false,
        }
    }

    /// Render the status log as a floating window
    pub fn render(&mut self, ctx: &egui::Context, log: &StatusLog) {
        if !self.visible {
            // Small button to re-open the pane
            egui::Window::new("show_status")
                .title_bar(false)
                .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -40.0))
                .resizable(false)
                .show(ctx, |ui| {
                    let label = if log.error_count() > 0 {
                        format!("Show Status ({} errors)", log.error_count())
                    } else {
                        "Show Status".to_string()
                    };
                    if ui.button(egui::RichText::new(label).size(11.0)).clicked() {
                        self.visible = true;
                    }
                });
            return;
        }

        egui::Window::new("Status")
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -40.0))
            .default_width(360.0)
            .resizable(false)
            .collapsible(false)
            .title_bar(false)
            .frame(
                egui::Frame::window(&ctx.style())
                    .fill(egui::Color32::from_rgba_unmultiplied(25, 30, 35, 230))
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(60, 80, 100)))
                    .corner_radius(6.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new("STATUS")
                            .color(egui::Color32::from_rgb(100, 180, 220))
                            .size(12.0)
                            .strong(),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .button(egui::RichText::new("✕").size(12.0))
                            .on_hover_text("Hide status pane")
                            .clicked()
                        {
                            self.visible = false;
                        }

                        let collapse_icon = if self.collapsed { "▼" } else { "▲" };
                        if ui
                            .button(egui::RichText::new(collapse_icon).size(10.0))
                            .on_hover_text(if self.collapsed { "Expand" } else { "Collapse" })
                            .clicked()
                        {
                            self.collapsed = !self.collapsed;
                        }
                    });
                });

                if self.collapsed {
                    return;
                }

                ui.separator();
                Self::render_data_section(ui, log);
                ui.add_space(6.0);
                Self::render_messages(ui, log);
            });
    }

    fn render_data_section(ui: &mut egui::Ui, log: &StatusLog) {
        ui.label(section_heading("DATA"));

        let Some(report) = log.last_report else {
            ui.label(dim_text("No dataset loaded").italics());
            return;
        };

        egui::Grid::new("status_data_grid")
            .num_columns(2)
            .spacing([8.0, 2.0])
            .show(ui, |ui| {
                for (label, value) in [
                    ("Rows in file", report.source_rows),
                    ("False positives", report.subset_rows),
                    ("No confidence", report.dropped_confidence),
                    ("No coordinates", report.missing_position),
                ] {
                    ui.label(dim_text(label));
                    ui.label(egui::RichText::new(value.to_string()).size(9.0).monospace());
                    ui.end_row();
                }
            });

        if let Some(loaded_at) = log.last_loaded_at {
            ui.label(dim_text(format!(
                "Loaded {}",
                loaded_at.with_timezone(&chrono::Local).format("%H:%M:%S")
            )));
        }
    }

    fn render_messages(ui: &mut egui::Ui, log: &StatusLog) {
        ui.label(section_heading(&format!("MESSAGES ({})", log.len())));

        if log.is_empty() {
            ui.label(dim_text("No messages").italics());
            return;
        }

        egui::ScrollArea::vertical()
            .max_height(LINE_HEIGHT * MAX_VISIBLE_LINES)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for message in log.iter_newest() {
                    ui.horizontal(|ui| {
                        let (icon, color) = match message.level {
                            StatusLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 180, 255)),
                            StatusLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 200, 100)),
                            StatusLevel::Error => ("✕", egui::Color32::from_rgb(255, 100, 100)),
                        };
                        ui.label(egui::RichText::new(icon).color(color).size(9.0));

                        let time_str = message
                            .timestamp
                            .with_timezone(&chrono::Local)
                            .format("%H:%M:%S")
                            .to_string();
                        ui.label(
                            egui::RichText::new(time_str)
                                .color(egui::Color32::from_rgb(100, 100, 100))
                                .size(8.0)
                                .monospace(),
                        );

                        let response = ui.label(
                            egui::RichText::new(truncate(&message.message, MAX_MESSAGE_LEN))
                                .color(egui::Color32::from_rgb(200, 200, 200))
                                .size(9.0),
                        );
                        if message.message.chars().count() > MAX_MESSAGE_LEN {
                            response.on_hover_text(message.message.as_str());
                        }
                    });
                }
            });
    }
}

fn section_heading(text: &str) -> egui::RichText {
    egui::RichText::new(text)
        .color(egui::Color32::from_rgb(150, 150, 150))
        .size(10.0)
        .strong()
}

fn dim_text(text: impl Into<String>) -> egui::RichText {
    egui::RichText::new(text)
        .color(egui::Color32::from_rgb(130, 130, 130))
        .size(9.0)
}

/// Shorten to `max` characters with a trailing ellipsis
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}
