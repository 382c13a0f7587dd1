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

//! Pannable, zoomable map with confidence-colored airport markers.

use eframe::egui;
use fp_data::{MapLayer, Marker, DEFAULT_CENTER, DEFAULT_ZOOM};

use super::tiles::{TileManager, WebMercator, MAX_TILE_ZOOM, TILE_SIZE};

const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 12.0;
const MARKER_STROKE_WIDTH: f32 = 2.0;
const CLICK_SLOP: f32 = 4.0;
const POPUP_MAX_WIDTH: f32 = 250.0;

/// What happened on the map this frame.
#[derive(Debug, Default)]
pub struct MapResponse {
    /// IATA code of a marker the user clicked.
    pub clicked: Option<String>,
}

/// Camera and popup state of the map panel.
#[derive(Debug)]
pub struct MapView {
    center_lat: f64,
    center_lon: f64,
    zoom: f32,
    default_zoom: f32,
    /// Center last taken from the data; the view recenters when it changes.
    data_center: Option<(f64, f64)>,
    /// IATA code whose popup is open.
    popup: Option<String>,
}

impl MapView {
    pub fn new(default_zoom: f32) -> Self {
        let default_zoom = if default_zoom.is_finite() {
            default_zoom.clamp(MIN_ZOOM, MAX_ZOOM)
        } else {
            DEFAULT_ZOOM
        };
        Self {
            center_lat: DEFAULT_CENTER.0,
            center_lon: DEFAULT_CENTER.1,
            zoom: default_zoom,
            default_zoom,
            data_center: None,
            popup: None,
        }
    }

    /// Move the camera to the layer's median center whenever the filtered set
    /// changes it. With nothing to show, fall back to the world view.
    pub fn follow(&mut self, layer: &MapLayer) {
        if layer.center == self.data_center {
            return;
        }
        self.data_center = layer.center;
        self.reset();
    }

    /// Center on the data (or the world view) at the default zoom.
    pub fn reset(&mut self) {
        let (lat, lon) = self.data_center.unwrap_or(DEFAULT_CENTER);
        self.center_lat = lat;
        self.center_lon = lon;
        self.zoom = self.default_zoom;
    }

    #[cfg(test)]
    pub fn center(&self) -> (f64, f64) {
        (self.center_lat, self.center_lon)
    }

    /// Drop the open popup if its marker is no longer on the map.
    fn prune_popup(&mut self, layer: &MapLayer) {
        if let Some(iata) = &self.popup {
            if !layer.markers.iter().any(|m| &m.popup.iata == iata) {
                self.popup = None;
            }
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "zoom is clamped to a small positive range"
    )]
    fn tile_zoom(&self) -> u8 {
        (self.zoom.round() as u8).min(MAX_TILE_ZOOM)
    }

    /// Pixel size of one tile at the current fractional zoom.
    fn tile_px(&self) -> f32 {
        TILE_SIZE * 2_f32.powf(self.zoom - f32::from(self.tile_zoom()))
    }

    /// Pan by a screen-space drag delta.
    fn pan(&mut self, delta: egui::Vec2) {
        let zoom = self.tile_zoom();
        let tile_px = f64::from(self.tile_px());
        let x = WebMercator::lon_to_x(self.center_lon, zoom) - f64::from(delta.x) / tile_px;
        let y = WebMercator::lat_to_y(self.center_lat, zoom) - f64::from(delta.y) / tile_px;

        let lon = WebMercator::tile_to_lon(x, zoom);
        self.center_lon = (lon + 180.0).rem_euclid(360.0) - 180.0;
        self.center_lat = WebMercator::tile_to_lat(y, zoom).clamp(-85.0, 85.0);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, tiles: &TileManager, layer: &MapLayer, height: f32) -> MapResponse {
        self.prune_popup(layer);

        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), height),
            egui::Sense::click_and_drag(),
        );
        let rect = response.rect;
        let center = rect.center();

        painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(242, 239, 233));

        // Scroll wheel and pinch zoom, only while the pointer is over the map
        if response.hovered() {
            let (scroll, pinch) = ui.input(|i| (i.smooth_scroll_delta.y, i.zoom_delta()));
            let change = scroll / 200.0 + pinch.log2();
            if change.abs() > 0.001 {
                self.zoom = (self.zoom + change).clamp(MIN_ZOOM, MAX_ZOOM);
            }
        }

        if response.dragged() {
            self.pan(response.drag_delta());
        }

        let tile_zoom = self.tile_zoom();
        let tile_px = self.tile_px();
        let center_x = WebMercator::lon_to_x(self.center_lon, tile_zoom);
        let center_y = WebMercator::lat_to_y(self.center_lat, tile_zoom);

        let painter = painter.with_clip_rect(rect);
        let mut tiles_rendered = 0;
        for tile in tiles.get_visible_tiles(
            self.center_lat,
            self.center_lon,
            tile_zoom,
            tile_px,
            rect.width(),
            rect.height(),
        ) {
            if let Some(texture) = tiles.get_tile(tile.coord, ui.ctx()) {
                let tile_rect = egui::Rect::from_min_size(
                    egui::pos2(center.x + tile.offset_x, center.y + tile.offset_y),
                    egui::vec2(tile_px, tile_px),
                );
                painter.image(
                    texture.id(),
                    tile_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
                tiles_rendered += 1;
            }
        }

        #[allow(clippy::cast_possible_truncation, reason = "screen coordinates fit in f32")]
        let to_screen = |lat: f64, lon: f64| -> egui::Pos2 {
            let dx = (WebMercator::lon_to_x(lon, tile_zoom) - center_x) * f64::from(tile_px);
            let dy = (WebMercator::lat_to_y(lat, tile_zoom) - center_y) * f64::from(tile_px);
            egui::pos2(center.x + dx as f32, center.y + dy as f32)
        };

        // Markers, tracking the one under a click
        let click_pos = if response.clicked() {
            response.interact_pointer_pos()
        } else {
            None
        };
        let mut hit: Option<(f32, &Marker, egui::Pos2)> = None;

        for marker in &layer.markers {
            let pos = to_screen(marker.latitude, marker.longitude);
            if !rect.expand(marker.radius).contains(pos) {
                continue;
            }
            let (r, g, b) = (marker.color.0, marker.color.1, marker.color.2);
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                reason = "opacity is in [0, 1]"
            )]
            let alpha = (marker.fill_opacity * 255.0).round() as u8;
            painter.circle(
                pos,
                marker.radius,
                egui::Color32::from_rgba_unmultiplied(r, g, b, alpha),
                egui::Stroke::new(MARKER_STROKE_WIDTH, egui::Color32::from_rgb(r, g, b)),
            );

            if let Some(click) = click_pos {
                let distance = click.distance(pos);
                if distance <= marker.radius + CLICK_SLOP && hit.is_none_or(|(best, _, _)| distance < best) {
                    hit = Some((distance, marker, pos));
                }
            }
        }

        let mut map_response = MapResponse::default();
        if click_pos.is_some() {
            match hit {
                Some((_, marker, _)) => {
                    self.popup = Some(marker.popup.iata.clone());
                    map_response.clicked = Some(marker.popup.iata.clone());
                }
                None => self.popup = None,
            }
        }

        // Popup for the open marker
        if let Some(iata) = &self.popup {
            if let Some(marker) = layer.markers.iter().find(|m| &m.popup.iata == iata) {
                let pos = to_screen(marker.latitude, marker.longitude);
                if rect.contains(pos) {
                    show_popup(ui.ctx(), marker, pos + egui::vec2(marker.radius + 4.0, 0.0));
                }
            }
        }

        // Hint
        painter.text(
            rect.left_top() + egui::vec2(10.0, 10.0),
            egui::Align2::LEFT_TOP,
            "Drag to pan | Scroll to zoom | Click a marker for details",
            egui::FontId::proportional(12.0),
            egui::Color32::from_black_alpha(200),
        );

        // Attribution (required by Carto)
        painter.text(
            rect.right_bottom() + egui::vec2(-10.0, -10.0),
            egui::Align2::RIGHT_BOTTOM,
            "© OpenStreetMap contributors © CARTO",
            egui::FontId::proportional(10.0),
            egui::Color32::from_black_alpha(180),
        );

        if let Some(message) = empty_map_message(layer) {
            draw_bubble(
                &painter,
                rect.center(),
                &message,
                egui::Color32::from_rgb(70, 110, 160),
            );
        }

        let tile_status = if tiles.get_error_count() > 0 {
            Some((
                format!("Failed to load {} tiles", tiles.get_error_count()),
                egui::Color32::from_rgb(220, 50, 50),
            ))
        } else if tiles.has_loading_tiles() && tiles_rendered == 0 {
            Some((
                "Loading map tiles...".to_string(),
                egui::Color32::from_rgb(255, 170, 60),
            ))
        } else {
            None
        };
        if let Some((message, color)) = tile_status {
            draw_bubble(&painter, rect.center_top() + egui::vec2(0.0, 20.0), &message, color);
        }

        map_response
    }
}

fn show_popup(ctx: &egui::Context, marker: &Marker, pos: egui::Pos2) {
    egui::Area::new(egui::Id::new("marker_popup"))
        .order(egui::Order::Foreground)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(POPUP_MAX_WIDTH);
                ui.label(egui::RichText::new(&marker.popup.name).strong());
                for (label, value) in marker.popup.lines() {
                    ui.horizontal(|ui| {
                        ui.label(format!("{label}:"));
                        if label == "Model Confidence" {
                            ui.label(egui::RichText::new(value).strong());
                        } else {
                            ui.label(value);
                        }
                    });
                }
            });
        });
}

/// Why the map has no markers, if it has none.
fn empty_map_message(layer: &MapLayer) -> Option<String> {
    if !layer.markers.is_empty() {
        return None;
    }
    Some(match layer.skipped {
        0 => "No airports match the selected confidence range".to_string(),
        1 => "The airport in this range has no coordinates".to_string(),
        n => format!("None of the {n} airports in this range have coordinates"),
    })
}

fn draw_bubble(painter: &egui::Painter, pos: egui::Pos2, message: &str, fill: egui::Color32) {
    let galley = painter.layout_no_wrap(
        message.to_string(),
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
    let padding = egui::vec2(12.0, 6.0);
    let bubble_rect = egui::Rect::from_center_size(pos, galley.size() + padding * 2.0);

    painter.rect_filled(bubble_rect, 5.0, fill);
    painter.text(
        pos,
        egui::Align2::CENTER_CENTER,
        message,
        egui::FontId::proportional(12.0),
        egui::Color32::WHITE,
    );
}
