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

//! The dashboard window.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;
use fp_data::{
    build_selector, filter, iata_from_label, ColorScale, ConfidenceRange, Dataset, DatasetCache,
    FeatureCollection, MapLayer, SelectorEntry,
};
use log::{error, info, warn};

use crate::config::AppConfig;
use crate::map::{MapView, TileManager};
use crate::status::StatusLog;
use crate::ui::{detail_panel, sidebar, SidebarAction, StatusPane};

pub const APP_TITLE: &str = "False Positive Airports: Model Confidence Map";

const BANNER: &str = "Airports the model flagged as likely involved in illicit activity \
                      although no incident has been recorded. Marker color shows the model's \
                      confidence, darker red meaning more confident. Narrow the confidence \
                      range in the sidebar and pick an airport below the map to inspect \
                      every feature the model saw.";

const FOOTER: &str = "Data: airport-level classification results with flight network \
                      centrality, crime and demographic features. \
                      Basemap © OpenStreetMap contributors © CARTO.";

const CONTACT: &str = "Questions or corrections: open an issue on the project repository.";

/// How often the data file is checked for changes.
const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Overrides given on the command line for this run.
#[derive(Debug, Default, Clone)]
pub struct StartupOptions {
    pub csv_path: Option<PathBuf>,
    /// IATA code or `"name (IATA)"` label.
    pub select: Option<String>,
    pub min_confidence: Option<f64>,
    pub max_confidence: Option<f64>,
}

#[derive(Debug)]
enum LoadState {
    NotLoaded,
    Loaded(Arc<Dataset>),
    Failed(String),
}

#[derive(Debug)]
pub struct DashboardApp {
    config: AppConfig,
    cache: DatasetCache,
    state: LoadState,
    range: ConfidenceRange,
    /// IATA code of the airport shown in the detail panel.
    selected: Option<String>,
    /// Command line range and selection, applied to the first successful load.
    startup: StartupOptions,
    map: MapView,
    tiles: TileManager,
    status: StatusLog,
    status_pane: StatusPane,
    last_check: Option<Instant>,
}

impl DashboardApp {
    pub fn new(mut config: AppConfig, startup: StartupOptions) -> Self {
        if let Some(path) = &startup.csv_path {
            config.csv_path.clone_from(path);
        }

        let mut app = Self {
            map: MapView::new(config.default_zoom),
            tiles: TileManager::new(config.tile_style.clone()),
            status_pane: StatusPane::new(config.show_status_log),
            config,
            cache: DatasetCache::new(),
            state: LoadState::NotLoaded,
            range: ConfidenceRange::new(0.0, 1.0),
            selected: None,
            startup,
            status: StatusLog::new(),
            last_check: None,
        };
        app.refresh(true);
        app
    }

    /// Reload the dataset when the file changed on disk. Checks at most once
    /// per [`REFRESH_INTERVAL`] unless `force` is set.
    fn refresh(&mut self, force: bool) {
        if !force && self.last_check.is_some_and(|t| t.elapsed() < REFRESH_INTERVAL) {
            return;
        }
        self.last_check = Some(Instant::now());

        let path = self.config.csv_path.clone();
        if matches!(self.state, LoadState::Failed(_)) && self.cache.unchanged_since_failure(&path) {
            return;
        }
        match self.cache.get_or_load(&path) {
            Ok(dataset) => {
                if let LoadState::Loaded(current) = &self.state {
                    if Arc::ptr_eq(current, &dataset) {
                        return;
                    }
                }
                self.apply_dataset(dataset, &path.display().to_string());
            }
            Err(err) => {
                let message = err.to_string();
                if !matches!(&self.state, LoadState::Failed(previous) if *previous == message) {
                    error!("Failed to load {}: {message}", path.display());
                    self.status.error(format!("Failed to load {}: {message}", path.display()));
                }
                self.state = LoadState::Failed(message);
            }
        }
    }

    fn apply_dataset(&mut self, dataset: Arc<Dataset>, source: &str) {
        let bounds = dataset.confidence_bounds();
        let first_load = !matches!(self.state, LoadState::Loaded(_));

        self.range = if first_load {
            let (min, max) = bounds;
            let lo = self.startup.min_confidence.take().unwrap_or(min);
            let hi = self.startup.max_confidence.take().unwrap_or(max);
            ConfidenceRange::new(lo, hi).clamped(bounds)
        } else {
            self.range.clamped(bounds)
        };

        if let Some(select) = self.startup.select.take() {
            self.selected = Some(iata_from_label(&select).to_string());
        }

        self.status.record_load(source, dataset.report());
        self.state = LoadState::Loaded(dataset);
    }

    fn dataset(&self) -> Option<Arc<Dataset>> {
        match &self.state {
            LoadState::Loaded(dataset) => Some(Arc::clone(dataset)),
            LoadState::NotLoaded | LoadState::Failed(_) => None,
        }
    }

    fn open_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Open classification results")
            .add_filter("CSV", &["csv"])
            .pick_file()
        else {
            return;
        };

        info!("Opening {}", path.display());
        self.config.csv_path = path;
        if let Err(e) = self.config.save() {
            warn!("Failed to save config: {e}");
            self.status.warn(format!("Failed to save config: {e}"));
        }

        self.cache.invalidate();
        self.state = LoadState::NotLoaded;
        self.selected = None;
        self.refresh(true);
    }

    fn reload(&mut self) {
        self.cache.invalidate();
        self.tiles.retry_failed();
        self.refresh(true);
    }

    fn export_geojson(&mut self, dataset: &Dataset) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Export airports")
            .set_file_name("false_positive_airports.geojson")
            .add_filter("GeoJSON", &["geojson", "json"])
            .save_file()
        else {
            return;
        };

        let collection = FeatureCollection::from_view(&filter(dataset, self.range));
        match collection.write_to(&path) {
            Ok(count) => self
                .status
                .info(format!("Exported {count} airports to {}", path.display())),
            Err(e) => {
                error!("Export failed: {e}");
                self.status.error(format!("Export failed: {e}"));
            }
        }
    }

    fn show_header(ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.heading(egui::RichText::new(APP_TITLE).strong());
        ui.label(BANNER);
        ui.add_space(6.0);
    }

    fn show_footer(ui: &mut egui::Ui) {
        ui.add_space(4.0);
        ui.horizontal_wrapped(|ui| {
            ui.label(egui::RichText::new(FOOTER).small().color(egui::Color32::GRAY));
        });
        ui.label(egui::RichText::new(CONTACT).small().color(egui::Color32::GRAY));
        ui.add_space(4.0);
    }

    fn show_load_error(ui: &mut egui::Ui, path: &std::path::Path, message: &str) {
        ui.add_space(20.0);
        egui::Frame::group(ui.style())
            .fill(egui::Color32::from_rgb(255, 235, 235))
            .show(ui, |ui| {
                ui.label(
                    egui::RichText::new("Could not load the airport data")
                        .strong()
                        .color(egui::Color32::from_rgb(180, 30, 30)),
                );
                ui.label(egui::RichText::new(message).color(egui::Color32::from_rgb(180, 30, 30)));
                ui.label(egui::RichText::new(path.display().to_string()).monospace().small());
                ui.add_space(4.0);
                ui.label("Open another CSV from the sidebar, or fix the file and press Reload.");
            });
    }
}

/// First entry of the dropdown when nothing is selected yet.
fn default_selection(selected: &mut Option<String>, entries: &[SelectorEntry]) {
    if selected.is_none() {
        *selected = entries.first().map(|e| e.key.clone());
    }
}

/// Note above the map when the range leaves it without markers.
fn range_note(in_range: usize, layer: &MapLayer) -> Option<String> {
    if in_range == 0 {
        return Some("No airports in the selected confidence range.".to_string());
    }
    if !layer.markers.is_empty() {
        return None;
    }
    Some(match layer.skipped {
        1 => "The airport in this range has no coordinates and is listed below only.".to_string(),
        n => format!("The {n} airports in this range have no coordinates and are listed below only."),
    })
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.refresh(false);
        ctx.request_repaint_after(REFRESH_INTERVAL);

        egui::TopBottomPanel::top("header").show(ctx, Self::show_header);
        egui::TopBottomPanel::bottom("footer").show(ctx, Self::show_footer);

        let dataset = self.dataset();
        let mut action = None;
        egui::SidePanel::left("filters")
            .default_width(self.config.sidebar_width)
            .resizable(true)
            .show(ctx, |ui| {
                action = sidebar::show(ui, &mut self.range, dataset.as_deref());
            });

        match action {
            Some(SidebarAction::OpenCsv) => self.open_csv(),
            Some(SidebarAction::Reload) => self.reload(),
            Some(SidebarAction::ExportGeoJson) => {
                if let Some(ds) = &dataset {
                    self.export_geojson(ds);
                }
            }
            Some(SidebarAction::ToggleStatus) => self.status_pane.visible = !self.status_pane.visible,
            None => {}
        }

        let dataset = self.dataset();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                match (&self.state, &dataset) {
                    (LoadState::Failed(message), _) => {
                        Self::show_load_error(ui, &self.config.csv_path, message);
                    }
                    (LoadState::Loaded(_), Some(ds)) => {
                        let view = filter(ds, self.range);
                        let (min, max) = ds.confidence_bounds();
                        let layer = MapLayer::build(&view, &ColorScale::new(min, max));

                        self.map.follow(&layer);
                        if let Some(note) = range_note(view.len(), &layer) {
                            ui.label(egui::RichText::new(note).color(egui::Color32::from_rgb(70, 110, 160)));
                        }
                        let response = self.map.show(ui, &self.tiles, &layer, self.config.map_height);
                        if let Some(iata) = response.clicked {
                            self.selected = Some(iata);
                        }

                        ui.add_space(12.0);

                        let entries = build_selector(&view);
                        default_selection(&mut self.selected, &entries);
                        detail_panel::show(ui, &view, &entries, &mut self.selected);
                    }
                    _ => {
                        ui.spinner();
                    }
                }
            });
        });

        self.status_pane.render(ctx, &self.status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection_takes_first_entry() {
        let entries = vec![
            SelectorEntry {
                key: "ABC".to_string(),
                label: "Alpha (ABC)".to_string(),
            },
            SelectorEntry {
                key: "XYZ".to_string(),
                label: "Xylo (XYZ)".to_string(),
            },
        ];

        let mut selected = None;
        default_selection(&mut selected, &entries);
        assert_eq!(selected.as_deref(), Some("ABC"));

        let mut selected = Some("QQQ".to_string());
        default_selection(&mut selected, &entries);
        assert_eq!(selected.as_deref(), Some("QQQ"));

        let mut selected = None;
        default_selection(&mut selected, &[]);
        assert_eq!(selected, None);
    }

    const CSV: &str = "label,IATA,name,city,country,latitude,longitude,confidence\n\
                       false_positive,ABC,Alpha Intl,A,A,10.0,20.0,0.2\n\
                       false_positive,XYZ,Xylo Field,X,X,30.0,40.0,0.9\n\
                       false_positive,NOP,No Position,N,N,,,0.6\n";

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fpmap-app-{}-{tag}.csv", std::process::id()))
    }

    fn app(tag: &str, startup: StartupOptions) -> DashboardApp {
        let config = AppConfig {
            csv_path: temp_path(tag),
            ..AppConfig::default()
        };
        DashboardApp::new(config, startup)
    }

    fn dataset(csv: &str) -> Arc<Dataset> {
        Arc::new(Dataset::from_reader(csv.as_bytes()).unwrap())
    }

    #[test]
    fn test_startup_overrides_apply_to_first_load() {
        let mut app = app(
            "startup",
            StartupOptions {
                min_confidence: Some(0.5),
                max_confidence: Some(5.0),
                select: Some("Xylo Field (XYZ)".to_string()),
                ..StartupOptions::default()
            },
        );
        // The configured file does not exist
        assert!(matches!(app.state, LoadState::Failed(_)));

        app.apply_dataset(dataset(CSV), "test");
        assert_eq!(app.range, ConfidenceRange::new(0.5, 0.9));
        assert_eq!(app.selected.as_deref(), Some("XYZ"));
        assert!(app.startup.min_confidence.is_none());
        assert!(app.startup.select.is_none());
    }

    #[test]
    fn test_reload_keeps_range_clamped_to_new_bounds() {
        let mut app = app("reload", StartupOptions::default());
        app.apply_dataset(dataset(CSV), "test");
        assert_eq!(app.range, ConfidenceRange::new(0.2, 0.9));

        app.range = ConfidenceRange::new(0.3, 0.85);
        let narrower = "label,IATA,name,city,country,latitude,longitude,confidence\n\
                        false_positive,ABC,Alpha Intl,A,A,10.0,20.0,0.4\n\
                        false_positive,XYZ,Xylo Field,X,X,30.0,40.0,0.8\n";
        app.apply_dataset(dataset(narrower), "test");
        assert_eq!(app.range, ConfidenceRange::new(0.4, 0.8));

        // Startup overrides are not applied again
        app.startup.min_confidence = Some(0.1);
        app.apply_dataset(dataset(CSV), "test");
        assert_eq!(app.range, ConfidenceRange::new(0.4, 0.8));
    }

    #[test]
    fn test_failed_file_not_reread_until_changed() {
        let path = temp_path("failed");
        std::fs::write(&path, "label,IATA,name\nfalse_positive,ABC,A\n").unwrap();

        let mut app = app("failed", StartupOptions::default());
        assert!(matches!(app.state, LoadState::Failed(_)));
        assert_eq!(app.cache.load_count(), 1);

        app.refresh(true);
        app.refresh(true);
        assert_eq!(app.cache.load_count(), 1);

        std::fs::write(&path, CSV).unwrap();
        app.refresh(true);
        assert_eq!(app.cache.load_count(), 2);
        assert!(matches!(app.state, LoadState::Loaded(_)));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_range_note_distinguishes_unplaced_airports() {
        let ds = dataset(CSV);
        let scale = ColorScale::new(0.2, 0.9);

        let view = filter(&ds, ConfidenceRange::new(0.3, 0.4));
        assert_eq!(
            range_note(view.len(), &MapLayer::build(&view, &scale)).as_deref(),
            Some("No airports in the selected confidence range.")
        );

        let view = filter(&ds, ConfidenceRange::new(0.5, 0.7));
        let note = range_note(view.len(), &MapLayer::build(&view, &scale));
        assert_eq!(
            note.as_deref(),
            Some("The airport in this range has no coordinates and is listed below only.")
        );

        let view = filter(&ds, ConfidenceRange::new(0.2, 0.9));
        assert_eq!(range_note(view.len(), &MapLayer::build(&view, &scale)), None);
    }
}
