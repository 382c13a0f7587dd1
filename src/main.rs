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

mod app;
mod config;
mod map;
mod status;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use log::{info, warn};
use mimalloc::MiMalloc;

use app::{DashboardApp, StartupOptions, APP_TITLE};
use config::AppConfig;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "fpmap-desktop")]
#[command(version)]
#[command(about = "Map of airports flagged as false positives, colored by model confidence", long_about = None)]
struct Cli {
    /// Classification results CSV (overrides the configured path)
    csv: Option<PathBuf>,

    /// Airport to show in the detail panel, as an IATA code or "Name (IATA)"
    #[arg(short, long)]
    select: Option<String>,

    /// Lower end of the initial confidence range
    #[arg(long)]
    min_confidence: Option<f64>,

    /// Upper end of the initial confidence range
    #[arg(long)]
    max_confidence: Option<f64>,
}

impl From<Cli> for StartupOptions {
    fn from(cli: Cli) -> Self {
        Self {
            csv_path: cli.csv,
            select: cli.select,
            min_confidence: cli.min_confidence,
            max_confidence: cli.max_confidence,
        }
    }
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    info!("Starting fpmap-desktop...");

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {e}");
        AppConfig::default()
    });
    if let Ok(path) = AppConfig::get_config_path() {
        info!("Config file: {}", path.display());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 1000.0])
            .with_title(APP_TITLE),
        ..Default::default()
    };

    let startup = StartupOptions::from(cli);
    eframe::run_native(
        "fpmap-desktop",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(config, startup)))),
    )
}
