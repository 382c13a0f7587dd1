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

//! Application configuration management.
//!
//! Preferences are stored as TOML through `confy`. Every field has a serde
//! default so older or hand-edited files keep loading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const APP_NAME: &str = "fpmap-desktop";
const CONFIG_NAME: &str = "config";

/// Results file read when nothing else is configured
pub const DEFAULT_CSV_PATH: &str = "false_positives_and_negatives.csv";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Classifier results CSV to load on startup
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// CARTO basemap style (`light_all`, `dark_all`, `rastertiles/voyager`)
    #[serde(default = "default_tile_style")]
    pub tile_style: String,

    /// Initial map zoom level
    #[serde(default = "default_zoom")]
    pub default_zoom: f32,

    /// Height of the map panel in pixels
    #[serde(default = "default_map_height")]
    pub map_height: f32,

    /// Filter sidebar width in pixels
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: f32,

    /// Show the status log window
    #[serde(default)]
    pub show_status_log: bool,
}

fn default_config_version() -> u32 {
    1
}

fn default_csv_path() -> PathBuf {
    PathBuf::from(DEFAULT_CSV_PATH)
}

fn default_tile_style() -> String {
    "light_all".to_string()
}

fn default_zoom() -> f32 {
    fp_data::DEFAULT_ZOOM
}

fn default_map_height() -> f32 {
    800.0
}

fn default_sidebar_width() -> f32 {
    280.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            csv_path: default_csv_path(),
            tile_style: default_tile_style(),
            default_zoom: default_zoom(),
            map_height: default_map_height(),
            sidebar_width: default_sidebar_width(),
            show_status_log: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults on first run
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.csv_path, PathBuf::from("false_positives_and_negatives.csv"));
        assert_eq!(config.tile_style, "light_all");
        assert!((config.default_zoom - 2.0).abs() < f32::EPSILON);
        assert!(!config.show_status_log);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let config: AppConfig = toml::from_str("csv_path = \"/data/results.csv\"\nmap_height = 600.0\n").unwrap();
        assert_eq!(config.csv_path, PathBuf::from("/data/results.csv"));
        assert!((config.map_height - 600.0).abs() < f32::EPSILON);
        assert_eq!(config.tile_style, "light_all");
        assert_eq!(config.config_version, 1);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = AppConfig::default();
        config.show_status_log = true;
        config.tile_style = "dark_all".to_string();

        let text = toml::to_string(&config).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
