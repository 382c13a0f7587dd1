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

//! Basemap tile fetching and caching.
//!
//! Tiles come from the CARTO basemap CDN, are decoded on worker threads and
//! cached on disk for a week. Nothing here blocks the UI thread on the network:
//! a missing tile is queued and simply not drawn until it arrives.

use egui::{ColorImage, TextureHandle};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

pub const TILE_SIZE: f32 = 256.0;
const CACHE_DURATION_DAYS: u64 = 7;

/// Highest zoom level the basemap serves.
pub const MAX_TILE_ZOOM: u8 = 18;

/// Web Mercator projection utilities. Coordinates are in tile units at `zoom`.
#[derive(Debug)]
pub struct WebMercator;

impl WebMercator {
    /// Convert latitude to a Web Mercator Y tile coordinate
    pub fn lat_to_y(lat: f64, zoom: u8) -> f64 {
        let lat_rad = lat.to_radians();
        let n = 2_f64.powi(i32::from(zoom));
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * n
    }

    /// Convert longitude to a Web Mercator X tile coordinate
    pub fn lon_to_x(lon: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        ((lon + 180.0) / 360.0) * n
    }

    /// Convert a Y tile coordinate back to latitude
    pub fn tile_to_lat(y: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        let lat_rad = ((std::f64::consts::PI * (1.0 - 2.0 * y / n)).sinh()).atan();
        lat_rad.to_degrees()
    }

    /// Convert an X tile coordinate back to longitude
    pub fn tile_to_lon(x: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        x / n * 360.0 - 180.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// Tile URL on the CARTO CDN for a basemap style such as `light_all`
    pub fn url(&self, style: &str) -> String {
        let subdomain = ['a', 'b', 'c', 'd'][((self.x + self.y) % 4) as usize];
        format!(
            "https://{}.basemaps.cartocdn.com/{}/{}/{}/{}.png",
            subdomain, style, self.zoom, self.x, self.y
        )
    }

    /// Cache filename based on hash of URL
    fn cache_filename(&self, style: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url(style).as_bytes());
        let hash = hasher.finalize();
        format!("{hash:x}.png")
    }
}

/// A tile placed on screen, relative to the viewport center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleTile {
    pub coord: TileCoord,
    pub offset_x: f32,
    pub offset_y: f32,
}

enum TileState {
    Loading,
    Loaded(TextureHandle),
    Failed,
}

type TileMap = Arc<Mutex<HashMap<TileCoord, TileState>>>;

pub struct TileManager {
    style: String,
    cache_dir: PathBuf,
    tiles: TileMap,
    queued: Arc<Mutex<HashSet<TileCoord>>>,
}

impl std::fmt::Debug for TileManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileManager")
            .field("style", &self.style)
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl TileManager {
    pub fn new(style: impl Into<String>) -> Self {
        let cache_dir = Self::get_cache_dir();

        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create tile cache directory: {e}");
        }

        Self::cleanup_old_tiles(&cache_dir);

        Self {
            style: style.into(),
            cache_dir,
            tiles: Arc::new(Mutex::new(HashMap::new())),
            queued: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    fn get_cache_dir() -> PathBuf {
        let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        path.push("fpmap-desktop");
        path.push("tiles");
        path
    }

    fn cleanup_old_tiles(cache_dir: &Path) {
        let now = SystemTime::now();
        let max_age = Duration::from_secs(CACHE_DURATION_DAYS * 24 * 60 * 60);

        let Ok(entries) = fs::read_dir(cache_dir) else {
            return;
        };
        for entry in entries.flatten() {
            let expired = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age);
            if expired {
                let _ = fs::remove_file(entry.path());
                debug!("Removed old tile cache: {:?}", entry.path());
            }
        }
    }

    /// Get tile from memory or disk cache, or queue it for download
    pub fn get_tile(&self, coord: TileCoord, ctx: &egui::Context) -> Option<TextureHandle> {
        let Ok(mut tiles) = self.tiles.lock() else {
            return None;
        };

        match tiles.get(&coord) {
            Some(TileState::Loaded(texture)) => Some(texture.clone()),
            Some(TileState::Loading | TileState::Failed) => None,
            None => {
                let cache_path = self.cache_dir.join(coord.cache_filename(&self.style));

                if cache_path.exists() {
                    match fs::read(&cache_path)
                        .map_err(|e| e.to_string())
                        .and_then(|bytes| decode_tile(&bytes, coord, ctx))
                    {
                        Ok(texture) => {
                            tiles.insert(coord, TileState::Loaded(texture.clone()));
                            return Some(texture);
                        }
                        Err(e) => warn!("Failed to load cached tile: {e}"),
                    }
                }

                tiles.insert(coord, TileState::Loading);
                drop(tiles);
                self.queue_download(coord, ctx.clone());
                None
            }
        }
    }

    fn queue_download(&self, coord: TileCoord, ctx: egui::Context) {
        let Ok(mut queued) = self.queued.lock() else {
            return;
        };
        if !queued.insert(coord) {
            return;
        }

        let tiles = Arc::clone(&self.tiles);
        let queue = Arc::clone(&self.queued);
        let url = coord.url(&self.style);
        let cache_path = self.cache_dir.join(coord.cache_filename(&self.style));

        std::thread::spawn(move || {
            let state = match download_tile(&url, &cache_path, coord, &ctx) {
                Ok(texture) => TileState::Loaded(texture),
                Err(e) => {
                    warn!("Failed to fetch tile {url}: {e}");
                    TileState::Failed
                }
            };
            if let Ok(mut tiles) = tiles.lock() {
                tiles.insert(coord, state);
            }
            if let Ok(mut queue) = queue.lock() {
                queue.remove(&coord);
            }
            ctx.request_repaint();
        });
    }

    /// Tiles covering a viewport centered on `(center_lat, center_lon)`, with
    /// each tile drawn `tile_px` pixels wide.
    pub fn get_visible_tiles(
        &self,
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        tile_px: f32,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Vec<VisibleTile> {
        visible_tiles(center_lat, center_lon, zoom, tile_px, viewport_width, viewport_height)
    }

    pub fn has_loading_tiles(&self) -> bool {
        self.tiles
            .lock()
            .is_ok_and(|tiles| tiles.values().any(|state| matches!(state, TileState::Loading)))
    }

    pub fn get_error_count(&self) -> usize {
        self.tiles.lock().map_or(0, |tiles| {
            tiles
                .values()
                .filter(|state| matches!(state, TileState::Failed))
                .count()
        })
    }

    /// Forget failed tiles so they are requested again.
    pub fn retry_failed(&self) {
        if let Ok(mut tiles) = self.tiles.lock() {
            tiles.retain(|_, state| !matches!(state, TileState::Failed));
        }
    }
}

fn download_tile(
    url: &str,
    cache_path: &Path,
    coord: TileCoord,
    ctx: &egui::Context,
) -> Result<TextureHandle, String> {
    debug!("Downloading tile: {url}");

    let response = reqwest::blocking::get(url).map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    let bytes = response.bytes().map_err(|e| e.to_string())?;

    if let Err(e) = fs::write(cache_path, &bytes) {
        warn!("Failed to save tile to cache: {e}");
    }

    decode_tile(&bytes, coord, ctx)
}

fn decode_tile(bytes: &[u8], coord: TileCoord, ctx: &egui::Context) -> Result<TextureHandle, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw());

    Ok(ctx.load_texture(
        format!("tile_{}_{}/{}", coord.zoom, coord.x, coord.y),
        color_image,
        egui::TextureOptions::default(),
    ))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "tile indices are bounded by 2^zoom and wrapped into range"
)]
fn visible_tiles(
    center_lat: f64,
    center_lon: f64,
    zoom: u8,
    tile_px: f32,
    viewport_width: f32,
    viewport_height: f32,
) -> Vec<VisibleTile> {
    let mut tiles = Vec::new();

    let center_tile_x = WebMercator::lon_to_x(center_lon, zoom);
    let center_tile_y = WebMercator::lat_to_y(center_lat, zoom);

    let tiles_wide = (viewport_width / tile_px).ceil() as i32 + 2;
    let tiles_high = (viewport_height / tile_px).ceil() as i32 + 2;

    let start_x = center_tile_x.floor() as i32 - tiles_wide / 2;
    let start_y = center_tile_y.floor() as i32 - tiles_high / 2;

    let max_tile = 2_i32.pow(u32::from(zoom));

    for dy in 0..tiles_high {
        for dx in 0..tiles_wide {
            let tile_x = start_x + dx;
            let tile_y = start_y + dy;

            // Longitude wraps, latitude doesn't
            let wrapped_x = tile_x.rem_euclid(max_tile);
            if tile_y < 0 || tile_y >= max_tile {
                continue;
            }

            let offset_x = (f64::from(tile_x) - center_tile_x) * f64::from(tile_px);
            let offset_y = (f64::from(tile_y) - center_tile_y) * f64::from(tile_px);

            tiles.push(VisibleTile {
                coord: TileCoord::new(wrapped_x as u32, tile_y as u32, zoom),
                offset_x: offset_x as f32,
                offset_y: offset_y as f32,
            });
        }
    }

    tiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_round_trip() {
        for &(lat, lon) in &[(0.0, 0.0), (51.47, -0.45), (-33.94, 151.18), (60.0, 179.0)] {
            let x = WebMercator::lon_to_x(lon, 5);
            let y = WebMercator::lat_to_y(lat, 5);
            assert!((WebMercator::tile_to_lon(x, 5) - lon).abs() < 1e-9);
            assert!((WebMercator::tile_to_lat(y, 5) - lat).abs() < 1e-9);
        }
    }

    #[test]
    fn test_mercator_origin() {
        assert!((WebMercator::lon_to_x(0.0, 2) - 2.0).abs() < 1e-12);
        assert!((WebMercator::lat_to_y(0.0, 2) - 2.0).abs() < 1e-12);
        assert!(WebMercator::lon_to_x(-180.0, 3).abs() < 1e-12);
    }

    #[test]
    fn test_tile_url() {
        let coord = TileCoord::new(1, 2, 3);
        assert_eq!(
            coord.url("light_all"),
            "https://d.basemaps.cartocdn.com/light_all/3/1/2.png"
        );
        assert!(coord.cache_filename("light_all").ends_with(".png"));
        assert_ne!(coord.cache_filename("light_all"), coord.cache_filename("dark_all"));
    }

    #[test]
    fn test_visible_tiles_wrap_and_clip() {
        let tiles = visible_tiles(0.0, 0.0, 1, TILE_SIZE, 1024.0, 1024.0);
        assert!(!tiles.is_empty());
        for tile in &tiles {
            assert!(tile.coord.x < 2);
            assert!(tile.coord.y < 2);
            assert_eq!(tile.coord.zoom, 1);
        }
        // Horizontal wrapping repeats the two columns across the viewport
        assert!(tiles.iter().filter(|t| t.coord == TileCoord::new(0, 0, 1)).count() > 1);
    }

    #[test]
    fn test_center_tile_offset() {
        let tiles = visible_tiles(0.0, 0.0, 2, TILE_SIZE, 256.0, 256.0);
        let center = tiles
            .iter()
            .find(|t| t.coord == TileCoord::new(2, 2, 2) && t.offset_x >= 0.0)
            .unwrap();
        assert!(center.offset_x.abs() < 1e-3);
        assert!(center.offset_y.abs() < 1e-3);
    }
}
