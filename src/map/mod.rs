//! Map rendering and tile management.
//!
//! This module provides tile fetching and caching, Web Mercator projection
//! utilities and the interactive marker map.

pub mod tiles;
pub mod view;

pub use tiles::TileManager;
pub use view::MapView;
