//! Data models for hotspot maps.

mod hotspot;
mod image_map;

pub use hotspot::{Hotspot, HotspotId, HotspotPatch, sanitize_color};
pub use image_map::{ImageMap, MapId, original_image_url};
