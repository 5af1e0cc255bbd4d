//! Hotspot Map - interactive image maps
//!
//! Pan and zoom an image inside a fixed container, pin hotspots to it as
//! percentages of the image's natural size, and move hotspot lists in and
//! out of CSV and JSON. The crate has no UI of its own; a host feeds it
//! pointer/touch events and draws the [`store::Marker`]s it returns.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod editor;
pub mod format;
pub mod geometry;
pub mod model;
pub mod persistence;
pub mod store;
pub mod viewer;
pub mod viewport;

pub use config::AppConfig;
pub use editor::{Editor, EditorEvent};
pub use format::{CsvFormat, FormatError, FormatRegistry, HotspotFormat, JsonFormat};
pub use geometry::{GeometryError, ImagePercent, Point, Rect, Size, ViewportState};
pub use model::{Hotspot, HotspotId, HotspotPatch, ImageMap};
pub use persistence::{InMemoryMapRepository, MapRepository, PersistenceError};
pub use store::{HotspotStore, Marker};
pub use viewer::{Viewer, ViewerAction};
pub use viewport::{ViewportConfig, ViewportController};
