//! Hotspot data model.
//!
//! A hotspot is a labelled, optionally linked marker positioned in percentage
//! coordinates of the image's natural size, so its position doesn't depend on
//! the current pan/zoom state.

use serde::Serialize;

use crate::color_utils::normalize_hex;
use crate::constants::DEFAULT_HOTSPOT_COLOR;
use crate::geometry::{ImagePercent, clamp_percent};

/// Unique identifier for a hotspot within one map.
pub type HotspotId = String;

/// A single hotspot on an image map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    /// Opaque identifier, unique within the map.
    pub id: HotspotId,
    /// Horizontal position in percent of natural width, `[0, 100]`.
    pub x: f64,
    /// Vertical position in percent of natural height, `[0, 100]`.
    pub y: f64,
    pub title: String,
    pub label: String,
    /// Target navigated to when the hotspot is clicked in the viewer.
    pub link_url: String,
    /// Marker color as `#rrggbb`.
    pub color: String,
    /// Inactive hotspots are hidden in the viewer and left out of CSV exports.
    pub active: bool,
    /// Display/list sequence; gaps are allowed.
    pub order: u32,
}

impl Hotspot {
    /// Create an active hotspot with default color and empty text fields.
    ///
    /// Coordinates are clamped into `[0, 100]`.
    pub fn new(id: impl Into<HotspotId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x: clamp_percent(x),
            y: clamp_percent(y),
            title: String::new(),
            label: String::new(),
            link_url: String::new(),
            color: DEFAULT_HOTSPOT_COLOR.to_string(),
            active: true,
            order: 0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_link_url(mut self, url: impl Into<String>) -> Self {
        self.link_url = url.into();
        self
    }

    /// Set the color; anything that isn't a hex color keeps the current one.
    pub fn with_color(mut self, color: &str) -> Self {
        self.color = sanitize_color(color, &self.color);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    pub fn position(&self) -> ImagePercent {
        ImagePercent::new(self.x, self.y)
    }

    /// Move the hotspot, clamping into the image.
    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = clamp_percent(x);
        self.y = clamp_percent(y);
    }

    pub fn has_link(&self) -> bool {
        !self.link_url.trim().is_empty()
    }

    /// Title for list display; untitled hotspots are numbered from 1.
    pub fn display_title(&self, index: usize) -> String {
        if self.title.trim().is_empty() {
            format!("Hotspot {}", index + 1)
        } else {
            self.title.clone()
        }
    }
}

/// Normalise a color, falling back when it isn't a hex color.
pub fn sanitize_color(color: &str, fallback: &str) -> String {
    if color.trim().is_empty() {
        return fallback.to_string();
    }
    match normalize_hex(color) {
        Some(hex) => hex,
        None => {
            log::warn!("Invalid hotspot color '{}', using {}", color, fallback);
            fallback.to_string()
        }
    }
}

/// Partial update applied through the edit dialog.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotspotPatch {
    pub title: Option<String>,
    pub label: Option<String>,
    pub link_url: Option<String>,
    pub color: Option<String>,
    pub active: Option<bool>,
}

impl HotspotPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn link_url(mut self, url: impl Into<String>) -> Self {
        self.link_url = Some(url.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the set fields to a hotspot.
    pub fn apply(&self, hotspot: &mut Hotspot) {
        if let Some(title) = &self.title {
            hotspot.title = title.clone();
        }
        if let Some(label) = &self.label {
            hotspot.label = label.clone();
        }
        if let Some(url) = &self.link_url {
            hotspot.link_url = url.clone();
        }
        if let Some(color) = &self.color {
            hotspot.color = sanitize_color(color, &hotspot.color);
        }
        if let Some(active) = self.active {
            hotspot.active = active;
        }
    }
}
