//! Image map: an image plus its ordered hotspots.

use serde::Serialize;

use crate::model::Hotspot;

/// Identifier of a stored map.
pub type MapId = String;

/// An image with its hotspots, exchanged with the persistence layer as a value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMap {
    /// `None` until the map has been saved for the first time.
    pub id: Option<MapId>,
    pub title: String,
    pub image_url: String,
    pub hotspots: Vec<Hotspot>,
}

impl ImageMap {
    pub fn new(title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            image_url: image_url.into(),
            hotspots: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<MapId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_hotspots(mut self, hotspots: Vec<Hotspot>) -> Self {
        self.hotspots = hotspots;
        self
    }

    /// Hotspots shown to visitors, in collection order.
    pub fn active_hotspots(&self) -> impl Iterator<Item = &Hotspot> {
        self.hotspots.iter().filter(|h| h.active)
    }
}

/// URL of the original upload for an image URL that points at a downscaled copy.
///
/// Media libraries commonly store large uploads as `name-scaled.ext`; the viewer
/// wants the unscaled original so zooming in stays sharp.
pub fn original_image_url(url: &str) -> String {
    url.replace("-scaled.", ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_hotspots_filter() {
        let map = ImageMap::new("Campus", "https://example.com/campus.png").with_hotspots(vec![
            Hotspot::new("a", 1.0, 1.0),
            Hotspot::new("b", 2.0, 2.0).with_active(false),
            Hotspot::new("c", 3.0, 3.0),
        ]);

        let ids: Vec<_> = map.active_hotspots().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_original_image_url() {
        assert_eq!(
            original_image_url("https://example.com/uploads/map-scaled.jpg"),
            "https://example.com/uploads/map.jpg"
        );
        assert_eq!(
            original_image_url("https://example.com/uploads/map.jpg"),
            "https://example.com/uploads/map.jpg"
        );
    }
}
