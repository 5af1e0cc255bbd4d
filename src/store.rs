//! In-memory hotspot collection for a single image map.

use crate::constants::DEFAULT_HOTSPOT_COLOR;
use crate::geometry::{self, GeometryError, Point, Rect, Size, ViewportState};
use crate::model::{Hotspot, HotspotId, HotspotPatch, sanitize_color};

/// A hotspot projected into screen space for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: HotspotId,
    /// Marker centre in screen pixels.
    pub position: Point,
    pub color: String,
    pub title: String,
    pub label: String,
    pub active: bool,
}

/// Ordered storage for the hotspots on one image.
///
/// Collection order is insertion order. `order` values are assigned on add and
/// never compacted, so they may contain gaps after removals.
#[derive(Debug, Clone)]
pub struct HotspotStore {
    hotspots: Vec<Hotspot>,
    /// Counter for generating unique hotspot IDs.
    next_id: u64,
    default_color: String,
    /// Set on every mutation; cleared when the host has persisted or re-rendered.
    dirty: bool,
}

impl Default for HotspotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HotspotStore {
    pub fn new() -> Self {
        Self::with_default_color(DEFAULT_HOTSPOT_COLOR)
    }

    /// Store whose new hotspots get `color` instead of the built-in default.
    pub fn with_default_color(color: &str) -> Self {
        Self {
            hotspots: Vec::new(),
            next_id: 1,
            default_color: sanitize_color(color, DEFAULT_HOTSPOT_COLOR),
            dirty: false,
        }
    }

    /// Build a store from existing hotspots (e.g. a loaded map).
    ///
    /// Empty or duplicate ids are replaced with fresh ones.
    pub fn from_hotspots(hotspots: impl IntoIterator<Item = Hotspot>) -> Self {
        let mut store = Self::new();
        for hotspot in hotspots {
            store.insert(hotspot);
        }
        store.dirty = false;
        store
    }

    pub fn default_color(&self) -> &str {
        &self.default_color
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    fn contains_id(&self, id: &str) -> bool {
        self.hotspots.iter().any(|h| h.id == id)
    }

    fn fresh_id(&mut self) -> HotspotId {
        loop {
            let id = format!("hotspot_{}", self.next_id);
            self.next_id += 1;
            if !self.contains_id(&id) {
                return id;
            }
        }
    }

    fn next_order(&self) -> u32 {
        u32::try_from(self.hotspots.len()).unwrap_or(u32::MAX)
    }

    /// Create an active hotspot at the given percentages and return it.
    ///
    /// Coordinates are clamped into `[0, 100]`; `order` is the collection length.
    pub fn add(&mut self, x: f64, y: f64) -> &Hotspot {
        let id = self.fresh_id();
        let hotspot = Hotspot::new(id, x, y)
            .with_color(&self.default_color)
            .with_order(self.next_order());
        log::debug!(
            "Added hotspot {} at ({:.2}%, {:.2}%)",
            hotspot.id,
            hotspot.x,
            hotspot.y
        );
        self.push(hotspot)
    }

    /// Append an existing hotspot, keeping its fields.
    ///
    /// Coordinates are re-clamped, an invalid color becomes the default color,
    /// and an empty or already used id is replaced with a fresh one.
    pub fn insert(&mut self, mut hotspot: Hotspot) -> &Hotspot {
        if hotspot.id.trim().is_empty() || self.contains_id(&hotspot.id) {
            hotspot.id = self.fresh_id();
        }
        hotspot.set_position(hotspot.x, hotspot.y);
        hotspot.color = sanitize_color(&hotspot.color, &self.default_color);
        self.push(hotspot)
    }

    fn push(&mut self, hotspot: Hotspot) -> &Hotspot {
        self.dirty = true;
        self.hotspots.push(hotspot);
        let last = self.hotspots.len() - 1;
        &self.hotspots[last]
    }

    /// Apply a partial update. Unknown ids are ignored; returns whether one matched.
    pub fn update(&mut self, id: &str, patch: &HotspotPatch) -> bool {
        let Some(hotspot) = self.hotspots.iter_mut().find(|h| h.id == id) else {
            log::debug!("Ignoring update for unknown hotspot {}", id);
            return false;
        };
        patch.apply(hotspot);
        self.dirty = true;
        true
    }

    /// Remove a hotspot. Remaining `order` values are left as they are.
    pub fn remove(&mut self, id: &str) -> Option<Hotspot> {
        let index = self.hotspots.iter().position(|h| h.id == id)?;
        self.dirty = true;
        log::debug!("Removed hotspot {}", id);
        Some(self.hotspots.remove(index))
    }

    /// Reposition a hotspot, clamping into `[0, 100]`. Returns whether the id matched.
    pub fn move_hotspot(&mut self, id: &str, x: f64, y: f64) -> bool {
        let Some(hotspot) = self.hotspots.iter_mut().find(|h| h.id == id) else {
            return false;
        };
        hotspot.set_position(x, y);
        self.dirty = true;
        true
    }

    pub fn get(&self, id: &str) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }

    /// All hotspots in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &Hotspot> {
        self.hotspots.iter()
    }

    pub fn as_slice(&self) -> &[Hotspot] {
        &self.hotspots
    }

    /// Hotspots that are shown publicly and exported.
    pub fn active(&self) -> impl Iterator<Item = &Hotspot> {
        self.hotspots.iter().filter(|h| h.active)
    }

    /// Hotspots stably sorted by `order`; ties keep collection order.
    pub fn sorted_by_order(&self) -> Vec<&Hotspot> {
        let mut sorted: Vec<&Hotspot> = self.hotspots.iter().collect();
        sorted.sort_by_key(|h| h.order);
        sorted
    }

    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    pub fn clear(&mut self) {
        if !self.hotspots.is_empty() {
            self.dirty = true;
        }
        self.hotspots.clear();
    }

    /// Replace the whole collection (e.g. a non-merging import).
    pub fn replace_all(&mut self, hotspots: impl IntoIterator<Item = Hotspot>) {
        self.hotspots.clear();
        for hotspot in hotspots {
            self.insert(hotspot);
        }
        self.dirty = true;
    }

    /// Append imported hotspots, renumbering `order` after the existing ones.
    pub fn extend(&mut self, hotspots: impl IntoIterator<Item = Hotspot>) {
        for hotspot in hotspots {
            let order = self.next_order();
            self.insert(hotspot.with_order(order));
        }
    }

    /// Project hotspots to screen space in collection (draw) order.
    pub fn markers(
        &self,
        viewport: &ViewportState,
        natural: Size,
        container: &Rect,
        active_only: bool,
    ) -> Result<Vec<Marker>, GeometryError> {
        self.hotspots
            .iter()
            .filter(|h| h.active || !active_only)
            .map(|h| {
                let position =
                    geometry::image_percent_to_screen(h.position(), viewport, natural, container)?;
                Ok(Marker {
                    id: h.id.clone(),
                    position,
                    color: h.color.clone(),
                    title: h.title.clone(),
                    label: h.label.clone(),
                    active: h.active,
                })
            })
            .collect()
    }

    /// Find the hotspot whose marker is under a screen point.
    ///
    /// Markers are circles of `radius` screen pixels. Later hotspots are drawn on
    /// top, so the last match wins. With `active_only`, inactive hotspots are
    /// never hit.
    pub fn hit_test(
        &self,
        screen: Point,
        viewport: &ViewportState,
        natural: Size,
        container: &Rect,
        radius: f64,
        active_only: bool,
    ) -> Result<Option<&Hotspot>, GeometryError> {
        for hotspot in self.hotspots.iter().rev() {
            if active_only && !hotspot.active {
                continue;
            }
            let marker =
                geometry::image_percent_to_screen(hotspot.position(), viewport, natural, container)?;
            if marker.distance_to(&screen) <= radius {
                return Ok(Some(hotspot));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_defaults() {
        let mut store = HotspotStore::new();
        let first = store.add(10.0, 20.0).clone();
        let second = store.add(30.0, 40.0).clone();

        assert_eq!(first.id, "hotspot_1");
        assert_eq!(second.id, "hotspot_2");
        assert_eq!(first.order, 0);
        assert_eq!(second.order, 1);
        assert_eq!(first.color, DEFAULT_HOTSPOT_COLOR);
        assert!(first.active && second.active);
        assert!(store.is_dirty());
    }

    #[test]
    fn test_add_clamps() {
        let mut store = HotspotStore::new();
        let h = store.add(-1.0, 250.0);
        assert_eq!((h.x, h.y), (0.0, 100.0));
    }

    #[test]
    fn test_update_unknown_is_noop() {
        let mut store = HotspotStore::new();
        store.add(1.0, 1.0);
        store.clear_dirty();

        assert!(!store.update("missing", &HotspotPatch::new().title("x")));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_update_applies_patch() {
        let mut store = HotspotStore::new();
        let id = store.add(1.0, 1.0).id.clone();

        assert!(store.update(&id, &HotspotPatch::new().title("Dock").active(false)));
        let h = store.get(&id).unwrap();
        assert_eq!(h.title, "Dock");
        assert!(!h.active);
        assert_eq!(store.active().count(), 0);
    }

    #[test]
    fn test_remove_keeps_order_gaps() {
        let mut store = HotspotStore::new();
        store.add(1.0, 1.0);
        let middle = store.add(2.0, 2.0).id.clone();
        store.add(3.0, 3.0);

        assert!(store.remove(&middle).is_some());
        assert!(store.remove(&middle).is_none());

        let orders: Vec<u32> = store.iter().map(|h| h.order).collect();
        assert_eq!(orders, vec![0, 2]);

        // New hotspot takes the collection length, which may repeat an order value
        assert_eq!(store.add(4.0, 4.0).order, 2);
    }

    #[test]
    fn test_move_clamps() {
        let mut store = HotspotStore::new();
        let id = store.add(50.0, 50.0).id.clone();

        assert!(store.move_hotspot(&id, -5.0, 150.0));
        let h = store.get(&id).unwrap();
        assert_eq!((h.x, h.y), (0.0, 100.0));
        assert!(!store.move_hotspot("missing", 1.0, 1.0));
    }

    #[test]
    fn test_insert_replaces_duplicate_ids() {
        let mut store = HotspotStore::new();
        store.add(1.0, 1.0);
        let dup = Hotspot::new("hotspot_1", 5.0, 5.0);
        let empty = Hotspot::new("", 6.0, 6.0);

        let dup_id = store.insert(dup).id.clone();
        let empty_id = store.insert(empty).id.clone();

        assert_ne!(dup_id, "hotspot_1");
        assert!(!empty_id.is_empty());
        assert_ne!(dup_id, empty_id);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_from_hotspots_skips_taken_ids() {
        let store = HotspotStore::from_hotspots(vec![
            Hotspot::new("hotspot_1", 1.0, 1.0),
            Hotspot::new("hotspot_2", 2.0, 2.0),
        ]);
        let mut store = store;
        assert!(!store.is_dirty());
        assert_eq!(store.add(3.0, 3.0).id, "hotspot_3");
    }

    #[test]
    fn test_sorted_by_order_is_stable() {
        let store = HotspotStore::from_hotspots(vec![
            Hotspot::new("a", 1.0, 1.0).with_order(2),
            Hotspot::new("b", 1.0, 1.0).with_order(1),
            Hotspot::new("c", 1.0, 1.0).with_order(2),
            Hotspot::new("d", 1.0, 1.0).with_order(0),
        ]);
        let ids: Vec<&str> = store.sorted_by_order().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_extend_renumbers_order() {
        let mut store = HotspotStore::new();
        store.add(1.0, 1.0);
        store.extend(vec![
            Hotspot::new("", 2.0, 2.0).with_order(0),
            Hotspot::new("", 3.0, 3.0).with_order(1),
        ]);
        let orders: Vec<u32> = store.iter().map(|h| h.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let natural = Size::new(1000.0, 500.0);
        let container = Rect::new(10.0, 10.0, 1000.0, 500.0);
        let viewport = ViewportState::identity();

        let mut store = HotspotStore::new();
        let below = store.add(50.0, 50.0).id.clone();
        let above = store.add(50.5, 50.0).id.clone();

        // (50%, 50%) of 1000x500 is (500, 250) local, (510, 260) on screen
        let hit = store
            .hit_test(Point::new(510.0, 260.0), &viewport, natural, &container, 12.0, false)
            .unwrap()
            .map(|h| h.id.clone());
        assert_eq!(hit, Some(above.clone()));

        store.update(&above, &HotspotPatch::new().active(false));
        let hit = store
            .hit_test(Point::new(510.0, 260.0), &viewport, natural, &container, 12.0, true)
            .unwrap()
            .map(|h| h.id.clone());
        assert_eq!(hit, Some(below));

        let miss = store
            .hit_test(Point::new(100.0, 100.0), &viewport, natural, &container, 12.0, false)
            .unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_markers_follow_viewport() {
        let natural = Size::new(200.0, 100.0);
        let container = Rect::new(0.0, 0.0, 400.0, 200.0);
        let viewport = ViewportState::new(2.0, 10.0, -20.0);

        let mut store = HotspotStore::new();
        store.add(50.0, 50.0);
        let hidden = store.add(10.0, 10.0).id.clone();
        store.update(&hidden, &HotspotPatch::new().active(false));

        let all = store.markers(&viewport, natural, &container, false).unwrap();
        assert_eq!(all.len(), 2);
        // (100, 50) image px * 2 + (10, -20)
        assert_eq!(all[0].position, Point::new(210.0, 80.0));

        let visible = store.markers(&viewport, natural, &container, true).unwrap();
        assert_eq!(visible.len(), 1);
        assert!(visible[0].active);
    }

    #[test]
    fn test_hit_test_requires_image() {
        let mut store = HotspotStore::new();
        store.add(1.0, 1.0);
        let result = store.hit_test(
            Point::new(0.0, 0.0),
            &ViewportState::identity(),
            Size::default(),
            &Rect::default(),
            12.0,
            false,
        );
        assert_eq!(result, Err(GeometryError::ImageNotReady));
    }
}
