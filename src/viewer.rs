//! Read-only public viewer.
//!
//! Shares the geometry engine and viewport controller with the editor but uses
//! the viewer preset (zoom 100% to 1000%, reset to natural size) and only ever
//! shows active hotspots. Clicking a hotspot navigates to its link.

use crate::config::AppConfig;
use crate::geometry::{GeometryError, Point, Rect, Size};
use crate::model::{ImageMap, original_image_url};
use crate::store::{HotspotStore, Marker};
use crate::viewport::{PointerButton, PointerTarget, ViewportController};

/// What the host should do after an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerAction {
    /// Open the hotspot's link.
    Navigate(String),
}

/// Public display of one image map.
#[derive(Debug, Clone)]
pub struct Viewer {
    viewport: ViewportController,
    store: HotspotStore,
    title: String,
    image_url: String,
    hit_radius: f64,
    /// Hotspot under the current press and where the press started
    pressed: Option<(String, Point)>,
}

impl Viewer {
    /// Build a viewer for `map`. Inactive hotspots are dropped up front.
    pub fn new(map: ImageMap, config: &AppConfig) -> Self {
        let store = HotspotStore::from_hotspots(map.hotspots.into_iter().filter(|h| h.active));
        Self {
            viewport: ViewportController::new(config.viewer.clone()),
            store,
            title: map.title,
            image_url: original_image_url(&map.image_url),
            hit_radius: config.hotspots.hit_radius,
            pressed: None,
        }
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Full-resolution image URL to load.
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn zoom_label(&self) -> String {
        self.viewport.zoom_label()
    }

    pub fn hotspot_count(&self) -> usize {
        self.store.len()
    }

    pub fn set_container(&mut self, container: Rect) {
        self.viewport.set_container(container);
    }

    pub fn image_loaded(&mut self, natural: Size) -> Result<(), GeometryError> {
        self.viewport.image_loaded(natural)
    }

    /// Markers for the active hotspots in screen space.
    pub fn markers(&self) -> Result<Vec<Marker>, GeometryError> {
        let natural = self.viewport.require_image()?;
        self.store
            .markers(self.viewport.state(), natural, self.viewport.container(), true)
    }

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton) -> Result<(), GeometryError> {
        let natural = self.viewport.require_image()?;
        self.pressed = None;

        let target = if button == PointerButton::Primary {
            self.pressed = self
                .store
                .hit_test(
                    screen,
                    self.viewport.state(),
                    natural,
                    self.viewport.container(),
                    self.hit_radius,
                    true,
                )?
                .map(|h| (h.id.clone(), screen));
            if self.pressed.is_some() {
                PointerTarget::Hotspot
            } else {
                PointerTarget::Canvas
            }
        } else {
            PointerTarget::Canvas
        };

        self.viewport.pointer_down(screen, button, target)?;
        Ok(())
    }

    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let threshold = self.viewport.config().drag_threshold;
        let slid_off = matches!(
            &self.pressed,
            Some((_, start)) if start.distance_to(&screen) > threshold
        );
        if slid_off {
            // Pressing a marker and sliding off is not a click
            self.pressed = None;
        }
        self.viewport.pointer_move(screen)
    }

    /// Button released. A click on a linked hotspot yields [`ViewerAction::Navigate`].
    pub fn pointer_up(&mut self, screen: Point) -> Result<Option<ViewerAction>, GeometryError> {
        self.viewport.pointer_up();
        let Some((pressed, _)) = self.pressed.take() else {
            return Ok(None);
        };

        // Released over the same marker it was pressed on
        let natural = self.viewport.require_image()?;
        let released = self.store.hit_test(
            screen,
            self.viewport.state(),
            natural,
            self.viewport.container(),
            self.hit_radius,
            true,
        )?;

        Ok(released
            .filter(|h| h.id == pressed && h.has_link())
            .map(|h| {
                log::info!("Navigating to {}", h.link_url);
                ViewerAction::Navigate(h.link_url.trim().to_string())
            }))
    }

    pub fn pointer_cancel(&mut self) {
        self.pressed = None;
        self.viewport.pointer_cancel();
    }

    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> Result<bool, GeometryError> {
        self.viewport.wheel(screen, delta_y)
    }

    pub fn double_click(&mut self, screen: Point) -> Result<bool, GeometryError> {
        self.viewport.double_click(screen)
    }

    pub fn zoom_in(&mut self) -> Result<bool, GeometryError> {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> Result<bool, GeometryError> {
        self.viewport.zoom_out()
    }

    pub fn reset_view(&mut self) -> Result<(), GeometryError> {
        self.end_gestures();
        self.viewport.reset()
    }

    pub fn touch_start(&mut self, touches: &[Point]) -> Result<(), GeometryError> {
        match touches {
            [only] => self.pointer_down(*only, PointerButton::Primary),
            _ => {
                self.pressed = None;
                self.viewport.touch_start(touches, PointerTarget::Canvas)?;
                Ok(())
            }
        }
    }

    pub fn touch_move(&mut self, touches: &[Point]) -> Result<bool, GeometryError> {
        match touches {
            [only] if !self.viewport.is_pinching() => Ok(self.pointer_move(*only)),
            _ => self.viewport.touch_move(touches),
        }
    }

    pub fn touch_end(&mut self, screen: Point) -> Result<Option<ViewerAction>, GeometryError> {
        if self.viewport.is_pinching() {
            self.end_gestures();
            return Ok(None);
        }
        self.pointer_up(screen)
    }

    /// Drop every in-flight gesture (teardown, focus loss).
    pub fn end_gestures(&mut self) {
        self.pressed = None;
        self.viewport.end_gestures();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Hotspot;

    fn viewer() -> Viewer {
        let map = ImageMap::new("Campus", "https://example.com/uploads/campus-scaled.jpg")
            .with_hotspots(vec![
                Hotspot::new("a", 50.0, 50.0).with_link_url("https://example.com/a"),
                Hotspot::new("b", 10.0, 10.0)
                    .with_link_url("https://example.com/b")
                    .with_active(false),
                Hotspot::new("c", 90.0, 90.0),
            ]);
        let mut viewer = Viewer::new(map, &AppConfig::default());
        viewer.set_container(Rect::new(0.0, 0.0, 400.0, 200.0));
        viewer.image_loaded(Size::new(400.0, 200.0)).unwrap();
        viewer
    }

    fn click(viewer: &mut Viewer, screen: Point) -> Option<ViewerAction> {
        viewer.pointer_down(screen, PointerButton::Primary).unwrap();
        viewer.pointer_up(screen).unwrap()
    }

    #[test]
    fn test_only_active_hotspots_render() {
        let viewer = viewer();
        let ids: Vec<String> = viewer.markers().unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(viewer.hotspot_count(), 2);
    }

    #[test]
    fn test_uses_original_image() {
        assert_eq!(
            viewer().image_url(),
            "https://example.com/uploads/campus.jpg"
        );
    }

    #[test]
    fn test_click_navigates() {
        let mut viewer = viewer();
        assert_eq!(
            click(&mut viewer, Point::new(202.0, 101.0)),
            Some(ViewerAction::Navigate("https://example.com/a".to_string()))
        );
    }

    #[test]
    fn test_click_without_link_or_on_inactive_does_nothing() {
        let mut viewer = viewer();
        // "c" has no link
        assert_eq!(click(&mut viewer, Point::new(360.0, 180.0)), None);
        // "b" is inactive
        assert_eq!(click(&mut viewer, Point::new(40.0, 20.0)), None);
    }

    #[test]
    fn test_drag_from_hotspot_does_not_navigate() {
        let mut viewer = viewer();
        viewer
            .pointer_down(Point::new(200.0, 100.0), PointerButton::Primary)
            .unwrap();
        viewer.pointer_move(Point::new(260.0, 100.0));
        assert_eq!(viewer.pointer_up(Point::new(200.0, 100.0)).unwrap(), None);
    }

    #[test]
    fn test_zoom_bounds_and_reset() {
        let mut viewer = viewer();
        assert_eq!(viewer.zoom_label(), "100%");

        // Already at the minimum: no change
        assert!(!viewer.zoom_out().unwrap());

        for _ in 0..30 {
            viewer.zoom_in().unwrap();
        }
        assert_eq!(viewer.zoom_label(), "1000%");
        assert!(!viewer.zoom_in().unwrap());

        viewer.reset_view().unwrap();
        assert_eq!(viewer.viewport().state(), &crate::geometry::ViewportState::identity());
    }

    #[test]
    fn test_pan_by_drag() {
        let mut viewer = viewer();
        viewer.zoom_in().unwrap();
        let before = *viewer.viewport().state();

        viewer
            .pointer_down(Point::new(20.0, 20.0), PointerButton::Primary)
            .unwrap();
        viewer.pointer_move(Point::new(50.0, 10.0));
        assert_eq!(viewer.pointer_up(Point::new(50.0, 10.0)).unwrap(), None);

        let after = viewer.viewport().state();
        assert_eq!(after.offset_x, before.offset_x + 30.0);
        assert_eq!(after.offset_y, before.offset_y - 10.0);
    }
}
