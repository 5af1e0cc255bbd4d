//! Pan/zoom controller shared by the editor and the public viewer.
//!
//! Owns the mutable [`ViewportState`] and turns pointer, wheel and touch input
//! into calls to the transform functions in [`crate::geometry`].

use serde::{Deserialize, Serialize};

use crate::constants::{
    BUTTON_ZOOM_IN, BUTTON_ZOOM_OUT, EDITOR_MAX_SCALE, EDITOR_MIN_SCALE, MIN_DRAG_DISTANCE,
    VIEWER_MAX_SCALE, VIEWER_MIN_SCALE, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT,
};
use crate::geometry::{self, GeometryError, Point, Rect, ScaleBounds, Size, ViewportState};

/// What "reset view" does for a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetMode {
    /// Scale the whole image into the container and centre it.
    #[default]
    FitToContainer,
    /// Natural size anchored at the container's top-left corner.
    Identity,
}

/// Zoom bounds and input tuning for one consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,

    #[serde(default = "default_wheel_zoom_in")]
    pub wheel_zoom_in: f64,
    #[serde(default = "default_wheel_zoom_out")]
    pub wheel_zoom_out: f64,

    #[serde(default = "default_button_zoom_in")]
    pub button_zoom_in: f64,
    #[serde(default = "default_button_zoom_out")]
    pub button_zoom_out: f64,

    /// Screen pixels a press must travel before it stops counting as a click.
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold: f64,

    #[serde(default)]
    pub reset_mode: ResetMode,
}

fn default_wheel_zoom_in() -> f64 {
    WHEEL_ZOOM_IN
}

fn default_wheel_zoom_out() -> f64 {
    WHEEL_ZOOM_OUT
}

fn default_button_zoom_in() -> f64 {
    BUTTON_ZOOM_IN
}

fn default_button_zoom_out() -> f64 {
    BUTTON_ZOOM_OUT
}

fn default_drag_threshold() -> f64 {
    MIN_DRAG_DISTANCE
}

impl ViewportConfig {
    /// Editor preset: [0.5, 3] and reset fits the image into the container.
    pub fn editor() -> Self {
        Self {
            min_scale: EDITOR_MIN_SCALE,
            max_scale: EDITOR_MAX_SCALE,
            wheel_zoom_in: WHEEL_ZOOM_IN,
            wheel_zoom_out: WHEEL_ZOOM_OUT,
            button_zoom_in: BUTTON_ZOOM_IN,
            button_zoom_out: BUTTON_ZOOM_OUT,
            drag_threshold: MIN_DRAG_DISTANCE,
            reset_mode: ResetMode::FitToContainer,
        }
    }

    /// Public viewer preset: [1, 10] and reset returns to natural size at the origin.
    pub fn viewer() -> Self {
        Self {
            min_scale: VIEWER_MIN_SCALE,
            max_scale: VIEWER_MAX_SCALE,
            reset_mode: ResetMode::Identity,
            ..Self::editor()
        }
    }

    pub fn bounds(&self) -> ScaleBounds {
        ScaleBounds::new(self.min_scale, self.max_scale)
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self::editor()
    }
}

/// Mouse buttons relevant to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Image or empty container space.
    Canvas,
    /// A hotspot marker; hotspots handle their own drags.
    Hotspot,
}

/// Pan gesture in progress, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PanDragState {
    #[default]
    Idle,
    /// Dragging, with the press position and the last pointer position (screen space)
    Dragging {
        start_pos: Point,
        last_pos: Point,
        /// Pointer has travelled past the drag threshold since the press
        moved: bool,
    },
}

impl PanDragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, PanDragState::Dragging { .. })
    }

    pub fn last_pos(&self) -> Option<Point> {
        match self {
            PanDragState::Dragging { last_pos, .. } => Some(*last_pos),
            PanDragState::Idle => None,
        }
    }

    /// Begin a pan at `pos`.
    pub fn start_drag(&mut self, pos: Point) {
        *self = PanDragState::Dragging {
            start_pos: pos,
            last_pos: pos,
            moved: false,
        };
    }

    /// Record a move; marks the drag as moved once it leaves the threshold radius.
    pub fn update_pos(&mut self, pos: Point, threshold: f64) {
        if let PanDragState::Dragging {
            start_pos,
            last_pos,
            moved,
        } = self
        {
            *last_pos = pos;
            if start_pos.distance_to(&pos) > threshold {
                *moved = true;
            }
        }
    }

    pub fn stop_drag(&mut self) -> Option<DragEnd> {
        match std::mem::take(self) {
            PanDragState::Dragging {
                start_pos, moved, ..
            } => Some(DragEnd { start_pos, moved }),
            PanDragState::Idle => None,
        }
    }
}

/// Summary of a finished pan drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEnd {
    /// Where the press started (screen space).
    pub start_pos: Point,
    /// The pointer travelled past the drag threshold; a click should be suppressed.
    pub moved: bool,
}

/// Owns one viewport's pan/zoom state.
///
/// Every operation that needs the image's natural size fails with
/// [`GeometryError::ImageNotReady`] until [`ViewportController::image_loaded`]
/// has been called.
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    state: ViewportState,
    drag: PanDragState,
    /// Inter-touch distance seen on the previous pinch event
    pinch_distance: Option<f64>,
    container: Rect,
    natural: Option<Size>,
}

impl ViewportController {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            config,
            state: ViewportState::identity(),
            drag: PanDragState::Idle,
            pinch_distance: None,
            container: Rect::default(),
            natural: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn container(&self) -> &Rect {
        &self.container
    }

    pub fn natural_size(&self) -> Option<Size> {
        self.natural
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch_distance.is_some()
    }

    /// Zoom level for display, e.g. `"120%"`.
    pub fn zoom_label(&self) -> String {
        self.state.zoom_label()
    }

    /// Update the container rectangle (screen space), e.g. after layout.
    pub fn set_container(&mut self, container: Rect) {
        self.container = container;
    }

    /// Record the natural image size once the image has loaded, then reset the view.
    pub fn image_loaded(&mut self, natural: Size) -> Result<(), GeometryError> {
        if !natural.is_ready() {
            self.natural = None;
            return Err(GeometryError::ImageNotReady);
        }
        self.natural = Some(natural);
        log::debug!("Image loaded: {}x{}", natural.width, natural.height);
        self.reset()
    }

    /// Forget the current image; geometry calls fail until the next load.
    pub fn clear_image(&mut self) {
        self.natural = None;
        self.end_gestures();
        self.state = ViewportState::identity();
    }

    /// Natural image size, or `ImageNotReady` before load.
    pub fn require_image(&self) -> Result<Size, GeometryError> {
        self.natural.ok_or(GeometryError::ImageNotReady)
    }

    /// Primary press on the canvas starts a pan drag. Returns whether a drag started.
    pub fn pointer_down(
        &mut self,
        screen: Point,
        button: PointerButton,
        target: PointerTarget,
    ) -> Result<bool, GeometryError> {
        self.require_image()?;
        if button != PointerButton::Primary || target == PointerTarget::Hotspot {
            return Ok(false);
        }
        self.drag.start_drag(screen);
        log::debug!("Pan drag started at ({:.1}, {:.1})", screen.x, screen.y);
        Ok(true)
    }

    /// Pan by the delta since the previous move. Returns whether the view changed.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let Some(last) = self.drag.last_pos() else {
            return false;
        };
        self.state = geometry::pan_by(&self.state, last.delta_to(&screen));
        self.drag.update_pos(screen, self.config.drag_threshold);
        true
    }

    /// Button released (on any target). Returns the drag summary if a drag was active.
    pub fn pointer_up(&mut self) -> Option<DragEnd> {
        let ended = self.drag.stop_drag();
        if let Some(end) = ended {
            log::debug!("Pan drag ended (moved: {})", end.moved);
        }
        ended
    }

    /// Pointer cancelled by the host; same exit as a release.
    pub fn pointer_cancel(&mut self) -> Option<DragEnd> {
        self.pointer_up()
    }

    /// Wheel zoom anchored at the pointer. Positive `delta_y` (scroll down) zooms out.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> Result<bool, GeometryError> {
        let factor = if delta_y > 0.0 {
            self.config.wheel_zoom_out
        } else if delta_y < 0.0 {
            self.config.wheel_zoom_in
        } else {
            return Ok(false);
        };
        self.zoom_at_screen(screen, factor)
    }

    /// Zoom by `factor` keeping a screen point fixed.
    pub fn zoom_at_screen(&mut self, screen: Point, factor: f64) -> Result<bool, GeometryError> {
        let local = self.container.to_local(screen);
        self.zoom_at_local(local, factor)
    }

    /// Zoom by `factor` keeping a container-local point fixed.
    ///
    /// Returns `false` without touching the state when the clamped scale doesn't change.
    pub fn zoom_at_local(&mut self, anchor: Point, factor: f64) -> Result<bool, GeometryError> {
        self.require_image()?;
        let next = geometry::zoom_at_point(&self.state, anchor, factor, &self.config.bounds());
        if next.scale == self.state.scale {
            return Ok(false);
        }
        self.state = next;
        log::debug!("Zoom {}", self.state.zoom_label());
        Ok(true)
    }

    /// "+" control: zoom in around the container centre.
    pub fn zoom_in(&mut self) -> Result<bool, GeometryError> {
        self.zoom_at_local(self.container.local_center(), self.config.button_zoom_in)
    }

    /// "-" control: zoom out around the container centre.
    pub fn zoom_out(&mut self) -> Result<bool, GeometryError> {
        self.zoom_at_local(self.container.local_center(), self.config.button_zoom_out)
    }

    /// Double click/tap zooms in at the pointer.
    pub fn double_click(&mut self, screen: Point) -> Result<bool, GeometryError> {
        self.zoom_at_screen(screen, self.config.button_zoom_in)
    }

    /// Reset the view according to the configured [`ResetMode`].
    pub fn reset(&mut self) -> Result<(), GeometryError> {
        let natural = self.require_image()?;
        self.state = match self.config.reset_mode {
            ResetMode::FitToContainer => {
                geometry::fit_to_container(natural, self.container.size())?
            }
            ResetMode::Identity => ViewportState::identity(),
        };
        log::debug!("View reset to {}", self.state.zoom_label());
        Ok(())
    }

    /// Touches went down. Two touches begin a pinch; one touch acts like a mouse press.
    pub fn touch_start(
        &mut self,
        touches: &[Point],
        target: PointerTarget,
    ) -> Result<bool, GeometryError> {
        match touches {
            [first, second, ..] => {
                self.require_image()?;
                self.drag.stop_drag();
                self.pinch_distance = Some(first.distance_to(second));
                Ok(true)
            }
            [only] => {
                self.pinch_distance = None;
                self.pointer_down(*only, PointerButton::Primary, target)
            }
            [] => Ok(false),
        }
    }

    /// Touches moved. Pinch zooms at the touch centroid by the distance ratio.
    pub fn touch_move(&mut self, touches: &[Point]) -> Result<bool, GeometryError> {
        match touches {
            [first, second, ..] => {
                let distance = first.distance_to(second);
                let previous = self.pinch_distance.replace(distance);
                match previous {
                    Some(last) if last > 0.0 && distance != last => {
                        let centroid = self.container.to_local(first.midpoint(second));
                        self.zoom_at_local(centroid, distance / last)
                    }
                    _ => Ok(false),
                }
            }
            [only] if self.pinch_distance.is_none() => Ok(self.pointer_move(*only)),
            _ => Ok(false),
        }
    }

    /// Touch ended or was cancelled; ends both pinch and drag.
    pub fn touch_end(&mut self) -> Option<DragEnd> {
        self.pinch_distance = None;
        self.pointer_up()
    }

    /// Drop any in-flight drag or pinch without side effects.
    pub fn end_gestures(&mut self) {
        self.pinch_distance = None;
        self.drag.stop_drag();
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{image_percent_to_screen, screen_to_image_percent};

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn loaded(config: ViewportConfig) -> ViewportController {
        let mut controller = ViewportController::new(config);
        controller.set_container(Rect::new(0.0, 0.0, 800.0, 600.0));
        controller.image_loaded(Size::new(1600.0, 900.0)).unwrap();
        controller
    }

    #[test]
    fn test_operations_before_image_load() {
        let mut controller = ViewportController::default();
        controller.set_container(Rect::new(0.0, 0.0, 800.0, 600.0));

        assert_eq!(controller.zoom_in(), Err(GeometryError::ImageNotReady));
        assert_eq!(controller.reset(), Err(GeometryError::ImageNotReady));
        assert_eq!(
            controller.wheel(Point::new(10.0, 10.0), -1.0),
            Err(GeometryError::ImageNotReady)
        );
        assert_eq!(
            controller.pointer_down(Point::default(), PointerButton::Primary, PointerTarget::Canvas),
            Err(GeometryError::ImageNotReady)
        );
        assert_eq!(
            controller.image_loaded(Size::new(0.0, 0.0)),
            Err(GeometryError::ImageNotReady)
        );
    }

    #[test]
    fn test_editor_reset_fits_container() {
        let controller = loaded(ViewportConfig::editor());
        let state = controller.state();

        assert!(approx_eq(state.scale, 0.5));
        assert!(approx_eq(state.offset_x, 0.0));
        assert!(approx_eq(state.offset_y, 75.0));
    }

    #[test]
    fn test_viewer_reset_is_identity() {
        let mut controller = loaded(ViewportConfig::viewer());
        assert_eq!(*controller.state(), ViewportState::identity());

        controller.zoom_in().unwrap();
        controller.reset().unwrap();
        assert_eq!(*controller.state(), ViewportState::identity());
        assert_eq!(controller.zoom_label(), "100%");
    }

    #[test]
    fn test_drag_pans_by_move_deltas() {
        let mut controller = loaded(ViewportConfig::viewer());

        assert!(controller
            .pointer_down(Point::new(100.0, 100.0), PointerButton::Primary, PointerTarget::Canvas)
            .unwrap());
        assert!(controller.is_dragging());

        controller.pointer_move(Point::new(110.0, 95.0));
        controller.pointer_move(Point::new(130.0, 90.0));

        assert!(approx_eq(controller.state().offset_x, 30.0));
        assert!(approx_eq(controller.state().offset_y, -10.0));

        let end = controller.pointer_up().unwrap();
        assert!(end.moved);
        assert!(!controller.is_dragging());

        // Moves after release do nothing
        assert!(!controller.pointer_move(Point::new(500.0, 500.0)));
        assert!(approx_eq(controller.state().offset_x, 30.0));
    }

    #[test]
    fn test_small_drag_counts_as_click() {
        let mut controller = loaded(ViewportConfig::editor());
        controller
            .pointer_down(Point::new(100.0, 100.0), PointerButton::Primary, PointerTarget::Canvas)
            .unwrap();
        controller.pointer_move(Point::new(101.0, 101.0));

        let end = controller.pointer_up().unwrap();
        assert!(!end.moved);
    }

    #[test]
    fn test_drag_ignored_for_hotspot_and_secondary_button() {
        let mut controller = loaded(ViewportConfig::editor());

        assert!(!controller
            .pointer_down(Point::new(5.0, 5.0), PointerButton::Primary, PointerTarget::Hotspot)
            .unwrap());
        assert!(!controller
            .pointer_down(Point::new(5.0, 5.0), PointerButton::Secondary, PointerTarget::Canvas)
            .unwrap());
        assert!(!controller.is_dragging());
        assert!(controller.pointer_up().is_none());
    }

    #[test]
    fn test_pointer_cancel_ends_drag() {
        let mut controller = loaded(ViewportConfig::editor());
        controller
            .pointer_down(Point::new(5.0, 5.0), PointerButton::Primary, PointerTarget::Canvas)
            .unwrap();
        assert!(controller.pointer_cancel().is_some());
        assert!(!controller.is_dragging());
    }

    #[test]
    fn test_wheel_direction_and_anchor() {
        let mut controller = loaded(ViewportConfig::viewer());
        controller.set_container(Rect::new(50.0, 20.0, 800.0, 600.0));
        let natural = controller.natural_size().unwrap();
        let anchor = Point::new(350.0, 220.0);

        let before = *controller.state();
        assert!(controller.wheel(anchor, -120.0).unwrap());
        assert!(approx_eq(controller.state().scale, 1.1));

        let percent = screen_to_image_percent(anchor, &before, natural, controller.container())
            .unwrap()
            .percent();
        let back =
            image_percent_to_screen(percent, controller.state(), natural, controller.container())
                .unwrap();
        assert!(approx_eq(back.x, anchor.x));
        assert!(approx_eq(back.y, anchor.y));

        // 1.1 * 0.9 falls under the viewer minimum and clamps to 1.0
        assert!(controller.wheel(anchor, 120.0).unwrap());
        assert!(approx_eq(controller.state().scale, 1.0));

        assert!(!controller.wheel(anchor, 0.0).unwrap());
    }

    #[test]
    fn test_viewer_zoom_out_at_min_is_noop() {
        let mut controller = loaded(ViewportConfig::viewer());
        let before = *controller.state();

        assert!(!controller.zoom_out().unwrap());
        assert_eq!(*controller.state(), before);
    }

    #[test]
    fn test_zoom_out_after_fitting_large_image() {
        let mut controller = ViewportController::new(ViewportConfig::editor());
        controller.set_container(Rect::new(0.0, 0.0, 800.0, 600.0));
        controller.image_loaded(Size::new(4000.0, 2000.0)).unwrap();
        assert!(approx_eq(controller.state().scale, 0.2));

        assert!(!controller.zoom_out().unwrap());
        assert!(!controller.wheel(Point::new(400.0, 300.0), 1.0).unwrap());
        assert!(approx_eq(controller.state().scale, 0.2));

        assert!(controller.zoom_in().unwrap());
        assert!(approx_eq(controller.state().scale, EDITOR_MIN_SCALE));
    }

    #[test]
    fn test_repeated_button_zoom_respects_bounds() {
        let mut controller = loaded(ViewportConfig::editor());
        for _ in 0..40 {
            controller.zoom_in().unwrap();
        }
        assert!(approx_eq(controller.state().scale, EDITOR_MAX_SCALE));

        for _ in 0..40 {
            controller.zoom_out().unwrap();
        }
        assert!(approx_eq(controller.state().scale, EDITOR_MIN_SCALE));
    }

    #[test]
    fn test_pinch_zooms_at_centroid() {
        let mut controller = loaded(ViewportConfig::viewer());
        let natural = controller.natural_size().unwrap();

        controller
            .touch_start(
                &[Point::new(300.0, 300.0), Point::new(400.0, 300.0)],
                PointerTarget::Canvas,
            )
            .unwrap();
        assert!(controller.is_pinching());
        assert!(!controller.is_dragging());

        let before = *controller.state();
        let centroid = Point::new(350.0, 300.0);
        assert!(controller
            .touch_move(&[Point::new(250.0, 300.0), Point::new(450.0, 300.0)])
            .unwrap());
        assert!(approx_eq(controller.state().scale, 2.0));

        let percent = screen_to_image_percent(centroid, &before, natural, controller.container())
            .unwrap()
            .percent();
        let back =
            image_percent_to_screen(percent, controller.state(), natural, controller.container())
                .unwrap();
        assert!(approx_eq(back.x, centroid.x));
        assert!(approx_eq(back.y, centroid.y));

        controller.touch_end();
        assert!(!controller.is_pinching());
    }

    #[test]
    fn test_single_touch_drags_like_mouse() {
        let mut controller = loaded(ViewportConfig::viewer());
        controller
            .touch_start(&[Point::new(10.0, 10.0)], PointerTarget::Canvas)
            .unwrap();
        controller.touch_move(&[Point::new(40.0, 30.0)]).unwrap();

        assert!(approx_eq(controller.state().offset_x, 30.0));
        assert!(approx_eq(controller.state().offset_y, 20.0));
        assert!(controller.touch_end().is_some());
    }

    #[test]
    fn test_config_presets() {
        let editor = ViewportConfig::editor();
        let viewer = ViewportConfig::viewer();

        assert_eq!(editor.bounds(), ScaleBounds::new(0.5, 3.0));
        assert_eq!(viewer.bounds(), ScaleBounds::new(1.0, 10.0));
        assert_eq!(editor.reset_mode, ResetMode::FitToContainer);
        assert_eq!(viewer.reset_mode, ResetMode::Identity);
        assert_eq!(viewer.wheel_zoom_in, editor.wheel_zoom_in);
    }
}
