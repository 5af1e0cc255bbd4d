//! Viewport transform mathematics.
//!
//! Pure functions converting between screen pixels and percentage-based image
//! coordinates, plus the zoom/pan/fit transforms shared by the editor and the
//! public viewer.
//!
//! The transform maps an image-local pixel `p` (natural, unscaled pixels) to a
//! container-local screen pixel `s` as `s = p * scale + offset`. Percentages are
//! image-local pixels divided by the natural size, times 100.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{PERCENT_MAX, SCALE_FLOOR};

/// Errors raised by geometry operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// Natural image size (or container size) isn't known yet; retry after the image loads.
    #[error("image dimensions are not available yet")]
    ImageNotReady,
}

/// A 2D point in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Midpoint between two points.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Vector from `self` to `other`.
    pub fn delta_to(&self, other: &Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions are finite and strictly positive.
    pub fn is_ready(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    fn ensure_ready(&self) -> Result<(), GeometryError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(GeometryError::ImageNotReady)
        }
    }
}

/// Container rectangle in screen (client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Convert a screen point into container-local pixels.
    pub fn to_local(&self, screen: Point) -> Point {
        Point::new(screen.x - self.left, screen.y - self.top)
    }

    /// Convert a container-local point back into screen pixels.
    pub fn to_screen(&self, local: Point) -> Point {
        Point::new(local.x + self.left, local.y + self.top)
    }

    /// Centre of the container in container-local pixels.
    pub fn local_center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Position as a percentage of the image's natural width/height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagePercent {
    pub x: f64,
    pub y: f64,
}

impl ImagePercent {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates lie in `[0, 100]`.
    pub fn is_inside(&self) -> bool {
        (0.0..=PERCENT_MAX).contains(&self.x) && (0.0..=PERCENT_MAX).contains(&self.y)
    }

    /// Clamp both coordinates into `[0, 100]`. NaN becomes 0.
    pub fn clamped(&self) -> Self {
        Self::new(clamp_percent(self.x), clamp_percent(self.y))
    }
}

/// Clamp a single percentage coordinate into `[0, 100]`.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, PERCENT_MAX)
    }
}

/// Result of projecting a screen point onto the image.
///
/// Landing outside the image is a normal outcome, not an error: callers pick
/// whether to clamp or reject.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Inside(ImagePercent),
    OutOfBounds(ImagePercent),
}

impl Projection {
    fn from_percent(percent: ImagePercent) -> Self {
        if percent.is_inside() {
            Projection::Inside(percent)
        } else {
            Projection::OutOfBounds(percent)
        }
    }

    /// The percentage only if it landed on the image.
    pub fn inside(self) -> Option<ImagePercent> {
        match self {
            Projection::Inside(p) => Some(p),
            Projection::OutOfBounds(_) => None,
        }
    }

    /// The raw (possibly out of range) percentage.
    pub fn percent(self) -> ImagePercent {
        match self {
            Projection::Inside(p) | Projection::OutOfBounds(p) => p,
        }
    }

    pub fn is_inside(self) -> bool {
        matches!(self, Projection::Inside(_))
    }
}

/// Pan/zoom transform state.
///
/// `offset_x`/`offset_y` translate the image's top-left corner relative to the
/// container's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewportState {
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Natural size, no translation.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Scale is finite and strictly positive.
    pub fn has_valid_scale(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0
    }

    /// Image-local pixel under a container-local point.
    pub fn local_to_image(&self, local: Point) -> Point {
        Point::new(
            (local.x - self.offset_x) / self.scale,
            (local.y - self.offset_y) / self.scale,
        )
    }

    /// Container-local point of an image-local pixel.
    pub fn image_to_local(&self, image: Point) -> Point {
        Point::new(
            image.x * self.scale + self.offset_x,
            image.y * self.scale + self.offset_y,
        )
    }

    /// Zoom level as a whole percentage, e.g. `"150%"`.
    pub fn zoom_label(&self) -> String {
        format!("{}%", (self.scale * 100.0).round())
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::identity()
    }
}

/// Allowed scale range for one consumer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl ScaleBounds {
    /// Create bounds; `min` is raised to a positive floor and `max` never falls below `min`.
    pub fn new(min: f64, max: f64) -> Self {
        let min = if min.is_finite() {
            min.max(SCALE_FLOOR)
        } else {
            SCALE_FLOOR
        };
        let max = if max.is_finite() { max.max(min) } else { min };
        Self { min, max }
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        // re-sanitise in case the fields were set directly
        let bounds = Self::new(self.min, self.max);
        if scale.is_nan() {
            return bounds.min;
        }
        scale.clamp(bounds.min, bounds.max)
    }
}

/// Convert a screen point into image percentages.
///
/// `container` is the container rectangle in the same screen space as `screen`.
pub fn screen_to_image_percent(
    screen: Point,
    viewport: &ViewportState,
    natural: Size,
    container: &Rect,
) -> Result<Projection, GeometryError> {
    natural.ensure_ready()?;
    if !viewport.has_valid_scale() {
        return Err(GeometryError::ImageNotReady);
    }

    let image = viewport.local_to_image(container.to_local(screen));
    let percent = ImagePercent::new(
        image.x / natural.width * PERCENT_MAX,
        image.y / natural.height * PERCENT_MAX,
    );
    Ok(Projection::from_percent(percent))
}

/// Convert image percentages into a screen point. Inverse of [`screen_to_image_percent`].
pub fn image_percent_to_screen(
    percent: ImagePercent,
    viewport: &ViewportState,
    natural: Size,
    container: &Rect,
) -> Result<Point, GeometryError> {
    natural.ensure_ready()?;

    let image = Point::new(
        percent.x / PERCENT_MAX * natural.width,
        percent.y / PERCENT_MAX * natural.height,
    );
    Ok(container.to_screen(viewport.image_to_local(image)))
}

/// Zoom by `factor` while keeping `anchor` visually fixed.
///
/// `anchor` is container-local (same space as the offsets). The new scale is
/// clamped to `bounds`; the anchor stays fixed for whatever scale results.
/// A scale already outside `bounds` (e.g. a fit on a large image) only moves
/// in the factor's direction.
/// Non-finite or non-positive factors leave the viewport unchanged.
pub fn zoom_at_point(
    viewport: &ViewportState,
    anchor: Point,
    factor: f64,
    bounds: &ScaleBounds,
) -> ViewportState {
    if !factor.is_finite() || factor <= 0.0 || !viewport.has_valid_scale() {
        return *viewport;
    }

    // Image-local point under the anchor before zooming
    let image = viewport.local_to_image(anchor);

    let clamped = bounds.clamp(viewport.scale * factor);
    let new_scale = if factor > 1.0 {
        clamped.max(viewport.scale)
    } else if factor < 1.0 {
        clamped.min(viewport.scale)
    } else {
        viewport.scale
    };

    ViewportState {
        scale: new_scale,
        offset_x: anchor.x - image.x * new_scale,
        offset_y: anchor.y - image.y * new_scale,
    }
}

/// Translate the viewport by a screen delta.
pub fn pan_by(viewport: &ViewportState, delta: Point) -> ViewportState {
    ViewportState {
        scale: viewport.scale,
        offset_x: viewport.offset_x + delta.x,
        offset_y: viewport.offset_y + delta.y,
    }
}

/// Scale the image to fit entirely inside the container, centred.
pub fn fit_to_container(natural: Size, container: Size) -> Result<ViewportState, GeometryError> {
    natural.ensure_ready()?;
    container.ensure_ready()?;

    let scale = (container.width / natural.width).min(container.height / natural.height);

    Ok(ViewportState {
        scale,
        offset_x: (container.width - natural.width * scale) / 2.0,
        offset_y: (container.height - natural.height * scale) / 2.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
    }

    fn points_eq(a: Point, b: Point) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    #[test]
    fn test_screen_to_percent_identity() {
        let natural = Size::new(200.0, 100.0);
        let container = Rect::new(0.0, 0.0, 400.0, 300.0);
        let projection = screen_to_image_percent(
            Point::new(50.0, 25.0),
            &ViewportState::identity(),
            natural,
            &container,
        )
        .unwrap();

        assert_eq!(projection, Projection::Inside(ImagePercent::new(25.0, 25.0)));
    }

    #[test]
    fn test_screen_to_percent_with_transform_and_container_offset() {
        let natural = Size::new(1000.0, 500.0);
        let container = Rect::new(30.0, 40.0, 800.0, 600.0);
        let viewport = ViewportState::new(2.0, -100.0, 20.0);

        // local (330, 260) -> image ((330+100)/2, (260-20)/2) = (215, 120)
        let p = screen_to_image_percent(Point::new(360.0, 300.0), &viewport, natural, &container)
            .unwrap()
            .percent();
        assert!(approx_eq(p.x, 21.5));
        assert!(approx_eq(p.y, 24.0));
    }

    #[test]
    fn test_out_of_bounds_is_not_an_error() {
        let natural = Size::new(100.0, 100.0);
        let container = Rect::new(0.0, 0.0, 300.0, 300.0);
        let projection = screen_to_image_percent(
            Point::new(150.0, 50.0),
            &ViewportState::identity(),
            natural,
            &container,
        )
        .unwrap();

        assert!(!projection.is_inside());
        assert_eq!(projection.inside(), None);
        assert!(approx_eq(projection.percent().x, 150.0));
    }

    #[test]
    fn test_image_not_ready() {
        let container = Rect::new(0.0, 0.0, 300.0, 300.0);
        let viewport = ViewportState::identity();

        assert_eq!(
            screen_to_image_percent(Point::new(1.0, 1.0), &viewport, Size::new(0.0, 0.0), &container),
            Err(GeometryError::ImageNotReady)
        );
        assert_eq!(
            image_percent_to_screen(
                ImagePercent::new(50.0, 50.0),
                &viewport,
                Size::new(100.0, 0.0),
                &container
            ),
            Err(GeometryError::ImageNotReady)
        );
        assert_eq!(
            fit_to_container(Size::new(f64::NAN, 10.0), Size::new(100.0, 100.0)),
            Err(GeometryError::ImageNotReady)
        );
    }

    #[test]
    fn test_round_trip_consistency() {
        let natural = Size::new(1920.0, 1080.0);
        let container = Rect::new(12.5, 80.0, 900.0, 600.0);
        let viewports = [
            ViewportState::identity(),
            ViewportState::new(0.5, 10.0, -30.0),
            ViewportState::new(2.75, -812.3, -144.9),
            ViewportState::new(9.9, -15000.0, -8000.0),
        ];
        let screens = [
            Point::new(12.5, 80.0),
            Point::new(400.0, 300.0),
            Point::new(911.0, 679.0),
            Point::new(137.25, 222.125),
        ];

        for viewport in &viewports {
            for screen in &screens {
                let percent = screen_to_image_percent(*screen, viewport, natural, &container)
                    .unwrap()
                    .percent();
                let back = image_percent_to_screen(percent, viewport, natural, &container).unwrap();
                assert!(points_eq(back, *screen), "{:?} -> {:?} -> {:?}", screen, percent, back);
            }
        }
    }

    #[test]
    fn test_zoom_at_point_keeps_anchor_fixed() {
        let natural = Size::new(800.0, 600.0);
        let container = Rect::new(0.0, 0.0, 640.0, 480.0);
        let bounds = ScaleBounds::new(0.5, 3.0);
        let viewport = ViewportState::new(1.0, 50.0, 30.0);
        let anchor = Point::new(150.0, 120.0);

        let zoomed = zoom_at_point(&viewport, anchor, 1.5, &bounds);
        assert!(approx_eq(zoomed.scale, 1.5));

        let percent = screen_to_image_percent(anchor, &viewport, natural, &container)
            .unwrap()
            .percent();
        let back = image_percent_to_screen(percent, &zoomed, natural, &container).unwrap();
        assert!(points_eq(back, anchor));
    }

    #[test]
    fn test_zoom_at_point_with_offset_container() {
        let natural = Size::new(500.0, 500.0);
        let container = Rect::new(100.0, 200.0, 400.0, 400.0);
        let bounds = ScaleBounds::new(1.0, 10.0);
        let viewport = ViewportState::new(1.3, -20.0, 5.0);
        let screen_anchor = Point::new(260.0, 410.0);

        let zoomed = zoom_at_point(&viewport, container.to_local(screen_anchor), 1.1, &bounds);

        let percent = screen_to_image_percent(screen_anchor, &viewport, natural, &container)
            .unwrap()
            .percent();
        let back = image_percent_to_screen(percent, &zoomed, natural, &container).unwrap();
        assert!(points_eq(back, screen_anchor));
    }

    #[test]
    fn test_zoom_at_center_of_identity_is_symmetric() {
        let bounds = ScaleBounds::new(0.5, 3.0);
        let zoomed = zoom_at_point(&ViewportState::identity(), Point::new(0.0, 0.0), 2.0, &bounds);

        assert_eq!(zoomed.scale, 2.0);
        assert!(approx_eq(zoomed.offset_x, 0.0));
        assert!(approx_eq(zoomed.offset_y, 0.0));
    }

    #[test]
    fn test_scale_clamping_repeated() {
        let bounds = ScaleBounds::new(0.5, 3.0);
        let anchor = Point::new(200.0, 150.0);

        let mut viewport = ViewportState::identity();
        for _ in 0..50 {
            viewport = zoom_at_point(&viewport, anchor, 0.9, &bounds);
            assert!(viewport.scale >= bounds.min);
        }
        assert!(approx_eq(viewport.scale, 0.5));

        for _ in 0..50 {
            viewport = zoom_at_point(&viewport, anchor, 1.1, &bounds);
            assert!(viewport.scale <= bounds.max);
        }
        assert!(approx_eq(viewport.scale, 3.0));
    }

    #[test]
    fn test_zoom_from_below_min_scale() {
        let bounds = ScaleBounds::new(0.5, 3.0);
        let anchor = Point::new(400.0, 300.0);
        let fitted = ViewportState::new(0.2, 0.0, 100.0);

        let out = zoom_at_point(&fitted, anchor, 0.8, &bounds);
        assert_eq!(out.scale, 0.2);

        let zoomed = zoom_at_point(&fitted, anchor, 1.2, &bounds);
        assert_eq!(zoomed.scale, 0.5);
        let before = fitted.local_to_image(anchor);
        let after = zoomed.local_to_image(anchor);
        assert!(approx_eq(before.x, after.x));
        assert!(approx_eq(before.y, after.y));
    }

    #[test]
    fn test_zoom_from_above_max_scale() {
        let bounds = ScaleBounds::new(0.5, 3.0);
        let viewport = ViewportState::new(5.0, 0.0, 0.0);

        assert_eq!(zoom_at_point(&viewport, Point::default(), 1.5, &bounds).scale, 5.0);
        assert_eq!(zoom_at_point(&viewport, Point::default(), 0.5, &bounds).scale, 3.0);
    }

    #[test]
    fn test_invalid_factor_is_ignored() {
        let bounds = ScaleBounds::new(0.5, 3.0);
        let viewport = ViewportState::new(1.2, 3.0, 4.0);

        assert_eq!(zoom_at_point(&viewport, Point::default(), 0.0, &bounds), viewport);
        assert_eq!(zoom_at_point(&viewport, Point::default(), -2.0, &bounds), viewport);
        assert_eq!(zoom_at_point(&viewport, Point::default(), f64::NAN, &bounds), viewport);
    }

    #[test]
    fn test_scale_bounds_never_allow_non_positive() {
        let bounds = ScaleBounds::new(-1.0, 0.0);
        assert!(bounds.min > 0.0);
        assert!(bounds.max >= bounds.min);
        assert!(bounds.clamp(-5.0) > 0.0);

        let inverted = ScaleBounds::new(4.0, 2.0);
        assert_eq!(inverted.clamp(3.0), 4.0);
    }

    #[test]
    fn test_pan_by() {
        let viewport = ViewportState::new(2.5, 10.0, 20.0);
        let panned = pan_by(&viewport, Point::new(5.0, -10.0));

        assert_eq!(panned.scale, 2.5);
        assert_eq!(panned.offset_x, 15.0);
        assert_eq!(panned.offset_y, 10.0);
    }

    #[test]
    fn test_fit_to_container_wide_image() {
        let fit = fit_to_container(Size::new(1000.0, 500.0), Size::new(500.0, 500.0)).unwrap();

        assert!(approx_eq(fit.scale, 0.5));
        assert!(approx_eq(fit.offset_x, 0.0));
        assert!(approx_eq(fit.offset_y, 125.0));
    }

    #[test]
    fn test_fit_to_container_tall_image() {
        let fit = fit_to_container(Size::new(200.0, 400.0), Size::new(800.0, 600.0)).unwrap();

        assert!(approx_eq(fit.scale, 1.5));
        assert!(approx_eq(fit.offset_x, 250.0));
        assert!(approx_eq(fit.offset_y, 0.0));
    }

    #[test]
    fn test_percent_clamping() {
        let clamped = ImagePercent::new(-5.0, 150.0).clamped();
        assert_eq!(clamped, ImagePercent::new(0.0, 100.0));
        assert_eq!(clamp_percent(f64::NAN), 0.0);
    }

    #[test]
    fn test_zoom_label() {
        assert_eq!(ViewportState::new(1.5, 0.0, 0.0).zoom_label(), "150%");
        assert_eq!(ViewportState::new(0.333, 0.0, 0.0).zoom_label(), "33%");
    }
}
