//! Global constants for hotspot maps

/// Color assigned to hotspots that don't carry a valid one.
pub const DEFAULT_HOTSPOT_COLOR: &str = "#4f46e5";

/// Upper bound of the percentage coordinate space (lower bound is 0).
pub const PERCENT_MAX: f64 = 100.0;

/// Smallest scale any viewport may reach, whatever its configured bounds say.
pub const SCALE_FLOOR: f64 = 1e-3;

/// Editor zoom range.
pub const EDITOR_MIN_SCALE: f64 = 0.5;
pub const EDITOR_MAX_SCALE: f64 = 3.0;

/// Public viewer zoom range (100% to 1000%).
pub const VIEWER_MIN_SCALE: f64 = 1.0;
pub const VIEWER_MAX_SCALE: f64 = 10.0;

/// Multiplicative zoom per wheel notch.
pub const WHEEL_ZOOM_IN: f64 = 1.1;
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Multiplicative zoom for the +/- controls.
pub const BUTTON_ZOOM_IN: f64 = 1.2;
pub const BUTTON_ZOOM_OUT: f64 = 0.8;

/// Pointer travel (screen pixels) after which a press counts as a drag instead of a click.
pub const MIN_DRAG_DISTANCE: f64 = 3.0;

/// Radius around a hotspot marker (screen pixels) that counts as a hit.
pub const HOTSPOT_HIT_RADIUS: f64 = 12.0;

/// Decimal places written for CSV coordinates.
pub const CSV_DECIMAL_PLACES: usize = 2;

/// Value used for an axis whose min and max coincide during CSV rescaling.
pub const DEGENERATE_AXIS_PERCENT: f64 = 50.0;
