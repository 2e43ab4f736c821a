//! Global constants for the meme compositing engine.

/// Line height multiplier applied to the font size when laying out
/// multi-line captions.
pub const LINE_HEIGHT_FACTOR: f32 = 1.4;

/// Caption outline width in surface pixels (scaled for export).
pub const STROKE_WIDTH: f32 = 6.0;

/// Padding around the measured text bounds, used by both the selection
/// box and hit-testing so the two never diverge.
pub const SELECTION_PADDING: f32 = 5.0;

/// Dash pattern for the selection box: 5 px on, 5 px off.
pub const SELECTION_DASH: f32 = 5.0;

/// Selection box stroke width in surface pixels.
pub const SELECTION_STROKE_WIDTH: f32 = 2.0;

/// Selection box accent color (teal).
pub const SELECTION_COLOR: [u8; 4] = [0x0d, 0x94, 0x88, 0xff];

/// Caption outline color.
pub const STROKE_COLOR: [u8; 4] = [0x00, 0x00, 0x00, 0xff];

/// Fill color used when an annotation has no (or an unparseable) color.
pub const DEFAULT_FILL: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

/// Placeholder text for newly created annotations.
pub const DEFAULT_TEXT: &str = "Your text here";

/// Minimum edge length for the display surface. Guarantees usable
/// editing space even for extreme aspect ratios or narrow viewports.
pub const MIN_SURFACE_EDGE: f32 = 200.0;
