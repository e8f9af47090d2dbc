//! Shared numeric constants for the certcanvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Smallest width or height a shape may be resized to, in scene units.
pub const MIN_SIZE: f64 = 20.0;

/// Smallest font size a text resize may produce.
pub const MIN_FONT_SIZE: f64 = 8.0;

/// Offset applied to both axes when duplicating an element.
pub const DUPLICATE_OFFSET: f64 = 10.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Distance from a corner or edge midpoint that still grabs its resize handle.
pub const HANDLE_THRESHOLD: f64 = 10.0;

/// Distance above the bounding box top edge to the rotate handle center.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Radius of the circular rotate handle hotspot.
pub const ROTATE_HANDLE_RADIUS: f64 = 10.0;

// ── Decorations ─────────────────────────────────────────────────

/// Side length of a drawn resize handle square.
pub const HANDLE_SIZE: f64 = 8.0;

/// Dash segment length for the hover outline.
pub const HOVER_DASH: f64 = 5.0;

/// Brand accent used for the selection outline and handles.
pub const ACCENT_COLOR: &str = "#4F46E5";

/// Neutral color used for the hover outline.
pub const HOVER_COLOR: &str = "#94A3B8";

// ── History ─────────────────────────────────────────────────────

/// Default number of snapshots retained by the undo history.
pub const HISTORY_LIMIT: usize = 100;

// ── Element defaults ────────────────────────────────────────────

/// Content given to a freshly added text element.
pub const DEFAULT_TEXT: &str = "[Recipient Name]";

/// Font size given to a freshly added text element.
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// Font family given to a freshly added text element.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Size of a freshly added rectangle.
pub const DEFAULT_RECT_SIZE: (f64, f64) = (150.0, 100.0);

/// Size of a freshly added circle.
pub const DEFAULT_CIRCLE_SIZE: (f64, f64) = (100.0, 100.0);

/// Canvas size of a blank certificate.
pub const DEFAULT_CANVAS_SIZE: (u32, u32) = (800, 600);
