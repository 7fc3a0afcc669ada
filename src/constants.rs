// Constants module - centralized limits and defaults
//
// Validation limits and default values shared by the renderer, the HTTP
// handlers and the CLI. Using constants instead of magic numbers keeps the
// surfaces consistent with each other.

// =============================================================================
// Validation limits
// =============================================================================

/// Maximum number of characters accepted as QR payload
pub const MAX_DATA_LENGTH: usize = 4296;

/// Smallest QR image edge in pixels
pub const MIN_QR_SIZE: i64 = 21;

/// Largest QR image edge in pixels
pub const MAX_QR_SIZE: i64 = 4000;

/// Smallest center overlay (logo/text) as a fraction of the QR edge
pub const MIN_OVERLAY_SCALE: f32 = 0.1;

/// Largest center overlay as a fraction of the QR edge
pub const MAX_OVERLAY_SCALE: f32 = 0.4;

/// Lowest QR symbol version
pub const MIN_SYMBOL_VERSION: i64 = 1;

/// Highest QR symbol version
pub const MAX_SYMBOL_VERSION: i64 = 40;

/// Largest halftone point size in pixels
pub const MAX_POINT_SIZE: i64 = 64;

/// Largest decoded background image (100 megapixels)
pub const MAX_SOURCE_PIXELS: u64 = 100_000_000;

/// Largest edge in pixels of a rendered halftone QR
pub const MAX_HALFTONE_SIDE: u64 = MAX_QR_SIZE as u64;

// =============================================================================
// Rendering defaults
// =============================================================================

/// Default QR image edge in pixels
pub const DEFAULT_QR_SIZE: u32 = 500;

/// Default quiet zone width in modules
pub const DEFAULT_BORDER: u32 = 4;

/// Pixels per module before the final resample
pub const DEFAULT_BOX_SIZE: u32 = 10;

/// Padding around a center overlay in pixels
pub const DEFAULT_OVERLAY_PADDING: u32 = 10;

/// Default fraction of the background width used by an embedded QR
pub const DEFAULT_EMBED_SCALE: f64 = 0.3;

/// Default margin from the background edge in pixels
pub const DEFAULT_MARGIN: u32 = 20;

/// Default logo size as a fraction of the QR edge
pub const DEFAULT_LOGO_SCALE: f32 = 0.25;

/// Default text area as a fraction of the QR edge
pub const DEFAULT_TEXT_SCALE: f32 = 0.3;

/// Smallest font size chosen when fitting text automatically
pub const MIN_AUTO_FONT_SIZE: f32 = 8.0;

// =============================================================================
// Artistic defaults
// =============================================================================

/// Default symbol version for artistic and halftone output
pub const DEFAULT_ARTISTIC_VERSION: u8 = 10;

/// Default halftone point size in pixels
pub const DEFAULT_POINT_SIZE: u32 = 8;

// =============================================================================
// Batch naming
// =============================================================================

/// Suffix inserted before the extension of embedded batch outputs
pub const EMBED_SUFFIX: &str = "_qr";

/// Suffix inserted before the extension of artistic batch outputs
pub const ARTISTIC_SUFFIX: &str = "_artistic";

/// Name used for an upload that arrived without a file name
pub const FALLBACK_SOURCE_NAME: &str = "image.png";

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Default maximum upload body size (20 MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
