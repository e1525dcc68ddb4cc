//! Global constants for the IKAT annotation client

use crate::color_utils::Color;

/// Horizontal space reserved next to the canvas for the sidebar
pub const SIDEBAR_ALLOWANCE: f32 = 400.0;

/// Vertical space reserved above the canvas for the toolbar
pub const TOOLBAR_ALLOWANCE: f32 = 150.0;

/// Default viewport width when no window size is known
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1920.0;

/// Default viewport height when no window size is known
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 1080.0;

/// Labels offered for every image before any are added at runtime.
pub const DEFAULT_LABELS: &[&str] = &[
    "Person",
    "Gruppe",
    "Tier",
    "Landschaft",
    "Portrait",
    "Überlappung von Hauptmotiven",
    "Bildsymetrie verletzt",
    "Nacht",
    "Tag",
];

/// Rendering constants for point sets drawn over the image.
pub mod render {
    use super::Color;

    /// Stroke color for subject points (red)
    pub const SUBJECT_COLOR: Color = Color::rgb(0xe7, 0x4c, 0x3c);

    /// Stroke color for composition points (blue)
    pub const COMPOSITION_COLOR: Color = Color::rgb(0x34, 0x98, 0xdb);

    /// Color of the index text drawn on each marker
    pub const MARKER_TEXT_COLOR: Color = Color::rgb(0xff, 0xff, 0xff);

    /// Alpha of the polygon fill tint
    pub const FILL_ALPHA: f32 = 0.3;

    /// Outline width in display pixels
    pub const LINE_WIDTH: f32 = 3.0;

    /// Radius of a point marker
    pub const MARKER_RADIUS: f32 = 6.0;

    /// Font size of the marker index text
    pub const FONT_SIZE: f32 = 12.0;

    /// Prefix of subject point labels ("S1", "S2", ...)
    pub const SUBJECT_PREFIX: &str = "S";

    /// Prefix of composition point labels ("K1", "K2", ...)
    pub const COMPOSITION_PREFIX: &str = "K";
}

/// REST surface of the annotation server.
pub mod api {
    /// Default server address
    pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

    /// Multipart upload endpoint
    pub const UPLOAD: &str = "/api/upload";

    /// Random image endpoint
    pub const RANDOM_IMAGE: &str = "/api/random-image";

    /// Save endpoint
    pub const SAVE: &str = "/api/save";

    /// Prefix of the image-by-hash endpoint
    pub const IMAGE_PREFIX: &str = "/api/image/";

    /// Prefix of the annotation-by-hash endpoint
    pub const ANNOTATION_PREFIX: &str = "/api/annotation/";

    /// Response header carrying the content hash of a random image
    pub const IMAGE_HASH_HEADER: &str = "X-Image-Hash";

    /// Multipart field name for uploaded files
    pub const UPLOAD_FIELD: &str = "file";

    /// Relative URL under which the server serves an image.
    pub fn image_url(hash: &str) -> String {
        format!("{}{}", IMAGE_PREFIX, hash)
    }
}
