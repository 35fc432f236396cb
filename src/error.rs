//! Error types for every stage of the palette pipeline.
//!
//! Each stage owns a small enum so callers can match on the failure that
//! matters to them; `PaletteError` folds them together for the one-shot entry
//! points.

use wasm_bindgen::JsValue;

/// Failure to turn file bytes into a [`PixelSurface`](crate::PixelSurface).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The declared type is not `image/*`. Raised before any decoding work.
    #[error("declared type `{declared_type}` is not an image")]
    NotAnImage { declared_type: String },

    #[error("unable to decode image: {0}")]
    DecodeFailure(String),

    #[error("image too large: {pixels} pixels (limit {limit})")]
    TooLarge { pixels: u64, limit: u64 },

    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Raw RGBA samples that do not describe a `width` x `height` surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    #[error("expected {expected} samples for {width}x{height}, got {actual}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("surface dimensions {width}x{height} overflow")]
    Overflow { width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("surface has no pixels")]
    EmptySurface,

    #[error("requested color count {requested} is outside 1..={max}")]
    InvalidCount { requested: usize, max: usize },

    #[error("quantization produced no colors")]
    NoColors,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexParseError {
    #[error("hex color must be 6 digits, got {0:?}")]
    Length(String),

    #[error("invalid hex digit in {0:?}")]
    Digit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CopyError {
    #[error("no swatch at index {0}")]
    NoSuchSwatch(usize),

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Umbrella error for the one-shot extraction helpers.
#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<PaletteError> for JsValue {
    fn from(error: PaletteError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

impl From<ConfigError> for JsValue {
    fn from(error: ConfigError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

impl From<CopyError> for JsValue {
    fn from(error: CopyError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}
