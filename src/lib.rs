use wasm_bindgen::prelude::*;
use js_sys::{Array, Function, Object, Reflect};

pub mod config;
pub mod controller;
pub mod decode;
pub mod error;
pub mod extract;
pub mod hex;
pub mod kmeans;
pub mod median_cut;
pub mod render;

pub use config::{Algorithm, ExtractConfig};
pub use controller::{Completion, Status, Ticket, UploadController, UploadState};
pub use decode::{ImageDecoder, PixelSurface, is_image_type};
pub use error::{
    ClipboardError, ConfigError, CopyError, DecodeError, ExtractionError, HexParseError,
    PaletteError, SurfaceError,
};
pub use extract::{
    ColorSample, DominantColor, MAX_COLORS, Palette, PaletteExtractor, PixelFilter, extractor_for,
};
pub use hex::{HexColor, to_hex};
pub use kmeans::KMeans;
pub use median_cut::MedianCut;
pub use render::{Clipboard, Swatch, render};

/// Decode `input`, extract a palette and render it, in one call.
pub fn extract_palette_bytes(
    input: &[u8],
    declared_type: &str,
    config: &ExtractConfig,
) -> Result<Vec<Swatch>, PaletteError> {
    config.validate()?;
    let surface = ImageDecoder::new(config.max_decoded_pixels).decode(input, declared_type)?;
    let palette = extractor_for(config).extract(&surface, config.color_count)?;
    Ok(render(&palette))
}

// ------------------------------------------------------------
// Browser bindings
// ------------------------------------------------------------

/// Stateless helper: returns the palette as an array of `#RRGGBB` strings.
#[wasm_bindgen]
pub fn extract_palette(
    input: Vec<u8>,
    declared_type: &str,
    n_colors: usize,
) -> Result<Array, JsValue> {
    let config = ExtractConfig {
        color_count: n_colors,
        ..ExtractConfig::default()
    };
    let swatches = extract_palette_bytes(&input, declared_type, &config)?;

    let palette_js = Array::new();
    for swatch in swatches {
        palette_js.push(&JsValue::from_str(&swatch.hex.to_string()));
    }
    Ok(palette_js)
}

/// Clipboard backed by a JS function such as
/// `text => navigator.clipboard.writeText(text)`.
///
/// A successful call only means the write was started; the page reports
/// completion through [`PaletteApp::copy_succeeded`].
struct JsClipboard<'a> {
    writer: &'a Function,
}

impl Clipboard for JsClipboard<'_> {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.writer
            .call1(&JsValue::NULL, &JsValue::from_str(text))
            .map(|_| ())
            .map_err(|e| ClipboardError(format!("{e:?}")))
    }
}

/// Page-side controller. The page forwards picker/drop events and file-read
/// completions; the app keeps the session and hands back swatches to draw.
#[wasm_bindgen]
pub struct PaletteApp {
    controller: UploadController,
}

#[wasm_bindgen]
impl PaletteApp {
    /// `config_json` is an optional partial [`ExtractConfig`] as JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<PaletteApp, JsValue> {
        let config = match config_json {
            Some(json) => ExtractConfig::from_json(&json)?,
            None => ExtractConfig::default(),
        };
        Ok(PaletteApp {
            controller: UploadController::new(&config)?,
        })
    }

    /// Returns the upload ticket, or `undefined` when the file is not an image.
    pub fn select_file(&mut self, name: &str, declared_type: &str) -> Option<f64> {
        self.controller
            .select_file(name, declared_type)
            .ok()
            .map(|ticket| ticket.generation() as f64)
    }

    /// Returns `false` when the ticket was superseded and the bytes were ignored.
    pub fn load_bytes(&mut self, ticket: f64, bytes: Vec<u8>) -> bool {
        let ticket = Ticket::from_generation(ticket as u64);
        self.controller.complete_read(ticket, &bytes) != Completion::Stale
    }

    pub fn load_failed(&mut self, ticket: f64) -> bool {
        let ticket = Ticket::from_generation(ticket as u64);
        self.controller.fail_read(ticket) != Completion::Stale
    }

    pub fn clear(&mut self) {
        self.controller.clear();
    }

    pub fn status(&self) -> String {
        self.controller.status().to_string()
    }

    pub fn state(&self) -> String {
        self.controller.state().to_string()
    }

    /// `[{hex, r, g, b, share}, ...]`, most dominant first.
    pub fn swatches(&self) -> Result<Array, JsValue> {
        let out = Array::new();
        for swatch in self.controller.swatches() {
            let [r, g, b] = swatch.rgb;
            let item = Object::new();
            Reflect::set(&item, &JsValue::from_str("hex"), &JsValue::from_str(&swatch.hex.to_string()))?;
            Reflect::set(&item, &JsValue::from_str("r"), &JsValue::from(r))?;
            Reflect::set(&item, &JsValue::from_str("g"), &JsValue::from(g))?;
            Reflect::set(&item, &JsValue::from_str("b"), &JsValue::from(b))?;
            Reflect::set(&item, &JsValue::from_str("share"), &JsValue::from(swatch.share))?;
            out.push(&item);
        }
        Ok(out)
    }

    /// Starts copying swatch `index` through `writer` and returns its hex code.
    ///
    /// The status is left alone until the page calls `copy_succeeded`, e.g.
    /// `writeText(hex).then(() => app.copy_succeeded(hex))`.
    pub fn copy_swatch(&mut self, index: usize, writer: &Function) -> Result<String, JsValue> {
        let mut clipboard = JsClipboard { writer };
        let hex = self.controller.start_copy(index, &mut clipboard)?;
        Ok(hex.to_string())
    }

    /// The clipboard write of `hex` resolved. Returns `false` when the
    /// swatch is gone (cleared or replaced) and the status was not changed.
    pub fn copy_succeeded(&mut self, hex: &str) -> Result<bool, JsValue> {
        let hex: HexColor = hex
            .parse()
            .map_err(|e: HexParseError| JsValue::from_str(&e.to_string()))?;
        Ok(self.controller.copy_succeeded(hex))
    }
}
