use serde::Serialize;

use crate::error::ClipboardError;
use crate::extract::Palette;
use crate::hex::{HexColor, to_hex};

/// One clickable palette entry: a background color and its hex label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Swatch {
    pub hex: HexColor,
    pub rgb: [u8; 3],
    /// Fraction of sampled pixels this color stands for.
    pub share: f32,
}

impl Swatch {
    /// Writes the hex label to the clipboard.
    pub fn copy_to(&self, clipboard: &mut dyn Clipboard) -> Result<HexColor, ClipboardError> {
        clipboard.write_text(&self.hex.to_string())?;
        Ok(self.hex)
    }
}

/// Host clipboard. Only text writes are needed.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Turns a palette into swatches, keeping its order.
pub fn render(palette: &Palette) -> Vec<Swatch> {
    let total = palette.sampled().max(1) as f32;
    palette
        .entries()
        .iter()
        .map(|entry| Swatch {
            hex: to_hex(entry.color),
            rgb: [entry.color.red, entry.color.green, entry.color.blue],
            share: entry.population as f32 / total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{ColorSample, DominantColor};

    #[derive(Default)]
    struct RecordingClipboard {
        written: Vec<String>,
        fail: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError("denied".into()));
            }
            self.written.push(text.to_string());
            Ok(())
        }
    }

    fn palette() -> Palette {
        Palette::ranked([
            DominantColor {
                color: ColorSample::new(255, 0, 0),
                population: 3,
            },
            DominantColor {
                color: ColorSample::new(0, 0, 16),
                population: 1,
            },
        ])
    }

    #[test]
    fn swatches_follow_palette_order() {
        let swatches = render(&palette());
        let labels: Vec<String> = swatches.iter().map(|s| s.hex.to_string()).collect();
        assert_eq!(labels, vec!["#FF0000", "#000010"]);
        assert_eq!(swatches[1].rgb, [0, 0, 16]);
        assert!((swatches[0].share - 0.75).abs() < 1e-6);
    }

    #[test]
    fn copy_writes_hex_text() {
        let swatches = render(&palette());
        let mut clipboard = RecordingClipboard::default();
        let hex = swatches[0].copy_to(&mut clipboard).unwrap();
        assert_eq!(hex.to_string(), "#FF0000");
        assert_eq!(clipboard.written, vec!["#FF0000"]);
    }

    #[test]
    fn copy_failure_is_reported() {
        let swatches = render(&palette());
        let mut clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(swatches[0].copy_to(&mut clipboard).is_err());
    }

    #[test]
    fn swatch_json_shape() {
        let json = serde_json::to_value(&render(&palette())[0]).unwrap();
        assert_eq!(json["hex"], "#FF0000");
        assert_eq!(json["rgb"], serde_json::json!([255, 0, 0]));
    }
}
