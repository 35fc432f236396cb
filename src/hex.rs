use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::HexParseError;
use crate::extract::ColorSample;

/// `#RRGGBB` with uppercase digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor([u8; 3]);

/// Formats a color as `#RRGGBB`.
pub fn to_hex(sample: ColorSample) -> HexColor {
    HexColor([sample.red, sample.green, sample.blue])
}

impl HexColor {
    pub fn to_rgb(self) -> ColorSample {
        let [r, g, b] = self.0;
        ColorSample::new(r, g, b)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

impl FromStr for HexColor {
    type Err = HexParseError;

    /// Accepts `RRGGBB` in either case, with or without the leading `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 {
            return Err(HexParseError::Length(s.to_string()));
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HexParseError::Digit(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| HexParseError::Digit(s.to_string()))
        };
        Ok(HexColor([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }
}

impl Serialize for HexColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
