use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::DEFAULT_MAX_DECODED_PIXELS;
use crate::error::ConfigError;
use crate::extract::MAX_COLORS;

/// Quantization routine used to build the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Histogram median cut. Deterministic, exact on flat images.
    #[default]
    MedianCut,
    /// k-means in CIE Lab.
    Kmeans,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::MedianCut => f.write_str("median-cut"),
            Algorithm::Kmeans => f.write_str("kmeans"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "median-cut" | "mediancut" | "mmcq" => Ok(Algorithm::MedianCut),
            "kmeans" | "k-means" => Ok(Algorithm::Kmeans),
            other => Err(ConfigError::Invalid(format!("unknown algorithm `{other}`"))),
        }
    }
}

/// Tunables for decoding and extraction.
///
/// Every field has a default, so a partial JSON object such as
/// `{"color_count": 8}` is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Upper bound on palette length.
    pub color_count: usize,
    /// Sample every `quality`-th pixel. `1` walks the whole surface.
    pub quality: usize,
    /// Pixels with alpha below this are skipped.
    pub alpha_threshold: u8,
    /// Skip near-white pixels (all channels above 250).
    pub ignore_white: bool,
    /// Reject images with more pixels than this before decoding them.
    pub max_decoded_pixels: u64,
    pub algorithm: Algorithm,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            color_count: 5,
            quality: 1,
            alpha_threshold: 125,
            ignore_white: false,
            max_decoded_pixels: DEFAULT_MAX_DECODED_PIXELS,
            algorithm: Algorithm::MedianCut,
        }
    }
}

impl ExtractConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ExtractConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.color_count == 0 || self.color_count > MAX_COLORS {
            return Err(ConfigError::Invalid(format!(
                "color_count must be within 1..={MAX_COLORS}, got {}",
                self.color_count
            )));
        }
        if self.quality == 0 {
            return Err(ConfigError::Invalid("quality must be at least 1".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(ConfigError::Invalid(
                "max_decoded_pixels must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
