//! Palette extraction contract shared by the quantizers.
//!
//! A [`PaletteExtractor`] turns a [`PixelSurface`] into at most `count`
//! dominant colors ordered by how many sampled pixels each one stands for.
//! Implementations differ only in how they partition the color space; the
//! sampling rules, validation and ranking live here.

use palette::Srgb;

use crate::config::{Algorithm, ExtractConfig};
use crate::decode::PixelSurface;
use crate::error::ExtractionError;
use crate::kmeans::KMeans;
use crate::median_cut::MedianCut;

/// An RGB color with 8-bit channels. Alpha is dropped during extraction.
pub type ColorSample = Srgb<u8>;

/// Largest palette any extractor will build.
pub const MAX_COLORS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominantColor {
    pub color: ColorSample,
    /// Sampled pixels represented by this color.
    pub population: u64,
}

/// Dominant colors, most populous first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    entries: Vec<DominantColor>,
    sampled: u64,
}

impl Palette {
    /// Ranks quantizer output by population.
    ///
    /// Entries sharing a color are merged. Equal populations keep the order
    /// they were produced in.
    pub fn ranked(entries: impl IntoIterator<Item = DominantColor>) -> Self {
        let mut merged: Vec<DominantColor> = Vec::new();
        for entry in entries {
            if entry.population == 0 {
                continue;
            }
            match merged.iter_mut().find(|e| e.color == entry.color) {
                Some(existing) => existing.population += entry.population,
                None => merged.push(entry),
            }
        }
        merged.sort_by(|a, b| b.population.cmp(&a.population));
        let sampled = merged.iter().map(|e| e.population).sum();
        Self {
            entries: merged,
            sampled,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DominantColor] {
        &self.entries
    }

    pub fn colors(&self) -> impl Iterator<Item = ColorSample> + '_ {
        self.entries.iter().map(|e| e.color)
    }

    /// Total number of sampled pixels behind the palette.
    pub fn sampled(&self) -> u64 {
        self.sampled
    }
}

/// A color quantization routine.
pub trait PaletteExtractor {
    fn name(&self) -> &'static str;

    /// Returns between 1 and `count` colors for any non-empty surface.
    fn extract(&self, surface: &PixelSurface, count: usize) -> Result<Palette, ExtractionError>;
}

/// Which pixels of a surface take part in quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFilter {
    pub quality: usize,
    pub alpha_threshold: u8,
    pub ignore_white: bool,
}

impl Default for PixelFilter {
    fn default() -> Self {
        Self {
            quality: 1,
            alpha_threshold: 125,
            ignore_white: false,
        }
    }
}

impl From<&ExtractConfig> for PixelFilter {
    fn from(config: &ExtractConfig) -> Self {
        Self {
            quality: config.quality.max(1),
            alpha_threshold: config.alpha_threshold,
            ignore_white: config.ignore_white,
        }
    }
}

impl PixelFilter {
    /// Collects the colors of the pixels that pass the filter.
    ///
    /// When nothing passes (a fully transparent or all-white image) the
    /// sampled pixels are returned unfiltered so the image still has a color.
    pub fn collect(&self, surface: &PixelSurface) -> Vec<ColorSample> {
        let step = self.quality.max(1);
        let kept: Vec<ColorSample> = surface
            .pixels()
            .step_by(step)
            .filter(|px| self.keeps(*px))
            .map(|[r, g, b, _]| ColorSample::new(r, g, b))
            .collect();

        if !kept.is_empty() {
            return kept;
        }

        log::debug!("no pixel passed the filter, sampling unfiltered");
        surface
            .pixels()
            .step_by(step)
            .map(|[r, g, b, _]| ColorSample::new(r, g, b))
            .collect()
    }

    fn keeps(&self, [r, g, b, a]: [u8; 4]) -> bool {
        if a < self.alpha_threshold {
            return false;
        }
        !(self.ignore_white && r > 250 && g > 250 && b > 250)
    }
}

/// Shared argument checks for every extractor.
pub(crate) fn check_request(surface: &PixelSurface, count: usize) -> Result<(), ExtractionError> {
    if count == 0 || count > MAX_COLORS {
        return Err(ExtractionError::InvalidCount {
            requested: count,
            max: MAX_COLORS,
        });
    }
    if surface.is_empty() {
        return Err(ExtractionError::EmptySurface);
    }
    Ok(())
}

/// Builds the extractor named by `config.algorithm`.
pub fn extractor_for(config: &ExtractConfig) -> Box<dyn PaletteExtractor> {
    let filter = PixelFilter::from(config);
    match config.algorithm {
        Algorithm::MedianCut => Box::new(MedianCut::new(filter)),
        Algorithm::Kmeans => Box::new(KMeans::new(filter)),
    }
}
