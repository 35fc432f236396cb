use std::collections::HashSet;

use kmeans_colors::get_kmeans;
use palette::{IntoColor, Lab, LinSrgb};

use crate::decode::PixelSurface;
use crate::error::ExtractionError;
use crate::extract::{
    ColorSample, DominantColor, Palette, PaletteExtractor, PixelFilter, check_request,
};

const MAX_ITER: usize = 20;
const CONVERGE: f32 = 1e-4;
const SEED: u64 = 0;

/// k-means clustering in CIE Lab.
///
/// Clusters are formed in Lab so perceptually close colors group together,
/// but each cluster is reported as the mean sRGB of its member pixels, which
/// keeps flat images exact.
#[derive(Debug, Clone)]
pub struct KMeans {
    filter: PixelFilter,
    max_iter: usize,
    converge: f32,
    seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(PixelFilter::default())
    }
}

impl KMeans {
    pub fn new(filter: PixelFilter) -> Self {
        Self {
            filter,
            max_iter: MAX_ITER,
            converge: CONVERGE,
            seed: SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl PaletteExtractor for KMeans {
    fn name(&self) -> &'static str {
        "kmeans"
    }

    fn extract(&self, surface: &PixelSurface, count: usize) -> Result<Palette, ExtractionError> {
        check_request(surface, count)?;

        let colors = self.filter.collect(surface);
        let distinct = colors
            .iter()
            .map(|c| [c.red, c.green, c.blue])
            .collect::<HashSet<_>>()
            .len();
        // k-means++ seeding needs at least k distinct points.
        let k = count.min(distinct);
        if k == 0 {
            return Err(ExtractionError::NoColors);
        }

        let lab_pixels: Vec<Lab> = colors
            .iter()
            .map(|c| {
                let linear: LinSrgb = c.into_linear();
                linear.into_color()
            })
            .collect();

        let result = get_kmeans(k, self.max_iter, self.converge, false, &lab_pixels, self.seed);
        log::debug!(
            "kmeans: k={k} over {} pixels, score {}",
            lab_pixels.len(),
            result.score
        );

        // `Sort::sort_indexed_colors` would rank the Lab centroids, but the
        // reported color is the member mean in sRGB, so the counts and sums
        // are gathered in the same pass.
        let mut population = vec![0u64; result.centroids.len()];
        let mut sums = vec![[0u64; 3]; result.centroids.len()];
        for (color, &cluster) in colors.iter().zip(&result.indices) {
            let cluster = cluster as usize;
            population[cluster] += 1;
            sums[cluster][0] += color.red as u64;
            sums[cluster][1] += color.green as u64;
            sums[cluster][2] += color.blue as u64;
        }

        let palette = Palette::ranked(population.iter().zip(&sums).filter(|(n, _)| **n > 0).map(
            |(&n, sum)| {
                let channel = |s: u64| ((s + n / 2) / n).min(255) as u8;
                DominantColor {
                    color: ColorSample::new(channel(sum[0]), channel(sum[1]), channel(sum[2])),
                    population: n,
                }
            },
        ));
        if palette.is_empty() {
            return Err(ExtractionError::NoColors);
        }
        Ok(palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(pixels: &[[u8; 4]]) -> PixelSurface {
        PixelSurface::new(pixels.len() as u32, 1, pixels.concat()).unwrap()
    }

    #[test]
    fn single_color_is_reproduced_exactly() {
        let s = surface(&[[200, 100, 50, 255]; 16]);
        let palette = KMeans::default().extract(&s, 5).unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.entries()[0].color, ColorSample::new(200, 100, 50));
        assert_eq!(palette.entries()[0].population, 16);
    }

    #[test]
    fn separates_well_spread_colors() {
        let mut pixels = vec![[255, 0, 0, 255]; 8];
        pixels.extend([[0, 0, 255, 255]; 4]);
        let palette = KMeans::default().extract(&surface(&pixels), 2).unwrap();
        let colors: Vec<_> = palette.colors().collect();
        assert_eq!(colors, vec![ColorSample::new(255, 0, 0), ColorSample::new(0, 0, 255)]);
    }

    #[test]
    fn stays_within_requested_count() {
        let pixels: Vec<[u8; 4]> = (0..64u8)
            .map(|v| [v * 4, 255 - v * 4, v.wrapping_mul(37), 255])
            .collect();
        let s = surface(&pixels);
        for count in [1, 3, 8] {
            let palette = KMeans::default().with_seed(7).extract(&s, count).unwrap();
            assert!(!palette.is_empty() && palette.len() <= count);
            assert_eq!(palette.sampled(), 64);
        }
    }

    #[test]
    fn rejects_empty_surface_and_bad_count() {
        let empty = PixelSurface::new(0, 0, Vec::new()).unwrap();
        assert_eq!(
            KMeans::default().extract(&empty, 3),
            Err(ExtractionError::EmptySurface)
        );
        let s = surface(&[[0, 0, 0, 255]]);
        assert!(matches!(
            KMeans::default().extract(&s, 0),
            Err(ExtractionError::InvalidCount { .. })
        ));
    }
}
