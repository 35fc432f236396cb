//! Median cut over a 5-bit-per-channel histogram.
//!
//! One pass over the sampled pixels fills the histogram; each bucket also
//! keeps the exact channel sums of its pixels, so box averages are exact
//! rather than bucket centers. Boxes are split along their widest channel at
//! the population-weighted median until `count` boxes exist or nothing is
//! left to split.

use crate::decode::PixelSurface;
use crate::error::ExtractionError;
use crate::extract::{
    ColorSample, DominantColor, Palette, PaletteExtractor, PixelFilter, check_request,
};

const SIGBITS: u32 = 5;
const RSHIFT: u32 = 8 - SIGBITS;
const HISTO_SIZE: usize = 1 << (3 * SIGBITS);

/// Share of boxes chosen purely by population; the rest favor large volumes.
const FRACT_BY_POPULATION: f64 = 0.75;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    key: [u8; 3],
    count: u64,
    sum: [u64; 3],
}

#[derive(Debug)]
struct ColorBox {
    buckets: Vec<Bucket>,
    population: u64,
}

impl ColorBox {
    fn new(buckets: Vec<Bucket>) -> Self {
        let population = buckets.iter().map(|b| b.count).sum();
        Self {
            buckets,
            population,
        }
    }

    fn can_split(&self) -> bool {
        self.buckets.len() > 1
    }

    fn ranges(&self) -> [(u8, u8); 3] {
        let mut ranges = [(u8::MAX, u8::MIN); 3];
        for bucket in &self.buckets {
            for (range, &k) in ranges.iter_mut().zip(&bucket.key) {
                range.0 = range.0.min(k);
                range.1 = range.1.max(k);
            }
        }
        ranges
    }

    fn volume(&self) -> u64 {
        self.ranges()
            .iter()
            .map(|&(lo, hi)| (hi - lo) as u64 + 1)
            .product()
    }

    /// Channel with the largest key spread; ties go to the earlier channel.
    fn widest_channel(&self) -> usize {
        let mut widest = 0;
        let mut widest_span = 0;
        for (channel, (lo, hi)) in self.ranges().into_iter().enumerate() {
            let span = hi - lo;
            if span > widest_span {
                widest = channel;
                widest_span = span;
            }
        }
        widest
    }

    fn split(mut self) -> (ColorBox, ColorBox) {
        let channel = self.widest_channel();
        self.buckets
            .sort_unstable_by_key(|b| (b.key[channel], b.key));

        let half = self.population.div_ceil(2);
        let mut acc = 0;
        let mut cut = self.buckets.len() - 1;
        for (i, bucket) in self.buckets.iter().enumerate() {
            acc += bucket.count;
            if acc >= half {
                cut = i + 1;
                break;
            }
        }
        let cut = cut.clamp(1, self.buckets.len() - 1);

        let upper = self.buckets.split_off(cut);
        (ColorBox::new(self.buckets), ColorBox::new(upper))
    }

    fn average(&self) -> ColorSample {
        let mut sum = [0u64; 3];
        for bucket in &self.buckets {
            for (s, b) in sum.iter_mut().zip(&bucket.sum) {
                *s += b;
            }
        }
        let n = self.population.max(1);
        let channel = |s: u64| ((s + n / 2) / n).min(255) as u8;
        ColorSample::new(channel(sum[0]), channel(sum[1]), channel(sum[2]))
    }
}

fn histogram(colors: &[ColorSample]) -> Vec<Bucket> {
    let mut slots = vec![u32::MAX; HISTO_SIZE];
    let mut buckets: Vec<Bucket> = Vec::new();

    for c in colors {
        let key = [c.red >> RSHIFT, c.green >> RSHIFT, c.blue >> RSHIFT];
        let index = ((key[0] as usize) << (2 * SIGBITS))
            | ((key[1] as usize) << SIGBITS)
            | key[2] as usize;

        let slot = &mut slots[index];
        if *slot == u32::MAX {
            *slot = buckets.len() as u32;
            buckets.push(Bucket {
                key,
                count: 0,
                sum: [0; 3],
            });
        }
        let bucket = &mut buckets[*slot as usize];
        bucket.count += 1;
        bucket.sum[0] += c.red as u64;
        bucket.sum[1] += c.green as u64;
        bucket.sum[2] += c.blue as u64;
    }

    buckets
}

/// Index of the splittable box with the highest priority, first one on ties.
fn next_to_split(boxes: &[ColorBox], by_volume: bool) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (i, b) in boxes.iter().enumerate().filter(|(_, b)| b.can_split()) {
        let priority = if by_volume {
            b.population.saturating_mul(b.volume())
        } else {
            b.population
        };
        if best.is_none_or(|(_, p)| priority > p) {
            best = Some((i, priority));
        }
    }
    best.map(|(i, _)| i)
}

/// Histogram median-cut quantizer.
#[derive(Debug, Clone, Default)]
pub struct MedianCut {
    filter: PixelFilter,
}

impl MedianCut {
    pub fn new(filter: PixelFilter) -> Self {
        Self { filter }
    }
}

impl PaletteExtractor for MedianCut {
    fn name(&self) -> &'static str {
        "median-cut"
    }

    fn extract(&self, surface: &PixelSurface, count: usize) -> Result<Palette, ExtractionError> {
        check_request(surface, count)?;

        let colors = self.filter.collect(surface);
        let buckets = histogram(&colors);
        if buckets.is_empty() {
            return Err(ExtractionError::NoColors);
        }
        log::debug!(
            "median cut: {} sampled pixels in {} buckets",
            colors.len(),
            buckets.len()
        );

        let by_population = ((count as f64) * FRACT_BY_POPULATION).ceil() as usize;
        let mut boxes = vec![ColorBox::new(buckets)];
        while boxes.len() < count {
            let by_volume = boxes.len() >= by_population;
            let Some(index) = next_to_split(&boxes, by_volume) else {
                break;
            };
            let (lower, upper) = boxes.remove(index).split();
            boxes.insert(index, upper);
            boxes.insert(index, lower);
        }

        let palette = Palette::ranked(boxes.iter().map(|b| DominantColor {
            color: b.average(),
            population: b.population,
        }));
        if palette.is_empty() {
            return Err(ExtractionError::NoColors);
        }
        Ok(palette)
    }
}
