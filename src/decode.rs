use image::{GenericImageView, ImageReader};
use std::io::Cursor;

use crate::error::{DecodeError, SurfaceError};

/// Decoded RGBA8 pixels, row-major, 4 samples per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl PixelSurface {
    /// Wraps raw RGBA samples, checking that the length matches the dimensions.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, SurfaceError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or(SurfaceError::Overflow { width, height })?;

        if samples.len() != expected {
            return Err(SurfaceError::LengthMismatch {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn pixel_count(&self) -> usize {
        self.samples.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterates pixels as `[r, g, b, a]`.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.samples
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }
}

/// `true` when a MIME-like type names an image (`image/png`, `IMAGE/JPEG`, ...).
pub fn is_image_type(declared_type: &str) -> bool {
    declared_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Default cap on `width * height` accepted by the decoder.
pub const DEFAULT_MAX_DECODED_PIXELS: u64 = 40_000_000;

/// Turns uploaded file bytes into a [`PixelSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDecoder {
    max_pixels: u64,
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DECODED_PIXELS)
    }
}

impl ImageDecoder {
    pub fn new(max_pixels: u64) -> Self {
        Self { max_pixels }
    }

    /// Decodes `bytes` at natural size into RGBA8.
    ///
    /// `declared_type` is checked first: anything that is not `image/*` fails
    /// with [`DecodeError::NotAnImage`] without looking at the bytes. The
    /// actual format is sniffed from the content, as browsers do.
    pub fn decode(&self, bytes: &[u8], declared_type: &str) -> Result<PixelSurface, DecodeError> {
        if !is_image_type(declared_type) {
            return Err(DecodeError::NotAnImage {
                declared_type: declared_type.to_string(),
            });
        }

        let (header_w, header_h) = Self::inspect_dimensions(bytes)?;
        self.check_pixel_limit(header_w, header_h)?;

        let img = image::load_from_memory(bytes)
            .map_err(|e| DecodeError::DecodeFailure(e.to_string()))?;
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(DecodeError::DecodeFailure(format!(
                "image has no pixels ({width}x{height})"
            )));
        }
        self.check_pixel_limit(width, height)?;

        let surface = PixelSurface::new(width, height, img.to_rgba8().into_raw())?;
        log::debug!("decoded {declared_type} image: {width}x{height}");
        Ok(surface)
    }

    /// Reads only the header so oversized images are refused before the
    /// full decode allocates.
    fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::DecodeFailure(e.to_string()))?;

        if reader.format().is_none() {
            return Err(DecodeError::DecodeFailure(
                "unrecognized image format".to_string(),
            ));
        }

        reader
            .into_dimensions()
            .map_err(|e| DecodeError::DecodeFailure(e.to_string()))
    }

    fn check_pixel_limit(&self, width: u32, height: u32) -> Result<(), DecodeError> {
        let pixels = width as u64 * height as u64;
        if pixels > self.max_pixels {
            return Err(DecodeError::TooLarge {
                pixels,
                limit: self.max_pixels,
            });
        }
        Ok(())
    }
}
