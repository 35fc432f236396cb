//! Upload flow: file chosen -> bytes read -> decoded -> palette -> swatches.
//!
//! The host delivers events to one [`UploadController`]. Every accepted file
//! starts a new generation; completions carry the [`Ticket`] of the upload
//! they belong to and are dropped when a newer upload or a clear happened in
//! between.

use std::fmt;

use crate::config::ExtractConfig;
use crate::decode::{ImageDecoder, PixelSurface, is_image_type};
use crate::error::{ConfigError, CopyError, DecodeError, ExtractionError};
use crate::extract::{Palette, PaletteExtractor, extractor_for};
use crate::hex::HexColor;
use crate::render::{Clipboard, Swatch, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Empty,
    Loading,
    Decoded,
    Extracting,
    Ready,
    Error,
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UploadState::Empty => "empty",
            UploadState::Loading => "loading",
            UploadState::Decoded => "decoded",
            UploadState::Extracting => "extracting",
            UploadState::Ready => "ready",
            UploadState::Error => "error",
        };
        f.write_str(name)
    }
}

/// The single status line shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    NotAnImage,
    Extracting,
    Extracted(usize),
    NoColors,
    ProcessingFailed,
    LoadFailed,
    Copied(HexColor),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => Ok(()),
            Status::NotAnImage => f.write_str("Please select an image file."),
            Status::Extracting => f.write_str("Extracting palette…"),
            Status::Extracted(n) => write!(
                f,
                "Palette of {n} colors extracted successfully. Click to copy the code."
            ),
            Status::NoColors => f.write_str("Unable to extract colors from this image."),
            Status::ProcessingFailed => {
                f.write_str("Error processing image. Try a different image.")
            }
            Status::LoadFailed => f.write_str("Error loading the image."),
            Status::Copied(hex) => write!(f, "{hex} copied!"),
        }
    }
}

/// Identifies one upload. Stale tickets are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }

    pub(crate) fn from_generation(generation: u64) -> Self {
        Ticket(generation)
    }
}

/// What happened to a completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Applied; the session is now in this state.
    Applied(UploadState),
    /// Belonged to a superseded upload and was discarded.
    Stale,
}

#[derive(Debug, Default)]
struct UploadSession {
    generation: u64,
    state: UploadState,
    file_name: Option<String>,
    declared_type: String,
    surface: Option<PixelSurface>,
    palette: Palette,
    swatches: Vec<Swatch>,
    status: Status,
}

impl UploadSession {
    /// Drops everything derived from the previous image and invalidates its tickets.
    fn reset(&mut self) {
        self.generation += 1;
        self.state = UploadState::Empty;
        self.file_name = None;
        self.declared_type.clear();
        self.surface = None;
        self.palette = Palette::default();
        self.swatches.clear();
        self.status = Status::Idle;
    }
}

pub struct UploadController {
    decoder: ImageDecoder,
    extractor: Box<dyn PaletteExtractor>,
    color_count: usize,
    session: UploadSession,
}

impl UploadController {
    pub fn new(config: &ExtractConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_extractor(
            ImageDecoder::new(config.max_decoded_pixels),
            extractor_for(config),
            config.color_count,
        ))
    }

    pub fn with_extractor(
        decoder: ImageDecoder,
        extractor: Box<dyn PaletteExtractor>,
        color_count: usize,
    ) -> Self {
        Self {
            decoder,
            extractor,
            color_count,
            session: UploadSession::default(),
        }
    }

    /// A file was picked or dropped.
    ///
    /// Non-images only change the status line; the current session, including
    /// any upload in flight, is left alone.
    pub fn select_file(&mut self, name: &str, declared_type: &str) -> Result<Ticket, DecodeError> {
        if !is_image_type(declared_type) {
            log::warn!("rejected {name}: `{declared_type}` is not an image type");
            self.session.status = Status::NotAnImage;
            return Err(DecodeError::NotAnImage {
                declared_type: declared_type.to_string(),
            });
        }

        self.session.reset();
        self.session.state = UploadState::Loading;
        self.session.file_name = Some(name.to_string());
        self.session.declared_type = declared_type.to_string();
        log::debug!("upload {} started: {name}", self.session.generation);
        Ok(Ticket(self.session.generation))
    }

    /// The host finished reading the file behind `ticket`.
    ///
    /// Decodes and extracts in one go; there is no suspension point after
    /// the bytes arrive.
    pub fn complete_read(&mut self, ticket: Ticket, bytes: &[u8]) -> Completion {
        if !self.accepts(ticket) {
            return Completion::Stale;
        }

        match self.decoder.decode(bytes, &self.session.declared_type) {
            Ok(surface) => {
                self.session.surface = Some(surface);
                self.session.state = UploadState::Decoded;
                Completion::Applied(self.extract_current())
            }
            Err(e) => {
                log::warn!("upload {} failed to decode: {e}", ticket.0);
                self.fail_loading();
                Completion::Applied(UploadState::Error)
            }
        }
    }

    /// The host could not read the file behind `ticket`.
    pub fn fail_read(&mut self, ticket: Ticket) -> Completion {
        if !self.accepts(ticket) {
            return Completion::Stale;
        }
        log::warn!("upload {} could not be read", ticket.0);
        self.fail_loading();
        Completion::Applied(UploadState::Error)
    }

    pub fn clear(&mut self) {
        self.session.reset();
        log::debug!("session cleared, generation {}", self.session.generation);
    }

    /// Hands the hex label of swatch `index` to the clipboard.
    ///
    /// The status line is untouched: an asynchronous clipboard has only
    /// started the write when this returns. Report the finished write with
    /// [`copy_succeeded`](Self::copy_succeeded).
    pub fn start_copy(
        &self,
        index: usize,
        clipboard: &mut dyn Clipboard,
    ) -> Result<HexColor, CopyError> {
        let swatch = self
            .session
            .swatches
            .get(index)
            .ok_or(CopyError::NoSuchSwatch(index))?;
        Ok(swatch.copy_to(clipboard)?)
    }

    /// The clipboard confirmed the write of `hex`.
    ///
    /// Ignored when `hex` is no longer one of the current swatches.
    pub fn copy_succeeded(&mut self, hex: HexColor) -> bool {
        if !self.session.swatches.iter().any(|s| s.hex == hex) {
            log::debug!("discarding copy confirmation for {hex}");
            return false;
        }
        self.session.status = Status::Copied(hex);
        true
    }

    /// Copies swatch `index` through a clipboard that has finished the write
    /// by the time `write_text` returns.
    pub fn copy_swatch(
        &mut self,
        index: usize,
        clipboard: &mut dyn Clipboard,
    ) -> Result<HexColor, CopyError> {
        let hex = self.start_copy(index, clipboard)?;
        self.copy_succeeded(hex);
        Ok(hex)
    }

    pub fn state(&self) -> UploadState {
        self.session.state
    }

    pub fn status(&self) -> Status {
        self.session.status
    }

    pub fn file_name(&self) -> Option<&str> {
        self.session.file_name.as_deref()
    }

    pub fn surface(&self) -> Option<&PixelSurface> {
        self.session.surface.as_ref()
    }

    pub fn palette(&self) -> &Palette {
        &self.session.palette
    }

    pub fn swatches(&self) -> &[Swatch] {
        &self.session.swatches
    }

    pub fn color_count(&self) -> usize {
        self.color_count
    }

    fn accepts(&self, ticket: Ticket) -> bool {
        let current = ticket.0 == self.session.generation
            && self.session.state == UploadState::Loading;
        if !current {
            log::debug!(
                "discarding completion for upload {} (current {})",
                ticket.0,
                self.session.generation
            );
        }
        current
    }

    fn fail_loading(&mut self) {
        self.session.surface = None;
        self.session.state = UploadState::Error;
        self.session.status = Status::LoadFailed;
    }

    fn extract_current(&mut self) -> UploadState {
        self.session.state = UploadState::Extracting;
        self.session.status = Status::Extracting;
        self.session.palette = Palette::default();
        self.session.swatches.clear();

        let result = match &self.session.surface {
            Some(surface) => self.extractor.extract(surface, self.color_count),
            None => Err(ExtractionError::EmptySurface),
        };

        match result {
            Ok(palette) if !palette.is_empty() => {
                log::info!(
                    "{}: {} colors from {}",
                    self.extractor.name(),
                    palette.len(),
                    self.session.file_name.as_deref().unwrap_or("<unnamed>")
                );
                self.session.swatches = render(&palette);
                self.session.status = Status::Extracted(palette.len());
                self.session.palette = palette;
                self.session.state = UploadState::Ready;
            }
            Ok(_) | Err(ExtractionError::EmptySurface | ExtractionError::NoColors) => {
                log::warn!("no colors extracted");
                self.session.status = Status::NoColors;
                self.session.state = UploadState::Error;
            }
            Err(e) => {
                log::warn!("extraction failed: {e}");
                self.session.status = Status::ProcessingFailed;
                self.session.state = UploadState::Error;
            }
        }
        self.session.state
    }
}
