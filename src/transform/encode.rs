//! Image encoder abstraction
//!
//! One encoder per raster output format behind a common trait, plus the
//! policy that decides which quality an action encodes with.

use crate::models::{Action, OutputFormat, DEFAULT_MAX_DIMENSION};
use crate::{Error, Result};
use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use image::codecs::png::PngEncoder as ImagePngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder as _};
use std::io::Cursor;

/// Quality used by actions the user does not tune.
pub const FIXED_QUALITY: f32 = 0.9;

/// Compress honours the caller's quality; resize and convert always use
/// [`FIXED_QUALITY`].
pub fn effective_quality(action: Action, quality: f32) -> f32 {
    match action {
        Action::Compress => quality,
        Action::Resize | Action::Convert => FIXED_QUALITY,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Encoded {
    Bytes(Vec<u8>),
    /// Target is a document format; the caller keeps the source bytes.
    Passthrough,
}

/// Trait for raster encoders.
pub trait RasterEncoder: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// Encode `surface` with `quality` in `0.0..=1.0`.
    fn encode(&self, surface: &DynamicImage, quality: f32) -> Result<Vec<u8>>;
}

/// Baseline JPEG. Alpha is flattened away.
pub struct JpegEncoder;

impl RasterEncoder for JpegEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jpeg
    }

    fn encode(&self, surface: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
        let rgb = surface.to_rgb8();
        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, percent(quality).max(1));

        encoder
            .write_image(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                ExtendedColorType::Rgb8,
            )
            .map_err(|e| Error::encode("jpeg", e))?;

        Ok(output.into_inner())
    }
}

/// Lossless PNG; quality is ignored.
pub struct PngEncoder;

impl RasterEncoder for PngEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Png
    }

    fn encode(&self, surface: &DynamicImage, _quality: f32) -> Result<Vec<u8>> {
        let rgba = surface.to_rgba8();
        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new(&mut output);

        encoder
            .write_image(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| Error::encode("png", e))?;

        Ok(output.into_inner())
    }
}

/// Lossy WebP through libwebp, honouring quality.
///
/// The `image` crate only ships a lossless WebP encoder.
pub struct WebpEncoder;

impl RasterEncoder for WebpEncoder {
    fn format(&self) -> OutputFormat {
        OutputFormat::Webp
    }

    fn encode(&self, surface: &DynamicImage, quality: f32) -> Result<Vec<u8>> {
        let rgba = surface.to_rgba8();
        let memory = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height())
            .encode_simple(false, f32::from(percent(quality)))
            .map_err(|e| Error::encode("webp", format!("{:?}", e)))?;

        Ok(memory.to_vec())
    }
}

/// Map a `0.0..=1.0` fraction onto the `0..=100` scale encoders take.
fn percent(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Create the encoder for `format`; `None` for document formats.
pub fn encoder_for(format: OutputFormat) -> Option<Box<dyn RasterEncoder>> {
    match format {
        OutputFormat::Jpeg => Some(Box::new(JpegEncoder)),
        OutputFormat::Png => Some(Box::new(PngEncoder)),
        OutputFormat::Webp => Some(Box::new(WebpEncoder)),
        OutputFormat::Pdf => None,
    }
}

/// Applies quality policy and surface limits around the format encoders.
#[derive(Debug, Clone, Copy)]
pub struct EncodePolicy {
    max_dimension: u32,
}

impl Default for EncodePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DIMENSION)
    }
}

impl EncodePolicy {
    pub fn new(max_dimension: u32) -> Self {
        Self { max_dimension }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    /// Reject surfaces the encoders cannot take.
    pub fn check_surface(&self, width: u32, height: u32, format: OutputFormat) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::encode(
                format.extension(),
                format!("empty surface {}x{}", width, height),
            ));
        }
        if width > self.max_dimension || height > self.max_dimension {
            return Err(Error::encode(
                format.extension(),
                format!(
                    "surface {}x{} exceeds the {} pixel limit per side",
                    width, height, self.max_dimension
                ),
            ));
        }
        Ok(())
    }

    pub fn encode(
        &self,
        surface: &DynamicImage,
        format: OutputFormat,
        action: Action,
        quality: f32,
    ) -> Result<Encoded> {
        let Some(encoder) = encoder_for(format) else {
            return Ok(Encoded::Passthrough);
        };

        self.check_surface(surface.width(), surface.height(), format)?;

        let quality = effective_quality(action, quality);
        tracing::debug!(
            "Encoding {}x{} surface as {} (quality {:.2})",
            surface.width(),
            surface.height(),
            encoder.format(),
            quality
        );

        let bytes = encoder.encode(surface, quality)?;
        if bytes.is_empty() {
            return Err(Error::encode(format.extension(), "encoder produced no output"));
        }
        Ok(Encoded::Bytes(bytes))
    }
}
