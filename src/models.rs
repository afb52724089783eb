//! Data models and structures
//!
//! Defines the source file, processing options, actions and results passed
//! through the transform pipeline, plus environment configuration.

use crate::mime;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The transform intent; governs dimension and quality policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Compress,
    Resize,
    Convert,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Compress => "compress",
            Action::Resize => "resize",
            Action::Convert => "convert",
        }
    }

    /// Suffix inserted before the extension of generated file names.
    pub fn suffix(&self) -> &'static str {
        match self {
            Action::Compress => "_compressed",
            Action::Resize => "_resized",
            Action::Convert => "_converted",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "compress" => Ok(Action::Compress),
            "resize" => Ok(Action::Resize),
            "convert" => Ok(Action::Convert),
            other => Err(Error::invalid_option(
                "action",
                format!("unknown action '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => mime::IMAGE_JPEG,
            OutputFormat::Png => mime::IMAGE_PNG,
            OutputFormat::Webp => mime::IMAGE_WEBP,
            OutputFormat::Pdf => mime::APPLICATION_PDF,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(Error::invalid_option(
                "format",
                format!("unknown format '{}'", other),
            )),
        }
    }
}

/// Quality used when no caller value is supplied.
pub const DEFAULT_QUALITY: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProcessingOptions {
    pub format: OutputFormat,
    /// Fraction in `0.0..=1.0`.
    pub quality: f32,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: DEFAULT_QUALITY,
            width: None,
            height: None,
        }
    }
}

impl ProcessingOptions {
    pub fn new(format: OutputFormat, quality: f32) -> Result<Self> {
        Ok(Self {
            format,
            quality: validate_quality(quality)?,
            width: None,
            height: None,
        })
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }
}

pub fn validate_quality(quality: f32) -> Result<f32> {
    if quality.is_nan() || !(0.0..=1.0).contains(&quality) {
        return Err(Error::invalid_option(
            "quality",
            format!("{} is outside 0.0..=1.0", quality),
        ));
    }
    Ok(quality)
}

/// A selected input file. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    bytes: Vec<u8>,
    mime_type: String,
    name: String,
}

impl SourceFile {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            name: name.into(),
        }
    }

    /// Read a file from disk, detecting its type from content and extension.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let mime_type = mime::detect(path, &bytes);
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::Invariant(format!("Invalid file name: {}", path.display())))?
            .to_string();

        Ok(Self::new(bytes, mime_type, name))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Output of one pipeline invocation, owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedResult {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub name: String,
    pub mime_type: String,
    pub original_size: u64,
    pub new_size: u64,
    /// Output dimensions; `None` when the bytes were passed through.
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ProcessedResult {
    /// Percentage of the original size saved. Negative when the output grew.
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (self.original_size as f64 - self.new_size as f64) / self.original_size as f64 * 100.0
    }

    pub fn summary(&self, action: Action) -> String {
        // Compared at display precision so a saving never reads as 0.0%.
        let ratio = (self.compression_ratio() * 10.0).round() / 10.0;
        if action == Action::Compress && ratio > 0.0 {
            format!("File compressed successfully! Reduced by {:.1}%", ratio)
        } else {
            "File processed successfully!".to_string()
        }
    }
}

/// Human readable byte count, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let mut text = format!("{:.2}", value);
    if text.contains('.') {
        text = text.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", text, UNITS[unit])
}

// Configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub output_dir: PathBuf,
    pub default_quality: f32,
    pub max_dimension: u32,
    pub timeout_secs: Option<u64>,
}

pub const DEFAULT_MAX_DIMENSION: u32 = 16384;

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            default_quality: DEFAULT_QUALITY,
            max_dimension: DEFAULT_MAX_DIMENSION,
            timeout_secs: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let default_quality = match parse_env::<f32>("FILEPRESS_DEFAULT_QUALITY")? {
            Some(quality) => validate_quality(quality)?,
            None => defaults.default_quality,
        };
        let max_dimension = match parse_env::<u32>("FILEPRESS_MAX_DIMENSION")? {
            Some(0) => {
                return Err(Error::invalid_option(
                    "FILEPRESS_MAX_DIMENSION",
                    "must be positive",
                ))
            }
            Some(max) => max,
            None => defaults.max_dimension,
        };

        Ok(Self {
            output_dir: std::env::var("FILEPRESS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            default_quality,
            max_dimension,
            timeout_secs: parse_env::<u64>("FILEPRESS_TIMEOUT_SECS")?,
        })
    }
}

fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::invalid_option(key, format!("cannot parse '{}'", raw))),
        Err(_) => Ok(None),
    }
}
