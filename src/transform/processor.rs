use super::dimensions::resolve;
use super::encode::{EncodePolicy, Encoded};
use super::naming::generate_name;
use super::TransformService;
use crate::mime;
use crate::models::{
    validate_quality, Action, Config, OutputFormat, ProcessedResult, ProcessingOptions, SourceFile,
};
use crate::{Error, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use std::time::Duration;
use tracing::{debug, info};

/// Runs the decode, resize and encode pipeline for a single file.
pub struct TransformProcessor {
    policy: EncodePolicy,
    timeout: Option<Duration>,
}

impl Default for TransformProcessor {
    fn default() -> Self {
        Self::new(EncodePolicy::default())
    }
}

impl TransformProcessor {
    pub fn new(policy: EncodePolicy) -> Self {
        Self {
            policy,
            timeout: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let processor = Self::new(EncodePolicy::new(config.max_dimension));
        match config.timeout_secs {
            Some(secs) => processor.with_timeout(Duration::from_secs(secs)),
            None => processor,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn passthrough(file: &SourceFile, action: Action) -> ProcessedResult {
        ProcessedResult {
            bytes: file.bytes().to_vec(),
            name: generate_name(file.name(), OutputFormat::Pdf, action),
            mime_type: file.mime_type().to_string(),
            original_size: file.size(),
            new_size: file.size(),
            width: None,
            height: None,
        }
    }

    fn transform_sync(
        policy: EncodePolicy,
        file: SourceFile,
        action: Action,
        options: ProcessingOptions,
    ) -> Result<ProcessedResult> {
        let source =
            image::load_from_memory(file.bytes()).map_err(|e| Error::Decode(e.to_string()))?;

        let (width, height) = resolve(
            source.width(),
            source.height(),
            options.width,
            options.height,
            action,
        );
        debug!(
            "Resolved {}x{} -> {}x{} for {}",
            source.width(),
            source.height(),
            width,
            height,
            action
        );
        policy.check_surface(width, height, options.format)?;

        let surface = if (width, height) == (source.width(), source.height()) {
            source
        } else {
            source.resize_exact(width, height, FilterType::Lanczos3)
        };

        let bytes = match policy.encode(&surface, options.format, action, options.quality)? {
            Encoded::Bytes(bytes) => bytes,
            Encoded::Passthrough => {
                return Err(Error::Invariant(format!(
                    "{} output cannot come from a raster surface",
                    options.format
                )))
            }
        };

        Ok(ProcessedResult {
            name: generate_name(file.name(), options.format, action),
            mime_type: options.format.mime_type().to_string(),
            original_size: file.size(),
            new_size: bytes.len() as u64,
            bytes,
            width: Some(width),
            height: Some(height),
        })
    }

    async fn transform(
        &self,
        file: &SourceFile,
        action: Action,
        options: &ProcessingOptions,
    ) -> Result<ProcessedResult> {
        let task = tokio::task::spawn_blocking({
            let policy = self.policy;
            let file = file.clone();
            let options = *options;
            move || Self::transform_sync(policy, file, action, options)
        });

        let joined = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, task)
                .await
                .map_err(|_| Error::Timeout(timeout))?,
            None => task.await,
        };

        joined.map_err(|e| Error::Invariant(format!("Transform task join error: {}", e)))?
    }
}

#[async_trait]
impl TransformService for TransformProcessor {
    async fn process(
        &self,
        file: &SourceFile,
        action: Action,
        options: &ProcessingOptions,
    ) -> Result<ProcessedResult> {
        let mime_type = file.mime_type();
        if !mime::is_supported(mime_type) {
            return Err(Error::UnsupportedType(mime_type.to_string()));
        }
        validate_quality(options.quality)?;

        info!(
            "Processing {} ({}, {} bytes) action={} format={}",
            file.name(),
            mime_type,
            file.size(),
            action,
            options.format
        );

        if mime::is_document(mime_type) || options.format == OutputFormat::Pdf {
            debug!("Passing {} through without rasterizing", file.name());
            return Ok(Self::passthrough(file, action));
        }

        let result = self.transform(file, action, options).await?;
        info!(
            "Produced {} ({} -> {} bytes)",
            result.name, result.original_size, result.new_size
        );
        Ok(result)
    }
}
