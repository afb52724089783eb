//! Command-line orchestration: load, select, process and save one file.

use crate::models::{
    format_file_size, Action, Config, OutputFormat, ProcessedResult, ProcessingOptions, SourceFile,
};
use crate::session::Session;
use crate::transform::{TransformProcessor, TransformService};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// One invocation of the pipeline as requested on the command line.
#[derive(Debug, Clone)]
pub struct Request {
    pub inputs: Vec<PathBuf>,
    pub action: Action,
    pub options: ProcessingOptions,
}

/// Where a processed file ended up, with its metadata.
#[derive(Debug)]
pub struct Outcome {
    pub path: PathBuf,
    pub action: Action,
    pub result: ProcessedResult,
}

impl Outcome {
    pub fn report(&self) -> serde_json::Value {
        serde_json::json!({
            "path": self.path,
            "action": self.action,
            "result": self.result,
            "compression_ratio": self.result.compression_ratio(),
            "message": self.result.summary(self.action),
        })
    }
}

pub struct App {
    service: Box<dyn TransformService>,
    output_dir: PathBuf,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self::with_service(Box::new(TransformProcessor::from_config(config)), config)
    }

    /// Build an app around an injected transform service.
    pub fn with_service(service: Box<dyn TransformService>, config: &Config) -> Self {
        Self {
            service,
            output_dir: config.output_dir.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn run(&self, request: Request) -> Result<Outcome> {
        let mut session = Session::new();

        let mut files = Vec::with_capacity(request.inputs.len());
        for path in &request.inputs {
            let file = SourceFile::load(path).await?;
            info!(
                "Loaded {} ({}, {})",
                file.name(),
                file.mime_type(),
                format_file_size(file.size())
            );
            files.push(file);
        }

        session.select_files(files)?;
        session.select_action(request.action);
        check_format(&session, request.options.format)?;

        let result = session
            .process(self.service.as_ref(), &request.options)
            .await?
            .clone();

        fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(&result.name);
        fs::write(&path, &result.bytes).await?;

        info!(
            "Saved {} ({} -> {})",
            path.display(),
            format_file_size(result.original_size),
            format_file_size(result.new_size)
        );

        Ok(Outcome {
            path,
            action: request.action,
            result,
        })
    }
}

fn check_format(session: &Session, format: OutputFormat) -> Result<()> {
    if session.allowed_formats().contains(&format) {
        return Ok(());
    }
    let action = session
        .action()
        .map(|action| action.to_string())
        .unwrap_or_else(|| "none".to_string());
    Err(Error::invalid_option(
        "format",
        format!("{} is not available for action {}", format, action),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::MockTransformer;

    fn config(dir: &Path) -> Config {
        Config {
            output_dir: dir.to_path_buf(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_run_writes_output() {
        let input_dir = tempfile::tempdir().unwrap();
        let output_dir = tempfile::tempdir().unwrap();
        let input = input_dir.path().join("scan.pdf");
        std::fs::write(&input, b"%PDF-1.4 test").unwrap();

        let app = App::with_service(
            Box::new(MockTransformer::new()),
            &config(&output_dir.path().join("nested")),
        );
        let outcome = app
            .run(Request {
                inputs: vec![input],
                action: Action::Convert,
                options: ProcessingOptions::new(OutputFormat::Pdf, 0.8).unwrap(),
            })
            .await
            .unwrap();

        assert!(outcome.path.ends_with("nested/scan_converted.pdf"));
        assert_eq!(std::fs::read(&outcome.path).unwrap(), b"%PDF-1.4 test");
        assert_eq!(outcome.report()["message"], "File processed successfully!");
    }

    #[tokio::test]
    async fn test_pdf_format_rejected_for_compress() {
        let input_dir = tempfile::tempdir().unwrap();
        let input = input_dir.path().join("a.png");
        std::fs::write(&input, [0x89, 0x50, 0x4E, 0x47]).unwrap();

        let service = MockTransformer::new();
        let app = App::with_service(Box::new(service), &config(input_dir.path()));
        let err = app
            .run(Request {
                inputs: vec![input],
                action: Action::Compress,
                options: ProcessingOptions::new(OutputFormat::Pdf, 0.8).unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOption { .. }));
    }

    #[tokio::test]
    async fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::with_service(Box::new(MockTransformer::new()), &config(dir.path()));

        let err = app
            .run(Request {
                inputs: vec![dir.path().join("missing.png")],
                action: Action::Resize,
                options: ProcessingOptions::default(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
