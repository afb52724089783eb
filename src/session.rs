//! Selection state for one interactive processing session
//!
//! Holds the accepted files, the chosen action and the last result. Each
//! selection overwrites the previous one wholesale. A failed run leaves the
//! selection in place so the caller can retry with different options.

use crate::mime;
use crate::models::{Action, OutputFormat, ProcessedResult, ProcessingOptions, SourceFile};
use crate::transform::TransformService;
use crate::{Error, Result};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    files: Vec<SourceFile>,
    action: Option<Action>,
    result: Option<ProcessedResult>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            files: Vec::new(),
            action: None,
            result: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Keep the supported files out of `files`. Returns how many were kept.
    pub fn select_files(&mut self, files: Vec<SourceFile>) -> Result<usize> {
        let offered = files.len();
        let accepted: Vec<SourceFile> = files
            .into_iter()
            .filter(|file| {
                let supported = mime::is_supported(file.mime_type());
                if !supported {
                    warn!(
                        "[{}] Skipping {}: unsupported type {}",
                        self.id,
                        file.name(),
                        file.mime_type()
                    );
                }
                supported
            })
            .collect();

        if accepted.is_empty() {
            return Err(Error::UnsupportedType(format!(
                "none of the {} selected file(s) is an image or PDF",
                offered
            )));
        }

        info!(
            "[{}] Selected {} of {} file(s)",
            self.id,
            accepted.len(),
            offered
        );
        self.files = accepted;
        self.result = None;
        Ok(self.files.len())
    }

    pub fn select_action(&mut self, action: Action) {
        self.action = Some(action);
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn action(&self) -> Option<Action> {
        self.action
    }

    pub fn result(&self) -> Option<&ProcessedResult> {
        self.result.as_ref()
    }

    /// Output formats offered for the selected action.
    pub fn allowed_formats(&self) -> &'static [OutputFormat] {
        match self.action {
            Some(Action::Compress) | Some(Action::Resize) => {
                &[OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Webp]
            }
            Some(Action::Convert) => &[
                OutputFormat::Jpeg,
                OutputFormat::Png,
                OutputFormat::Webp,
                OutputFormat::Pdf,
            ],
            None => &[],
        }
    }

    /// Transform the first selected file with the selected action.
    pub async fn process(
        &mut self,
        service: &dyn TransformService,
        options: &ProcessingOptions,
    ) -> Result<&ProcessedResult> {
        let (Some(file), Some(action)) = (self.files.first(), self.action) else {
            return Err(Error::NothingSelected(
                "select a file and an action first".to_string(),
            ));
        };

        if self.files.len() > 1 {
            info!(
                "[{}] Only the first of {} files is processed",
                self.id,
                self.files.len()
            );
        }

        match service.process(file, action, options).await {
            Ok(result) => {
                info!("[{}] {}", self.id, result.summary(action));
                Ok(self.result.insert(result))
            }
            Err(e) => {
                warn!("[{}] Processing {} failed: {}", self.id, file.name(), e);
                self.result = None;
                Err(e)
            }
        }
    }

    /// Clear files, action and result.
    pub fn reset(&mut self) {
        self.files.clear();
        self.action = None;
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::MockTransformer;
    use tokio_test::{assert_err, assert_ok};

    fn image_file(name: &str) -> SourceFile {
        SourceFile::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png", name)
    }

    fn text_file() -> SourceFile {
        SourceFile::new(b"hi".to_vec(), "text/plain", "notes.txt")
    }

    #[test]
    fn test_select_filters_unsupported() {
        let mut session = Session::new();
        let kept = assert_ok!(session.select_files(vec![text_file(), image_file("a.png")]));
        assert_eq!(kept, 1);
        assert_eq!(session.files()[0].name(), "a.png");
    }

    #[test]
    fn test_select_nothing_supported_keeps_previous() {
        let mut session = Session::new();
        assert_ok!(session.select_files(vec![image_file("keep.png")]));

        let err = assert_err!(session.select_files(vec![text_file()]));
        assert!(matches!(err, Error::UnsupportedType(_)));
        assert_eq!(session.files()[0].name(), "keep.png");
    }

    #[test]
    fn test_allowed_formats() {
        let mut session = Session::new();
        assert!(session.allowed_formats().is_empty());

        session.select_action(Action::Resize);
        assert!(!session.allowed_formats().contains(&OutputFormat::Pdf));

        session.select_action(Action::Convert);
        assert!(session.allowed_formats().contains(&OutputFormat::Pdf));
    }

    #[tokio::test]
    async fn test_process_requires_selection() {
        let mut session = Session::new();
        let service = MockTransformer::new();

        let err = assert_err!(
            session
                .process(&service, &ProcessingOptions::default())
                .await
        );
        assert!(matches!(err, Error::NothingSelected(_)));

        assert_ok!(session.select_files(vec![image_file("a.png")]));
        let err = assert_err!(
            session
                .process(&service, &ProcessingOptions::default())
                .await
        );
        assert!(matches!(err, Error::NothingSelected(_)));
        assert_eq!(service.get_process_count(), 0);
    }

    #[tokio::test]
    async fn test_process_first_file_only() {
        let mut session = Session::new();
        let service = MockTransformer::new();
        assert_ok!(session.select_files(vec![image_file("first.png"), image_file("second.png")]));
        session.select_action(Action::Compress);

        let result = assert_ok!(
            session
                .process(&service, &ProcessingOptions::default())
                .await
        );
        assert_eq!(result.name, "first_compressed.jpeg");
        assert_eq!(service.get_process_count(), 1);
        assert!(session.result().is_some());
    }

    #[tokio::test]
    async fn test_failure_preserves_selection() {
        let mut session = Session::new();
        let service = MockTransformer::new().with_failure(true);
        assert_ok!(session.select_files(vec![image_file("a.png")]));
        session.select_action(Action::Convert);

        assert_err!(
            session
                .process(&service, &ProcessingOptions::default())
                .await
        );
        assert!(session.result().is_none());
        assert_eq!(session.files().len(), 1);
        assert_eq!(session.action(), Some(Action::Convert));

        service.set_failure(false);
        assert_ok!(
            session
                .process(&service, &ProcessingOptions::default())
                .await
        );
        assert_eq!(service.get_process_count(), 2);
    }

    #[test]
    fn test_reset() {
        let mut session = Session::new();
        assert_ok!(session.select_files(vec![image_file("a.png")]));
        session.select_action(Action::Resize);

        session.reset();
        assert!(session.files().is_empty());
        assert_eq!(session.action(), None);
        assert!(session.result().is_none());
    }
}
