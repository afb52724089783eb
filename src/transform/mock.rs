use super::naming::generate_name;
use super::TransformService;
use crate::models::{Action, ProcessedResult, ProcessingOptions, SourceFile};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Records calls and echoes the source bytes back under the generated name.
pub struct MockTransformer {
    process_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
    output: Option<Vec<u8>>,
}

impl MockTransformer {
    pub fn new() -> Self {
        Self {
            process_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
            output: None,
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn with_output(mut self, output: Vec<u8>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn set_failure(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    pub fn get_process_count(&self) -> usize {
        *self.process_count.lock().unwrap()
    }
}

impl Default for MockTransformer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransformService for MockTransformer {
    async fn process(
        &self,
        file: &SourceFile,
        action: Action,
        options: &ProcessingOptions,
    ) -> Result<ProcessedResult> {
        *self.process_count.lock().unwrap() += 1;

        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::encode(
                options.format.extension(),
                "Mock failure",
            ));
        }

        let bytes = self
            .output
            .clone()
            .unwrap_or_else(|| file.bytes().to_vec());

        Ok(ProcessedResult {
            name: generate_name(file.name(), options.format, action),
            mime_type: options.format.mime_type().to_string(),
            original_size: file.size(),
            new_size: bytes.len() as u64,
            bytes,
            width: options.width,
            height: options.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutputFormat;

    fn file() -> SourceFile {
        SourceFile::new(b"fake image data".to_vec(), "image/png", "test.png")
    }

    #[tokio::test]
    async fn test_mock_transformer() {
        let transformer = MockTransformer::new();
        let options = ProcessingOptions::new(OutputFormat::Webp, 0.5).unwrap();

        let result = transformer
            .process(&file(), Action::Convert, &options)
            .await
            .unwrap();

        assert_eq!(result.name, "test_converted.webp");
        assert_eq!(result.bytes, b"fake image data");
        assert_eq!(transformer.get_process_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_with_output() {
        let transformer = MockTransformer::new().with_output(vec![1, 2, 3]);

        let result = transformer
            .process(&file(), Action::Compress, &ProcessingOptions::default())
            .await
            .unwrap();

        assert_eq!(result.new_size, 3);
        assert_eq!(result.original_size, 15);
    }

    #[tokio::test]
    async fn test_mock_with_failure() {
        let transformer = MockTransformer::new().with_failure(true);

        let result = transformer
            .process(&file(), Action::Resize, &ProcessingOptions::default())
            .await;
        assert!(result.is_err());
        assert_eq!(transformer.get_process_count(), 1);
    }
}
