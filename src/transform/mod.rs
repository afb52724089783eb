//! Raster transform pipeline
//!
//! Resolves output dimensions, re-renders the source image at that size and
//! encodes it to the requested format. Documents bypass the raster path and
//! are returned unchanged under a new name.

pub mod dimensions;
pub mod encode;
pub mod mock;
pub mod naming;
pub mod processor;

pub use dimensions::resolve;
pub use encode::{EncodePolicy, Encoded};
pub use mock::MockTransformer;
pub use naming::generate_name;
pub use processor::TransformProcessor;

use crate::models::{Action, ProcessedResult, ProcessingOptions, SourceFile};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TransformService: Send + Sync {
    async fn process(
        &self,
        file: &SourceFile,
        action: Action,
        options: &ProcessingOptions,
    ) -> Result<ProcessedResult>;
}
