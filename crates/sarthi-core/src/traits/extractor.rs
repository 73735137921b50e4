//! Source extractor trait.

use async_trait::async_trait;

use crate::error::SarthiResult;
use crate::types::SourceType;

/// One text-extraction strategy per source type.
///
/// Implementations fetch the content behind `url` and return plain text.
/// Any network or parse failure surfaces as an error; the pipeline treats an
/// empty result as a failure too, so extractors don't need to special-case
/// it themselves.
#[async_trait]
pub trait SourceExtractor: Send + Sync {
    /// Extract plain text from the content at `url`.
    async fn extract(&self, url: &str) -> SarthiResult<String>;

    /// The source type this extractor handles.
    fn source_type(&self) -> SourceType;

    /// Human-readable implementation name, for logs.
    fn name(&self) -> &str;
}
