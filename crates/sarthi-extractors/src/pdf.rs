//! PDF text extraction using pdf-extract.

use async_trait::async_trait;

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::SourceExtractor;
use sarthi_core::types::SourceType;

use crate::fetch::fetch_bytes;

/// PDF extractor.
///
/// Downloads the document and runs the synchronous pdf-extract parser inside
/// `spawn_blocking` so it never stalls the async runtime.
pub struct PdfExtractor {
    client: reqwest::Client,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceExtractor for PdfExtractor {
    async fn extract(&self, url: &str) -> SarthiResult<String> {
        let bytes = fetch_bytes(&self.client, url, SourceType::Pdf).await?;

        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                SarthiError::extraction(SourceType::Pdf, format!("extraction task failed: {}", e))
            })?
            .map_err(|e| {
                SarthiError::extraction(SourceType::Pdf, format!("pdf parse failed: {}", e))
            })?;

        Ok(text)
    }

    fn source_type(&self) -> SourceType {
        SourceType::Pdf
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}
