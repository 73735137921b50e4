//! Image text extraction via Tesseract OCR.

use async_trait::async_trait;

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::SourceExtractor;
use sarthi_core::types::SourceType;

use crate::fetch::fetch_bytes;

/// OCR extractor for photographed or scanned notes.
///
/// Downloads the image and runs Tesseract inside `spawn_blocking`. The image
/// is converted to grayscale first, which is the format Tesseract expects.
pub struct ImageExtractor {
    client: reqwest::Client,
}

impl ImageExtractor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn ocr(bytes: &[u8]) -> SarthiResult<String> {
        use rusty_tesseract::{Args, Image};

        let img = image::load_from_memory(bytes).map_err(|e| {
            SarthiError::extraction(SourceType::Image, format!("image decode failed: {}", e))
        })?;

        let gray = image::DynamicImage::ImageLuma8(img.to_luma8());
        let tesseract_image = Image::from_dynamic_image(&gray).map_err(|e| {
            SarthiError::extraction(SourceType::Image, format!("image convert failed: {}", e))
        })?;

        rusty_tesseract::image_to_string(&tesseract_image, &Args::default()).map_err(|e| {
            SarthiError::extraction(SourceType::Image, format!("ocr failed: {}", e))
        })
    }
}

impl Default for ImageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceExtractor for ImageExtractor {
    async fn extract(&self, url: &str) -> SarthiResult<String> {
        let bytes = fetch_bytes(&self.client, url, SourceType::Image).await?;

        tokio::task::spawn_blocking(move || Self::ocr(&bytes))
            .await
            .map_err(|e| {
                SarthiError::extraction(SourceType::Image, format!("extraction task failed: {}", e))
            })?
    }

    fn source_type(&self) -> SourceType {
        SourceType::Image
    }

    fn name(&self) -> &str {
        "tesseract-ocr"
    }
}
