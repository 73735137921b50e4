//! sarthi-extractors - Source text extraction for study material ingestion.
//!
//! One extractor per source type, each turning a URL into plain text:
//!
//! - **PDF** (feature: `pdf`) - pdf-extract over downloaded bytes
//! - **Image** (feature: `ocr`) - Tesseract OCR over downloaded bytes
//! - **Video link** (feature: `video`) - YouTube caption transcripts
//! - **Webpage link** - static HTML text, or a rendered page with the
//!   `headless` feature for script-heavy sites
//!
//! # Example
//!
//! ```ignore
//! use sarthi_extractors::default_extractor_set;
//!
//! let extractors = default_extractor_set();
//! ```

mod factory;
mod fetch;
#[cfg(feature = "ocr")]
mod image;
#[cfg(feature = "pdf")]
mod pdf;
#[cfg(feature = "video")]
mod video;
mod webpage;

pub use factory::default_extractor_set;
#[cfg(feature = "ocr")]
pub use image::ImageExtractor;
#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;
#[cfg(feature = "video")]
pub use video::VideoExtractor;
#[cfg(feature = "headless")]
pub use webpage::HeadlessWebpageExtractor;
pub use webpage::StaticWebpageExtractor;

// Re-export core types for convenience
pub use sarthi_core::traits::SourceExtractor;
pub use sarthi_core::types::SourceType;
