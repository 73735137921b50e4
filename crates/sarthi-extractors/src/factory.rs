//! Assembly of the default extractor registry.

use std::sync::Arc;

use sarthi_core::pipeline::ExtractorSet;

/// Build the extractor registry for every source type enabled at compile
/// time. Webpage links always get an extractor: the rendered fetch with the
/// default `headless` feature, the static fetch when it is disabled.
pub fn default_extractor_set() -> ExtractorSet {
    let set = ExtractorSet::new();

    #[cfg(feature = "pdf")]
    let set = set.register(Arc::new(crate::pdf::PdfExtractor::new()));

    #[cfg(feature = "ocr")]
    let set = set.register(Arc::new(crate::image::ImageExtractor::new()));

    #[cfg(feature = "video")]
    let set = set.register(Arc::new(crate::video::VideoExtractor::new()));

    #[cfg(feature = "headless")]
    let set = set.register(Arc::new(crate::webpage::HeadlessWebpageExtractor::new()));
    #[cfg(not(feature = "headless"))]
    let set = set.register(Arc::new(crate::webpage::StaticWebpageExtractor::new()));

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use sarthi_core::types::SourceType;

    #[test]
    fn webpage_extractor_is_always_present() {
        let set = default_extractor_set();
        assert!(set.get(SourceType::WebpageLink).is_ok());
    }

    #[cfg(feature = "headless")]
    #[test]
    fn default_build_renders_webpages() {
        let set = default_extractor_set();
        let extractor = set.get(SourceType::WebpageLink).unwrap();
        assert_eq!(extractor.name(), "headless-webpage");
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn pdf_extractor_is_registered() {
        let set = default_extractor_set();
        assert!(set.get(SourceType::Pdf).is_ok());
    }

    #[cfg(not(feature = "ocr"))]
    #[test]
    fn missing_extractor_is_an_error() {
        let set = default_extractor_set();
        assert!(set.get(SourceType::Image).is_err());
    }
}
