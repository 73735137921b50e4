//! Webpage text extraction.
//!
//! Rendered fetch through a headless browser by default (feature
//! `headless`), so script-generated content is captured. Disabling the
//! feature falls back to a static HTTP fetch.

use async_trait::async_trait;
use scraper::{Html, Selector};

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::SourceExtractor;
use sarthi_core::types::SourceType;

use crate::fetch::fetch_text;

/// Collect readable text from an HTML document, skipping script and style
/// content.
fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body").expect("static selector");
    let skip = Selector::parse("script, style, noscript").expect("static selector");

    let Some(body) = document.select(&body).next() else {
        return String::new();
    };

    let skipped: Vec<_> = body.select(&skip).flat_map(|el| el.text()).collect();
    body.text()
        .filter(|t| !skipped.contains(t))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Webpage extractor using a plain HTTP fetch.
pub struct StaticWebpageExtractor {
    client: reqwest::Client,
}

impl StaticWebpageExtractor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for StaticWebpageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceExtractor for StaticWebpageExtractor {
    async fn extract(&self, url: &str) -> SarthiResult<String> {
        let html = fetch_text(&self.client, url, SourceType::WebpageLink).await?;
        Ok(html_to_text(&html))
    }

    fn source_type(&self) -> SourceType {
        SourceType::WebpageLink
    }

    fn name(&self) -> &str {
        "static-webpage"
    }
}

/// Webpage extractor that renders the page in headless Chrome first, so
/// script-generated content is included.
#[cfg(feature = "headless")]
pub struct HeadlessWebpageExtractor;

#[cfg(feature = "headless")]
impl HeadlessWebpageExtractor {
    pub fn new() -> Self {
        Self
    }

    fn render(url: &str) -> SarthiResult<String> {
        use headless_chrome::Browser;

        let err = |e: anyhow::Error| {
            SarthiError::extraction(SourceType::WebpageLink, format!("render failed: {}", e))
        };

        let browser = Browser::default().map_err(err)?;
        let tab = browser.new_tab().map_err(err)?;
        tab.navigate_to(url).map_err(err)?;
        tab.wait_until_navigated().map_err(err)?;
        tab.get_content().map_err(err)
    }
}

#[cfg(feature = "headless")]
impl Default for HeadlessWebpageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "headless")]
#[async_trait]
impl SourceExtractor for HeadlessWebpageExtractor {
    async fn extract(&self, url: &str) -> SarthiResult<String> {
        let url = url.to_string();
        // Browser control is synchronous; keep it off the async runtime.
        let html = tokio::task::spawn_blocking(move || Self::render(&url))
            .await
            .map_err(|e| {
                SarthiError::extraction(
                    SourceType::WebpageLink,
                    format!("extraction task failed: {}", e),
                )
            })??;
        Ok(html_to_text(&html))
    }

    fn source_type(&self) -> SourceType {
        SourceType::WebpageLink
    }

    fn name(&self) -> &str {
        "headless-webpage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_body_text() {
        let html = r#"<html><head><title>t</title></head>
            <body><h1>Photosynthesis</h1><p>Plants make food.</p></body></html>"#;
        let text = html_to_text(html);
        assert!(text.contains("Photosynthesis"));
        assert!(text.contains("Plants make food."));
    }

    #[test]
    fn skips_scripts_and_styles() {
        let html = r#"<html><body>
            <script>var secret = 1;</script>
            <style>.x { color: red; }</style>
            <p>visible</p></body></html>"#;
        let text = html_to_text(html);
        assert!(text.contains("visible"));
        assert!(!text.contains("secret"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn empty_document_yields_empty_text() {
        assert_eq!(html_to_text(""), "");
    }
}
