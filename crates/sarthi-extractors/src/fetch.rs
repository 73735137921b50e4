//! Shared download helper for URL-based extractors.

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::types::SourceType;

/// Download the body behind `url`, failing on non-2xx statuses.
pub(crate) async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    source_type: SourceType,
) -> SarthiResult<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SarthiError::extraction(source_type, format!("download failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(SarthiError::extraction(
            source_type,
            format!("download failed with status {}", response.status()),
        ));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| SarthiError::extraction(source_type, format!("download failed: {}", e)))?;
    Ok(bytes.to_vec())
}

/// Same as [`fetch_bytes`] but decodes the body as text.
pub(crate) async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    source_type: SourceType,
) -> SarthiResult<String> {
    let bytes = fetch_bytes(client, url, source_type).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
