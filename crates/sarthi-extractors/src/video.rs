//! YouTube transcript extraction.
//!
//! Fetches the watch page, scrapes the video title and description from its
//! meta tags, locates the caption track list in the embedded player config,
//! then downloads and flattens the timedtext transcript. The result is a
//! labeled blob (`Title:` / `Description:` / `Transcript:`) so chunks keep
//! that context. Videos without captions fail with an extraction error.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;

use sarthi_core::error::{SarthiError, SarthiResult};
use sarthi_core::traits::SourceExtractor;
use sarthi_core::types::SourceType;

use crate::fetch::fetch_text;

/// Transcript extractor for YouTube links.
pub struct VideoExtractor {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode", default)]
    language_code: String,
}

impl VideoExtractor {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Pull the video id out of the common YouTube URL shapes.
    fn parse_video_id(link: &str) -> Option<String> {
        let url = url::Url::parse(link).ok()?;
        let host = url.host_str()?;

        if host == "youtu.be" {
            return url
                .path_segments()?
                .find(|s| !s.is_empty())
                .map(str::to_string);
        }

        if !host.ends_with("youtube.com") {
            return None;
        }

        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        match segments.next() {
            Some("watch") => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some("embed") | Some("shorts") | Some("live") => segments.next().map(str::to_string),
            _ => None,
        }
    }

    /// Slice the `captionTracks` array out of the watch page and parse it.
    fn parse_caption_tracks(page: &str) -> Option<Vec<CaptionTrack>> {
        let start = page.find("\"captionTracks\":")? + "\"captionTracks\":".len();
        let rest = &page[start..];
        let open = rest.find('[')?;

        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, c) in rest[open..].char_indices() {
            if in_string {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        let raw = &rest[open..open + i + 1];
                        return serde_json::from_str(raw).ok();
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Prefer an English track, fall back to whatever is first.
    fn pick_track(tracks: Vec<CaptionTrack>) -> Option<CaptionTrack> {
        let english = tracks
            .iter()
            .position(|t| t.language_code.starts_with("en"));
        let index = english.unwrap_or(0);
        tracks.into_iter().nth(index)
    }

    /// Flatten timedtext XML into plain text. Entities are decoded by the
    /// HTML parser.
    fn transcript_text(timedtext: &str) -> String {
        let document = Html::parse_fragment(timedtext);
        let selector = Selector::parse("text").expect("static selector");
        document
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Title and description from the watch page's meta tags. The `<title>`
    /// element is the fallback, with YouTube's suffix stripped.
    fn page_metadata(page: &str) -> (String, String) {
        let document = Html::parse_document(page);
        let meta_content = |selector: &str| -> Option<String> {
            let selector = Selector::parse(selector).ok()?;
            document
                .select(&selector)
                .find_map(|el| el.value().attr("content"))
                .map(str::to_string)
        };

        let title = meta_content(r#"meta[property="og:title"]"#)
            .or_else(|| {
                let selector = Selector::parse("title").ok()?;
                document.select(&selector).next().map(|el| {
                    el.text()
                        .collect::<String>()
                        .trim_end_matches(" - YouTube")
                        .trim()
                        .to_string()
                })
            })
            .unwrap_or_default();
        let description = meta_content(r#"meta[property="og:description"]"#)
            .or_else(|| meta_content(r#"meta[name="description"]"#))
            .unwrap_or_default();
        (title, description)
    }

    /// Assemble the labeled blob handed to the chunker.
    fn labeled_text(page: &str, transcript: &str) -> String {
        let (title, description) = Self::page_metadata(page);
        format!(
            "Title: {}\nDescription: {}\nTranscript: {}",
            title, description, transcript
        )
    }
}

impl Default for VideoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceExtractor for VideoExtractor {
    async fn extract(&self, url: &str) -> SarthiResult<String> {
        let video_id = Self::parse_video_id(url).ok_or_else(|| {
            SarthiError::extraction(SourceType::VideoLink, "not a recognizable YouTube link")
        })?;

        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let page = fetch_text(&self.client, &watch_url, SourceType::VideoLink).await?;

        let tracks = Self::parse_caption_tracks(&page).ok_or_else(|| {
            SarthiError::extraction(SourceType::VideoLink, "no caption tracks on this video")
        })?;
        let track = Self::pick_track(tracks).ok_or_else(|| {
            SarthiError::extraction(SourceType::VideoLink, "empty caption track list")
        })?;

        // baseUrl is HTML-escaped inside the embedded JSON
        let track_url = track.base_url.replace("\\u0026", "&");
        let timedtext = fetch_text(&self.client, &track_url, SourceType::VideoLink).await?;

        Ok(Self::labeled_text(&page, &Self::transcript_text(&timedtext)))
    }

    fn source_type(&self) -> SourceType {
        SourceType::VideoLink
    }

    fn name(&self) -> &str {
        "youtube-transcript"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watch_urls() {
        assert_eq!(
            VideoExtractor::parse_video_id("https://www.youtube.com/watch?v=abc123XYZ_-"),
            Some("abc123XYZ_-".to_string())
        );
        assert_eq!(
            VideoExtractor::parse_video_id("https://m.youtube.com/watch?v=abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn parses_short_and_embed_urls() {
        assert_eq!(
            VideoExtractor::parse_video_id("https://youtu.be/abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            VideoExtractor::parse_video_id("https://www.youtube.com/embed/abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            VideoExtractor::parse_video_id("https://www.youtube.com/shorts/abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn rejects_non_youtube_urls() {
        assert_eq!(
            VideoExtractor::parse_video_id("https://example.com/watch?v=abc123"),
            None
        );
        assert_eq!(VideoExtractor::parse_video_id("not a url"), None);
    }

    #[test]
    fn slices_caption_tracks_from_page() {
        let page = r#"junk"captionTracks":[{"baseUrl":"https://example.com/timedtext?v=1","languageCode":"en"},{"baseUrl":"https://example.com/timedtext?v=2","languageCode":"de"}],"more":true"#;
        let tracks = VideoExtractor::parse_caption_tracks(page).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].language_code, "en");
    }

    #[test]
    fn prefers_english_track() {
        let tracks = vec![
            CaptionTrack {
                base_url: "https://example.com/de".into(),
                language_code: "de".into(),
            },
            CaptionTrack {
                base_url: "https://example.com/en".into(),
                language_code: "en-US".into(),
            },
        ];
        let track = VideoExtractor::pick_track(tracks).unwrap();
        assert_eq!(track.base_url, "https://example.com/en");
    }

    #[test]
    fn scrapes_title_and_description_from_meta() {
        let page = r#"<html><head>
            <meta property="og:title" content="Cell Biology 101">
            <meta property="og:description" content="An intro lecture.">
            <title>Cell Biology 101 - YouTube</title>
            </head><body></body></html>"#;
        let (title, description) = VideoExtractor::page_metadata(page);
        assert_eq!(title, "Cell Biology 101");
        assert_eq!(description, "An intro lecture.");
    }

    #[test]
    fn falls_back_to_the_page_title() {
        let page = "<html><head><title>Cell Biology 101 - YouTube</title></head></html>";
        let (title, description) = VideoExtractor::page_metadata(page);
        assert_eq!(title, "Cell Biology 101");
        assert_eq!(description, "");
    }

    #[test]
    fn labels_title_description_and_transcript() {
        let page = r#"<html><head>
            <meta property="og:title" content="Mitosis">
            <meta property="og:description" content="How cells divide.">
            </head></html>"#;
        assert_eq!(
            VideoExtractor::labeled_text(page, "cells divide in phases"),
            "Title: Mitosis\nDescription: How cells divide.\nTranscript: cells divide in phases"
        );
    }

    #[test]
    fn flattens_timedtext() {
        let xml = r#"<transcript><text start="0" dur="2">hello &amp; welcome</text><text start="2" dur="2">to the course</text></transcript>"#;
        assert_eq!(
            VideoExtractor::transcript_text(xml),
            "hello & welcome to the course"
        );
    }
}
