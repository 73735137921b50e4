//! Study material rows and their closed status/source enums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Kind of artifact a material was ingested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    Pdf,
    Image,
    VideoLink,
    WebpageLink,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Pdf => "pdf",
            SourceType::Image => "image",
            SourceType::VideoLink => "video-link",
            SourceType::WebpageLink => "webpage-link",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(SourceType::Pdf),
            "image" => Some(SourceType::Image),
            "video-link" => Some(SourceType::VideoLink),
            "webpage-link" => Some(SourceType::WebpageLink),
            _ => None,
        }
    }

    /// Classify a submitted link. YouTube URLs become video materials,
    /// everything else is treated as a webpage.
    pub fn from_link(link: &str) -> Self {
        let is_youtube = Url::parse(link)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .map(|host| {
                let host = host.trim_start_matches("www.");
                host == "youtube.com" || host == "youtu.be" || host == "m.youtube.com"
            })
            .unwrap_or(false);
        if is_youtube {
            SourceType::VideoLink
        } else {
            SourceType::WebpageLink
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Background-processing status of a material.
///
/// Transitions are monotonic: `Pending -> Processing -> Completed | Failed`.
/// Only the pipeline worker moves a material forward; nothing moves one back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Pending => "pending",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProcessingStatus::Pending),
            "processing" => Some(ProcessingStatus::Processing),
            "completed" => Some(ProcessingStatus::Completed),
            "failed" => Some(ProcessingStatus::Failed),
            _ => None,
        }
    }

    /// Whether the pipeline may move a material from `self` to `next`.
    pub fn can_transition_to(&self, next: ProcessingStatus) -> bool {
        matches!(
            (self, next),
            (ProcessingStatus::Pending, ProcessingStatus::Processing)
                | (ProcessingStatus::Processing, ProcessingStatus::Completed)
                | (ProcessingStatus::Processing, ProcessingStatus::Failed)
        )
    }
}

/// One uploaded or linked artifact attached to a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyMaterial {
    /// Opaque unique identifier.
    pub id: String,
    /// Frame this material belongs to.
    pub frame_id: String,
    /// Owning user.
    pub owner_id: String,
    /// Display title (file name, or derived from the link).
    pub title: String,
    /// What kind of source this is.
    pub source_type: SourceType,
    /// Where the raw content lives (uploaded-file URL or submitted link).
    pub source_uri: String,
    /// External storage handle for uploaded binaries; `None` for links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_id: Option<String>,
    /// Pipeline status.
    pub status: ProcessingStatus,
    /// LLM-generated summary, present once processing completed with one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a material row (status starts `Pending`).
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub frame_id: String,
    pub owner_id: String,
    pub title: String,
    pub source_type: SourceType,
    pub source_uri: String,
    pub storage_id: Option<String>,
}

impl NewMaterial {
    /// Describe a submitted link. Detects YouTube vs webpage and derives a
    /// human title from the URL.
    pub fn from_link(frame_id: impl Into<String>, owner_id: impl Into<String>, link: &str) -> Self {
        Self {
            frame_id: frame_id.into(),
            owner_id: owner_id.into(),
            title: title_from_link(link),
            source_type: SourceType::from_link(link),
            source_uri: link.to_string(),
            storage_id: None,
        }
    }
}

/// Derive a display title from a link: last path segment with separators
/// mapped to spaces and the first letter capitalized, falling back to the
/// host, then to "Untitled".
pub fn title_from_link(link: &str) -> String {
    let parsed = match Url::parse(link) {
        Ok(u) => u,
        Err(_) => return "Untitled".to_string(),
    };

    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .map(|s| s.to_string())
        .or_else(|| parsed.host_str().map(|h| h.to_string()));

    match segment {
        Some(seg) => {
            let spaced = seg.replace(['-', '_'], " ");
            let mut chars = spaced.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => "Untitled".to_string(),
            }
        }
        None => "Untitled".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_transitions_are_monotonic() {
        use ProcessingStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Failed.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Failed));
    }

    #[test]
    fn link_classification() {
        assert_eq!(
            SourceType::from_link("https://www.youtube.com/watch?v=abc123"),
            SourceType::VideoLink
        );
        assert_eq!(
            SourceType::from_link("https://youtu.be/abc123"),
            SourceType::VideoLink
        );
        assert_eq!(
            SourceType::from_link("https://example.com/article"),
            SourceType::WebpageLink
        );
    }

    #[test]
    fn title_derivation() {
        assert_eq!(
            title_from_link("https://example.com/intro-to-rust"),
            "Intro to rust"
        );
        assert_eq!(
            title_from_link("https://example.com/deep_learning/"),
            "Deep learning"
        );
        assert_eq!(title_from_link("https://example.com/"), "Example.com");
        assert_eq!(title_from_link("not a url"), "Untitled");
    }

    #[test]
    fn source_type_round_trip() {
        for ty in [
            SourceType::Pdf,
            SourceType::Image,
            SourceType::VideoLink,
            SourceType::WebpageLink,
        ] {
            assert_eq!(SourceType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(SourceType::parse("docx"), None);
    }
}
