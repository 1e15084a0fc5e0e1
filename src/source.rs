//! YouTube video ID extraction.
//!
//! The video ID is the naming key for every artifact the pipeline writes, so
//! derivation has to be deterministic for a given URL.

use crate::error::{FortellError, Result};
use regex::Regex;

/// Resolves YouTube URLs (or bare video IDs) to their 11-character video ID.
pub struct VideoSource {
    video_id_regex: Regex,
}

impl VideoSource {
    pub fn new() -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        Self { video_id_regex }
    }

    /// Extract the video ID from a YouTube URL or bare ID.
    pub fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        // Try group 1 (URL format) then group 2 (bare ID)
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Extract the video ID, failing with a typed error on unrecognizable input.
    pub fn resolve(&self, input: &str) -> Result<String> {
        self.extract_video_id(input).ok_or_else(|| {
            FortellError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", input))
        })
    }
}

impl Default for VideoSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let source = VideoSource::new();

        // Test various URL formats
        assert_eq!(
            source.extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            source.extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            source.extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            source.extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );

        // Test invalid inputs
        assert_eq!(source.extract_video_id("not-a-video-id"), None);
        assert_eq!(source.extract_video_id(""), None);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let source = VideoSource::new();
        let first = source.extract_video_id("https://youtu.be/2SRVN9f25v4");
        let second = source.extract_video_id("https://youtu.be/2SRVN9f25v4");
        assert_eq!(first, second);
        assert_eq!(first, Some("2SRVN9f25v4".to_string()));
    }

    #[test]
    fn test_resolve_error_on_bad_input() {
        let source = VideoSource::new();
        assert!(source.resolve("https://example.com/video").is_err());
    }
}
