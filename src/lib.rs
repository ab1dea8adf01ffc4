pub mod audio;
pub mod config;
pub mod formats;
pub mod output;
pub mod subtitle;
pub mod summarize;
pub mod transcribe;
pub mod youtube;

use serde::Serialize;

/// How the transcript was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptSource {
    Captions,
    SpeechToText,
}

impl std::fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriptSource::Captions => write!(f, "captions"),
            TranscriptSource::SpeechToText => write!(f, "speech-to-text"),
        }
    }
}

/// Presentation subset of the resolver's video metadata
#[derive(Debug, Clone, Serialize)]
pub struct VideoMeta {
    pub title: String,
    pub author: String,
    pub duration: Option<String>,
    pub thumbnail: Option<String>,
    pub view_count: Option<u64>,
    pub upload_date: Option<String>,
}

/// Complete result of processing one video
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    #[serde(flatten)]
    pub meta: VideoMeta,
    pub transcript: String,
    pub source: TranscriptSource,
    pub summary: Option<String>,
    pub processing_time: String,
    pub url: String,
}

/// Build presentation metadata from resolver output
pub fn video_metadata(info: &youtube::VideoInfo) -> VideoMeta {
    VideoMeta {
        title: info.title.clone().unwrap_or_else(|| "Unknown Title".to_string()),
        author: info.uploader.clone().unwrap_or_else(|| "Unknown Author".to_string()),
        duration: info.duration.filter(|d| *d > 0.0).map(format_duration),
        thumbnail: info.thumbnail.clone(),
        view_count: info.view_count,
        upload_date: info.upload_date.clone(),
    }
}

/// Format a duration in seconds as MM:SS; minutes are not clamped to an hour
pub fn format_duration(seconds: f64) -> String {
    let total = seconds as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Extract video ID from various YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    // Bare 11-character video ID
    if regex::Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap().is_match(input) {
        return Some(input.to_string());
    }

    // youtube.com/watch?v=ID
    if let Some(caps) = regex::Regex::new(r"(?:youtube\.com/watch\?.*v=)([a-zA-Z0-9_-]{11})")
        .unwrap()
        .captures(input)
    {
        return Some(caps[1].to_string());
    }

    // youtu.be/ID
    if let Some(caps) = regex::Regex::new(r"youtu\.be/([a-zA-Z0-9_-]{11})")
        .unwrap()
        .captures(input)
    {
        return Some(caps[1].to_string());
    }

    // youtube.com/embed/ID
    if let Some(caps) = regex::Regex::new(r"youtube\.com/embed/([a-zA-Z0-9_-]{11})")
        .unwrap()
        .captures(input)
    {
        return Some(caps[1].to_string());
    }

    // youtube.com/shorts/ID
    if let Some(caps) = regex::Regex::new(r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})")
        .unwrap()
        .captures(input)
    {
        return Some(caps[1].to_string());
    }

    None
}

/// Rebuild a canonical watch URL from any supported input form, stripping
/// tracking parameters and playlist context
pub fn normalize_video_url(input: &str) -> Option<String> {
    extract_video_id(input).map(|id| format!("https://www.youtube.com/watch?v={id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_video_id() {
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_shorts_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_invalid_url() {
        assert_eq!(extract_video_id("not-a-valid-id"), None);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_whitespace_trimming() {
        assert_eq!(extract_video_id("  dQw4w9WgXcQ  "), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_normalize_watch_url_strips_params() {
        assert_eq!(
            normalize_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLx&t=42"),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_normalize_short_url() {
        assert_eq!(
            normalize_video_url("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_normalize_bare_id() {
        assert_eq!(
            normalize_video_url("dQw4w9WgXcQ"),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_normalize_invalid() {
        assert_eq!(normalize_video_url("https://example.com/video"), None);
    }

    #[test]
    fn test_format_duration_short() {
        assert_eq!(format_duration(65.0), "01:05");
    }

    #[test]
    fn test_format_duration_over_an_hour() {
        assert_eq!(format_duration(3661.0), "61:01");
    }

    #[test]
    fn test_format_duration_truncates_fraction() {
        assert_eq!(format_duration(59.9), "00:59");
    }

    #[test]
    fn test_transcript_source_display() {
        assert_eq!(TranscriptSource::Captions.to_string(), "captions");
        assert_eq!(TranscriptSource::SpeechToText.to_string(), "speech-to-text");
    }
}
