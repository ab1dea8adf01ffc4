use eyre::{Result, bail};
use log::debug;
use serde::Deserialize;

/// One format variant reported by the metadata resolver.
///
/// yt-dlp reports codec-less entries (storyboards, manifests) in the same
/// list; `vcodec`/`acodec` are `"none"` when a stream is explicitly absent
/// and missing entirely when yt-dlp does not know.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaFormat {
    #[serde(default)]
    pub format_id: String,
    pub url: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub filesize: Option<f64>,
    pub filesize_approx: Option<f64>,
}

impl MediaFormat {
    /// A usable audio stream is present
    pub fn has_audio(&self) -> bool {
        matches!(self.acodec.as_deref(), Some(c) if !c.is_empty() && c != "none")
    }

    /// No video stream, audio-only variant
    pub fn video_absent(&self) -> bool {
        self.vcodec.as_deref() == Some("none")
    }

    /// Size in bytes, preferring exact over approximate; zero or absent is unknown
    pub fn size_bytes(&self) -> Option<u64> {
        match self.filesize {
            Some(n) if n > 0.0 => Some(n as u64),
            _ => match self.filesize_approx {
                Some(n) if n > 0.0 => Some(n as u64),
                _ => None,
            },
        }
    }

    fn acodec_contains(&self, needles: &[&str]) -> bool {
        let codec = self.acodec.as_deref().unwrap_or("").to_lowercase();
        needles.iter().any(|needle| codec.contains(needle))
    }
}

/// Pick the single cheapest audio-capable format to download.
///
/// Ranked tiers in priority order: opus audio-only, then aac/mp4a audio-only,
/// then anything else that carries audio (video stream tolerated). Within the
/// first non-empty tier the smallest known size wins; unknown size orders
/// last. Fails only when no format carries audio at all.
pub fn select_audio_format(formats: &[MediaFormat]) -> Result<&MediaFormat> {
    let audio: Vec<&MediaFormat> = formats.iter().filter(|f| f.has_audio()).collect();
    if audio.is_empty() {
        bail!("no audio format available");
    }

    let tiers: [(&str, fn(&MediaFormat) -> bool); 3] = [
        ("high-efficiency", |f| f.video_absent() && f.acodec_contains(&["opus"])),
        ("medium-efficiency", |f| {
            f.video_absent() && f.acodec_contains(&["aac", "mp4a"])
        }),
        ("fallback", |_| true),
    ];

    for (tier, matches) in tiers {
        let best = audio
            .iter()
            .copied()
            .filter(|f| matches(f))
            .min_by_key(|f| f.size_bytes().unwrap_or(u64::MAX));
        if let Some(format) = best {
            debug!(
                "selected format {} ({tier}): acodec={} size={:?}",
                format.format_id,
                format.acodec.as_deref().unwrap_or("?"),
                format.size_bytes()
            );
            return Ok(format);
        }
    }

    // The catch-all tier above makes this unreachable; kept so selection
    // cannot fail once an audio-capable format exists.
    Ok(audio[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(id: &str, acodec: Option<&str>, vcodec: Option<&str>, filesize: Option<f64>) -> MediaFormat {
        MediaFormat {
            format_id: id.to_string(),
            url: Some(format!("https://example.com/{id}")),
            vcodec: vcodec.map(String::from),
            acodec: acodec.map(String::from),
            filesize,
            filesize_approx: None,
        }
    }

    #[test]
    fn test_never_selects_audioless_format() {
        let formats = vec![
            fmt("video-only", Some("none"), Some("avc1"), Some(1000.0)),
            fmt("storyboard", None, None, None),
        ];
        assert!(select_audio_format(&formats).is_err());
    }

    #[test]
    fn test_empty_list_is_an_error() {
        assert!(select_audio_format(&[]).is_err());
    }

    #[test]
    fn test_prefers_opus_audio_only() {
        let formats = vec![
            fmt("aac-small", Some("mp4a.40.2"), Some("none"), Some(100.0)),
            fmt("opus-large", Some("opus"), Some("none"), Some(9000.0)),
            fmt("muxed", Some("opus"), Some("vp9"), Some(50.0)),
        ];
        let selected = select_audio_format(&formats).unwrap();
        assert_eq!(selected.format_id, "opus-large");
    }

    #[test]
    fn test_smallest_size_wins_within_tier() {
        let formats = vec![
            fmt("opus-big", Some("opus"), Some("none"), Some(5000.0)),
            fmt("opus-small", Some("opus"), Some("none"), Some(1200.0)),
            fmt("opus-mid", Some("opus"), Some("none"), Some(3000.0)),
        ];
        let selected = select_audio_format(&formats).unwrap();
        assert_eq!(selected.format_id, "opus-small");
    }

    #[test]
    fn test_unknown_size_orders_last() {
        let formats = vec![
            fmt("opus-unknown", Some("opus"), Some("none"), None),
            fmt("opus-known", Some("opus"), Some("none"), Some(8_000_000.0)),
        ];
        let selected = select_audio_format(&formats).unwrap();
        assert_eq!(selected.format_id, "opus-known");
    }

    #[test]
    fn test_zero_size_counts_as_unknown() {
        let formats = vec![
            fmt("opus-zero", Some("opus"), Some("none"), Some(0.0)),
            fmt("opus-known", Some("opus"), Some("none"), Some(500.0)),
        ];
        let selected = select_audio_format(&formats).unwrap();
        assert_eq!(selected.format_id, "opus-known");
    }

    #[test]
    fn test_medium_tier_when_no_opus() {
        let formats = vec![
            fmt("muxed", Some("mp4a.40.2"), Some("avc1"), Some(100.0)),
            fmt("aac", Some("mp4a.40.2"), Some("none"), Some(2000.0)),
        ];
        let selected = select_audio_format(&formats).unwrap();
        assert_eq!(selected.format_id, "aac");
    }

    #[test]
    fn test_fallback_accepts_muxed_formats() {
        let formats = vec![
            fmt("video-only", Some("none"), Some("avc1"), Some(10.0)),
            fmt("muxed-big", Some("mp3"), Some("avc1"), Some(9000.0)),
            fmt("muxed-small", Some("mp3"), Some("avc1"), Some(4000.0)),
        ];
        let selected = select_audio_format(&formats).unwrap();
        assert_eq!(selected.format_id, "muxed-small");
    }

    #[test]
    fn test_approximate_size_used_when_exact_missing() {
        let mut with_approx = fmt("approx", Some("opus"), Some("none"), None);
        with_approx.filesize_approx = Some(1500.5);
        let formats = vec![with_approx, fmt("exact", Some("opus"), Some("none"), Some(2000.0))];
        let selected = select_audio_format(&formats).unwrap();
        assert_eq!(selected.format_id, "approx");
    }

    #[test]
    fn test_exact_size_preferred_over_approximate() {
        let mut f = fmt("both", Some("opus"), Some("none"), Some(100.0));
        f.filesize_approx = Some(99999.0);
        assert_eq!(f.size_bytes(), Some(100));
    }

    #[test]
    fn test_deserializes_ytdlp_format_entry() {
        let json = r#"{
            "format_id": "251",
            "url": "https://example.com/251",
            "vcodec": "none",
            "acodec": "opus",
            "filesize": 3145728,
            "abr": 128.5,
            "ext": "webm"
        }"#;
        let format: MediaFormat = serde_json::from_str(json).unwrap();
        assert_eq!(format.format_id, "251");
        assert!(format.has_audio());
        assert!(format.video_absent());
        assert_eq!(format.size_bytes(), Some(3_145_728));
    }

    #[test]
    fn test_deserializes_sparse_format_entry() {
        let format: MediaFormat = serde_json::from_str(r#"{"format_id": "sb0"}"#).unwrap();
        assert!(!format.has_audio());
        assert!(!format.video_absent());
        assert_eq!(format.size_bytes(), None);
    }
}
