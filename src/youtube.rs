use std::collections::HashMap;
use std::time::Duration;

use eyre::{Result, WrapErr, bail};
use log::debug;
use serde::Deserialize;

use crate::formats::MediaFormat;
use crate::subtitle;

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const REFERER: &str = "https://www.youtube.com/";

/// Structured video description as reported by yt-dlp
#[derive(Debug, Deserialize)]
pub struct VideoInfo {
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<f64>,
    pub thumbnail: Option<String>,
    pub view_count: Option<u64>,
    pub upload_date: Option<String>,
    #[serde(default)]
    pub subtitles: HashMap<String, Vec<SubtitleTrack>>,
    #[serde(default)]
    pub formats: Vec<MediaFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubtitleTrack {
    pub url: String,
}

/// Resolve video metadata via yt-dlp without downloading any media
pub async fn extract_video_info(url: &str) -> Result<VideoInfo> {
    debug!("resolving video info: {url}");

    let output = tokio::process::Command::new("yt-dlp")
        .args([
            "--dump-single-json",
            "--no-warnings",
            "--no-playlist",
            "--skip-download",
            "--socket-timeout",
            "30",
            "--user-agent",
            USER_AGENT,
            "--referer",
            REFERER,
            "--add-headers",
            "Accept-Language:en-us,en;q=0.5",
            url,
        ])
        .output()
        .await;

    let output = match output {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            bail!(
                "yt-dlp not found. Install it to resolve video metadata:\n  \
                 pip install yt-dlp\n  \
                 or: brew install yt-dlp"
            );
        }
        Err(e) => return Err(e).wrap_err("failed to run yt-dlp"),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("yt-dlp exited with status {}: {}", output.status, stderr.trim());
    }

    serde_json::from_slice(&output.stdout).wrap_err("failed to parse yt-dlp output")
}

fn first_preferred_track<'a>(
    info: &'a VideoInfo,
    langs: &'a [String],
) -> Option<(&'a str, &'a SubtitleTrack)> {
    langs.iter().find_map(|lang| {
        info.subtitles
            .get(lang)
            .and_then(|tracks| tracks.first())
            .map(|track| (lang.as_str(), track))
    })
}

/// Fetch and normalize the first caption track matching the language
/// preference order. `Ok(None)` when no preferred language has captions;
/// HTTP failures propagate so the caller can fall back to transcription.
pub async fn fetch_subtitle(
    client: &reqwest::Client,
    info: &VideoInfo,
    langs: &[String],
) -> Result<Option<String>> {
    let Some((lang, track)) = first_preferred_track(info, langs) else {
        return Ok(None);
    };
    debug!("fetching {lang} caption track: {}", track.url);

    let payload = client
        .get(&track.url)
        .header("User-Agent", USER_AGENT)
        .header("Referer", REFERER)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let mut text = subtitle::subtitle_to_text(&payload);
    if subtitle::is_simplified_chinese(lang) {
        text = subtitle::s2hk(&text);
    }
    Ok(Some(text))
}

/// Download the selected format's bytes directly over HTTP
pub async fn download_audio(client: &reqwest::Client, format: &MediaFormat) -> Result<Vec<u8>> {
    let Some(url) = format.url.as_deref() else {
        bail!("selected format {} has no download URL", format.format_id);
    };
    debug!("downloading audio format {}", format.format_id);

    let resp = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .header("Referer", REFERER)
        .timeout(Duration::from_secs(60))
        .send()
        .await
        .and_then(|r| r.error_for_status());

    let resp = match resp {
        Ok(r) => r,
        Err(e) if e.status() == Some(reqwest::StatusCode::FORBIDDEN) => {
            bail!("YouTube blocked audio download (HTTP 403). Try again later or use a different video.");
        }
        Err(e) => return Err(e).wrap_err("failed to download audio"),
    };

    let bytes = resp.bytes().await?.to_vec();
    debug!("downloaded {} bytes of audio", bytes.len());
    Ok(bytes)
}
