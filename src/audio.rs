use std::path::Path;

use eyre::{Result, bail};
use log::{debug, warn};
use tokio::process::Command;

/// Demuxer hints tried in order before ffmpeg's own auto-detection
const FORMAT_HINTS: &[&str] = &["mp3", "mp4", "m4a", "webm", "ogg"];

/// Re-encode audio to mono 16 kHz 32 kbps MP3 to keep the upload small.
///
/// Falls back to the original bytes when every decode attempt fails or
/// ffmpeg is not installed; transcription tolerates the larger file.
pub async fn optimize_for_transcription(audio: &[u8]) -> Vec<u8> {
    debug!("optimizing {} bytes of audio for transcription", audio.len());

    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            warn!("could not create temp dir for re-encode: {e}");
            return audio.to_vec();
        }
    };
    let source = dir.path().join("source");
    if let Err(e) = tokio::fs::write(&source, audio).await {
        warn!("could not stage audio for re-encode: {e}");
        return audio.to_vec();
    }

    for &hint in FORMAT_HINTS {
        match reencode(&source, Some(hint)).await {
            Ok(bytes) => {
                debug!("re-encoded audio as {hint}: {} bytes", bytes.len());
                return bytes;
            }
            Err(e) => debug!("re-encode with {hint} hint failed: {e}"),
        }
    }

    match reencode(&source, None).await {
        Ok(bytes) => {
            debug!("re-encoded audio via auto-detection: {} bytes", bytes.len());
            bytes
        }
        Err(e) => {
            warn!("audio re-encode failed, using original bytes: {e}");
            audio.to_vec()
        }
    }
}

async fn reencode(source: &Path, hint: Option<&str>) -> Result<Vec<u8>> {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-loglevel", "error"]);
    if let Some(hint) = hint {
        cmd.args(["-f", hint]);
    }
    cmd.arg("-i").arg(source);
    cmd.args(["-vn", "-ac", "1", "-ar", "16000", "-b:a", "32k", "-f", "mp3", "pipe:1"]);

    let output = cmd.output().await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffmpeg exited with status {}: {}", output.status, stderr.trim());
    }
    if output.stdout.is_empty() {
        bail!("ffmpeg produced no output");
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unparseable_bytes_fall_back_to_original() {
        let garbage = b"definitely not audio data".to_vec();
        let result = optimize_for_transcription(&garbage).await;
        assert_eq!(result, garbage);
    }

    #[tokio::test]
    async fn test_empty_input_falls_back_to_original() {
        let result = optimize_for_transcription(&[]).await;
        assert!(result.is_empty());
    }
}
