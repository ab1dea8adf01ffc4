use std::time::Duration;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::subtitle;

const STORAGE_INITIATE_URL: &str = "https://rest.alpha.fal.ai/storage/upload/initiate";
const QUEUE_SUBMIT_URL: &str = "https://queue.fal.run/fal-ai/whisper";
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Classified transcription failure. The bracketed user-facing rendering
/// lives in `user_message` and is applied only at the output boundary.
#[derive(Debug, Error, PartialEq)]
pub enum TranscribeError {
    #[error("FAL_KEY environment variable not set")]
    NotConfigured,
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("timed out: {0}")]
    TimedOut(String),
    #[error("{0}")]
    Other(String),
}

impl TranscribeError {
    /// Classify a raw error message by its content
    pub fn classify(msg: String) -> Self {
        let lower = msg.to_lowercase();
        if lower.contains("403") || lower.contains("forbidden") {
            TranscribeError::AccessDenied(msg)
        } else if lower.contains("quota") || lower.contains("limit") {
            TranscribeError::QuotaExceeded(msg)
        } else if lower.contains("timeout") {
            TranscribeError::TimedOut(msg)
        } else {
            TranscribeError::Other(msg)
        }
    }

    /// Rendering shown to users in place of a transcript
    pub fn user_message(&self) -> String {
        match self {
            TranscribeError::NotConfigured => "[FAL_KEY not configured]".to_string(),
            TranscribeError::AccessDenied(_) => {
                "[FAL API access denied (403). Check API key permissions.]".to_string()
            }
            TranscribeError::QuotaExceeded(_) => "[FAL API quota exceeded]".to_string(),
            TranscribeError::TimedOut(_) => "[FAL API timeout - audio may be too long]".to_string(),
            TranscribeError::Other(msg) => format!("[FAL transcription failed: {msg}]"),
        }
    }
}

impl From<reqwest::Error> for TranscribeError {
    fn from(e: reqwest::Error) -> Self {
        TranscribeError::classify(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct InitiateUploadResponse {
    upload_url: String,
    file_url: String,
}

#[derive(Debug, Deserialize)]
struct QueueSubmitResponse {
    status_url: String,
    response_url: String,
}

#[derive(Debug, Deserialize)]
struct QueueStatus {
    status: String,
    #[serde(default)]
    logs: Vec<QueueLog>,
}

#[derive(Debug, Deserialize)]
struct QueueLog {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WhisperResult {
    #[serde(default)]
    chunks: Vec<WhisperChunk>,
}

#[derive(Debug, Deserialize)]
struct WhisperChunk {
    text: String,
}

/// Transcribe optimized audio through the FAL whisper queue.
///
/// Uploads the bytes, submits a job with no language hint, polls until
/// completion while forwarding new progress log lines to `on_log`, and
/// returns the newline-joined chunk text normalized to Traditional Chinese
/// (HK). A missing `FAL_KEY` short-circuits before any network call.
pub async fn transcribe(
    client: &reqwest::Client,
    audio: Vec<u8>,
    mut on_log: impl FnMut(&str),
) -> Result<String, TranscribeError> {
    let key = match std::env::var("FAL_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => return Err(TranscribeError::NotConfigured),
    };

    let file_url = upload_audio(client, &key, audio).await?;
    debug!("audio uploaded: {file_url}");

    let job = submit_job(client, &key, &file_url).await?;
    debug!("transcription job submitted: {}", job.status_url);

    await_completion(client, &key, &job.status_url, &mut on_log).await?;

    let result = fetch_result(client, &key, &job.response_url).await?;
    Ok(subtitle::s2hk(&chunks_to_text(&result)))
}

async fn upload_audio(
    client: &reqwest::Client,
    key: &str,
    audio: Vec<u8>,
) -> Result<String, TranscribeError> {
    let initiate: InitiateUploadResponse = client
        .post(STORAGE_INITIATE_URL)
        .header("Authorization", format!("Key {key}"))
        .json(&serde_json::json!({
            "content_type": "audio/mpeg",
            "file_name": "audio.mp3",
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    // The upload URL is presigned; no Authorization header here
    client
        .put(&initiate.upload_url)
        .header("Content-Type", "audio/mpeg")
        .body(audio)
        .send()
        .await?
        .error_for_status()?;

    Ok(initiate.file_url)
}

async fn submit_job(
    client: &reqwest::Client,
    key: &str,
    file_url: &str,
) -> Result<QueueSubmitResponse, TranscribeError> {
    let job = client
        .post(QUEUE_SUBMIT_URL)
        .header("Authorization", format!("Key {key}"))
        .json(&serde_json::json!({
            "audio_url": file_url,
            "task": "transcribe",
            "language": null,
        }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(job)
}

async fn await_completion(
    client: &reqwest::Client,
    key: &str,
    status_url: &str,
    on_log: &mut impl FnMut(&str),
) -> Result<(), TranscribeError> {
    let mut seen_logs = 0;
    loop {
        let status: QueueStatus = client
            .get(status_url)
            .query(&[("logs", "1")])
            .header("Authorization", format!("Key {key}"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        for log in &status.logs[seen_logs.min(status.logs.len())..] {
            on_log(&log.message);
        }
        seen_logs = seen_logs.max(status.logs.len());

        match status.status.as_str() {
            "COMPLETED" => return Ok(()),
            "IN_QUEUE" | "IN_PROGRESS" => {}
            other => {
                return Err(TranscribeError::classify(format!(
                    "transcription job ended with status {other}"
                )));
            }
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn fetch_result(
    client: &reqwest::Client,
    key: &str,
    response_url: &str,
) -> Result<WhisperResult, TranscribeError> {
    let result = client
        .get(response_url)
        .header("Authorization", format!("Key {key}"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(result)
}

fn chunks_to_text(result: &WhisperResult) -> String {
    result
        .chunks
        .iter()
        .map(|chunk| chunk.text.trim())
        .collect::<Vec<_>>()
        .join("\n")
}
