use eyre::{Result, bail};
use log::debug;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Fixed summarization instruction; the transcript's own language drives the
/// output language
pub const SUMMARY_PROMPT: &str =
    "Summarize with list out of the key facts mentioned. Follow the language of the text.";

/// Summarize text with the Gemini API at temperature zero
pub async fn summarize(client: &reqwest::Client, model: &str, text: &str) -> Result<String> {
    let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
        eyre::eyre!("GEMINI_API_KEY environment variable not set (required for summarization)")
    })?;

    debug!("summarizing {} chars via Gemini model {model}", text.len());

    let body = serde_json::json!({
        "contents": [
            {
                "parts": [
                    { "text": format!("{SUMMARY_PROMPT}\n\n{text}") }
                ]
            }
        ],
        "generationConfig": {
            "temperature": 0.0
        }
    });

    let resp = client
        .post(format!("{GEMINI_ENDPOINT}/{model}:generateContent"))
        .header("x-goog-api-key", &api_key)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        bail!("Gemini API returned {status}: {body}");
    }

    let json: serde_json::Value = resp.json().await?;
    extract_gemini_text(&json)
}

fn extract_gemini_text(json: &serde_json::Value) -> Result<String> {
    if let Some(parts) = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
    {
        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");
        if !text.is_empty() {
            return Ok(text);
        }
    }
    bail!("unexpected Gemini API response format");
}
