use eyre::Result;

use crate::{ProcessResult, VideoMeta};

/// Render the transcript, followed by the summary when one exists
pub fn render_text(result: &ProcessResult) -> String {
    match &result.summary {
        Some(summary) => format!("{}\n\n--- Summary ---\n{summary}", result.transcript),
        None => result.transcript.clone(),
    }
}

/// Render the complete result as pretty-printed JSON
pub fn render_json(result: &ProcessResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Render metadata only, for info mode
pub fn render_info_text(meta: &VideoMeta) -> String {
    let mut out = format!("Title: {}\nAuthor: {}", meta.title, meta.author);
    if let Some(ref duration) = meta.duration {
        out.push_str(&format!("\nDuration: {duration}"));
    }
    if let Some(view_count) = meta.view_count {
        out.push_str(&format!("\nViews: {view_count}"));
    }
    if let Some(ref upload_date) = meta.upload_date {
        out.push_str(&format!("\nUploaded: {upload_date}"));
    }
    if let Some(ref thumbnail) = meta.thumbnail {
        out.push_str(&format!("\nThumbnail: {thumbnail}"));
    }
    out
}

pub fn render_info_json(meta: &VideoMeta) -> Result<String> {
    Ok(serde_json::to_string_pretty(meta)?)
}
