use log::debug;
use zhconv::{Variant, zhconv};

/// Convert Simplified Chinese to Traditional Chinese (Hong Kong variant).
/// Identity on text that is already Traditional or not Chinese at all.
pub fn s2hk(text: &str) -> String {
    zhconv(text, Variant::ZhHK)
}

/// Language tags YouTube uses for Simplified Chinese caption tracks
pub fn is_simplified_chinese(lang: &str) -> bool {
    matches!(lang, "zh-CN" | "zh-Hans")
}

/// Extract plain text from a raw caption payload, sniffing the wire format:
/// a payload opening with `{` is timed-text JSON, anything else is SubRip.
pub fn subtitle_to_text(payload: &str) -> String {
    if payload.trim_start().starts_with('{') {
        timedtext_to_text(payload)
    } else {
        srt_to_text(payload)
    }
}

/// Parse YouTube's timed-text JSON captions into plain text.
///
/// Concatenates `events[*].segs[*].utf8` in order with no separator. Returns
/// the input unchanged when it is not valid JSON or lacks an `events` array,
/// so a bad payload is never lost.
pub fn timedtext_to_text(payload: &str) -> String {
    let Ok(data) = serde_json::from_str::<serde_json::Value>(payload) else {
        debug!("caption payload is not valid JSON, passing through unchanged");
        return payload.to_string();
    };
    let Some(events) = data.get("events").and_then(|e| e.as_array()) else {
        return payload.to_string();
    };

    let mut text = String::new();
    for event in events {
        let Some(segs) = event.get("segs").and_then(|s| s.as_array()) else {
            continue;
        };
        for seg in segs {
            if let Some(utf8) = seg.get("utf8").and_then(|u| u.as_str()) {
                text.push_str(utf8);
            }
        }
    }
    text.trim().to_string()
}

/// Strip SubRip framing: sequence numbers, timestamp ranges, blank lines
pub fn srt_to_text(payload: &str) -> String {
    payload
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.contains("-->") && !line.chars().all(|c| c.is_ascii_digit())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tidy a raw transcript line by line: capitalize a lowercase leading letter
/// and close each line with punctuation. Blank lines are dropped.
pub fn simple_format(text: &str) -> String {
    let mut formatted = Vec::new();
    for raw in text.split('\n') {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut line = trimmed.to_string();
        if let Some(first) = line.chars().next() {
            if first.is_lowercase() {
                let upper: String = first.to_uppercase().collect();
                line = format!("{upper}{}", &line[first.len_utf8()..]);
            }
        }
        if !line.ends_with('.') && !line.ends_with('!') && !line.ends_with('?') {
            line.push('.');
        }
        formatted.push(line);
    }
    formatted.join("\n")
}
