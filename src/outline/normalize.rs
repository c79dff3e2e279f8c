//! Pull a JSON outline out of free-form model output.
//!
//! Precedence:
//! 1. If the reply contains a triple-backtick fence, the first fenced segment wins: the text
//!    between the first and second fence, or everything after the first fence when it is
//!    never closed. Anything outside that segment is discarded.
//! 2. Inside the segment a leading `json` language tag (ASCII case-insensitive) is removed as a
//!    fixed prefix.
//! 3. Surrounding whitespace is trimmed. A reply without fences is only trimmed.

use super::{Outline, OutlineError};

const FENCE: &str = "```";
const LANGUAGE_TAG: &str = "json";

/// Return the slice of `reply` that should hold the JSON outline.
pub fn extract_json_payload(reply: &str) -> &str {
    let Some(start) = reply.find(FENCE) else {
        return reply.trim();
    };

    let after_open = &reply[start + FENCE.len()..];
    let segment = match after_open.find(FENCE) {
        Some(end) => &after_open[..end],
        None => after_open,
    };

    strip_language_tag(segment.trim_start()).trim()
}

fn strip_language_tag(segment: &str) -> &str {
    match segment.get(..LANGUAGE_TAG.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(LANGUAGE_TAG) => &segment[LANGUAGE_TAG.len()..],
        _ => segment,
    }
}

/// Normalize `reply` and parse it as an [`Outline`].
///
/// No guessing or repair: anything serde rejects becomes [`OutlineError::Parse`] carrying the
/// untouched reply for diagnosis.
pub fn parse_outline(reply: &str) -> Result<Outline, OutlineError> {
    let payload = extract_json_payload(reply);
    Outline::from_json(payload).map_err(|e| OutlineError::Parse {
        raw: reply.to_string(),
        message: e.to_string(),
    })
}
