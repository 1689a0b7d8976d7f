use std::time::{SystemTime, UNIX_EPOCH};

const MAX_FILE_NAME_CHARS: usize = 64;

pub fn now_i64() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_secs() as i64)
        .unwrap_or(0)
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis() as i64)
        .unwrap_or(0)
}

/// Reduce a peer-supplied name to something safe to embed in a file name:
/// trimmed, capped, everything outside `[A-Za-z0-9._-]` replaced.
pub fn sanitize_name(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .take(MAX_FILE_NAME_CHARS)
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                ch
            } else {
                '-'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
