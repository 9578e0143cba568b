//! Locate a JSON value inside free-form model output
//!
//! Models wrap JSON in prose or markdown fences. The scanner returns the first
//! balanced `{...}` or `[...]` span, honoring string literals and escapes so
//! braces inside strings do not confuse the depth count.

use tracing::debug;

/// Return the first balanced JSON object or array span in `text`
pub fn extract_json(text: &str) -> Option<&str> {
    debug!(text_len = text.len(), "extract_json: called");
    let bytes = text.as_bytes();

    for (start, &b) in bytes.iter().enumerate() {
        if b != b'{' && b != b'[' {
            continue;
        }
        if let Some(end) = balanced_end(bytes, start) {
            debug!(start, end, "extract_json: found span");
            return Some(&text[start..=end]);
        }
    }

    debug!("extract_json: no balanced span");
    None
}

/// Index of the bracket closing the one at `start`, if the span is balanced
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut stack: Vec<u8> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => stack.push(b'}'),
            b'[' => stack.push(b']'),
            b'}' | b']' => {
                if stack.pop() != Some(b) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
