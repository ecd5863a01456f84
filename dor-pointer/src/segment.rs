//! RFC 6901 reference-token escaping
//!
//! Two characters are reserved inside a segment: `~` (escaped as `~0`) and
//! `/` (escaped as `~1`). Encoding is a single left-to-right scan, which is
//! the same as replacing `~` first and `/` second. Decoding is lenient: a
//! `~` that is not followed by `0` or `1` is kept as-is.

use std::borrow::Cow;

/// Escape a raw segment for use in a JSON Pointer
pub fn encode_segment(raw: &str) -> String {
    encode_segment_cow(raw).into_owned()
}

/// Escape a raw segment, borrowing when nothing needs escaping
pub fn encode_segment_cow(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['~', '/']) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 4);
    for ch in raw.chars() {
        match ch {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Unescape a JSON Pointer segment
///
/// - `~1` → `/`
/// - `~0` → `~`
/// - any other `~` passes through unchanged
pub fn decode_segment(escaped: &str) -> String {
    decode_segment_cow(escaped).into_owned()
}

/// Unescape a segment, borrowing when it has no `~`
pub fn decode_segment_cow(escaped: &str) -> Cow<'_, str> {
    if !escaped.contains('~') {
        return Cow::Borrowed(escaped);
    }
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('1') => {
                chars.next();
                out.push('/');
            }
            Some('0') => {
                chars.next();
                out.push('~');
            }
            _ => out.push('~'),
        }
    }
    Cow::Owned(out)
}

/// Check that every `~` in an escaped segment starts `~0` or `~1`
pub(crate) fn validate_escapes(token: &str) -> Result<(), String> {
    let mut chars = token.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.peek() {
                Some('0') | Some('1') => {
                    chars.next();
                }
                Some(other) => {
                    return Err(format!(
                        "Invalid escape sequence '~{}'. Use '~0' for '~' and '~1' for '/'.",
                        other
                    ));
                }
                None => {
                    return Err(
                        "Incomplete escape sequence at end of segment. Use '~0' for '~' and '~1' for '/'."
                            .to_string(),
                    );
                }
            }
        }
    }
    Ok(())
}
