//! Request path canonicalisation.
//!
//! Rules match on plain prefixes, so a path must be in canonical form before
//! it is resolved: no empty segments, no `.` or `..` segments (percent-encoded
//! dots included). Non-canonical paths are redirected to their clean form
//! instead of being routed.

use std::borrow::Cow;

/// Return the canonical form of `raw`, borrowing when it already is one.
///
/// `..` never climbs above the root. A trailing slash is kept unless the
/// result is the root itself.
pub fn clean_path(raw: &str) -> Cow<'_, str> {
    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match dot_segment(segment) {
            _ if segment.is_empty() => {}
            Some(Dots::One) => {}
            Some(Dots::Two) => {
                segments.pop();
            }
            None => segments.push(segment),
        }
    }

    let mut clean = String::with_capacity(raw.len());
    for segment in &segments {
        clean.push('/');
        clean.push_str(segment);
    }
    if clean.is_empty() {
        clean.push('/');
    } else if raw.ends_with('/') {
        clean.push('/');
    }

    if clean == raw {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(clean)
    }
}

enum Dots {
    One,
    Two,
}

/// Classify `.` / `..` segments, treating `%2e` (any case) as a dot.
fn dot_segment(segment: &str) -> Option<Dots> {
    let mut dots = 0;
    let mut rest = segment.as_bytes();
    while !rest.is_empty() {
        if rest[0] == b'.' {
            rest = &rest[1..];
        } else if rest.len() >= 3 && rest[0] == b'%' && rest[1] == b'2' && rest[2].eq_ignore_ascii_case(&b'e') {
            rest = &rest[3..];
        } else {
            return None;
        }
        dots += 1;
    }
    match dots {
        1 => Some(Dots::One),
        2 => Some(Dots::Two),
        _ => None,
    }
}
