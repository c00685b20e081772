//! Path Normalizer
//!
//! Converts JSON-pointer style locations (`/cameras/0/id`) into the
//! field-reference grammar used by every `Issue.path` (`cameras[0].id`).

/// Normalize a slash-separated location into a field reference.
///
/// Empty segments are dropped, numeric segments become `[N]` suffixes and
/// everything else is joined with `.`. Root or empty input gives `""`.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(segment);
        }
    }
    out
}
