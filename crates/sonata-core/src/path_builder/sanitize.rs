//! Path component sanitization.
//!
//! Unlike `url_model::sanitize_filename_for_linux` (which targets a single
//! Linux filename and tolerates length limits), this sanitizer targets one
//! *path component* (an artist/album/title/playlist name) against the
//! forbidden set named by the output path builder's contract: any of
//! `/ \ : * ? " < > | NUL` becomes `_`, surrounding whitespace and dots are
//! trimmed, and an empty result becomes `"unknown"`.

const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', '\0'];

/// Sanitize a single path component (artist, album, title, playlist name, ...).
pub fn sanitize_component(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}
