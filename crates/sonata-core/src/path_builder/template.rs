//! Minimal placeholder templating for configurable path/filename templates.
//!
//! Recognized placeholders: `{playlist}`, `{playlist_position}`,
//! `{playlist_position:02d}`, `{artist}`, `{album_artist}`, `{album}`,
//! `{title}`, `{disc_number}`. No external templating crate is pulled in for
//! this -- same "just parse it" posture `url_model::content_disposition`
//! takes for header values instead of a full MIME-header library.

use std::collections::HashMap;

/// Values available for substitution into a template. Missing keys render
/// as an empty string rather than erroring: a template referencing
/// `{disc_number}` for a single-disc release should just drop the token.
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    values: HashMap<&'static str, String>,
}

impl TemplateValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn set_opt(self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.set(key, v),
            None => self,
        }
    }
}

/// Render `template` by replacing every `{key}` or `{key:02d}` token with its
/// value from `values`. A `:02d` format suffix zero-pads the value to width 2
/// (values are expected to already be numeric strings when paired with that
/// suffix; non-numeric values are left as-is).
pub fn render(template: &str, values: &TemplateValues) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    let bytes = template.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = template[i..].find('}') {
                let token = &template[i + 1..i + end];
                out.push_str(&resolve_token(token, values));
                i += end + 1;
                continue;
            }
        }
        // Fall back to copying a single char at a time (handles multi-byte UTF-8).
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }

    let _ = &mut chars; // kept for clarity that we intentionally index by byte offset above
    out
}

fn resolve_token(token: &str, values: &TemplateValues) -> String {
    let (key, fmt) = match token.split_once(':') {
        Some((k, f)) => (k, Some(f)),
        None => (token, None),
    };
    let raw = values.values.get(key).cloned().unwrap_or_default();
    match fmt {
        Some("02d") => zero_pad(&raw, 2),
        _ => raw,
    }
}

fn zero_pad(raw: &str, width: usize) -> String {
    if raw.len() >= width {
        return raw.to_string();
    }
    match raw.parse::<i64>() {
        Ok(n) => format!("{:0width$}", n, width = width),
        Err(_) => raw.to_string(),
    }
}
