use sha2::{Digest, Sha256};
use url::Url;

const DEFAULT_EXTENSION: &str = "mp4";

/// Filesystem-safe, deterministic filename for a downloaded video:
/// `{sanitized_title}--{short_hash(url)}.{ext}`, where `ext` comes from the
/// URL path and falls back to `mp4`.
pub fn video_filename(title: &str, url: &str) -> String {
    let sanitized = sanitize_title(title);
    let hash = short_hash(url);
    let extension = extension_from_url(url).unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
    format!("{sanitized}--{hash}.{extension}")
}

/// Longest title stem kept in a filename, in characters.
const MAX_STEM_CHARS: usize = 80;
const FALLBACK_STEM: &str = "vsl";

/// Keeps letters, digits and `-` of a title; runs of anything else collapse
/// to one `_`. Dots are replaced too, so the stem never carries a second
/// extension and never matches a Windows device name.
fn sanitize_title(title: &str) -> String {
    // Titles are often the source URL; keep host and path only.
    let title = title.split_once("://").map_or(title, |(_, rest)| rest);
    let title = title.split(['?', '#']).next().unwrap_or_default();

    let mut stem = String::with_capacity(title.len().min(MAX_STEM_CHARS));
    for c in title.chars() {
        if c.is_alphanumeric() || c == '-' {
            stem.push(c);
        } else if !stem.is_empty() && !stem.ends_with('_') {
            stem.push('_');
        }
    }
    let stem: String = stem.trim_end_matches('_').chars().take(MAX_STEM_CHARS).collect();
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    let valid = !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric());
    valid.then(|| ext.to_ascii_lowercase())
}

/// First 8 hex digits of the URL's SHA-256.
fn short_hash(url: &str) -> String {
    Sha256::digest(url.as_bytes())[..4]
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
