use std::collections::HashSet;

use url::Url;

/// Source tag sent with URLs pasted into the admin form.
pub const ADMIN_BULK_SOURCE: &str = "admin_paste";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AdminRequest {
    #[default]
    Idle,
    Pending,
    /// Response body (pretty JSON), shown verbatim.
    Done(String),
    /// The request never got a readable answer; holds the error line.
    Failed(String),
}

impl AdminRequest {
    pub fn is_pending(&self) -> bool {
        matches!(self, AdminRequest::Pending)
    }

    /// True once the request has an outcome, good or bad.
    pub fn is_finished(&self) -> bool {
        matches!(self, AdminRequest::Done(_) | AdminRequest::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminState {
    pub(crate) urls_text: String,
    pub(crate) batch_size_text: String,
    pub(crate) bulk: AdminRequest,
    pub(crate) ingest: AdminRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSizeError {
    NotPositive,
}

/// Splits pasted text into URLs: trimmed, non-empty lines, first occurrence
/// wins on duplicates.
pub fn parse_urls(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(normalize_url_for_dedupe(line)))
        .map(ToOwned::to_owned)
        .collect()
}

/// Dedupe key for a URL: lowercase scheme and host, no trailing slash.
/// Path case is significant. Strings that do not parse as URLs get the same
/// treatment textually: only the part before the first `/` after the
/// authority is lowercased.
pub fn normalize_url_for_dedupe(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(parsed) = Url::parse(trimmed) {
        return parsed.as_str().trim_end_matches('/').to_string();
    }
    let trimmed = trimmed.trim_end_matches('/');
    let authority_start = trimmed.find("://").map_or(0, |i| i + 3);
    let path_start = trimmed[authority_start..]
        .find('/')
        .map_or(trimmed.len(), |i| authority_start + i);
    let (authority, path) = trimmed.split_at(path_start);
    format!("{}{}", authority.to_ascii_lowercase(), path)
}

/// Blank input means "use the backend default".
pub fn parse_batch_size(raw: &str) -> Result<Option<u32>, BatchSizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<u32>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(BatchSizeError::NotPositive),
    }
}
