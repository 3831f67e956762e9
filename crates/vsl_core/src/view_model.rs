use crate::{AdminRequest, Page, QueryStatus, SearchResultItem};

/// Card snippets longer than this many characters are cut and marked.
pub const SNIPPET_CHARS: usize = 220;
const SNIPPET_MARKER: char = '…';

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub page: Page,
    pub query: QueryView,
    pub detail: Option<VslDetailView>,
    pub admin: AdminView,
    pub notice: Option<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryView {
    pub term: String,
    pub status: QueryStatus,
    pub results: Vec<ResultCardView>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCardView {
    pub id: String,
    pub title: String,
    pub snippet: String,
}

impl ResultCardView {
    pub(crate) fn from_item(item: &SearchResultItem) -> Self {
        let snippet = if item.transcript_snippet.trim().is_empty() {
            snippet_from_transcript(&item.transcript_full)
        } else {
            item.transcript_snippet.clone()
        };
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            snippet,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VslDetailView {
    pub id: String,
    pub title: String,
    pub video_path: String,
    pub transcript: String,
    pub can_copy: bool,
}

impl VslDetailView {
    pub(crate) fn from_item(item: &SearchResultItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            video_path: item.video_path.clone(),
            transcript: item.transcript_full.clone(),
            can_copy: !item.transcript_full.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdminView {
    pub urls_text: String,
    pub batch_size_text: String,
    pub bulk: AdminRequest,
    pub ingest: AdminRequest,
}

/// First [`SNIPPET_CHARS`] characters of a transcript, marked when cut.
pub fn snippet_from_transcript(transcript: &str) -> String {
    match transcript.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => {
            let mut snippet = transcript[..cut].to_string();
            snippet.push(SNIPPET_MARKER);
            snippet
        }
        None => transcript.to_string(),
    }
}
