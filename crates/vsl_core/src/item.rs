/// A VSL as returned by the search endpoint. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchResultItem {
    pub id: String,
    pub title: String,
    /// URI of the video, usually absolute.
    pub video_path: String,
    pub transcript_snippet: String,
    pub transcript_full: String,
}
