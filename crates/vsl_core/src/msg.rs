use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the search box (raw, untrimmed value).
    SearchInputChanged(String),
    /// Engine finished a lookup issued under `generation`.
    SearchResolved {
        generation: crate::Generation,
        result: crate::SearchResult,
    },
    /// User opened the result at `index` of the current result list.
    ResultOpened { index: usize },
    /// User navigated back to the search page.
    BackClicked,
    /// User navigated to the admin page.
    AdminOpened,
    /// User asked to copy the full transcript of the open VSL.
    CopyTranscriptClicked,
    /// Clipboard write finished.
    ClipboardResult(Result<(), String>),
    /// User asked to download the open VSL's video.
    DownloadClicked,
    /// Engine finished a video download.
    DownloadCompleted(Result<PathBuf, String>),
    /// A notice's display time ran out.
    NoticeExpired { notice_id: crate::NoticeId },
    /// User edited the bulk URL textarea.
    AdminUrlsChanged(String),
    /// User submitted the bulk URL textarea.
    AdminUrlsSubmitted,
    /// User edited the batch size input.
    AdminBatchSizeChanged(String),
    /// User clicked "Run ingest now".
    AdminRunIngestClicked,
    /// Engine finished the bulk URL submission; `Ok` holds the response body.
    BulkSubmitCompleted(Result<String, String>),
    /// Engine finished the ingest trigger; `Ok` holds the response body.
    IngestCompleted(Result<String, String>),
    /// User is leaving the application.
    QuitRequested,
    /// Fallback for placeholder wiring.
    NoOp,
}
