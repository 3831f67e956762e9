use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Search(crate::SearchRequest),
    SubmitUrls { source: String, urls: Vec<String> },
    RunIngest { batch_size: Option<u32> },
    CopyToClipboard { text: String },
    DownloadVideo { url: String, title: String },
    ClearNoticeAfter {
        notice_id: crate::NoticeId,
        delay: Duration,
    },
    Shutdown,
}
