use vsl_logging::{vsl_debug, vsl_info, vsl_warn};

use crate::admin::{parse_batch_size, parse_urls, ADMIN_BULK_SOURCE};
use crate::{AdminRequest, AppState, Effect, Msg, Page, NOTICE_DURATION};

pub const NOTICE_NO_VSL: &str = "No VSL data found for this page.";
pub const NOTICE_COPIED: &str = "transcription copied";
pub const NOTICE_DOWNLOAD_FAILED: &str = "Download failed";
pub const NOTICE_NO_URLS: &str = "Paste at least one URL.";
pub const NOTICE_BAD_BATCH_SIZE: &str = "batch_size must be a positive integer.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.is_quitting() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::SearchInputChanged(raw) => {
            if state.page() != Page::Swipe {
                return (state, Vec::new());
            }
            let request = state.query_mut().set_term(&raw);
            state.mark_dirty();
            request.map(Effect::Search).into_iter().collect()
        }
        Msg::SearchResolved { generation, result } => {
            if state.query_mut().resolve(generation, result) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ResultOpened { index } => {
            if state.page() != Page::Swipe {
                return (state, Vec::new());
            }
            if state.open_result(index) {
                Vec::new()
            } else {
                vsl_debug!("No result at index {}", index);
                notice(&mut state, NOTICE_NO_VSL)
            }
        }
        Msg::BackClicked => {
            state.navigate(Page::Swipe);
            Vec::new()
        }
        Msg::AdminOpened => {
            state.navigate(Page::Admin);
            Vec::new()
        }
        Msg::CopyTranscriptClicked => match state.selected() {
            Some(item) if state.page() == Page::Vsl && !item.transcript_full.is_empty() => {
                vec![Effect::CopyToClipboard {
                    text: item.transcript_full.clone(),
                }]
            }
            _ => Vec::new(),
        },
        Msg::ClipboardResult(Ok(())) => notice(&mut state, NOTICE_COPIED),
        Msg::ClipboardResult(Err(detail)) => {
            vsl_warn!("Failed to copy transcript: {}", detail);
            Vec::new()
        }
        Msg::DownloadClicked => match state.selected() {
            Some(item) if state.page() == Page::Vsl && !item.video_path.is_empty() => {
                vec![Effect::DownloadVideo {
                    url: item.video_path.clone(),
                    title: item.title.clone(),
                }]
            }
            _ => Vec::new(),
        },
        Msg::DownloadCompleted(Ok(path)) => {
            notice(&mut state, format!("Saved VSL to {}", path.display()))
        }
        Msg::DownloadCompleted(Err(detail)) => {
            vsl_warn!("Video download failed: {}", detail);
            notice(&mut state, NOTICE_DOWNLOAD_FAILED)
        }
        Msg::NoticeExpired { notice_id } => {
            state.expire_notice(notice_id);
            Vec::new()
        }
        Msg::AdminUrlsChanged(text) => {
            state.admin.urls_text = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::AdminBatchSizeChanged(text) => {
            state.admin.batch_size_text = text;
            state.mark_dirty();
            Vec::new()
        }
        Msg::AdminUrlsSubmitted => {
            if state.admin.bulk.is_pending() {
                return (state, Vec::new());
            }
            let urls = parse_urls(&state.admin.urls_text);
            if urls.is_empty() {
                notice(&mut state, NOTICE_NO_URLS)
            } else {
                vsl_info!("Submitting {} URLs for ingestion", urls.len());
                state.admin.bulk = AdminRequest::Pending;
                state.mark_dirty();
                vec![Effect::SubmitUrls {
                    source: ADMIN_BULK_SOURCE.to_string(),
                    urls,
                }]
            }
        }
        Msg::AdminRunIngestClicked => {
            if state.admin.ingest.is_pending() {
                return (state, Vec::new());
            }
            match parse_batch_size(&state.admin.batch_size_text) {
                Ok(batch_size) => {
                    state.admin.ingest = AdminRequest::Pending;
                    state.mark_dirty();
                    vec![Effect::RunIngest { batch_size }]
                }
                Err(_) => notice(&mut state, NOTICE_BAD_BATCH_SIZE),
            }
        }
        Msg::BulkSubmitCompleted(result) => {
            state.admin.bulk = match result {
                Ok(body) => AdminRequest::Done(body),
                Err(detail) => AdminRequest::Failed(format!("Error sending URLs: {detail}")),
            };
            state.mark_dirty();
            Vec::new()
        }
        Msg::IngestCompleted(result) => {
            state.admin.ingest = match result {
                Ok(body) => AdminRequest::Done(body),
                Err(detail) => AdminRequest::Failed(format!("Error running ingest: {detail}")),
            };
            state.mark_dirty();
            Vec::new()
        }
        Msg::QuitRequested => {
            state.quit();
            vec![Effect::Shutdown]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn notice(state: &mut AppState, text: impl Into<String>) -> Vec<Effect> {
    let notice_id = state.post_notice(text);
    vec![Effect::ClearNoticeAfter {
        notice_id,
        delay: NOTICE_DURATION,
    }]
}
