//! VSL browser core: pure state machine and view-model helpers.
mod admin;
mod effect;
mod item;
mod msg;
mod query;
mod state;
mod update;
mod view_model;

pub use admin::{
    normalize_url_for_dedupe, parse_batch_size, parse_urls, AdminRequest, BatchSizeError,
    ADMIN_BULK_SOURCE,
};
pub use effect::Effect;
pub use item::SearchResultItem;
pub use msg::Msg;
pub use query::{
    normalize_term, Generation, QueryController, QueryState, QueryStatus, SearchRequest,
    SearchResult, SEARCH_FAILED_MESSAGE,
};
pub use state::{AppState, Notice, NoticeId, Page, NOTICE_DURATION};
pub use update::{
    update, NOTICE_BAD_BATCH_SIZE, NOTICE_COPIED, NOTICE_DOWNLOAD_FAILED, NOTICE_NO_URLS,
    NOTICE_NO_VSL,
};
pub use view_model::{
    snippet_from_transcript, AdminView, AppViewModel, QueryView, ResultCardView, VslDetailView,
    SNIPPET_CHARS,
};
