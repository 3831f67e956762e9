use std::time::Duration;

use crate::admin::AdminState;
use crate::view_model::{
    AdminView, AppViewModel, QueryView, ResultCardView, VslDetailView,
};
use crate::{QueryController, SearchResultItem};

pub type NoticeId = u64;

/// How long a notice stays visible unless replaced.
pub const NOTICE_DURATION: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Swipe,
    Vsl,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: NoticeId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    page: Page,
    query: QueryController,
    selected: Option<SearchResultItem>,
    pub(crate) admin: AdminState,
    notice: Option<Notice>,
    next_notice_id: NoticeId,
    quitting: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn query(&self) -> &QueryController {
        &self.query
    }

    pub fn selected(&self) -> Option<&SearchResultItem> {
        self.selected.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn view(&self) -> AppViewModel {
        let query = self.query.state();
        AppViewModel {
            page: self.page,
            query: QueryView {
                term: query.term.clone(),
                status: query.status,
                results: query.results.iter().map(ResultCardView::from_item).collect(),
                error_message: query.error_message.clone(),
            },
            detail: self.selected.as_ref().map(VslDetailView::from_item),
            admin: AdminView {
                urls_text: self.admin.urls_text.clone(),
                batch_size_text: self.admin.batch_size_text.clone(),
                bulk: self.admin.bulk.clone(),
                ingest: self.admin.ingest.clone(),
            },
            notice: self.notice.as_ref().map(|notice| notice.text.clone()),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn query_mut(&mut self) -> &mut QueryController {
        &mut self.query
    }

    /// Switches page. Leaving the search page tears its controller down;
    /// entering it builds a fresh one.
    pub(crate) fn navigate(&mut self, page: Page) {
        if self.page == page {
            return;
        }
        if self.page == Page::Swipe {
            self.query.dispose();
        }
        if page == Page::Swipe {
            self.query = QueryController::starting_after(self.query.generation());
            self.selected = None;
        }
        self.page = page;
        self.mark_dirty();
    }

    pub(crate) fn open_result(&mut self, index: usize) -> bool {
        let Some(item) = self.query.state().results.get(index).cloned() else {
            return false;
        };
        self.selected = Some(item);
        self.navigate(Page::Vsl);
        true
    }

    /// Replaces the current notice and returns its id.
    pub(crate) fn post_notice(&mut self, text: impl Into<String>) -> NoticeId {
        self.next_notice_id += 1;
        let id = self.next_notice_id;
        self.notice = Some(Notice {
            id,
            text: text.into(),
        });
        self.mark_dirty();
        id
    }

    pub(crate) fn expire_notice(&mut self, notice_id: NoticeId) {
        if self.notice.as_ref().is_some_and(|notice| notice.id == notice_id) {
            self.notice = None;
            self.mark_dirty();
        }
    }

    pub(crate) fn quit(&mut self) {
        self.query.dispose();
        self.quitting = true;
        self.mark_dirty();
    }
}
