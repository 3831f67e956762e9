use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use vsl_core::{update, AdminRequest, AppState, AppViewModel, Msg, QueryStatus};
use vsl_engine::EngineHandle;
use vsl_logging::{vsl_debug, vsl_info};

use crate::effects::{ClipboardWriter, EffectRunner};
use crate::terminal::input::{parse_line, Input, HELP};
use crate::terminal::render::render;

/// Upper bound for one-shot commands waiting on the backend.
const ONE_SHOT_TIMEOUT: Duration = Duration::from_secs(120);

/// How a one-shot admin request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminReply {
    /// The backend answered; the body is shown whatever its HTTP status.
    Answered(String),
    /// Transport or decoding failure.
    Failed(String),
}

/// Single-threaded owner of [`AppState`]. Every message, whether from the
/// terminal or the engine, goes through [`App::dispatch`].
pub struct App<W: Write> {
    state: AppState,
    runner: EffectRunner,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
    out: W,
}

impl<W: Write> App<W> {
    pub fn new(engine: EngineHandle, clipboard: Box<dyn ClipboardWriter>, out: W) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::new(engine, msg_tx.clone(), clipboard);
        Self {
            state: AppState::new(),
            runner,
            msg_tx,
            msg_rx,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Applies one message, runs its effects and re-renders if anything changed.
    pub fn dispatch(&mut self, msg: Msg) -> Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = was_dirty.then(|| state.view());
        self.state = state;
        self.runner.run(effects);
        if let Some(view) = view {
            self.render(&view)?;
        }
        Ok(())
    }

    fn render(&mut self, view: &AppViewModel) -> Result<()> {
        self.out
            .write_all(render(view).as_bytes())
            .and_then(|()| self.out.flush())
            .context("failed to write to the terminal")
    }

    /// Interactive session: every stdin line is an input event.
    pub fn run_interactive(&mut self) -> Result<()> {
        let input_tx = self.msg_tx.clone();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                let msg = match parse_line(&line) {
                    Input::Msg(msg) => msg,
                    Input::Help => {
                        eprintln!("{HELP}");
                        continue;
                    }
                    Input::Invalid(reason) => {
                        eprintln!("{reason} (:help lists commands)");
                        continue;
                    }
                };
                if input_tx.send(msg).is_err() {
                    return;
                }
            }
            let _ = input_tx.send(Msg::QuitRequested);
        });

        self.render(&self.state.view())?;
        while !self.state.is_quitting() {
            let msg = self
                .msg_rx
                .recv()
                .context("message channel closed unexpectedly")?;
            self.dispatch(msg)?;
        }
        vsl_info!("Interactive session finished");
        Ok(())
    }

    /// Dispatches `msgs`, then pumps messages until `done` holds.
    pub fn run_until(
        &mut self,
        msgs: Vec<Msg>,
        timeout: Duration,
        done: impl Fn(&AppState) -> bool,
    ) -> Result<()> {
        for msg in msgs {
            self.dispatch(msg)?;
        }
        let deadline = Instant::now() + timeout;
        while !done(&self.state) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                bail!("timed out waiting for the backend");
            }
            match self.msg_rx.recv_timeout(remaining) {
                Ok(msg) => self.dispatch(msg)?,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => bail!("message channel closed"),
            }
        }
        Ok(())
    }

    /// Runs one search to completion. Returns the final status.
    pub fn search_once(&mut self, term: &str) -> Result<QueryStatus> {
        self.run_until(
            vec![Msg::SearchInputChanged(term.to_string())],
            ONE_SHOT_TIMEOUT,
            |state| state.query().state().status != QueryStatus::Loading,
        )?;
        let status = self.state.query().state().status;
        vsl_debug!("One-shot search finished with {:?}", status);
        self.shutdown()?;
        Ok(status)
    }

    /// Submits pasted URL text through the admin flow.
    pub fn submit_urls_once(&mut self, text: &str) -> Result<AdminReply> {
        self.run_admin(
            vec![
                Msg::AdminOpened,
                Msg::AdminUrlsChanged(text.to_string()),
                Msg::AdminUrlsSubmitted,
            ],
            |state| state.view().admin.bulk,
        )
    }

    /// Triggers an ingest run through the admin flow.
    pub fn run_ingest_once(&mut self, batch_size: Option<&str>) -> Result<AdminReply> {
        self.run_admin(
            vec![
                Msg::AdminOpened,
                Msg::AdminBatchSizeChanged(batch_size.unwrap_or_default().to_string()),
                Msg::AdminRunIngestClicked,
            ],
            |state| state.view().admin.ingest,
        )
    }

    fn run_admin(
        &mut self,
        msgs: Vec<Msg>,
        slot: impl Fn(&AppState) -> AdminRequest,
    ) -> Result<AdminReply> {
        for msg in msgs {
            self.dispatch(msg)?;
        }
        if slot(&self.state) == AdminRequest::Idle {
            // Rejected by validation; the notice says why.
            let reason = self
                .state
                .notice()
                .map(|notice| notice.text.clone())
                .unwrap_or_else(|| "request not sent".to_string());
            bail!(reason);
        }
        self.run_until(Vec::new(), ONE_SHOT_TIMEOUT, |state| {
            slot(state).is_finished()
        })?;
        let reply = match slot(&self.state) {
            AdminRequest::Failed(text) => AdminReply::Failed(text),
            AdminRequest::Done(body) => AdminReply::Answered(body),
            AdminRequest::Idle | AdminRequest::Pending => bail!("admin request did not finish"),
        };
        self.shutdown()?;
        Ok(reply)
    }

    fn shutdown(&mut self) -> Result<()> {
        self.dispatch(Msg::QuitRequested)
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use vsl_core::{SearchResultItem, NOTICE_BAD_BATCH_SIZE, NOTICE_COPIED};
    use vsl_engine::{decode_json, ApiClient, ClientError, ProgressSink};

    use super::*;

    /// Batch size the fake backend cannot answer.
    const BROKEN_BATCH: u32 = 500;

    struct FakeBackend;

    #[async_trait::async_trait]
    impl ApiClient for FakeBackend {
        async fn search(&self, term: &str) -> Result<Vec<SearchResultItem>, ClientError> {
            if term == "broken" {
                return Err(decode_json(b"<html>").unwrap_err());
            }
            let transcript_full = if term == "silent" {
                String::new()
            } else {
                format!("Full transcript for {term}")
            };
            Ok(vec![SearchResultItem {
                id: "1".into(),
                title: format!("Match for {term}"),
                transcript_snippet: "snippet".into(),
                transcript_full,
                ..SearchResultItem::default()
            }])
        }

        async fn submit_urls(
            &self,
            _source: &str,
            urls: &[String],
        ) -> Result<serde_json::Value, ClientError> {
            Ok(serde_json::json!({ "inserted": urls.len() }))
        }

        async fn run_ingest(
            &self,
            batch_size: Option<u32>,
        ) -> Result<serde_json::Value, ClientError> {
            if batch_size == Some(BROKEN_BATCH) {
                return decode_json(b"Internal Server Error");
            }
            Ok(serde_json::json!({ "batch_size": batch_size }))
        }

        async fn download(
            &self,
            _url: &str,
            _title: &str,
            dest_dir: &Path,
            _sink: &dyn ProgressSink,
        ) -> Result<PathBuf, ClientError> {
            Ok(dest_dir.to_path_buf())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingClipboard(Arc<Mutex<Vec<String>>>);

    impl ClipboardWriter for RecordingClipboard {
        fn write_text(&mut self, text: &str) -> Result<(), String> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn app_with(clipboard: RecordingClipboard) -> App<Vec<u8>> {
        let engine =
            EngineHandle::with_client(Arc::new(FakeBackend), PathBuf::from("downloads")).unwrap();
        App::new(engine, Box::new(clipboard), Vec::new())
    }

    fn app() -> App<Vec<u8>> {
        app_with(RecordingClipboard::default())
    }

    /// Searches `term` and opens its first result.
    fn open_first(app: &mut App<Vec<u8>>, term: &str) {
        app.run_until(
            vec![Msg::SearchInputChanged(term.into())],
            Duration::from_secs(5),
            |state| state.query().state().status == QueryStatus::Succeeded,
        )
        .unwrap();
        app.dispatch(Msg::ResultOpened { index: 0 }).unwrap();
    }

    #[test]
    fn one_shot_search_renders_each_transition() {
        let mut app = app();
        let status = app.search_once("  promo ").unwrap();
        assert_eq!(status, QueryStatus::Succeeded);

        let output = String::from_utf8(app.into_output()).unwrap();
        let loading = output.find("Searching for \"promo\"").expect("loading frame");
        let done = output.find("1. Match for promo").expect("result frame");
        assert!(loading < done);
    }

    #[test]
    fn one_shot_search_failure_is_generic() {
        let mut app = app();
        assert_eq!(app.search_once("broken").unwrap(), QueryStatus::Failed);
        let output = String::from_utf8(app.into_output()).unwrap();
        assert!(output.contains(vsl_core::SEARCH_FAILED_MESSAGE));
        assert!(!output.contains("<html>"));
    }

    #[test]
    fn blank_one_shot_search_is_idle() {
        let mut app = app();
        assert_eq!(app.search_once("   ").unwrap(), QueryStatus::Idle);
    }

    #[test]
    fn submit_urls_returns_pretty_body() {
        let mut app = app();
        let reply = app
            .submit_urls_once("https://a.example.com\nhttps://b.example.com\n")
            .unwrap();
        assert_eq!(reply, AdminReply::Answered("{\n  \"inserted\": 2\n}".to_string()));
    }

    #[test]
    fn failed_ingest_is_reported_as_failure() {
        let mut app = app();
        let reply = app.run_ingest_once(Some("500")).unwrap();
        let AdminReply::Failed(text) = reply else {
            panic!("expected a failure, got {reply:?}");
        };
        assert!(text.starts_with("Error running ingest: "), "{text}");

        let output = String::from_utf8(app.into_output()).unwrap();
        assert!(output.contains("Error running ingest: "));
    }

    #[test]
    fn invalid_batch_size_is_reported() {
        let mut app = app();
        let err = app.run_ingest_once(Some("zero")).unwrap_err();
        assert_eq!(err.to_string(), NOTICE_BAD_BATCH_SIZE);
    }

    #[test]
    fn copy_writes_the_transcript_and_confirms() {
        let clipboard = RecordingClipboard::default();
        let mut app = app_with(clipboard.clone());
        open_first(&mut app, "promo");

        app.run_until(
            vec![Msg::CopyTranscriptClicked],
            Duration::from_secs(5),
            |state| state.notice().is_some(),
        )
        .unwrap();

        assert_eq!(
            *clipboard.0.lock().unwrap(),
            vec!["Full transcript for promo".to_string()]
        );
        app.dispatch(Msg::QuitRequested).unwrap();
        let output = String::from_utf8(app.into_output()).unwrap();
        assert!(output.contains(&format!("» {NOTICE_COPIED}")));
    }

    #[test]
    fn copy_without_transcript_leaves_clipboard_untouched() {
        let clipboard = RecordingClipboard::default();
        let mut app = app_with(clipboard.clone());
        open_first(&mut app, "silent");

        app.dispatch(Msg::CopyTranscriptClicked).unwrap();
        assert!(clipboard.0.lock().unwrap().is_empty());
        assert!(app.state.notice().is_none());
    }
}
