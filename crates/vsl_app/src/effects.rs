use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use vsl_core::{Effect, Msg};
use vsl_engine::{EngineEvent, EngineHandle};
use vsl_logging::{vsl_debug, vsl_info, vsl_warn};

const EVENT_POLL: Duration = Duration::from_millis(50);

/// Destination for "copy transcript".
pub trait ClipboardWriter: Send {
    fn write_text(&mut self, text: &str) -> Result<(), String>;
}

/// The desktop clipboard. A fresh handle is opened per copy so a missing
/// display only fails that copy.
#[derive(Debug, Default)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), String> {
        let mut clipboard = arboard::Clipboard::new().map_err(|err| err.to_string())?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|err| err.to_string())
    }
}

/// Executes core effects and turns engine events back into messages.
pub struct EffectRunner {
    engine: Arc<EngineHandle>,
    msg_tx: mpsc::Sender<Msg>,
    clipboard: Box<dyn ClipboardWriter>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        msg_tx: mpsc::Sender<Msg>,
        clipboard: Box<dyn ClipboardWriter>,
    ) -> Self {
        let runner = Self {
            engine: Arc::new(engine),
            msg_tx,
            clipboard,
        };
        runner.spawn_event_loop();
        runner
    }

    pub fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Search(request) => {
                    vsl_debug!(
                        "Search generation={} term_len={}",
                        request.generation,
                        request.term.len()
                    );
                    self.engine.search(request.generation, request.term);
                }
                Effect::SubmitUrls { source, urls } => {
                    vsl_info!("SubmitUrls source={} count={}", source, urls.len());
                    self.engine.submit_urls(source, urls);
                }
                Effect::RunIngest { batch_size } => {
                    vsl_info!("RunIngest batch_size={:?}", batch_size);
                    self.engine.run_ingest(batch_size);
                }
                Effect::CopyToClipboard { text } => {
                    let result = self.clipboard.write_text(&text);
                    let _ = self.msg_tx.send(Msg::ClipboardResult(result));
                }
                Effect::DownloadVideo { url, title } => {
                    vsl_info!("DownloadVideo url={}", url);
                    self.engine.download(url, title);
                }
                Effect::ClearNoticeAfter { notice_id, delay } => {
                    let msg_tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = msg_tx.send(Msg::NoticeExpired { notice_id });
                    });
                }
                Effect::Shutdown => {
                    self.engine.shutdown();
                }
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || {
            while !engine.is_shut_down() {
                let Some(event) = engine.recv_timeout(EVENT_POLL) else {
                    continue;
                };
                let Some(msg) = event_to_msg(event) else {
                    continue;
                };
                if msg_tx.send(msg).is_err() {
                    break;
                }
            }
        });
    }
}

impl Drop for EffectRunner {
    fn drop(&mut self) {
        // The event loop holds its own handle; stop it with the runner.
        self.engine.shutdown();
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::SearchCompleted { generation, result } => Msg::SearchResolved {
            generation,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::BulkSubmitted(result) => Msg::BulkSubmitCompleted(pretty_body(result)),
        EngineEvent::IngestTriggered(result) => Msg::IngestCompleted(pretty_body(result)),
        EngineEvent::DownloadProgress { url, bytes } => {
            vsl_debug!("Download {} at {} bytes", url, bytes);
            return None;
        }
        EngineEvent::DownloadCompleted(result) => {
            Msg::DownloadCompleted(result.map_err(|err| err.to_string()))
        }
    };
    Some(msg)
}

fn pretty_body(result: Result<serde_json::Value, vsl_engine::ClientError>) -> Result<String, String> {
    match result {
        Ok(value) => serde_json::to_string_pretty(&value).map_err(|err| err.to_string()),
        Err(err) => {
            vsl_warn!("Admin request failed: {}", err);
            Err(err.to_string())
        }
    }
}
