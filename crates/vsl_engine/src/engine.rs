use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use vsl_core::Generation;
use vsl_logging::{vsl_debug, vsl_error};

use crate::client::{ApiClient, ApiSettings, ChannelProgressSink, ReqwestClient};
use crate::{ClientError, EngineEvent, FailureKind};

enum EngineCommand {
    Search { generation: Generation, term: String },
    SubmitUrls { source: String, urls: Vec<String> },
    RunIngest { batch_size: Option<u32> },
    Download { url: String, title: String },
    Shutdown,
}

/// Runs backend calls on a background tokio runtime. Commands are queued
/// from any thread; each runs as its own task and reports one
/// [`EngineEvent`] when it finishes.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Mutex<mpsc::Receiver<EngineEvent>>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings, download_dir: PathBuf) -> Result<Self, ClientError> {
        let client = ReqwestClient::new(settings)?;
        Self::with_client(Arc::new(client), download_dir)
    }

    pub fn with_client(
        client: Arc<dyn ApiClient>,
        download_dir: PathBuf,
    ) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                if matches!(command, EngineCommand::Shutdown) {
                    break;
                }
                let client = client.clone();
                let event_tx = event_tx.clone();
                let download_dir = download_dir.clone();
                let cancel = task_cancel.clone();
                runtime.spawn(async move {
                    let work = handle_command(client.as_ref(), command, &download_dir, event_tx);
                    if cancel.run_until_cancelled(work).await.is_none() {
                        vsl_debug!("Engine task cancelled");
                    }
                });
            }
            task_cancel.cancel();
            runtime.shutdown_background();
        });

        Ok(Self {
            cmd_tx,
            event_rx: Mutex::new(event_rx),
            cancel,
        })
    }

    pub fn search(&self, generation: Generation, term: impl Into<String>) {
        self.send(EngineCommand::Search {
            generation,
            term: term.into(),
        });
    }

    pub fn submit_urls(&self, source: impl Into<String>, urls: Vec<String>) {
        self.send(EngineCommand::SubmitUrls {
            source: source.into(),
            urls,
        });
    }

    pub fn run_ingest(&self, batch_size: Option<u32>) {
        self.send(EngineCommand::RunIngest { batch_size });
    }

    pub fn download(&self, url: impl Into<String>, title: impl Into<String>) {
        self.send(EngineCommand::Download {
            url: url.into(),
            title: title.into(),
        });
    }

    /// Cancels every outstanding task; cancelled tasks never report.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            vsl_error!("Engine thread is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn handle_command(
    client: &dyn ApiClient,
    command: EngineCommand,
    download_dir: &std::path::Path,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Search { generation, term } => {
            vsl_debug!("Search generation={} term={:?}", generation, term);
            EngineEvent::SearchCompleted {
                generation,
                result: client.search(&term).await,
            }
        }
        EngineCommand::SubmitUrls { source, urls } => {
            EngineEvent::BulkSubmitted(client.submit_urls(&source, &urls).await)
        }
        EngineCommand::RunIngest { batch_size } => {
            EngineEvent::IngestTriggered(client.run_ingest(batch_size).await)
        }
        EngineCommand::Download { url, title } => {
            let sink = ChannelProgressSink::new(event_tx.clone());
            EngineEvent::DownloadCompleted(client.download(&url, &title, download_dir, &sink).await)
        }
        EngineCommand::Shutdown => return,
    };
    let _ = event_tx.send(event);
}
