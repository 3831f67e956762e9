use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use vsl_core::SearchResultItem;
use vsl_logging::{vsl_debug, vsl_info};

use crate::filename::video_filename;
use crate::persist::AtomicFileWriter;
use crate::wire::{self, BulkRequest, IngestRequest};
use crate::{ClientError, EngineEvent, FailureKind};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub search_path: String,
    pub bulk_path: String,
    pub ingest_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    /// Cap on JSON response bodies.
    pub max_body_bytes: u64,
    /// Cap on downloaded videos.
    pub max_download_bytes: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            search_path: "/api/search".to_string(),
            bulk_path: "/urls/bulk".to_string(),
            ingest_path: "/admin/run_ingest_now".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_body_bytes: 5 * 1024 * 1024,
            max_download_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The backend's REST surface.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<SearchResultItem>, ClientError>;

    async fn submit_urls(
        &self,
        source: &str,
        urls: &[String],
    ) -> Result<serde_json::Value, ClientError>;

    async fn run_ingest(&self, batch_size: Option<u32>) -> Result<serde_json::Value, ClientError>;

    /// Streams `url` into `dest_dir` and returns the written path.
    async fn download(
        &self,
        url: &str,
        title: &str,
        dest_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<PathBuf, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestClient {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
    download_client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(settings: ApiSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        // Videos can take longer than any whole-request timeout; bound stalls instead.
        let download_client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            settings,
            base,
            client,
            download_client,
        })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn post_json(&self, url: Url, body: Vec<u8>) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        // The admin inspects whatever the backend answers, error statuses included.
        let status = response.status();
        if !status.is_success() {
            vsl_debug!("Admin endpoint answered {}", status);
        }
        let bytes = read_body(response, self.settings.max_body_bytes).await?;
        wire::decode_json(&bytes)
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestClient {
    async fn search(&self, term: &str) -> Result<Vec<SearchResultItem>, ClientError> {
        let mut url = self.endpoint(&self.settings.search_path)?;
        url.query_pairs_mut().append_pair("q", term);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = read_body(response, self.settings.max_body_bytes).await?;
        wire::decode_search_response(&bytes)
    }

    async fn submit_urls(
        &self,
        source: &str,
        urls: &[String],
    ) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(&self.settings.bulk_path)?;
        let body = wire::encode_json(&BulkRequest { source, urls })?;
        self.post_json(url, body).await
    }

    async fn run_ingest(&self, batch_size: Option<u32>) -> Result<serde_json::Value, ClientError> {
        let url = self.endpoint(&self.settings.ingest_path)?;
        let body = wire::encode_json(&IngestRequest { batch_size })?;
        self.post_json(url, body).await
    }

    async fn download(
        &self,
        url: &str,
        title: &str,
        dest_dir: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<PathBuf, ClientError> {
        // Relative video paths are served by the backend itself.
        let resolved = self.endpoint(url)?;
        let max_bytes = self.settings.max_download_bytes;

        let response = self
            .download_client
            .get(resolved.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let writer = AtomicFileWriter::new(dest_dir.to_path_buf());
        let mut pending = writer
            .begin()
            .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = pending.written() + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            pending
                .write_chunk(&chunk)
                .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;
            sink.emit(EngineEvent::DownloadProgress {
                url: url.to_string(),
                bytes: pending.written(),
            });
        }

        let filename = video_filename(title, resolved.as_str());
        let path = pending
            .commit(&filename)
            .map_err(|err| ClientError::new(FailureKind::Io, err.to_string()))?;
        vsl_info!("Downloaded {} to {:?}", resolved, path);
        Ok(path)
    }
}

async fn read_body(response: reqwest::Response, max_bytes: u64) -> Result<Vec<u8>, ClientError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(too_large(max_bytes, Some(content_len)));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(too_large(max_bytes, Some(next_len)));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> ClientError {
    ClientError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return ClientError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
