//! VSL engine: backend client and effect execution.
mod client;
mod engine;
mod filename;
mod persist;
mod types;
mod wire;

pub use client::{ApiClient, ApiSettings, ChannelProgressSink, ProgressSink, ReqwestClient};
pub use engine::EngineHandle;
pub use filename::video_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PendingFile, PersistError};
pub use types::{ClientError, EngineEvent, FailureKind};
pub use wire::{decode_json, decode_search_response};
