//! JSON shapes exchanged with the backend.
//!
//! Decoding of search responses is lenient: a body without a `results`
//! array is an empty result set, and individual entries that cannot be read
//! are skipped. Only a body that is not JSON at all is an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use vsl_core::SearchResultItem;
use vsl_logging::vsl_warn;

use crate::{ClientError, FailureKind};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: WireId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    video_path: Option<String>,
    #[serde(default)]
    transcript_snippet: Option<String>,
    #[serde(default)]
    transcript_full: Option<String>,
}

impl From<WireItem> for SearchResultItem {
    fn from(item: WireItem) -> Self {
        let id = match item.id {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        };
        SearchResultItem {
            id,
            title: item.title.unwrap_or_default(),
            video_path: item.video_path.unwrap_or_default(),
            transcript_snippet: item.transcript_snippet.unwrap_or_default(),
            transcript_full: item.transcript_full.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BulkRequest<'a> {
    pub source: &'a str,
    pub urls: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct IngestRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

pub fn decode_search_response(body: &[u8]) -> Result<Vec<SearchResultItem>, ClientError> {
    let value = decode_json(body)?;
    let Some(entries) = value.get("results").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let items = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match WireItem::deserialize(entry) {
            Ok(item) => Some(SearchResultItem::from(item)),
            Err(err) => {
                vsl_warn!("Skipping unreadable search result #{}: {}", index, err);
                None
            }
        })
        .collect();
    Ok(items)
}

pub fn decode_json(body: &[u8]) -> Result<Value, ClientError> {
    serde_json::from_slice(body)
        .map_err(|err| ClientError::new(FailureKind::MalformedBody, err.to_string()))
}

pub(crate) fn encode_json<T: Serialize>(payload: &T) -> Result<Vec<u8>, ClientError> {
    serde_json::to_vec(payload)
        .map_err(|err| ClientError::new(FailureKind::MalformedBody, err.to_string()))
}
