//! Agent transport: starts turns and re-attaches to running ones
//!
//! The durable-agent runtime answers `POST {base}/api/chat` with a UI
//! message stream over SSE and names the run in the `x-workflow-run-id`
//! header. An interrupted run is re-attached through
//! `GET {base}/api/chat/{runId}/stream`.

use super::chunk::UiChunk;
use super::message::ChatMessage;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use reqwest::{Client, Url};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub const RUN_ID_HEADER: &str = "x-workflow-run-id";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid transport URL: {0}")]
    InvalidUrl(String),
    #[error("Workflow run ID not found in \"{RUN_ID_HEADER}\" response header")]
    MissingRunId,
    #[error("Agent transport returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed stream chunk: {0}")]
    MalformedChunk(#[from] serde_json::Error),
    #[error("No active workflow run ID found")]
    NoActiveRun,
}

pub type ChunkStream = BoxStream<'static, Result<UiChunk, TransportError>>;

/// A freshly started turn
pub struct StartedRun {
    pub run_id: String,
    pub chunks: ChunkStream,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Hand the full message list to the agent and open its stream
    async fn send_messages(&self, messages: &[ChatMessage]) -> Result<StartedRun, TransportError>;

    /// Re-attach to a run, skipping the first `start_index` chunks
    async fn reconnect(&self, run_id: &str, start_index: usize) -> Result<ChunkStream, TransportError>;
}

// ============================================================================
// URLs
// ============================================================================

fn with_segments(base: &str, segments: &[&str]) -> Result<Url, TransportError> {
    let mut url = Url::parse(base).map_err(|e| TransportError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| TransportError::InvalidUrl(format!("{base}: cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Endpoint that starts a new turn
pub fn chat_url(base: &str) -> Result<Url, TransportError> {
    with_segments(base, &["api", "chat"])
}

/// Run-scoped stream endpoint. The run id is percent-encoded as one segment.
pub fn resume_url(base: &str, run_id: &str) -> Result<Url, TransportError> {
    with_segments(base, &["api", "chat", run_id, "stream"])
}

// ============================================================================
// SSE decoding
// ============================================================================

/// Incremental SSE parser yielding the `data` payload of each event
#[derive(Debug, Default)]
struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend(bytes.iter().copied().filter(|b| *b != b'\r'));

        let mut payloads = Vec::new();
        while let Some(end) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let event: Vec<u8> = self.buffer.drain(..end + 2).collect();
            let event = String::from_utf8_lossy(&event);
            let data: Vec<&str> = event
                .lines()
                .filter_map(|line| line.strip_prefix("data:"))
                .map(|d| d.strip_prefix(' ').unwrap_or(d))
                .collect();
            if !data.is_empty() {
                payloads.push(data.join("\n"));
            }
        }
        payloads
    }
}

/// Turn an SSE byte stream into UI chunks
fn decode_stream<S, B>(bytes: S) -> ChunkStream
where
    S: Stream<Item = reqwest::Result<B>> + Send + 'static,
    B: AsRef<[u8]>,
{
    let mut decoder = SseDecoder::default();
    bytes
        .map(move |item| match item {
            Ok(bytes) => decoder
                .push(bytes.as_ref())
                .into_iter()
                .filter(|payload| payload != DONE_SENTINEL)
                .map(|payload| serde_json::from_str(&payload).map_err(TransportError::from))
                .collect(),
            Err(e) => vec![Err(TransportError::from(e))],
        })
        .flat_map(stream::iter)
        .boxed()
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        body,
    })
}

// ============================================================================
// HTTP transport
// ============================================================================

pub struct HttpChatTransport {
    client: Client,
    base: String,
}

impl HttpChatTransport {
    pub fn new(base: impl Into<String>) -> Result<Self, TransportError> {
        let base = base.into();
        // Validate once so request paths only fail on the network
        chat_url(&base)?;
        let client = Client::builder().connect_timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, base })
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send_messages(&self, messages: &[ChatMessage]) -> Result<StartedRun, TransportError> {
        let url = chat_url(&self.base)?;
        tracing::debug!(%url, messages = messages.len(), "Sending chat messages");

        let response = self
            .client
            .post(url)
            .json(&json!({ "messages": messages }))
            .send()
            .await?;
        let response = check_status(response).await?;

        let run_id = response
            .headers()
            .get(RUN_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .ok_or(TransportError::MissingRunId)?
            .to_string();
        tracing::info!(run_id = %run_id, "Workflow run started");

        Ok(StartedRun {
            run_id,
            chunks: decode_stream(response.bytes_stream()),
        })
    }

    async fn reconnect(&self, run_id: &str, start_index: usize) -> Result<ChunkStream, TransportError> {
        let mut url = resume_url(&self.base, run_id)?;
        if start_index > 0 {
            url.query_pairs_mut()
                .append_pair("startIndex", &start_index.to_string());
        }
        tracing::info!(run_id = %run_id, start_index, "Reconnecting to workflow run");

        let response = check_status(self.client.get(url).send().await?).await?;
        Ok(decode_stream(response.bytes_stream()))
    }
}
