//! OpenAI-compatible chat completions client.
//!
//! Works with: OpenAI, ovos-persona-server, Ollama, vLLM, and any server
//! exposing `/chat/completions`.
//!
//! Supports:
//! - Non-streaming completions (single JSON response)
//! - Streaming completions (SSE lines, forwarded raw)

use futures::stream::{self, BoxStream, StreamExt};
use rustedrag_core::error::CompletionError;
use rustedrag_core::message::Message;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sse::{self, LineBuffer};

/// Sampling parameters, passed through to the server unmodified.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 1.0,
            max_tokens: 500,
        }
    }
}

/// One line of a streamed completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionLine {
    /// The line exactly as received (or the synthetic error line).
    pub raw: String,
    /// Content delta carried by this line, if any.
    pub delta: Option<String>,
    /// Set on `[DONE]` and on the error line; nothing follows a terminal line.
    pub terminal: bool,
}

impl CompletionLine {
    fn parse(raw: String) -> Self {
        let terminal = sse::is_done(&raw);
        let delta = if terminal { None } else { sse::content_delta(&raw) };
        Self { raw, delta, terminal }
    }

    fn error(err: &CompletionError) -> Self {
        Self {
            raw: sse::error_line(&err.to_string()),
            delta: None,
            terminal: true,
        }
    }
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    base_url: String,
    api_key: Option<String>,
    model: Option<String>,
    sampling: SamplingParams,
    client: reqwest::Client,
}

impl CompletionClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8337/v1`).
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: None,
            sampling: SamplingParams::default(),
            client,
        }
    }

    /// Attach a bearer credential to every request.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set the model name. Unset sends `"model": null` and lets the server pick.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Set the sampling parameters.
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub fn sampling(&self) -> SamplingParams {
        self.sampling
    }

    fn chat_request(&self, messages: &[Message], stream: bool) -> reqwest::RequestBuilder {
        let body = ChatCompletionRequest {
            model: self.model.as_deref(),
            messages,
            max_tokens: self.sampling.max_tokens,
            temperature: self.sampling.temperature,
            top_p: self.sampling.top_p,
            stream,
        };

        let mut request = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json");

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        request.json(&body)
    }

    /// Send the messages and return the first choice's content.
    ///
    /// A choice whose `content` is null yields an empty answer.
    pub async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError> {
        debug!(
            url = %self.completions_url(),
            model = ?self.model,
            messages = messages.len(),
            "Sending completion request"
        );

        let response = self
            .chat_request(messages, false)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_body, "Completion endpoint returned error");
            return Err(CompletionError::ApiError {
                status_code: status.as_u16(),
                message: error_body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        parse_completion(&body)
    }

    /// Open a streaming completion and yield its lines.
    ///
    /// The request is sent on the first poll. The stream owns the HTTP
    /// response, so dropping it at any point closes the connection.
    /// Failures never surface as errors: they become one terminal
    /// [`sse::error_line`] and the stream ends.
    pub fn stream(&self, messages: &[Message]) -> BoxStream<'static, CompletionLine> {
        debug!(
            url = %self.completions_url(),
            model = ?self.model,
            messages = messages.len(),
            "Sending streaming completion request"
        );

        let request = self
            .chat_request(messages, true)
            .header("Accept", "text/event-stream");

        stream::unfold(LineState::Pending(request), next_line).boxed()
    }
}

fn parse_completion(body: &str) -> Result<String, CompletionError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| CompletionError::InvalidJson(e.to_string()))?;

    let api_response: ApiResponse = serde_json::from_value(value)
        .map_err(|e| CompletionError::UnexpectedFormat(e.to_string()))?;

    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::UnexpectedFormat("No choices in response".into()))?;

    Ok(choice.message.content.unwrap_or_default())
}

// --- Streaming state machine ---

type ByteStream = BoxStream<'static, reqwest::Result<Vec<u8>>>;

enum LineState {
    Pending(reqwest::RequestBuilder),
    Open { body: ByteStream, buffer: LineBuffer },
    Closed,
}

async fn open(request: reqwest::RequestBuilder) -> Result<ByteStream, CompletionError> {
    let response = request
        .send()
        .await
        .map_err(|e| CompletionError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(CompletionError::ApiError {
            status_code: status.as_u16(),
            message: error_body,
        });
    }

    Ok(response
        .bytes_stream()
        .map(|chunk| chunk.map(|bytes| bytes.to_vec()))
        .boxed())
}

async fn next_line(mut state: LineState) -> Option<(CompletionLine, LineState)> {
    loop {
        state = match state {
            LineState::Closed => return None,

            LineState::Pending(request) => match open(request).await {
                Ok(body) => LineState::Open {
                    body,
                    buffer: LineBuffer::default(),
                },
                Err(err) => {
                    warn!(error = %err, "Streaming completion request failed");
                    return Some((CompletionLine::error(&err), LineState::Closed));
                }
            },

            LineState::Open { mut body, mut buffer } => {
                if let Some(raw) = buffer.next_line() {
                    // Blank lines separate SSE events; they carry nothing.
                    if raw.is_empty() {
                        LineState::Open { body, buffer }
                    } else {
                        let line = CompletionLine::parse(raw);
                        let next = if line.terminal {
                            LineState::Closed
                        } else {
                            LineState::Open { body, buffer }
                        };
                        return Some((line, next));
                    }
                } else {
                    match body.next().await {
                        Some(Ok(bytes)) => {
                            buffer.push(&bytes);
                            LineState::Open { body, buffer }
                        }
                        Some(Err(e)) => {
                            let err = CompletionError::StreamInterrupted(e.to_string());
                            warn!(error = %err, "Completion stream interrupted");
                            return Some((CompletionLine::error(&err), LineState::Closed));
                        }
                        None => {
                            return buffer
                                .finish()
                                .filter(|raw| !raw.is_empty())
                                .map(|raw| (CompletionLine::parse(raw), LineState::Closed));
                        }
                    }
                }
            }
        };
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: Option<&'a str>,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}
