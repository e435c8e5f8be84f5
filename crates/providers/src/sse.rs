//! Server-sent event line handling for streamed chat completions.
//!
//! The completion endpoint streams `data: {json}` lines terminated by
//! `data: [DONE]`. These helpers split the byte stream into lines and pull
//! the content delta out of a line without ever rejecting it: callers
//! forward every line as-is and only use the delta for bookkeeping.

use serde::Deserialize;
use tracing::trace;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_TOKEN: &str = "[DONE]";

/// Accumulates raw bytes and yields complete `\n`-terminated lines.
///
/// Bytes are buffered undecoded so a UTF-8 sequence split across two
/// network chunks is decoded intact.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    /// Append a chunk received from the network.
    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Take the next complete line, without its `\n` / `\r\n` terminator.
    pub fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=end).collect();
        line.pop();
        Some(decode(line))
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        Some(decode(std::mem::take(&mut self.pending)))
    }
}

fn decode(mut line: Vec<u8>) -> String {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8_lossy(&line).into_owned()
}

/// How a single streamed line should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// `data: [DONE]`: end of stream.
    Done,
    /// `data: <payload>` with the prefix stripped.
    Data(&'a str),
    /// Anything else (comments, `event:` lines, unprefixed text).
    Other,
}

/// Classify a raw line.
pub fn classify(line: &str) -> SseLine<'_> {
    match line.strip_prefix(DATA_PREFIX) {
        Some(payload) if payload.trim() == DONE_TOKEN => SseLine::Done,
        Some(payload) => SseLine::Data(payload.trim()),
        None => SseLine::Other,
    }
}

/// Whether `line` is the end-of-stream marker.
pub fn is_done(line: &str) -> bool {
    classify(line) == SseLine::Done
}

/// Extract `choices[0].delta.content` from a data line, if there is any.
///
/// Unparseable payloads yield `None`; they are not errors.
pub fn content_delta(line: &str) -> Option<String> {
    let SseLine::Data(payload) = classify(line) else {
        return None;
    };

    match serde_json::from_str::<StreamResponse>(payload) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()?
            .delta
            .content
            .filter(|c| !c.is_empty()),
        Err(e) => {
            trace!(data = %payload, error = %e, "Ignoring unparseable SSE chunk");
            None
        }
    }
}

/// The in-band line emitted when the stream fails.
///
/// It is shaped like any other data event so consumers that parse
/// `data: ` lines can surface the error without special casing.
pub fn error_line(message: &str) -> String {
    format!(
        "{DATA_PREFIX}{}",
        serde_json::json!({ "error": message, "done": true })
    )
}

/// The message carried by an [`error_line`], if `line` is one.
pub fn error_message(line: &str) -> Option<String> {
    let SseLine::Data(payload) = classify(line) else {
        return None;
    };
    let value: serde_json::Value = serde_json::from_str(payload).ok()?;
    if value.get("done").and_then(serde_json::Value::as_bool) != Some(true) {
        return None;
    }
    value.get("error")?.as_str().map(str::to_string)
}

// --- Streaming SSE types ---

/// A single SSE `data: {...}` chunk from a streaming response.
#[derive(Debug, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}
