//! Vector store retriever: context search against a remote vector store.
//!
//! Calls `POST {base}/vector_stores/{id}/search` and returns the text of
//! each hit in ranked order.

use async_trait::async_trait;
use rustedrag_core::error::RetrievalError;
use rustedrag_core::retriever::ContextRetriever;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// A retriever backed by an OpenAI-compatible vector store search endpoint.
#[derive(Debug, Clone)]
pub struct VectorStoreRetriever {
    base_url: String,
    vector_store_id: String,
    max_num_results: usize,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl VectorStoreRetriever {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        vector_store_id: impl Into<String>,
        max_num_results: usize,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            vector_store_id: vector_store_id.into(),
            max_num_results,
            api_key: None,
            client,
        }
    }

    /// Attach a bearer credential to search requests.
    ///
    /// The same key the completion client uses is sent here too; hosted
    /// vector stores reject unauthenticated searches.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn search_url(&self) -> String {
        format!(
            "{}/vector_stores/{}/search",
            self.base_url, self.vector_store_id
        )
    }
}

#[async_trait]
impl ContextRetriever for VectorStoreRetriever {
    fn name(&self) -> &str {
        "vector_store"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, RetrievalError> {
        let url = self.search_url();
        debug!(url = %url, query = %query, "Sending vector store search request");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request
            .json(&SearchRequest {
                query,
                max_num_results: self.max_num_results,
            })
            .send()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::Status {
                status_code: status.as_u16(),
                message: error_body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RetrievalError::Network(e.to_string()))?;

        let chunks = parse_search_response(&body)?;
        debug!(chunks = chunks.len(), "Retrieved chunks from vector store");
        Ok(chunks)
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_num_results: usize,
}

/// Pull the text out of each search hit, skipping hits without any.
///
/// `content` is usually a string. OpenAI's hosted search returns a list of
/// `{"type": "text", "text": ...}` parts instead; those are joined with
/// newlines.
fn parse_search_response(body: &str) -> Result<Vec<String>, RetrievalError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| RetrievalError::InvalidJson(e.to_string()))?;

    let items = value
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            RetrievalError::UnexpectedFormat(format!("expected a 'data' list, got: {value}"))
        })?;

    Ok(items
        .iter()
        .filter_map(|item| item.get("content").and_then(content_text))
        .collect())
}

fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(text) => Some(text.clone()),
        Value::Array(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect();
            (!texts.is_empty()).then(|| texts.join("\n"))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_search_url() {
        let r = VectorStoreRetriever::new(reqwest::Client::new(), "http://h/v1/", "vs_42", 5);
        assert_eq!(r.search_url(), "http://h/v1/vector_stores/vs_42/search");
        assert_eq!(r.name(), "vector_store");
    }

    #[test]
    fn extracts_content_in_order_and_skips_items_without_it() {
        let body = r#"{"data":[
            {"content":"first","score":0.9},
            {"score":0.8},
            {"content":"third"}
        ]}"#;
        assert_eq!(parse_search_response(body).unwrap(), vec!["first", "third"]);
    }

    #[test]
    fn joins_text_parts() {
        let body = r#"{"data":[{"content":[{"type":"text","text":"a"},{"type":"text","text":"b"}]}]}"#;
        assert_eq!(parse_search_response(body).unwrap(), vec!["a\nb"]);
    }

    #[test]
    fn empty_data_is_empty_result() {
        assert!(parse_search_response(r#"{"data":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn missing_data_list_is_unexpected_format() {
        assert!(matches!(
            parse_search_response(r#"{"results":[]}"#),
            Err(RetrievalError::UnexpectedFormat(_))
        ));
        assert!(matches!(
            parse_search_response(r#"{"data":"oops"}"#),
            Err(RetrievalError::UnexpectedFormat(_))
        ));
    }

    #[test]
    fn malformed_json_is_invalid_json() {
        assert!(matches!(
            parse_search_response("not json"),
            Err(RetrievalError::InvalidJson(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_store_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let r = VectorStoreRetriever::new(reqwest::Client::new(), format!("http://{addr}/v1"), "vs_1", 5)
            .with_api_key(Some("sk-test".into()));
        assert!(matches!(
            r.search("anything").await,
            Err(RetrievalError::Network(_))
        ));
    }
}
