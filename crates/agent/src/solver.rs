//! RAG solver: retrieval-augmented answers with short-term memory.
//!
//! # Flow
//!
//! 1. Search the vector store for the user query (failure → no context)
//! 2. Assemble system prompt + memory window + query
//! 3. Call the completion endpoint, blocking or streaming
//! 4. Remember the (query, answer) turn for follow-ups
//!
//! All entrypoints take `&mut self`: one request at a time per solver. A
//! stream returned by [`RagSolver::stream_answer`] keeps the solver
//! borrowed until it is dropped.

use futures::stream::{self, BoxStream, StreamExt};
use rustedrag_config::SolverConfig;
use rustedrag_core::error::{CompletionError, ConfigurationError};
use rustedrag_core::message::Message;
use rustedrag_core::retriever::ContextRetriever;
use rustedrag_memory::ConversationMemory;
use rustedrag_providers::sse;
use rustedrag_providers::{CompletionClient, CompletionLine, SamplingParams, VectorStoreRetriever};
use tracing::{debug, error, info, warn};

use crate::context::PromptAssembler;

/// Retrieval-augmented chat solver.
pub struct RagSolver {
    retriever: Box<dyn ContextRetriever>,
    completions: CompletionClient,
    assembler: PromptAssembler,
    memory: ConversationMemory,
}

impl RagSolver {
    /// Build a solver from validated configuration.
    ///
    /// Fails if `api_url` or `vector_store_id` is missing, the template
    /// lacks a placeholder, or the HTTP client cannot be built. A missing
    /// model or key only warns: local servers often need neither.
    pub fn new(config: &SolverConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        if config.llm_model.is_none() {
            warn!("llm_model not set; the server will pick its default model");
        }
        if config.key.is_none() {
            warn!("key not set; requests will be sent without an Authorization header");
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        let retriever = VectorStoreRetriever::new(
            client.clone(),
            config.base_url(),
            &config.vector_store_id,
            config.max_num_results,
        )
        .with_api_key(config.key.clone());

        let completions = CompletionClient::new(client, config.base_url())
            .with_api_key(config.key.clone())
            .with_model(config.llm_model.clone())
            .with_sampling(SamplingParams {
                temperature: config.llm_temperature,
                top_p: config.llm_top_p,
                max_tokens: config.llm_max_tokens,
            });

        let assembler = PromptAssembler::new(config.prompt_template()?, config.max_context_tokens);

        let memory = if config.enable_memory {
            ConversationMemory::new(config.memory_size)
        } else {
            ConversationMemory::disabled()
        };

        Ok(Self {
            retriever: Box::new(retriever),
            completions,
            assembler,
            memory,
        })
    }

    /// Replace the context source (e.g. a different index or a test stub).
    pub fn with_retriever(mut self, retriever: Box<dyn ContextRetriever>) -> Self {
        self.retriever = retriever;
        self
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut ConversationMemory {
        &mut self.memory
    }

    /// Remembered turns as alternating user/assistant messages.
    pub fn chat_history(&self) -> Vec<Message> {
        self.memory.history()
    }

    /// Chat history followed by `utterance` as a new user message.
    pub fn messages_for(&self, utterance: &str) -> Vec<Message> {
        let mut messages = self.chat_history();
        messages.push(Message::user(utterance));
        messages
    }

    /// Answer a single query, blocking until the full answer arrives.
    ///
    /// Completion failures are returned and leave memory untouched.
    pub async fn answer(&mut self, query: &str) -> Result<String, CompletionError> {
        let prompt = self.prepare(query).await;

        let answer = self.completions.complete(&prompt).await.map_err(|e| {
            error!(error = %e, "Completion request failed");
            e
        })?;

        if self.memory.record(query, answer.as_str()) {
            debug!(stored = self.memory.len(), "Stored turn in memory");
        }
        info!(answer_len = answer.len(), "RAG answer generated");
        Ok(answer)
    }

    /// Answer the last message of a conversation.
    ///
    /// Earlier messages are ignored: prior turns come from the solver's own
    /// memory so that retrieval context is never replayed twice.
    pub async fn continue_chat(&mut self, messages: &[Message]) -> Result<String, CompletionError> {
        let query = last_query(messages)?;
        self.answer(&query).await
    }

    /// Stream an answer as raw SSE lines.
    ///
    /// Every received line is yielded unchanged, up to and including
    /// `data: [DONE]`. A transport failure yields one
    /// `data: {"done":true,"error":...}` line and ends the stream. Once a
    /// terminal line is reached (or the body ends) the accumulated answer is
    /// recorded in memory before that line is yielded. Dropping the stream
    /// early closes the connection and records nothing.
    pub async fn stream_answer(&mut self, query: &str) -> BoxStream<'_, String> {
        let prompt = self.prepare(query).await;
        let lines = self.completions.stream(&prompt);

        let turn = StreamingTurn {
            query: query.to_string(),
            answer: String::new(),
            memory: &mut self.memory,
        };

        stream::unfold(Some((lines, turn)), |state| async move {
            let (mut lines, mut turn) = state?;
            match lines.next().await {
                Some(CompletionLine {
                    raw,
                    delta,
                    terminal,
                }) => {
                    if let Some(delta) = delta {
                        turn.answer.push_str(&delta);
                    }
                    if terminal {
                        turn.finish();
                        Some((raw, None))
                    } else {
                        Some((raw, Some((lines, turn))))
                    }
                }
                None => {
                    turn.finish();
                    None
                }
            }
        })
        .boxed()
    }

    /// Stream an answer to the last message of a conversation.
    ///
    /// An empty conversation yields a single error line.
    pub async fn stream_chat(&mut self, messages: &[Message]) -> BoxStream<'_, String> {
        match last_query(messages) {
            Ok(query) => self.stream_answer(&query).await,
            Err(e) => stream::once(async move { sse::error_line(&e.to_string()) }).boxed(),
        }
    }

    /// Retrieve context and assemble the prompt for `query`.
    async fn prepare(&self, query: &str) -> Vec<Message> {
        let chunks = match self.retriever.search(query).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(
                    retriever = self.retriever.name(),
                    error = %e,
                    "Context retrieval failed, answering without augmented context"
                );
                Vec::new()
            }
        };
        debug!(chunks = chunks.len(), "Context retrieved");

        self.assembler.build(query, &chunks, self.memory.window())
    }
}

/// Bookkeeping for one in-flight streamed answer.
struct StreamingTurn<'a> {
    query: String,
    answer: String,
    memory: &'a mut ConversationMemory,
}

impl StreamingTurn<'_> {
    fn finish(self) {
        let answer_len = self.answer.len();
        if self.memory.record(self.query, self.answer) {
            debug!(stored = self.memory.len(), "Stored streamed turn in memory");
        }
        info!(answer_len, "RAG stream finished");
    }
}

fn last_query(messages: &[Message]) -> Result<String, CompletionError> {
    messages
        .last()
        .map(|m| m.content.clone())
        .ok_or(CompletionError::EmptyConversation)
}
