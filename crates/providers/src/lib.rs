//! Remote service clients for RustedRAG.
//!
//! Both clients talk to an OpenAI-compatible server: the vector store
//! search endpoint for context, and the chat completions endpoint for
//! answers.

pub mod openai_compat;
pub mod sse;
pub mod vector_store;

pub use openai_compat::{CompletionClient, CompletionLine, SamplingParams};
pub use vector_store::VectorStoreRetriever;
