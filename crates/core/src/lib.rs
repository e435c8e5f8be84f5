//! # RustedRAG Core
//!
//! Domain types, traits, and error definitions for the RustedRAG solver.
//! This crate has **no HTTP dependencies**. It defines the domain model
//! that the provider, memory and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Remote collaborators are defined as traits here. Implementations live
//! in their respective crates, so a retriever can be swapped for a stub in
//! tests without touching the solver.

pub mod error;
pub mod message;
pub mod retriever;
pub mod template;

// Re-export key types at crate root for ergonomics
pub use error::{CompletionError, ConfigurationError, Error, Result, RetrievalError};
pub use message::{Message, QaPair, Role};
pub use retriever::ContextRetriever;
pub use template::{PromptTemplate, DEFAULT_PROMPT_TEMPLATE};
