//! Conversation memory for RustedRAG.

pub mod conversation;

pub use conversation::ConversationMemory;
