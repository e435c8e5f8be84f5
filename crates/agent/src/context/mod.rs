//! Context assembly for retrieval-augmented prompts.
//!
//! | Part | Source | Trim Strategy |
//! |------|--------|---------------|
//! | System | Template + retrieved chunks | Chunks cut at the word budget, in rank order |
//! | Memory | Recent Q&A pairs | Capped to the memory window |
//! | User | Current query | Never trimmed |

pub mod assembler;
pub mod token;

pub use assembler::{AssembledContext, PromptAssembler};
