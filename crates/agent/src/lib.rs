//! The retrieval-augmented solver: the heart of RustedRAG.
//!
//! Every turn follows the same cycle:
//!
//! 1. **Retrieve** context chunks for the user query from the vector store
//! 2. **Assemble** the system prompt (template + budgeted context), the
//!    remembered turns, and the query
//! 3. **Complete** via the chat completion endpoint, blocking or streamed
//! 4. **Remember** the question and its answer for the next turn
//!
//! Retrieval failure is never fatal: the model answers without context.

pub mod context;
pub mod solver;

pub use context::{AssembledContext, PromptAssembler};
pub use solver::RagSolver;
