//! In-process conversation memory: the last few answered turns.
//!
//! Storage is append-only: `record` never evicts. The capacity only bounds
//! what `window` surfaces to prompts, so older pairs stay stored but are
//! never replayed. Nothing survives a restart.

use rustedrag_core::message::{Message, QaPair};
use tracing::debug;

/// An ordered store of question/answer pairs with a capped read window.
///
/// Owned by a single solver; mutation goes through `&mut self`.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    pairs: Vec<QaPair>,
    capacity: usize,
    enabled: bool,
}

impl ConversationMemory {
    pub fn new(capacity: usize) -> Self {
        Self {
            pairs: Vec::new(),
            capacity,
            enabled: true,
        }
    }

    /// A memory that never records anything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0)
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Store a turn. Skipped (returns `false`) when memory is disabled or the
    /// answer is empty; otherwise appended with no dedup.
    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) -> bool {
        let answer = answer.into();
        if !self.enabled || answer.is_empty() {
            return false;
        }
        self.pairs.push(QaPair::new(question, answer));
        debug!(stored = self.pairs.len(), "Recorded conversation turn");
        true
    }

    /// Up to the last `n` pairs, oldest first.
    pub fn recent(&self, n: usize) -> &[QaPair] {
        let start = self.pairs.len().saturating_sub(n);
        &self.pairs[start..]
    }

    /// The pairs that are replayed into prompts: `recent(capacity)`.
    pub fn window(&self) -> &[QaPair] {
        self.recent(self.capacity)
    }

    /// The window rendered as alternating user/assistant messages.
    pub fn history(&self) -> Vec<Message> {
        self.window().iter().flat_map(QaPair::to_messages).collect()
    }

    /// Number of stored pairs, including those outside the window.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(3)
    }
}
