//! Prompt assembly: retrieved chunks + memory + the current turn.
//!
//! Produces the message list sent to the completion endpoint:
//!
//! 1. **System**: the template rendered with the budgeted context and the query
//! 2. **Memory**: one user/assistant pair per remembered turn, oldest first
//! 3. **User**: the current query
//!
//! # Determinism
//!
//! Assembly is a pure function of its inputs: no I/O, no clock, no
//! randomness. Identical inputs always produce identical messages.

use crate::context::token;
use rustedrag_core::message::{Message, QaPair};
use rustedrag_core::template::PromptTemplate;
use tracing::debug;

/// The budgeted context block and how it was filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledContext {
    /// Accepted chunks joined by blank lines, trimmed.
    pub text: String,
    /// Estimated tokens (words) of the accepted chunks.
    pub tokens: usize,
    /// Chunks accepted before the budget was hit.
    pub chunks_included: usize,
    /// Chunks offered.
    pub chunks_total: usize,
}

impl AssembledContext {
    pub fn chunks_dropped(&self) -> usize {
        self.chunks_total - self.chunks_included
    }
}

/// The prompt assembler. Stateless; create one and reuse it.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    template: PromptTemplate,
    max_context_tokens: usize,
}

impl PromptAssembler {
    /// Create an assembler with the given template and context word budget.
    pub fn new(template: PromptTemplate, max_context_tokens: usize) -> Self {
        Self {
            template,
            max_context_tokens,
        }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn max_context_tokens(&self) -> usize {
        self.max_context_tokens
    }

    /// Fill the context block greedily, in retrieval order.
    ///
    /// Stops at the first chunk that would push the total past the budget;
    /// later (smaller) chunks are not considered, so ranking order is kept.
    pub fn build_context<S: AsRef<str>>(&self, chunks: &[S]) -> AssembledContext {
        let mut text = String::new();
        let mut tokens = 0;
        let mut included = 0;

        for chunk in chunks {
            let chunk = chunk.as_ref();
            let cost = token::estimate_tokens(chunk);
            if tokens + cost > self.max_context_tokens {
                debug!(
                    tokens,
                    budget = self.max_context_tokens,
                    dropped = chunks.len() - included,
                    "Truncating context at token budget"
                );
                break;
            }
            text.push_str(chunk);
            text.push_str("\n\n");
            tokens += cost;
            included += 1;
        }

        AssembledContext {
            text: text.trim().to_string(),
            tokens,
            chunks_included: included,
            chunks_total: chunks.len(),
        }
    }

    /// Build the full message list for one request.
    ///
    /// `memory` is replayed as given; callers pass the memory window, not
    /// the whole store.
    pub fn build<S: AsRef<str>>(
        &self,
        query: &str,
        chunks: &[S],
        memory: &[QaPair],
    ) -> Vec<Message> {
        let context = self.build_context(chunks);
        let system = self.template.render(&context.text, query);

        let mut messages = Vec::with_capacity(2 + memory.len() * 2);
        messages.push(Message::system(system));
        messages.extend(memory.iter().flat_map(QaPair::to_messages));
        messages.push(Message::user(query));

        debug!(
            messages = messages.len(),
            context_tokens = context.tokens,
            chunks = context.chunks_included,
            "Assembled prompt"
        );
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustedrag_core::message::Role;

    fn assembler(budget: usize) -> PromptAssembler {
        PromptAssembler::new(
            PromptTemplate::new("CTX[{context}] Q[{question}]").unwrap(),
            budget,
        )
    }

    #[test]
    fn stops_at_first_chunk_over_budget() {
        let ctx = assembler(3).build_context(&["alpha beta", "gamma delta epsilon"]);
        assert_eq!(ctx.text, "alpha beta");
        assert_eq!(ctx.tokens, 2);
        assert_eq!(ctx.chunks_included, 1);
        assert_eq!(ctx.chunks_dropped(), 1);
    }

    #[test]
    fn does_not_skip_ahead_to_smaller_chunks() {
        let ctx = assembler(3).build_context(&["one", "two three four", "five"]);
        assert_eq!(ctx.text, "one");
    }

    #[test]
    fn chunks_separated_by_blank_line() {
        let ctx = assembler(100).build_context(&["first chunk", "second chunk"]);
        assert_eq!(ctx.text, "first chunk\n\nsecond chunk");
        assert_eq!(ctx.tokens, 4);
    }

    #[test]
    fn exact_budget_fits() {
        let ctx = assembler(5).build_context(&["alpha beta", "gamma delta epsilon"]);
        assert_eq!(ctx.chunks_included, 2);
        assert_eq!(ctx.tokens, 5);
    }

    #[test]
    fn zero_budget_is_empty_context() {
        let ctx = assembler(0).build_context(&["alpha", "beta"]);
        assert_eq!(ctx.text, "");
        assert_eq!(ctx.tokens, 0);
    }

    #[test]
    fn context_never_exceeds_budget() {
        let chunks: Vec<String> = (1..20).map(|n| "word ".repeat(n)).collect();
        for budget in [0, 1, 7, 30, 100] {
            let ctx = assembler(budget).build_context(&chunks);
            assert!(token::estimate_tokens(&ctx.text) <= budget);
        }
    }

    #[test]
    fn minimal_prompt_is_system_then_user() {
        let a = assembler(2000);
        let messages = a.build::<&str>("hi", &[], &[]);
        assert_eq!(
            messages,
            vec![Message::system("CTX[] Q[hi]"), Message::user("hi")]
        );
    }

    #[test]
    fn memory_replayed_between_system_and_query() {
        let memory = vec![QaPair::new("q1", "a1"), QaPair::new("q2", "a2")];
        let messages = assembler(2000).build("q3", &["fact"], &memory);

        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant,
                Role::User
            ]
        );
        assert_eq!(messages[0].content, "CTX[fact] Q[q3]");
        assert_eq!(messages[1].content, "q1");
        assert_eq!(messages[4].content, "a2");
        assert_eq!(messages[5].content, "q3");
    }

    #[test]
    fn default_template_renders_context_and_question() {
        let a = PromptAssembler::new(PromptTemplate::default(), 2000);
        let messages = a.build("What is Nedzo?", &["Nedzo is a robot."], &[]);
        assert!(messages[0].content.contains("Context:\nNedzo is a robot."));
        assert!(messages[0].content.ends_with("Question:\nWhat is Nedzo?"));
    }

    #[test]
    fn assembly_is_deterministic() {
        let a = assembler(10);
        let memory = vec![QaPair::new("q", "a")];
        assert_eq!(
            a.build("x", &["c1", "c2"], &memory),
            a.build("x", &["c1", "c2"], &memory)
        );
    }
}
