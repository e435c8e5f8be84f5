//! System prompt template with `{context}` and `{question}` placeholders.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Built-in template used when none is configured.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are a helpful assistant. Use the following context to answer the user's question. \
If the answer is not in the context, state that you don't know.\n\n\
Context:\n{context}\n\nQuestion:\n{question}";

/// A validated system prompt template.
///
/// Construction fails unless both placeholders are present, so a
/// `PromptTemplate` can always be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromptTemplate {
    source: String,
}

impl PromptTemplate {
    /// Validate and wrap a template string.
    ///
    /// A doubled brace is a literal, so `{{context}}` does not count as the
    /// context placeholder.
    pub fn new(source: impl Into<String>) -> Result<Self, ConfigurationError> {
        let source = source.into();
        let segments = segments(&source);
        for (placeholder, segment) in [
            (CONTEXT_PLACEHOLDER, Segment::Context),
            (QUESTION_PLACEHOLDER, Segment::Question),
        ] {
            if !segments.contains(&segment) {
                return Err(ConfigurationError::InvalidTemplate(format!(
                    "system_prompt_template must contain the '{placeholder}' placeholder"
                )));
            }
        }
        Ok(Self { source })
    }

    /// The raw template text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute both placeholders in a single left-to-right pass.
    ///
    /// Substituted text is never rescanned, so a question that itself
    /// contains `{context}` is inserted verbatim. `{{` and `}}` render as a
    /// single brace; any other brace is copied through unchanged.
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + context.len() + question.len());
        for segment in segments(&self.source) {
            out.push_str(match segment {
                Segment::Text(text) => text,
                Segment::Context => context,
                Segment::Question => question,
            });
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Text(&'a str),
    Context,
    Question,
}

/// Split a template into literal text and placeholders.
fn segments(source: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = source;

    while let Some(pos) = rest.find(['{', '}']) {
        if pos > 0 {
            out.push(Segment::Text(&rest[..pos]));
        }
        let tail = &rest[pos..];
        let (segment, consumed) = if tail.starts_with("{{") {
            (Segment::Text("{"), 2)
        } else if tail.starts_with("}}") {
            (Segment::Text("}"), 2)
        } else if tail.starts_with(CONTEXT_PLACEHOLDER) {
            (Segment::Context, CONTEXT_PLACEHOLDER.len())
        } else if tail.starts_with(QUESTION_PLACEHOLDER) {
            (Segment::Question, QUESTION_PLACEHOLDER.len())
        } else {
            (Segment::Text(&tail[..1]), 1)
        };
        out.push(segment);
        rest = &tail[consumed..];
    }

    if !rest.is_empty() {
        out.push(Segment::Text(rest));
    }
    out
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl TryFrom<String> for PromptTemplate {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PromptTemplate> for String {
    fn from(template: PromptTemplate) -> Self {
        template.source
    }
}
