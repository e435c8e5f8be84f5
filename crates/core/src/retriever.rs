//! Retriever trait: the abstraction over remote context sources.
//!
//! A retriever turns a user query into ranked text chunks. The vector
//! store implementation lives in `rustedrag-providers`; tests substitute
//! their own.

use async_trait::async_trait;
use crate::error::RetrievalError;

/// The core ContextRetriever trait.
///
/// The solver calls `search()` once per request and treats any error as
/// "no context": retrieval never aborts answer generation.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// A human-readable name for this retriever (e.g., "vector_store").
    fn name(&self) -> &str;

    /// Return text chunks relevant to `query`, most relevant first.
    async fn search(&self, query: &str) -> std::result::Result<Vec<String>, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRetriever(Vec<String>);

    #[async_trait]
    impl ContextRetriever for FixedRetriever {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, _query: &str) -> Result<Vec<String>, RetrievalError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn trait_objects_are_usable() {
        let retriever: Box<dyn ContextRetriever> =
            Box::new(FixedRetriever(vec!["chunk one".into()]));
        assert_eq!(retriever.name(), "fixed");
        assert_eq!(retriever.search("anything").await.unwrap(), vec!["chunk one"]);
    }
}
