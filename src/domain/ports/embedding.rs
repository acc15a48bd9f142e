use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;

    /// Embed a batch of texts. The output has one slot per input, in input
    /// order; a slot is `None` when embedding that item failed. Only a total
    /// provider outage (every item failed) surfaces as an error, and that
    /// error is retryable.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Option<Embedding>>, DomainError>;

    fn dimension(&self) -> usize;
}
