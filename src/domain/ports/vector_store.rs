use crate::domain::{errors::DomainError, DocumentChunk, Embedding, SearchResult};
use async_trait::async_trait;
use uuid::Uuid;

/// Bounds applied to a similarity search.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub top_k: usize,
    pub min_similarity: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persist one chunk together with its embedding in a single write.
    /// Safe to retry; duplicate chunks are acceptable.
    async fn insert(
        &self,
        chunk: &DocumentChunk,
        embedding: &Embedding,
    ) -> Result<Uuid, DomainError>;

    /// Return chunks of `document_id` only, ranked by descending cosine
    /// similarity to `query`, strictly above `min_similarity`, at most
    /// `top_k` results.
    async fn search(
        &self,
        document_id: Uuid,
        query: &Embedding,
        params: SearchParams,
    ) -> Result<Vec<SearchResult>, DomainError>;

    /// Remove every chunk owned by `document_id`.
    async fn delete_by_document(&self, document_id: Uuid) -> Result<(), DomainError>;
}
