use async_trait::async_trait;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    ports::{SearchParams, VectorStore},
    DocumentChunk, DomainError, Embedding, SearchResult,
};

/// Process-local vector store. Chunk text and embedding land together in one
/// append, so a chunk without a vector can never be observed.
pub struct InMemoryVectorStore {
    dimension: usize,
    chunks: RwLock<Vec<(DocumentChunk, Embedding)>>,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            chunks: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn insert(
        &self,
        chunk: &DocumentChunk,
        embedding: &Embedding,
    ) -> Result<Uuid, DomainError> {
        if embedding.dimension() != self.dimension {
            return Err(DomainError::storage(format!(
                "embedding has {} dimensions, store expects {}",
                embedding.dimension(),
                self.dimension
            )));
        }

        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.push((chunk.clone(), embedding.clone()));
        Ok(chunk.id)
    }

    async fn search(
        &self,
        document_id: Uuid,
        query: &Embedding,
        params: SearchParams,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .chunks
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .filter(|(chunk, _)| chunk.document_id == document_id)
            .map(|(chunk, embedding)| SearchResult {
                chunk: chunk.clone(),
                score: query.cosine_similarity(embedding),
            })
            .filter(|r| r.score > params.min_similarity)
            .collect();

        // Stable sort: equal scores keep insertion order.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(params.top_k);

        Ok(results)
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<(), DomainError> {
        let mut store = self
            .chunks
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        store.retain(|(chunk, _)| chunk.document_id != document_id);
        Ok(())
    }
}
