use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    ports::{EmbeddingService, SearchParams, VectorStore},
    DomainError, SearchResult,
};

/// Per-query retrieval: embed the query, then similarity-search the chunks of
/// one document. Results feed the chat prompt downstream; this service never
/// calls the language model itself.
pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    defaults: SearchParams,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        defaults: SearchParams,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            defaults,
        }
    }

    #[instrument(skip(self, query))]
    pub async fn retrieve(
        &self,
        document_id: Uuid,
        query: &str,
    ) -> Result<Vec<SearchResult>, DomainError> {
        self.retrieve_with(document_id, query, self.defaults).await
    }

    #[instrument(skip(self, query))]
    pub async fn retrieve_with(
        &self,
        document_id: Uuid,
        query: &str,
        params: SearchParams,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedding.embed(query).await.map_err(|e| match e {
            // Provider outages stay retryable; anything else is a query
            // embedding failure with no context to return.
            DomainError::ProviderUnavailable(_) => e,
            other => DomainError::embedding(format!("query embedding failed: {other}")),
        })?;

        let results = self
            .vector_store
            .search(document_id, &embedding, params)
            .await?;

        tracing::debug!(hits = results.len(), "retrieval finished");
        Ok(results)
    }
}
