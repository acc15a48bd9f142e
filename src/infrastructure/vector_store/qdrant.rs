use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use uuid::Uuid;

use crate::domain::{
    ports::{SearchParams, VectorStore},
    DocumentChunk, DomainError, Embedding, SearchResult,
};

/// Qdrant-backed vector store. A chunk's text rides in the point payload, so
/// text and vector are written in a single upsert.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::external(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| DomainError::external(e.to_string()))?;
        }

        Ok(())
    }

    fn document_filter(document_id: Uuid) -> Filter {
        Filter::must([Condition::matches(
            "document_id",
            document_id.to_string(),
        )])
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn insert(
        &self,
        chunk: &DocumentChunk,
        embedding: &Embedding,
    ) -> Result<Uuid, DomainError> {
        if embedding.dimension() != self.dimension {
            return Err(DomainError::storage(format!(
                "embedding has {} dimensions, collection expects {}",
                embedding.dimension(),
                self.dimension
            )));
        }

        let payload: Payload = serde_json::json!({
            "chunk_id": chunk.id.to_string(),
            "document_id": chunk.document_id.to_string(),
            "content": chunk.content,
            "chunk_index": chunk.chunk_index,
        })
        .try_into()
        .map_err(|_| DomainError::internal("Failed to create payload"))?;

        let point = PointStruct::new(
            chunk.id.to_string(),
            embedding.as_slice().to_vec(),
            payload,
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]))
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        Ok(chunk.id)
    }

    async fn search(
        &self,
        document_id: Uuid,
        query: &Embedding,
        params: SearchParams,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(
                    &self.collection,
                    query.as_slice().to_vec(),
                    params.top_k as u64,
                )
                .filter(Self::document_filter(document_id))
                .score_threshold(params.min_similarity)
                .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        let search_results: Vec<SearchResult> = results
            .result
            .into_iter()
            // Qdrant's threshold is inclusive; the contract is strictly above.
            .filter(|point| point.score > params.min_similarity)
            .filter_map(|point| {
                let payload = point.payload;

                let chunk_id: Uuid = payload.get("chunk_id")?.as_str()?.parse().ok()?;
                let owner_id: Uuid = payload.get("document_id")?.as_str()?.parse().ok()?;
                if owner_id != document_id {
                    return None;
                }
                let content = payload.get("content")?.as_str()?.to_string();
                let chunk_index = payload.get("chunk_index")?.as_integer()? as usize;

                let chunk = DocumentChunk {
                    id: chunk_id,
                    document_id: owner_id,
                    content,
                    chunk_index,
                };

                Some(SearchResult {
                    chunk,
                    score: point.score,
                })
            })
            .collect();

        Ok(search_results)
    }

    async fn delete_by_document(&self, document_id: Uuid) -> Result<(), DomainError> {
        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(Self::document_filter(document_id)),
            )
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        Ok(())
    }
}
