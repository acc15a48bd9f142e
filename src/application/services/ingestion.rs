use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::domain::{
    ports::{EmbeddingService, VectorStore},
    Document, DocumentChunk, TextChunker,
};

/// How far a document made it through indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStage {
    Received,
    Chunked,
    Embedding,
    Stored,
    Complete,
    Failed,
}

/// Outcome of one ingestion run. A document with partial failures is still
/// usable for chat, just with reduced recall.
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub document_id: Uuid,
    pub stage: IngestionStage,
    pub chunks_total: usize,
    pub chunks_indexed: usize,
    pub embedding_failures: usize,
    pub storage_failures: usize,
    pub failure: Option<String>,
}

impl IngestionReport {
    fn complete(document_id: Uuid) -> Self {
        Self {
            document_id,
            stage: IngestionStage::Complete,
            chunks_total: 0,
            chunks_indexed: 0,
            embedding_failures: 0,
            storage_failures: 0,
            failure: None,
        }
    }

    fn failed(document_id: Uuid, chunks_total: usize, reason: impl Into<String>) -> Self {
        Self {
            document_id,
            stage: IngestionStage::Failed,
            chunks_total,
            chunks_indexed: 0,
            embedding_failures: chunks_total,
            storage_failures: 0,
            failure: Some(reason.into()),
        }
    }
}

/// Turns a freshly registered document into indexed, searchable chunks:
/// chunk, embed the batch, then insert every surviving chunk concurrently.
///
/// Best-effort by policy: a chunk whose embedding fails is dropped, a chunk
/// whose insert fails does not abort its siblings, and the pipeline only
/// reports `Failed` when the embedding provider is down outright.
pub struct IngestionPipeline {
    chunker: TextChunker,
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
}

impl IngestionPipeline {
    pub fn new(
        chunker: TextChunker,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            chunker,
            embedding,
            vector_store,
        }
    }

    #[instrument(skip(self, document), fields(document_id = %document.id))]
    pub async fn run(&self, document: &Document) -> IngestionReport {
        let mut report = IngestionReport::complete(document.id);
        tracing::debug!(stage = ?IngestionStage::Received, "ingestion started");

        let texts = self.chunker.split(&document.content);
        report.chunks_total = texts.len();
        tracing::debug!(stage = ?IngestionStage::Chunked, chunks = texts.len(), "document chunked");
        if texts.is_empty() {
            return report;
        }

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = match self.embedding.embed_batch(&refs).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                tracing::warn!(error = %e, "embedding provider failed, nothing indexed");
                return IngestionReport::failed(document.id, texts.len(), e.to_string());
            }
        };
        tracing::debug!(stage = ?IngestionStage::Embedding, "chunk embeddings settled");

        let mut inserts = Vec::new();
        for (index, (text, embedding)) in texts.iter().zip(embeddings).enumerate() {
            match embedding {
                Some(embedding) => {
                    let chunk = DocumentChunk::new(document.id, text.as_str(), index);
                    let store = self.vector_store.clone();
                    inserts.push(async move {
                        let result = store.insert(&chunk, &embedding).await;
                        (chunk.chunk_index, result)
                    });
                }
                None => {
                    tracing::warn!(chunk_index = index, "chunk embedding failed, skipping");
                    report.embedding_failures += 1;
                }
            }
        }

        for (index, result) in join_all(inserts).await {
            match result {
                Ok(_) => report.chunks_indexed += 1,
                Err(e) => {
                    tracing::warn!(chunk_index = index, error = %e, "chunk insert failed");
                    report.storage_failures += 1;
                }
            }
        }
        tracing::debug!(stage = ?IngestionStage::Stored, indexed = report.chunks_indexed, "inserts settled");

        tracing::info!(
            chunks_total = report.chunks_total,
            chunks_indexed = report.chunks_indexed,
            embedding_failures = report.embedding_failures,
            storage_failures = report.storage_failures,
            "ingestion complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SearchParams;
    use crate::domain::{DomainError, Embedding, SearchResult};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct ScriptedEmbeddings {
        fail_indices: HashSet<usize>,
        total_outage: bool,
    }

    impl ScriptedEmbeddings {
        fn healthy() -> Self {
            Self {
                fail_indices: HashSet::new(),
                total_outage: false,
            }
        }

        fn failing_at(indices: &[usize]) -> Self {
            Self {
                fail_indices: indices.iter().copied().collect(),
                total_outage: false,
            }
        }

        fn down() -> Self {
            Self {
                fail_indices: HashSet::new(),
                total_outage: true,
            }
        }
    }

    #[async_trait]
    impl EmbeddingService for ScriptedEmbeddings {
        async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
            Ok(Embedding::new(vec![text.len() as f32, 1.0, 0.0]))
        }

        async fn embed_batch(
            &self,
            texts: &[&str],
        ) -> Result<Vec<Option<Embedding>>, DomainError> {
            if self.total_outage {
                return Err(DomainError::provider_unavailable("connection refused"));
            }
            Ok(texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    if self.fail_indices.contains(&i) {
                        None
                    } else {
                        Some(Embedding::new(vec![text.len() as f32, i as f32, 0.0]))
                    }
                })
                .collect())
        }

        fn dimension(&self) -> usize {
            3
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        inserted: Mutex<Vec<DocumentChunk>>,
        fail_chunk_indices: HashSet<usize>,
    }

    impl RecordingStore {
        fn failing_at(indices: &[usize]) -> Self {
            Self {
                inserted: Mutex::new(Vec::new()),
                fail_chunk_indices: indices.iter().copied().collect(),
            }
        }
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn insert(
            &self,
            chunk: &DocumentChunk,
            _embedding: &Embedding,
        ) -> Result<Uuid, DomainError> {
            if self.fail_chunk_indices.contains(&chunk.chunk_index) {
                return Err(DomainError::storage("disk full"));
            }
            self.inserted.lock().unwrap().push(chunk.clone());
            Ok(chunk.id)
        }

        async fn search(
            &self,
            _document_id: Uuid,
            _query: &Embedding,
            _params: SearchParams,
        ) -> Result<Vec<SearchResult>, DomainError> {
            Ok(Vec::new())
        }

        async fn delete_by_document(&self, _document_id: Uuid) -> Result<(), DomainError> {
            Ok(())
        }
    }

    fn pipeline_with(
        embedding: ScriptedEmbeddings,
        store: Arc<RecordingStore>,
    ) -> IngestionPipeline {
        // 820 boundary-free characters at 100/20 split into exactly 10 chunks.
        IngestionPipeline::new(
            TextChunker::new(100, 20).unwrap(),
            Arc::new(embedding),
            store,
        )
    }

    fn ten_chunk_document() -> Document {
        Document::new("report.pdf", "x".repeat(820))
    }

    #[tokio::test]
    async fn test_all_chunks_indexed_on_happy_path() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = pipeline_with(ScriptedEmbeddings::healthy(), store.clone());
        let doc = ten_chunk_document();

        let report = pipeline.run(&doc).await;

        assert_eq!(report.stage, IngestionStage::Complete);
        assert_eq!(report.chunks_total, 10);
        assert_eq!(report.chunks_indexed, 10);
        assert_eq!(report.embedding_failures, 0);
        assert_eq!(report.storage_failures, 0);
        assert_eq!(store.inserted.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_partial_embedding_failure_drops_only_affected_chunks() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = pipeline_with(ScriptedEmbeddings::failing_at(&[2, 7]), store.clone());
        let doc = ten_chunk_document();

        let report = pipeline.run(&doc).await;

        assert_eq!(report.stage, IngestionStage::Complete);
        assert_eq!(report.chunks_total, 10);
        assert_eq!(report.chunks_indexed, 8);
        assert_eq!(report.embedding_failures, 2);
        assert!(report.failure.is_none());

        let inserted = store.inserted.lock().unwrap();
        let indices: HashSet<usize> = inserted.iter().map(|c| c.chunk_index).collect();
        assert!(!indices.contains(&2));
        assert!(!indices.contains(&7));
        assert_eq!(indices.len(), 8);
    }

    #[tokio::test]
    async fn test_provider_outage_fails_the_run_and_stores_nothing() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = pipeline_with(ScriptedEmbeddings::down(), store.clone());
        let doc = ten_chunk_document();

        let report = pipeline.run(&doc).await;

        assert_eq!(report.stage, IngestionStage::Failed);
        assert_eq!(report.chunks_indexed, 0);
        assert!(report.failure.is_some());
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_abort_sibling_inserts() {
        let store = Arc::new(RecordingStore::failing_at(&[0]));
        let pipeline = pipeline_with(ScriptedEmbeddings::healthy(), store.clone());
        let doc = ten_chunk_document();

        let report = pipeline.run(&doc).await;

        assert_eq!(report.stage, IngestionStage::Complete);
        assert_eq!(report.chunks_indexed, 9);
        assert_eq!(report.storage_failures, 1);
        assert_eq!(store.inserted.lock().unwrap().len(), 9);
    }

    #[tokio::test]
    async fn test_empty_document_yields_empty_report() {
        let store = Arc::new(RecordingStore::default());
        let pipeline = pipeline_with(ScriptedEmbeddings::healthy(), store.clone());
        let doc = Document::new("empty.pdf", "");

        let report = pipeline.run(&doc).await;

        assert_eq!(report.stage, IngestionStage::Complete);
        assert_eq!(report.chunks_total, 0);
        assert_eq!(report.chunks_indexed, 0);
    }
}
