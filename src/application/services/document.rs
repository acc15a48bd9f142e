use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::application::services::ingestion::{IngestionPipeline, IngestionReport};
use crate::domain::{
    ports::{DocumentStore, LlmService, VectorStore},
    Document, DomainError,
};

/// Document lifecycle: register (persist, summarize, index), fetch, list,
/// and cascade delete. Registration is synchronous; the caller gets the
/// document back only after every index insert has settled.
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    vector_store: Arc<dyn VectorStore>,
    ingestion: Arc<IngestionPipeline>,
    llm: Option<Arc<dyn LlmService>>,
    summary_prompt: String,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        vector_store: Arc<dyn VectorStore>,
        ingestion: Arc<IngestionPipeline>,
    ) -> Self {
        Self {
            store,
            vector_store,
            ingestion,
            llm: None,
            summary_prompt: String::new(),
        }
    }

    /// Enable upload-time summaries. Summary generation is best-effort and
    /// never fails a registration.
    pub fn with_summarizer(
        mut self,
        llm: Arc<dyn LlmService>,
        summary_prompt: impl Into<String>,
    ) -> Self {
        self.llm = Some(llm);
        self.summary_prompt = summary_prompt.into();
        self
    }

    #[instrument(skip(self, content))]
    pub async fn register(
        &self,
        name: &str,
        content: &str,
    ) -> Result<(Document, IngestionReport), DomainError> {
        let mut doc = Document::new(name, content);

        if let Some(llm) = &self.llm {
            match llm.complete_with_system(&self.summary_prompt, content).await {
                Ok(summary) => doc = doc.with_summary(summary),
                Err(e) => {
                    tracing::warn!(error = %e, "summary generation failed, continuing without");
                }
            }
        }

        self.store.save(&doc).await?;
        let report = self.ingestion.run(&doc).await;

        Ok((doc, report))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        self.store.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Document>, DomainError> {
        self.store.list().await
    }

    /// Deleting a document removes all of its chunks; no orphan vectors may
    /// remain afterwards.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        self.store.delete(id).await?;
        self.vector_store.delete_by_document(id).await
    }
}
