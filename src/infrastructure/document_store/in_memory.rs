use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::domain::{ports::DocumentStore, Document, DomainError};

/// Process-local document repository.
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<Uuid, Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(&self, doc: &Document) -> Result<(), DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        documents.insert(doc.id, doc.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        Ok(documents.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Document>, DomainError> {
        let documents = self
            .documents
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut all: Vec<Document> = documents.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut documents = self
            .documents
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        documents
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_get_roundtrip() {
        let store = InMemoryDocumentStore::new();
        let doc = Document::new("a.pdf", "content");

        store.save(&doc).await.unwrap();
        let loaded = store.get(doc.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "a.pdf");
        assert_eq!(loaded.content, "content");
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = InMemoryDocumentStore::new();
        let older = Document::new("old.pdf", "x");
        let mut newer = Document::new("new.pdf", "y");
        newer.created_at = older.created_at + chrono::Duration::seconds(5);

        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(listed[0].name, "new.pdf");
        assert_eq!(listed[1].name, "old.pdf");
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();
        let err = store.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
