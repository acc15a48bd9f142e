use crate::domain::{errors::DomainError, Document};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn save(&self, doc: &Document) -> Result<(), DomainError>;
    async fn get(&self, id: Uuid) -> Result<Option<Document>, DomainError>;
    /// All documents, newest first.
    async fn list(&self) -> Result<Vec<Document>, DomainError>;
    async fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}
