mod chat;
mod document;
mod ingestion;
mod rag;

pub use chat::{ChatAnswer, ChatService};
pub use document::DocumentService;
pub use ingestion::{IngestionPipeline, IngestionReport, IngestionStage};
pub use rag::RagService;
