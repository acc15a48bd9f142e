pub mod config;
pub mod document_store;
pub mod embedding;
pub mod llm;
pub mod vector_store;

pub use config::Config;
pub use document_store::InMemoryDocumentStore;
pub use embedding::GeminiEmbedding;
pub use llm::GeminiLlm;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
