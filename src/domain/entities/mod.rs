mod document;
mod embedding;
mod message;

pub use document::{Document, DocumentChunk, SearchResult};
pub use embedding::Embedding;
pub use message::{Message, MessageRole};
