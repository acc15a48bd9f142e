use std::path::Path;

use serde::Deserialize;

use crate::domain::{DomainError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub chunking: ChunkingConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub vector_store: VectorStoreConfig,
    pub cors: CorsConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub min_similarity: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    /// "memory" or "qdrant".
    pub backend: String,
    pub url: String,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub chat_system: String,
    pub summary_system: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            chunking: ChunkingConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
            vector_store: VectorStoreConfig::default(),
            cors: CorsConfig::default(),
            prompts: PromptsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-004".to_string(),
            dimension: 768,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_similarity: 0.2,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            url: "http://localhost:6334".to_string(),
            collection: "document_chunks".to_string(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            chat_system: DEFAULT_CHAT_PROMPT.to_string(),
            summary_system: DEFAULT_SUMMARY_PROMPT.to_string(),
        }
    }
}

impl Config {
    /// Load from a YAML file; missing sections fall back to defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DomainError::configuration(format!(
                "cannot read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;
        serde_yaml::from_str(&raw)
            .map_err(|e| DomainError::configuration(format!("invalid config file: {e}")))
    }
}

const DEFAULT_CHAT_PROMPT: &str = "\
You are an AI assistant designed to chat about the content of a specific document. \
Relevant document content is provided with each message. Base all your answers on that \
content, and keep responses clear, simple, and to the point. If a response is lengthy, \
break it into numbered or bulleted points. If asked about something not covered by the \
provided content, politely state that the information is not available in the document. \
Do not use markdown formatting; answer in plain text only.";

const DEFAULT_SUMMARY_PROMPT: &str = "\
You are tasked with creating a detailed summary of a document. The document content \
will be provided in the next message. Begin with a brief overview of the document's \
main topic, then list the key sections and their main points, including any important \
statistics, dates, or figures. Conclude with a short statement of the document's \
overall purpose. Use plain text with simple bullet points; no markdown tags.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_values() {
        let config = Config::default();
        assert_eq!(config.chunking.chunk_size, 1000);
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.embedding.dimension, 768);
        assert_eq!(config.retrieval.top_k, 10);
        assert!((config.retrieval.min_similarity - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.llm.timeout_seconds, 30);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config: Config =
            serde_yaml::from_str("chunking:\n  chunk_size: 500\n").unwrap();
        assert_eq!(config.chunking.chunk_size, 500);
        // chunk_overlap comes from the section default, everything else from
        // the top-level defaults.
        assert_eq!(config.chunking.chunk_overlap, 200);
        assert_eq!(config.embedding.model, "text-embedding-004");
    }
}
