use async_trait::async_trait;
use futures::future::join_all;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::gemini;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

/// Gemini embedding adapter. One network call per text; no local caching and
/// no normalization of the returned vectors.
pub struct GeminiEmbedding {
    client: gemini::Client,
    model: String,
    dimension: usize,
}

impl GeminiEmbedding {
    /// Reads `GEMINI_API_KEY` from the environment.
    pub fn new() -> Self {
        Self {
            client: gemini::Client::from_env(),
            model: "text-embedding-004".to_string(),
            dimension: 768,
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            client: gemini::Client::from_env(),
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }
}

impl Default for GeminiEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingService for GeminiEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let model = self.client.embedding_model(&self.model);

        let embeddings = EmbeddingsBuilder::new(model)
            .document(text)
            .map_err(|e| DomainError::external(e.to_string()))?
            .build()
            .await
            .map_err(|e| DomainError::external(e.to_string()))?;

        let embedding = embeddings
            .into_iter()
            .next()
            .map(|(_doc, emb)| {
                let vec_f32: Vec<f32> = emb.first().vec.into_iter().map(|x| x as f32).collect();
                Embedding::new(vec_f32)
            })
            .ok_or_else(|| DomainError::internal("No embedding returned"))?;

        if embedding.dimension() != self.dimension {
            return Err(DomainError::embedding(format!(
                "expected {} dimensions, provider returned {}",
                self.dimension,
                embedding.dimension()
            )));
        }

        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Option<Embedding>>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let results = join_all(texts.iter().map(|text| self.embed(text))).await;

        let mut slots = Vec::with_capacity(results.len());
        let mut last_error = None;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(embedding) => slots.push(Some(embedding)),
                Err(e) => {
                    tracing::warn!(index, error = %e, "embedding failed for batch item");
                    last_error = Some(e);
                    slots.push(None);
                }
            }
        }

        // Every single item failing means the provider itself is down, which
        // is a retryable batch-level error rather than partial degradation.
        if slots.iter().all(Option::is_none) {
            let detail = last_error.map(|e| e.to_string()).unwrap_or_default();
            return Err(DomainError::provider_unavailable(detail));
        }

        Ok(slots)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
