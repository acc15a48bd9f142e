use serde::{Deserialize, Serialize};

/// A dense embedding vector. Dimension is fixed by the provider model; values
/// are not normalized, so consumers must not assume unit length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn new(vec: Vec<f32>) -> Self {
        Self(vec)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Cosine similarity, equivalent to `1 - cosine_distance`. Mismatched
    /// dimensions and zero vectors score 0.
    pub fn cosine_similarity(&self, other: &Embedding) -> f32 {
        if self.0.len() != other.0.len() {
            return 0.0;
        }

        let mut dot = 0.0f32;
        let mut norm_sq_a = 0.0f32;
        let mut norm_sq_b = 0.0f32;
        for (a, b) in self.0.iter().zip(&other.0) {
            dot += a * b;
            norm_sq_a += a * a;
            norm_sq_b += b * b;
        }

        if norm_sq_a == 0.0 || norm_sq_b == 0.0 {
            return 0.0;
        }
        dot / (norm_sq_a.sqrt() * norm_sq_b.sqrt())
    }
}
