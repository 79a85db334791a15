use async_trait::async_trait;

use crate::error::Result;

/// Seam to the embedding model, an external collaborator this crate never
/// implements beyond a test double. A production binary supplies a real
/// provider (an HTTP client to an embedding service, or an in-process
/// model); this crate only needs the 384-float vector it returns.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn dimension(&self) -> usize {
        cogni_core::EMBEDDING_DIM
    }
}

/// Deterministic, dependency-free stand-in for a real embedding model.
/// Hashes the input text into a fixed-length vector so repeated calls with
/// the same text produce the same embedding — good enough to exercise the
/// index's add/update/delete/query contract in tests without pulling in a
/// model runtime.
#[derive(Debug, Default)]
pub struct HashEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let dim = self.dimension();
        let mut vector = vec![0.0f32; dim];
        for (i, byte) in text.bytes().enumerate() {
            let slot = i % dim;
            vector[slot] += (byte as f32) / 255.0;
        }
        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in vector.iter_mut() {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_embeds_identically() {
        let provider = HashEmbeddingProvider;
        let a = provider.embed("hello world").await.unwrap();
        let b = provider.embed("hello world").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), cogni_core::EMBEDDING_DIM);
    }

    #[tokio::test]
    async fn different_text_embeds_differently() {
        let provider = HashEmbeddingProvider;
        let a = provider.embed("hello").await.unwrap();
        let b = provider.embed("goodbye").await.unwrap();
        assert_ne!(a, b);
    }
}
