use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use tokio_util::sync::CancellationToken;
use twox_hash::XxHash64;

use agora_core::traits::Embedder;

use crate::similarity::l2_normalize;

/// Deterministic bag-of-words embedder.
///
/// Every lowercased token is hashed into one of `dim` buckets; the result is
/// L2-normalized. Texts sharing vocabulary land close together, which is all
/// the offline CLI and the tests need.
pub struct HashingEmbedder {
    dim: usize,
    id: String,
}

impl HashingEmbedder {
    pub const DEFAULT_DIM: usize = 256;

    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("hash:xxh64:d{dim}") }
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        for (i, token) in tokens.enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        if v.iter().all(|x| *x == 0.0) {
            return Vec::new();
        }
        l2_normalize(&mut v);
        v
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DIM)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    async fn embed(&self, text: &str, cancel: &CancellationToken) -> Result<Vec<f32>> {
        if cancel.is_cancelled() {
            return Err(anyhow!("embedding cancelled"));
        }
        Ok(self.embed_sync(text))
    }
}
