//! Process-wide embedding cache keyed by `(embedder_id, content_hash)`.
//!
//! The cache is consulted before calling the wrapped embedder and written
//! through on misses. Failures and empty vectors are never cached, so a
//! transient outage does not pin a "no embedding" answer.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

use agora_core::traits::Embedder;

fn hash_content(s: &str) -> String {
    blake3::hash(s.as_bytes()).to_hex().to_string()
}

pub struct CachedEmbedder {
    inner: Arc<dyn Embedder>,
    entries: Mutex<HashMap<(String, String), Vec<f32>>>,
    capacity: usize,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>, capacity: usize) -> Self {
        Self { inner, entries: Mutex::new(HashMap::new()), capacity: capacity.max(1) }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &(String, String)) -> Option<Vec<f32>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    fn store(&self, key: (String, String), vector: Vec<f32>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        // Crude bound: start over rather than track recency.
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            tracing::debug!(capacity = self.capacity, "embedding cache full; clearing");
            entries.clear();
        }
        entries.insert(key, vector);
    }
}

#[async_trait]
impl Embedder for CachedEmbedder {
    fn embedder_id(&self) -> &str {
        self.inner.embedder_id()
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    async fn embed(&self, text: &str, cancel: &CancellationToken) -> Result<Vec<f32>> {
        let key = (self.inner.embedder_id().to_string(), hash_content(text));
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        let vector = self.inner.embed(text, cancel).await?;
        if !vector.is_empty() {
            self.store(key, vector.clone());
        }
        Ok(vector)
    }
}
