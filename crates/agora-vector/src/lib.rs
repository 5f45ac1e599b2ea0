//! In-memory vector collaborator for the hybrid ranker.
//!
//! Posts are embedded as `title\nbody` with any `Embedder` and searched by
//! brute-force cosine distance (lower is better), matching the distance
//! convention of external vector stores.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use agora_core::traits::{Embedder, VectorBackend};
use agora_core::types::{ContentRecord, ScoredRecord, SearchFilters};
use agora_embed::cosine_distance;

/// Embedding calls in flight while indexing.
const EMBED_CONCURRENCY: usize = 8;

struct Entry {
    record: ContentRecord,
    vector: Vec<f32>,
}

pub struct MemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    entries: RwLock<Vec<Entry>>,
}

impl MemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder, entries: RwLock::new(Vec::new()) }
    }

    pub fn embedder_id(&self) -> &str {
        self.embedder.embedder_id()
    }

    /// Embed and store records. Records whose embedding comes back empty are
    /// skipped; the count of stored records is returned.
    pub async fn index_records(&self, records: &[ContentRecord], cancel: &CancellationToken) -> Result<usize> {
        let embedded: Vec<Option<Entry>> = futures::stream::iter(records)
            .map(|record| async move {
                let text = format!("{}\n{}", record.thread_title, record.body);
                let vector = self.embedder.embed(&text, cancel).await?;
                if vector.is_empty() {
                    tracing::debug!(id = record.id, "skipping post with empty embedding");
                    return Ok::<_, anyhow::Error>(None);
                }
                Ok(Some(Entry { record: record.clone(), vector }))
            })
            .buffered(EMBED_CONCURRENCY)
            .try_collect()
            .await?;
        let fresh: Vec<Entry> = embedded.into_iter().flatten().collect();
        let stored = fresh.len();
        let mut entries = self.entries.write().await;
        entries.retain(|e| !fresh.iter().any(|f| f.record.id == e.record.id));
        entries.extend(fresh);
        tracing::debug!(stored, total = entries.len(), embedder = self.embedder.embedder_id(), "indexed posts into vector store");
        Ok(stored)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl VectorBackend for MemoryVectorStore {
    async fn search_vector(&self, query: &str, filters: &SearchFilters, limit: usize) -> Result<Vec<ScoredRecord>> {
        let query_vec = self.embedder.embed(query, &CancellationToken::new()).await?;
        if query_vec.is_empty() {
            return Err(anyhow!("query produced an empty embedding"));
        }
        let entries = self.entries.read().await;
        let mut hits: Vec<ScoredRecord> = entries
            .iter()
            .filter(|e| filters.matches(&e.record))
            .map(|e| ScoredRecord::new(e.record.clone(), cosine_distance(&query_vec, &e.vector)))
            .collect();
        // Closest first; a NaN distance sorts after every real one.
        let key = |raw: f32| if raw.is_nan() { f32::INFINITY } else { raw };
        hits.sort_by(|a, b| key(a.raw).total_cmp(&key(b.raw)));
        hits.truncate(limit);
        Ok(hits)
    }
}
