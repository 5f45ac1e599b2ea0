use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{CreatedEntity, CreatedThread, ProgressEvent, ScoredRecord, SearchFilters};

/// Free-text generation (LLM call). `persona` is the system prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        persona: &str,
        prompt: &str,
        model: Option<&str>,
        cancel: &CancellationToken,
    ) -> anyhow::Result<String>;
}

/// Text embedding. An empty vector counts as "no embedding".
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `hash:xxh64:d256`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    async fn embed(&self, text: &str, cancel: &CancellationToken) -> anyhow::Result<Vec<f32>>;
}

/// Lexical search. `raw` is a relevance rank, higher is better.
#[async_trait]
pub trait FullTextBackend: Send + Sync {
    async fn search_text(&self, query: &str, filters: &SearchFilters, limit: usize) -> anyhow::Result<Vec<ScoredRecord>>;
}

/// Nearest-neighbour search. `raw` is a cosine distance, lower is better.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    async fn search_vector(&self, query: &str, filters: &SearchFilters, limit: usize) -> anyhow::Result<Vec<ScoredRecord>>;
}

/// Fire-and-forget broadcast of progress events. Must not block.
pub trait ProgressSink: Send + Sync {
    fn publish(&self, event: &ProgressEvent) -> anyhow::Result<()>;
}

/// Persistence for seeded content.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn create_collection(&self, name: &str, slug: &str, description: Option<&str>) -> anyhow::Result<CreatedEntity>;
    async fn create_thread(&self, collection_id: i64, title: &str, body: &str, author: &str) -> anyhow::Result<CreatedThread>;
    async fn create_reply(&self, thread_id: i64, parent_post_id: i64, body: &str, author: &str) -> anyhow::Result<CreatedEntity>;
}
