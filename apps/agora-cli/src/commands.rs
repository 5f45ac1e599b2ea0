use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use agora_core::config::AgoraSettings;
use agora_core::traits::{Embedder, ProgressSink};
use agora_core::types::{ContentRecord, GenerationJob, SearchOptions, SearchResult};
use agora_embed::{CachedEmbedder, HashingEmbedder};
use agora_hybrid::HybridSearchEngine;
use agora_seed::{ForumSeeder, JobStatus, MemoryStore, ProgressLog, ProgressReporter, SeedWorker, SeederConfig};
use agora_text::TantivyFullText;
use agora_vector::MemoryVectorStore;

use crate::generator::TemplateGenerator;

pub type ForumSearch = HybridSearchEngine<TantivyFullText, MemoryVectorStore>;

const EMBED_CACHE_CAPACITY: usize = 4096;

pub fn default_embedder() -> Arc<dyn Embedder> {
    Arc::new(CachedEmbedder::new(Arc::new(HashingEmbedder::default()), EMBED_CACHE_CAPACITY))
}

/// Index `records` into fresh in-memory backends.
pub async fn build_search(settings: &AgoraSettings, records: &[ContentRecord]) -> Result<ForumSearch> {
    let text = TantivyFullText::in_memory()?;
    let indexed = text.index_records(records)?;
    let vector = MemoryVectorStore::new(default_embedder());
    let embedded = vector.index_records(records, &CancellationToken::new()).await?;
    tracing::info!(indexed, embedded, "search corpus ready");
    Ok(HybridSearchEngine::with_settings(text, vector, &settings.search))
}

pub async fn search(engine: &ForumSearch, options: &SearchOptions) -> Result<Vec<SearchResult>> {
    Ok(engine.search(options).await?)
}

pub fn format_result(rank: usize, r: &SearchResult) -> String {
    let part = |s: Option<f32>| s.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
    format!(
        "{rank}. [{:.3}] {} ({}, by {}, {})\n   ft={} sem={}\n   {}",
        r.score,
        r.thread_title,
        r.collection_slug,
        r.author,
        r.created_at.format("%Y-%m-%d"),
        part(r.full_text_score),
        part(r.semantic_score),
        r.snippet
    )
}

pub struct SeedOutcome {
    pub status: Option<JobStatus>,
    pub store: Arc<MemoryStore>,
}

/// Run one job through a worker with the offline generator and wait for it.
pub async fn seed(settings: &AgoraSettings, job: GenerationJob, sink: Arc<dyn ProgressSink>) -> Result<SeedOutcome> {
    let store = Arc::new(MemoryStore::new());
    let seeder = ForumSeeder::new(Arc::new(TemplateGenerator::new()), default_embedder(), store.clone())
        .with_config(SeederConfig::from(&settings.seed))
        .with_reporter(ProgressReporter::new(sink, ProgressLog::new()));
    tracing::debug!(max_concurrency = seeder.config().max_concurrency, "seeder configured");

    let worker = SeedWorker::spawn(seeder, 1);
    let job_id = worker.enqueue(job).await?;
    let status = worker.wait_for(job_id).await;
    worker.shutdown().await?;
    Ok(SeedOutcome { status, store })
}
