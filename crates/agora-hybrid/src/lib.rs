//! agora-hybrid
//!
//! Combines a lexical and a vector collaborator into one ranked list of
//! forum posts. See `merge` for the scoring rules and `snippet` for display
//! excerpts.

pub mod merge;
pub mod snippet;

use agora_core::config::SearchSettings;
use agora_core::error::Result;
use agora_core::traits::{FullTextBackend, VectorBackend};
use agora_core::types::{ScoredRecord, SearchMode, SearchOptions, SearchResult};

pub use merge::{merge_hybrid, paginate, rank_full_text, rank_semantic, HybridWeights};
pub use snippet::{build_snippet, SnippetWindow};

pub struct HybridSearchEngine<TI, VI> where TI: FullTextBackend, VI: VectorBackend {
    text: TI,
    vector: VI,
    weights: HybridWeights,
    candidate_pool: usize,
    snippet: SnippetWindow,
}

impl<TI, VI> HybridSearchEngine<TI, VI> where TI: FullTextBackend, VI: VectorBackend {
    /// Candidates requested from each backend in hybrid mode, regardless of
    /// the caller's limit.
    pub const CANDIDATE_POOL: usize = 50;

    pub fn new(text: TI, vector: VI) -> Self {
        Self { text, vector, weights: HybridWeights::default(), candidate_pool: Self::CANDIDATE_POOL, snippet: SnippetWindow::default() }
    }

    pub fn with_settings(text: TI, vector: VI, settings: &SearchSettings) -> Self {
        Self {
            text,
            vector,
            weights: HybridWeights::from(settings),
            candidate_pool: settings.candidate_pool,
            snippet: SnippetWindow { chars: settings.snippet_chars, context: settings.snippet_context },
        }
    }

    pub fn weights(&self) -> HybridWeights { self.weights }

    pub async fn search(&self, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        if !options.has_query() { return Ok(Vec::new()); }
        options.validate()?;

        let query = options.query.trim();
        let window = options.offset.saturating_add(options.limit);
        let ranked = match options.mode {
            SearchMode::FullText => {
                let hits = best_effort("full_text", self.text.search_text(query, &options.filters, window).await);
                rank_full_text(hits)
            }
            SearchMode::Semantic => {
                let hits = best_effort("semantic", self.vector.search_vector(query, &options.filters, window).await);
                rank_semantic(hits)
            }
            SearchMode::Hybrid => {
                let (text_hits, semantic_hits) = tokio::join!(
                    self.text.search_text(query, &options.filters, self.candidate_pool),
                    self.vector.search_vector(query, &options.filters, self.candidate_pool),
                );
                let text_hits = best_effort("full_text", text_hits);
                let semantic_hits = best_effort("semantic", semantic_hits);
                tracing::debug!(full_text = text_hits.len(), semantic = semantic_hits.len(), "merging hybrid candidates");
                merge_hybrid(text_hits, semantic_hits, self.weights)
            }
        };

        let mut page = paginate(ranked, options.offset, options.limit);
        for result in &mut page {
            result.snippet = build_snippet(&result.body, query, self.snippet);
        }
        tracing::debug!(mode = %options.mode, returned = page.len(), query, "search complete");
        Ok(page)
    }
}

/// A failed sub-search contributes nothing instead of failing the request.
fn best_effort(source: &str, outcome: anyhow::Result<Vec<ScoredRecord>>) -> Vec<ScoredRecord> {
    match outcome {
        Ok(hits) => hits,
        Err(e) => {
            let error = format!("{e:#}");
            tracing::warn!(source, %error, "sub-search failed; continuing without it");
            Vec::new()
        }
    }
}
