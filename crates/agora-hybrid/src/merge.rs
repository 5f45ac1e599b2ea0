//! Score normalization and weighted merge of full-text and semantic hits.

use std::collections::HashMap;

use agora_core::config::SearchSettings;
use agora_core::types::{ContentId, ScoredRecord, SearchResult};

/// Fixed contribution of each source to the combined score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridWeights {
    pub full_text: f32,
    pub semantic: f32,
}

impl HybridWeights {
    pub const FULL_TEXT: f32 = 0.4;
    pub const SEMANTIC: f32 = 0.6;
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self { full_text: Self::FULL_TEXT, semantic: Self::SEMANTIC }
    }
}

impl From<&SearchSettings> for HybridWeights {
    fn from(s: &SearchSettings) -> Self {
        Self { full_text: s.full_text_weight, semantic: s.semantic_weight }
    }
}

fn max_raw(hits: &[ScoredRecord]) -> f32 {
    hits.iter().map(|h| h.raw).reduce(f32::max).unwrap_or(1.0)
}

/// `raw / max`, or 0 when the maximum is 0.
pub fn normalize_rank(raw: f32, max: f32) -> f32 {
    if max == 0.0 { 0.0 } else { raw / max }
}

/// Distances are max-normalized then inverted so closer scores higher.
pub fn normalize_distance(raw: f32, max: f32) -> f32 {
    if max == 0.0 { 0.0 } else { 1.0 - raw / max }
}

/// Merge both hit lists into one ranked list, keyed by content id.
///
/// Contributions are additive. Ties keep first-seen order: full-text hits in
/// their order, then semantic-only hits in theirs.
pub fn merge_hybrid(text_hits: Vec<ScoredRecord>, semantic_hits: Vec<ScoredRecord>, weights: HybridWeights) -> Vec<SearchResult> {
    let max_ft = max_raw(&text_hits);
    let max_sem = max_raw(&semantic_hits);

    let mut merged: Vec<SearchResult> = Vec::with_capacity(text_hits.len() + semantic_hits.len());
    let mut slot_by_id: HashMap<ContentId, usize> = HashMap::new();

    for hit in text_hits {
        let normalized = normalize_rank(hit.raw, max_ft);
        let slot = *slot_by_id.entry(hit.record.id).or_insert_with(|| {
            merged.push(SearchResult::from_record(hit.record));
            merged.len() - 1
        });
        let result = &mut merged[slot];
        if result.full_text_score.is_none() {
            result.full_text_score = Some(normalized);
            result.score += normalized * weights.full_text;
        }
    }

    for hit in semantic_hits {
        let normalized = normalize_distance(hit.raw, max_sem);
        let slot = *slot_by_id.entry(hit.record.id).or_insert_with(|| {
            merged.push(SearchResult::from_record(hit.record));
            merged.len() - 1
        });
        let result = &mut merged[slot];
        if result.semantic_score.is_none() {
            result.semantic_score = Some(normalized);
            result.score += normalized * weights.semantic;
        }
    }

    sort_by_score(&mut merged);
    merged
}

/// Full-text only: the raw rank is the combined score.
pub fn rank_full_text(hits: Vec<ScoredRecord>) -> Vec<SearchResult> {
    let mut ranked: Vec<SearchResult> = hits
        .into_iter()
        .map(|hit| {
            let mut result = SearchResult::from_record(hit.record);
            result.score = hit.raw;
            result.full_text_score = Some(hit.raw);
            result
        })
        .collect();
    sort_by_score(&mut ranked);
    ranked
}

/// Semantic only: `1 - distance` is the combined score.
pub fn rank_semantic(hits: Vec<ScoredRecord>) -> Vec<SearchResult> {
    let mut ranked: Vec<SearchResult> = hits
        .into_iter()
        .map(|hit| {
            let mut result = SearchResult::from_record(hit.record);
            result.score = 1.0 - hit.raw;
            result.semantic_score = Some(result.score);
            result
        })
        .collect();
    sort_by_score(&mut ranked);
    ranked
}

/// Descending by score, NaN last. `sort_by` is stable, so equal scores keep
/// input order.
fn sort_by_score(results: &mut [SearchResult]) {
    let key = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
    results.sort_by(|a, b| key(b.score).total_cmp(&key(a.score)));
}

pub fn paginate(results: Vec<SearchResult>, offset: usize, limit: usize) -> Vec<SearchResult> {
    results.into_iter().skip(offset).take(limit).collect()
}
