//! Job-wide diversity gate for thread titles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use agora_embed::cosine_similarity;

/// Outcome of offering a candidate title to the gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Accepted,
    /// Same title as an accepted one, ignoring case.
    Duplicate,
    /// Embedding too close to an accepted one.
    TooSimilar(f32),
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Debug)]
struct Accepted {
    lowercase: String,
    title: String,
    embedding: Option<Vec<f32>>,
}

/// Titles accepted so far in one job, with their embeddings when known.
///
/// All tasks of a job share one set. The check and the insert happen under
/// one lock so two tasks cannot both accept near-identical titles.
#[derive(Debug)]
pub struct TitleEmbeddingSet {
    accepted: Mutex<Vec<Accepted>>,
    threshold: f32,
    fallback_counter: AtomicU64,
}

impl TitleEmbeddingSet {
    pub const DEFAULT_THRESHOLD: f32 = 0.90;

    pub fn new(threshold: f32) -> Self {
        Self { accepted: Mutex::new(Vec::new()), threshold, fallback_counter: AtomicU64::new(0) }
    }

    pub fn threshold(&self) -> f32 { self.threshold }

    /// Check `title` against every accepted entry and record it if it passes.
    ///
    /// A missing embedding skips the similarity check for this candidate only.
    pub fn try_accept(&self, title: &str, embedding: Option<Vec<f32>>) -> GateDecision {
        let lowercase = title.to_lowercase();
        let mut accepted = self.accepted.lock().unwrap_or_else(PoisonError::into_inner);

        if accepted.iter().any(|a| a.lowercase == lowercase) {
            return GateDecision::Duplicate;
        }
        if let Some(candidate) = embedding.as_deref() {
            let closest = accepted
                .iter()
                .filter_map(|a| a.embedding.as_deref())
                .map(|other| cosine_similarity(candidate, other))
                .fold(f32::NEG_INFINITY, f32::max);
            if closest >= self.threshold {
                return GateDecision::TooSimilar(closest);
            }
        }

        accepted.push(Accepted { lowercase, title: title.to_string(), embedding });
        GateDecision::Accepted
    }

    /// Suffix `last` with the next job-wide discussion number and record it.
    ///
    /// Numbers start at 1 and are never reused within one set. A number whose
    /// title was already accepted is skipped.
    pub fn disambiguate(&self, last: &str) -> String {
        let mut accepted = self.accepted.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            let n = self.fallback_counter.fetch_add(1, Ordering::SeqCst) + 1;
            let title = format!("{last} (Discussion {n})");
            let lowercase = title.to_lowercase();
            if accepted.iter().any(|a| a.lowercase == lowercase) {
                continue;
            }
            accepted.push(Accepted { lowercase, title: title.clone(), embedding: None });
            return title;
        }
    }

    pub fn titles(&self) -> Vec<String> {
        let accepted = self.accepted.lock().unwrap_or_else(PoisonError::into_inner);
        accepted.iter().map(|a| a.title.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.accepted.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Default for TitleEmbeddingSet {
    fn default() -> Self { Self::new(Self::DEFAULT_THRESHOLD) }
}
