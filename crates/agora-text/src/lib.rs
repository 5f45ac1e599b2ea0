//! agora-text
//!
//! Tantivy-backed full-text collaborator for the hybrid ranker. Posts are
//! indexed in RAM; BM25 scores are reported as raw ranks.

pub mod tantivy_utils;
pub mod index;

pub use index::TantivyFullText;
