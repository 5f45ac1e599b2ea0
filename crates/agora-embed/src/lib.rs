//! agora-embed
//!
//! Embedding helpers shared by the vector store and the seeding diversity
//! gate: cosine math, an offline hashing embedder and a content-hash cache.

pub mod cache;
pub mod hashing;
pub mod similarity;

pub use cache::CachedEmbedder;
pub use hashing::HashingEmbedder;
pub use similarity::{cosine_distance, cosine_similarity, l2_normalize};
