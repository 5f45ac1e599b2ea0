//! agora-seed
//!
//! Seeds a forum collection with generated threads and replies. Thread tasks
//! run concurrently under a semaphore; a shared diversity gate keeps titles
//! from repeating within one job.

pub mod charter;
pub mod concurrency;
pub mod decorate;
pub mod diversity;
pub mod progress;
pub mod prompts;
pub mod replies;
pub mod seeder;
pub mod store;
pub mod text;
pub mod worker;

pub use charter::Charter;
pub use concurrency::{default_max_concurrency, resolve_max_concurrency};
pub use diversity::{GateDecision, TitleEmbeddingSet};
pub use progress::{JobStatus, ProgressLog, ProgressReporter, TracingSink};
pub use seeder::{ForumSeeder, JobSummary, SeederConfig};
pub use store::MemoryStore;
pub use worker::SeedWorker;
