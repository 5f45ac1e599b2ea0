#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use agora_core::traits::{ContentStore, Embedder, TextGenerator};
use agora_core::types::{CreatedEntity, CreatedThread, ProgressEvent, Stage};
use agora_seed::{ForumSeeder, MemoryStore, SeederConfig};

#[derive(Debug, Clone, Copy)]
pub enum Titles {
    /// `Topic {n}` for thread `n`.
    Numbered,
    /// The same text for every request.
    Constant(&'static str),
    /// `Popular topic` on a first attempt, a token-based title on retries.
    FreshOnRetry,
}

pub struct StubGenerator {
    titles: Titles,
    delay: Duration,
    panic_on_thread: Option<usize>,
    pub calls: AtomicUsize,
    pub title_calls: AtomicUsize,
    pub retry_prompts: AtomicUsize,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub personas: Mutex<Vec<String>>,
    pub reply_prompts: Mutex<Vec<String>>,
}

impl StubGenerator {
    pub fn new(titles: Titles) -> Self {
        Self {
            titles,
            delay: Duration::ZERO,
            panic_on_thread: None,
            calls: AtomicUsize::new(0),
            title_calls: AtomicUsize::new(0),
            retry_prompts: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            personas: Mutex::new(Vec::new()),
            reply_prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn panicking_on(mut self, thread: usize) -> Self {
        self.panic_on_thread = Some(thread);
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

fn thread_number(prompt: &str) -> usize {
    prompt
        .split("thread #")
        .nth(1)
        .and_then(|rest| rest.split(' ').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, persona: &str, prompt: &str, _model: Option<&str>, cancel: &CancellationToken) -> anyhow::Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.personas.lock().unwrap().push(persona.to_string());

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.active.fetch_sub(1, Ordering::SeqCst);
                    anyhow::bail!("generation interrupted");
                }
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if prompt.starts_with("Write a title") {
            self.title_calls.fetch_add(1, Ordering::SeqCst);
            let hint = prompt.split("Uniqueness hint: ").nth(1).and_then(|rest| rest.split('.').next());
            if hint.is_some() {
                self.retry_prompts.fetch_add(1, Ordering::SeqCst);
            }
            let n = thread_number(prompt);
            if self.panic_on_thread == Some(n) {
                panic!("generator exploded on thread {n}");
            }
            return Ok(match (self.titles, hint) {
                (Titles::Numbered, _) => format!("Topic {n}"),
                (Titles::Constant(t), _) => t.to_string(),
                (Titles::FreshOnRetry, Some(token)) => format!("Fresh angle {token}"),
                (Titles::FreshOnRetry, None) => "Popular topic".to_string(),
            });
        }
        if prompt.starts_with("Write the opening post") {
            return Ok("Opening post body.\nA second line with more detail.".to_string());
        }
        self.reply_prompts.lock().unwrap().push(prompt.to_string());
        Ok(format!("Reply number {call} with a thought."))
    }
}

/// Always fails, so every title goes through the gate unembedded.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn embedder_id(&self) -> &str { "failing" }
    fn dim(&self) -> usize { 0 }
    async fn embed(&self, _text: &str, _cancel: &CancellationToken) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("embedding service offline")
    }
}

/// Rejects thread creation for titles containing a marker, and optionally
/// collection creation.
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_title: Option<&'static str>,
    fail_collection: bool,
}

impl FlakyStore {
    pub fn failing_title(marker: &'static str) -> Self {
        Self { inner: MemoryStore::new(), fail_title: Some(marker), fail_collection: false }
    }

    pub fn failing_collection() -> Self {
        Self { inner: MemoryStore::new(), fail_title: None, fail_collection: true }
    }
}

#[async_trait]
impl ContentStore for FlakyStore {
    async fn create_collection(&self, name: &str, slug: &str, description: Option<&str>) -> anyhow::Result<CreatedEntity> {
        if self.fail_collection {
            anyhow::bail!("database is read-only");
        }
        self.inner.create_collection(name, slug, description).await
    }

    async fn create_thread(&self, collection_id: i64, title: &str, body: &str, author: &str) -> anyhow::Result<CreatedThread> {
        if self.fail_title.is_some_and(|marker| title == marker) {
            anyhow::bail!("constraint violation for '{title}'");
        }
        self.inner.create_thread(collection_id, title, body, author).await
    }

    async fn create_reply(&self, thread_id: i64, parent_post_id: i64, body: &str, author: &str) -> anyhow::Result<CreatedEntity> {
        self.inner.create_reply(thread_id, parent_post_id, body, author).await
    }
}

pub fn config(max_concurrency: usize) -> SeederConfig {
    SeederConfig { max_concurrency, ..SeederConfig::default() }
}

pub fn seeder(generator: Arc<StubGenerator>, embedder: Arc<dyn Embedder>, store: Arc<dyn ContentStore>, max_concurrency: usize) -> ForumSeeder {
    ForumSeeder::new(generator, embedder, store).with_config(config(max_concurrency))
}

pub fn stages(events: &[ProgressEvent], stage: Stage) -> Vec<&ProgressEvent> {
    events.iter().filter(|e| e.stage == stage).collect()
}
