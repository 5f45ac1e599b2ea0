use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use agora_core::config::SeedSettings;
use agora_core::error::{Error, Result};
use agora_core::traits::{ContentStore, Embedder, TextGenerator};
use agora_core::types::{GenerationJob, ProgressEvent, Stage};

use crate::charter::Charter;
use crate::concurrency::resolve_max_concurrency;
use crate::decorate::{decorate_text, decorate_title};
use crate::diversity::{GateDecision, TitleEmbeddingSet};
use crate::progress::ProgressReporter;
use crate::prompts::{body_prompt, reply_prompt, title_prompt};
use crate::replies::{choose_parent, pick_author};
use crate::text::{normalize_title, quote_snippet, uniqueness_token, UNTITLED};

#[derive(Debug, Clone, PartialEq)]
pub struct SeederConfig {
    pub max_concurrency: usize,
    pub max_title_attempts: usize,
    pub similarity_threshold: f32,
    pub title_max_chars: usize,
    pub reply_snippet_chars: usize,
    /// Used when the job does not name a model.
    pub default_model: Option<String>,
}

impl From<&SeedSettings> for SeederConfig {
    fn from(s: &SeedSettings) -> Self {
        Self {
            max_concurrency: resolve_max_concurrency(s.max_concurrency),
            max_title_attempts: s.max_title_attempts.max(1),
            similarity_threshold: s.similarity_threshold,
            title_max_chars: s.title_max_chars,
            reply_snippet_chars: s.reply_snippet_chars,
            default_model: s.model.clone(),
        }
    }
}

impl Default for SeederConfig {
    fn default() -> Self { Self::from(&SeedSettings::default()) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub job_id: Uuid,
    pub collection_id: Option<i64>,
    pub threads_requested: usize,
    pub threads_created: usize,
    /// Tasks that ended in an error, including ones whose thread was created
    /// before a reply failed.
    pub threads_failed: usize,
    pub replies_created: usize,
    /// The job as a whole failed (collection creation, cancellation).
    pub failed: bool,
}

/// Populates a new collection with generated threads and replies.
#[derive(Clone)]
pub struct ForumSeeder {
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn ContentStore>,
    reporter: ProgressReporter,
    config: Arc<SeederConfig>,
}

impl ForumSeeder {
    pub fn new(generator: Arc<dyn TextGenerator>, embedder: Arc<dyn Embedder>, store: Arc<dyn ContentStore>) -> Self {
        Self { generator, embedder, store, reporter: ProgressReporter::default(), config: Arc::new(SeederConfig::default()) }
    }

    pub fn with_config(mut self, config: SeederConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &SeederConfig { &self.config }

    pub fn reporter(&self) -> &ProgressReporter { &self.reporter }

    /// Run one job to completion. Failures are reported as progress events,
    /// never returned.
    pub async fn run_job(&self, job: GenerationJob, cancel: CancellationToken) -> JobSummary {
        let job = Arc::new(job.normalized());
        let mut summary = JobSummary {
            job_id: job.id,
            collection_id: None,
            threads_requested: job.thread_count,
            threads_created: 0,
            threads_failed: 0,
            replies_created: 0,
            failed: false,
        };
        tracing::info!(job_id = %job.id, collection = %job.collection_name, threads = job.thread_count, replies = job.replies_per_thread, "seed job started");
        self.emit(job.id, Stage::Start, format!(
            "seeding '{}' with {} threads of {} replies",
            job.collection_name, job.thread_count, job.replies_per_thread
        ));

        match self.execute(job.clone(), &cancel, &mut summary).await {
            Ok(()) => {
                self.emit(job.id, Stage::Done, format!(
                    "created {} of {} threads ({} replies)",
                    summary.threads_created, summary.threads_requested, summary.replies_created
                ));
            }
            Err(e) => {
                summary.failed = true;
                tracing::error!(job_id = %job.id, error = %e, "seed job failed");
                self.emit(job.id, Stage::Error, e.to_string());
            }
        }
        summary
    }

    async fn execute(&self, job: Arc<GenerationJob>, cancel: &CancellationToken, summary: &mut JobSummary) -> Result<()> {
        let collection = guarded(
            cancel,
            self.store.create_collection(&job.collection_name, &job.collection_slug, job.description.as_deref()),
        )
        .await?;
        summary.collection_id = Some(collection.id);
        self.reporter.emit(
            ProgressEvent::new(job.id, Stage::Collection, format!("created collection '{}'", job.collection_slug))
                .with_entity(collection.id),
        );

        let charter = Charter::select(job.tone.as_deref(), &mut StdRng::from_entropy());
        self.emit(job.id, Stage::Tone, format!("using the '{}' charter", charter.name));

        let ctx = Arc::new(ThreadContext {
            generator: self.generator.clone(),
            embedder: self.embedder.clone(),
            store: self.store.clone(),
            reporter: self.reporter.clone(),
            config: self.config.clone(),
            titles: TitleEmbeddingSet::new(self.config.similarity_threshold),
            threads_created: AtomicUsize::new(0),
            replies_created: AtomicUsize::new(0),
            collection_id: collection.id,
            charter,
            job: job.clone(),
            cancel: cancel.clone(),
        });

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut index_by_task = HashMap::new();
        for index in 1..=job.thread_count {
            let ctx = ctx.clone();
            let semaphore = semaphore.clone();
            let handle = tasks.spawn(async move {
                let _permit = tokio::select! {
                    biased;
                    _ = ctx.cancel.cancelled() => return Err(Error::Cancelled),
                    permit = semaphore.acquire_owned() => permit.map_err(|_| Error::Operation("thread semaphore closed".to_string()))?,
                };
                ctx.seed_thread(index).await
            });
            index_by_task.insert(handle.id(), index);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            let (task_id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(e) => (e.id(), Err(Error::Operation(format!("thread task panicked: {e}")))),
            };
            if let Err(e) = outcome {
                summary.threads_failed += 1;
                let index = index_by_task.get(&task_id).copied().unwrap_or_default();
                tracing::error!(job_id = %job.id, task = index, error = %e, "thread task failed");
                self.reporter.emit(ProgressEvent::new(job.id, Stage::Error, e.to_string()).for_task(index));
            }
        }

        summary.threads_created = ctx.threads_created.load(Ordering::SeqCst);
        summary.replies_created = ctx.replies_created.load(Ordering::SeqCst);
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        tracing::info!(job_id = %job.id, created = summary.threads_created, failed = summary.threads_failed, "seed job finished");
        Ok(())
    }

    fn emit(&self, job_id: Uuid, stage: Stage, message: String) {
        self.reporter.emit(ProgressEvent::new(job_id, stage, message));
    }
}

/// Run a collaborator call unless the job is cancelled first.
async fn guarded<T, F>(cancel: &CancellationToken, call: F) -> Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        outcome = call => outcome.map_err(|e| if cancel.is_cancelled() { Error::Cancelled } else { Error::unavailable(&e) }),
    }
}

struct PriorMessage {
    post_id: i64,
    body: String,
}

/// State shared by all thread tasks of one job.
struct ThreadContext {
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn ContentStore>,
    reporter: ProgressReporter,
    config: Arc<SeederConfig>,
    titles: TitleEmbeddingSet,
    threads_created: AtomicUsize,
    replies_created: AtomicUsize,
    collection_id: i64,
    charter: Charter,
    job: Arc<GenerationJob>,
    cancel: CancellationToken,
}

impl ThreadContext {
    fn model(&self) -> Option<&str> {
        self.job.model.as_deref().or(self.config.default_model.as_deref())
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let text = guarded(&self.cancel, self.generator.generate(&self.charter.persona, prompt, self.model(), &self.cancel)).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Operation("generator returned empty text".to_string()));
        }
        Ok(text.to_string())
    }

    /// Embedding failures leave the title unembedded rather than failing
    /// the task. Cancellation still stops it.
    async fn embed_title(&self, title: &str) -> Result<Option<Vec<f32>>> {
        match guarded(&self.cancel, self.embedder.embed(title, &self.cancel)).await {
            Ok(v) if v.is_empty() => Ok(None),
            Ok(v) => Ok(Some(v)),
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                tracing::warn!(job_id = %self.job.id, error = %e, "title embedding unavailable; skipping similarity check");
                Ok(None)
            }
        }
    }

    async fn unique_title(&self, index: usize, rng: &mut StdRng) -> Result<String> {
        let mut last = None;
        for attempt in 1..=self.config.max_title_attempts.max(1) {
            let token = (attempt > 1).then(|| uniqueness_token(&mut *rng));
            let raw = self.generate(&title_prompt(&self.job, index, token.as_deref())).await?;
            let candidate = normalize_title(&raw, self.config.title_max_chars);
            let embedding = self.embed_title(&candidate).await?;
            match self.titles.try_accept(&candidate, embedding) {
                GateDecision::Accepted => {
                    tracing::debug!(job_id = %self.job.id, task = index, attempt, title = %candidate, "title accepted");
                    return Ok(candidate);
                }
                decision => {
                    tracing::debug!(job_id = %self.job.id, task = index, attempt, ?decision, title = %candidate, "title rejected");
                    last = Some(candidate);
                }
            }
        }
        let title = self.titles.disambiguate(last.as_deref().unwrap_or(UNTITLED));
        tracing::debug!(job_id = %self.job.id, task = index, title = %title, "title attempts exhausted; suffixed");
        Ok(title)
    }

    fn finish_text(&self, text: String, rng: &mut StdRng) -> String {
        if self.job.decorate { decorate_text(&text, rng) } else { text }
    }

    async fn seed_thread(&self, index: usize) -> Result<()> {
        let mut rng = StdRng::from_entropy();
        let title = self.unique_title(index, &mut rng).await?;
        let shown_title = if self.job.decorate { decorate_title(&title, &mut rng) } else { title.clone() };

        let body = self.generate(&body_prompt(&self.job, &title)).await?;
        let body = self.finish_text(body, &mut rng);
        let author = pick_author(&mut rng);
        let thread = guarded(&self.cancel, self.store.create_thread(self.collection_id, &shown_title, &body, author)).await?;
        self.threads_created.fetch_add(1, Ordering::SeqCst);
        self.reporter.emit(
            ProgressEvent::new(self.job.id, Stage::Thread, format!("created thread '{shown_title}'"))
                .with_entity(thread.thread_id)
                .for_task(index),
        );

        let mut prior = vec![PriorMessage { post_id: thread.root_post_id, body }];
        for n in 1..=self.job.replies_per_thread {
            let parent_index = choose_parent(&mut rng, prior.len());
            let parent_post_id = prior[parent_index].post_id;
            let parent = quote_snippet(&prior[parent_index].body, self.config.reply_snippet_chars);
            let root = (parent_index != 0).then(|| quote_snippet(&prior[0].body, self.config.reply_snippet_chars));

            let reply = self.generate(&reply_prompt(&title, &parent, root.as_deref())).await?;
            let reply = self.finish_text(reply, &mut rng);
            let author = pick_author(&mut rng);
            let created = guarded(&self.cancel, self.store.create_reply(thread.thread_id, parent_post_id, &reply, author)).await?;
            self.replies_created.fetch_add(1, Ordering::SeqCst);
            self.reporter.emit(
                ProgressEvent::new(self.job.id, Stage::Reply, format!("reply {n} of {} to post {parent_post_id}", self.job.replies_per_thread))
                    .with_entity(created.id)
                    .for_task(index),
            );
            prior.push(PriorMessage { post_id: created.id, body: reply });
        }
        Ok(())
    }
}
