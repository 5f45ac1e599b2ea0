//! Background queue that runs seed jobs one at a time.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use agora_core::error::{Error, Result};
use agora_core::types::{GenerationJob, ProgressEvent, Stage};

use crate::progress::{JobStatus, ProgressLog};
use crate::seeder::ForumSeeder;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

type PendingJobs = Arc<Mutex<HashSet<Uuid>>>;

pub struct SeedWorker {
    sender: mpsc::Sender<GenerationJob>,
    log: ProgressLog,
    pending: PendingJobs,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

impl SeedWorker {
    pub const DEFAULT_BUFFER: usize = 16;
    pub const DEFAULT_RETAINED_JOBS: usize = 64;

    /// Start the worker task. Must be called inside a tokio runtime.
    pub fn spawn(seeder: ForumSeeder, buffer: usize) -> Self {
        Self::spawn_with_retention(seeder, buffer, Self::DEFAULT_RETAINED_JOBS)
    }

    /// Like `spawn`, but keeps the progress history of only the last
    /// `retained_jobs` finished jobs (at least one).
    pub fn spawn_with_retention(seeder: ForumSeeder, buffer: usize, retained_jobs: usize) -> Self {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let shutdown = CancellationToken::new();
        let log = seeder.reporter().log().clone();
        let pending = PendingJobs::default();
        let state = WorkerState { pending: pending.clone(), retained: VecDeque::new(), retain: retained_jobs.max(1) };
        let handle = tokio::spawn(run_worker(receiver, seeder, shutdown.clone(), state));
        Self { sender, log, pending, shutdown, handle }
    }

    /// Queue a job and return its id. Jobs run with the worker's own
    /// cancellation scope, not the caller's.
    pub async fn enqueue(&self, job: GenerationJob) -> Result<Uuid> {
        let job = job.normalized();
        let job_id = job.id;
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).insert(job_id);
        if self.sender.send(job).await.is_err() {
            self.pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&job_id);
            return Err(Error::Operation("seed worker stopped".to_string()));
        }
        tracing::debug!(job_id = %job_id, "seed job enqueued");
        Ok(job_id)
    }

    pub fn status(&self, job_id: Uuid) -> Option<JobStatus> {
        self.log.status(job_id)
    }

    pub fn events(&self, job_id: Uuid) -> Vec<ProgressEvent> {
        self.log.events(job_id)
    }

    pub fn log(&self) -> &ProgressLog { &self.log }

    /// Poll until the job completes or the worker has stopped. Returns `None`
    /// for jobs this worker never queued or whose history was already dropped.
    pub async fn wait_for(&self, job_id: Uuid) -> Option<JobStatus> {
        loop {
            let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner).contains(&job_id);
            if !pending || self.log.is_complete(job_id) || self.handle.is_finished() {
                return self.log.status(job_id);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Cancel the running job and every job still queued.
    pub fn abort(&self) {
        tracing::info!("aborting seed worker");
        self.shutdown.cancel();
    }

    /// Close the queue and wait for queued jobs to drain.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.sender);
        self.handle.await.map_err(|e| Error::Operation(format!("seed worker task failed: {e}")))
    }
}

struct WorkerState {
    pending: PendingJobs,
    /// Finished jobs whose history is still in the log, oldest first.
    retained: VecDeque<Uuid>,
    retain: usize,
}

impl WorkerState {
    fn finish(&mut self, job_id: Uuid, log: &ProgressLog) {
        self.retained.push_back(job_id);
        while self.retained.len() > self.retain {
            if let Some(old) = self.retained.pop_front() {
                log.forget(old);
                tracing::debug!(job_id = %old, "dropped progress history");
            }
        }
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).remove(&job_id);
    }
}

async fn run_worker(mut receiver: mpsc::Receiver<GenerationJob>, seeder: ForumSeeder, shutdown: CancellationToken, mut state: WorkerState) {
    while let Some(job) = receiver.recv().await {
        let job_id = job.id;
        let cancel = shutdown.child_token();
        let runner = seeder.clone();
        // Run each job on its own task so a panic cannot take the worker down.
        match tokio::spawn(async move { runner.run_job(job, cancel).await }).await {
            Ok(summary) => tracing::info!(
                job_id = %job_id,
                created = summary.threads_created,
                failed = summary.threads_failed,
                replies = summary.replies_created,
                "seed job finished"
            ),
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "seed job panicked");
                seeder.reporter().emit(ProgressEvent::new(job_id, Stage::Error, format!("seed job panicked: {e}")));
            }
        }
        state.finish(job_id, seeder.reporter().log());
    }
    tracing::debug!("seed worker queue closed");
}
