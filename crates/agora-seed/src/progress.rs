//! Progress fan-out: a pluggable sink for live consumers plus an in-memory
//! log that pollers can query after the fact.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;
use uuid::Uuid;

use agora_core::traits::ProgressSink;
use agora_core::types::{ProgressEvent, Stage};

/// Mirrors every event into the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn publish(&self, event: &ProgressEvent) -> anyhow::Result<()> {
        let job_id = event.job_id.to_string();
        match event.stage {
            Stage::Error => tracing::error!(job_id, task = event.task, message = %event.message, "seed job error"),
            Stage::Start | Stage::Done => tracing::info!(job_id, stage = %event.stage, message = %event.message, "seed job"),
            _ => tracing::debug!(job_id, stage = %event.stage, task = event.task, entity = event.entity_id, message = %event.message, "seed progress"),
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct JobProgress {
    events: Vec<ProgressEvent>,
    complete: bool,
    failed: bool,
}

/// Snapshot of one job for pollers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatus {
    pub job_id: Uuid,
    pub complete: bool,
    /// A job-level error ended the job.
    pub failed: bool,
    pub last: Option<ProgressEvent>,
    pub event_count: usize,
}

/// Append-only event history per job, shared between the seeder and pollers.
#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    jobs: Arc<RwLock<HashMap<Uuid, JobProgress>>>,
}

impl ProgressLog {
    pub fn new() -> Self { Self::default() }

    pub fn append(&self, event: ProgressEvent) {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let entry = jobs.entry(event.job_id).or_default();
        if event.is_terminal() {
            entry.complete = true;
            entry.failed = event.stage == Stage::Error;
        }
        entry.events.push(event);
    }

    pub fn events(&self, job_id: Uuid) -> Vec<ProgressEvent> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id).map(|p| p.events.clone()).unwrap_or_default()
    }

    pub fn is_complete(&self, job_id: Uuid) -> bool {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id).is_some_and(|p| p.complete)
    }

    pub fn status(&self, job_id: Uuid) -> Option<JobStatus> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&job_id).map(|p| JobStatus {
            job_id,
            complete: p.complete,
            failed: p.failed,
            last: p.events.last().cloned(),
            event_count: p.events.len(),
        })
    }

    /// Drop a finished job's history.
    pub fn forget(&self, job_id: Uuid) -> bool {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        jobs.remove(&job_id).is_some()
    }
}

/// Records each event in the log, then hands it to the sink.
#[derive(Clone)]
pub struct ProgressReporter {
    sink: Arc<dyn ProgressSink>,
    log: ProgressLog,
}

impl ProgressReporter {
    pub fn new(sink: Arc<dyn ProgressSink>, log: ProgressLog) -> Self {
        Self { sink, log }
    }

    pub fn log(&self) -> &ProgressLog { &self.log }

    /// Never fails; a broken sink only costs a warning.
    pub fn emit(&self, event: ProgressEvent) {
        if let Err(e) = self.sink.publish(&event) {
            let error = format!("{e:#}");
            tracing::warn!(job_id = %event.job_id, stage = %event.stage, %error, "progress sink rejected event");
        }
        self.log.append(event);
    }
}

impl Default for ProgressReporter {
    fn default() -> Self { Self::new(Arc::new(TracingSink), ProgressLog::new()) }
}
