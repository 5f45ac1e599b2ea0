mod support;

use std::sync::Arc;
use std::time::Duration;

use agora_core::types::{GenerationJob, Stage};
use agora_seed::{MemoryStore, SeedWorker};

use support::{seeder, stages, FailingEmbedder, StubGenerator, Titles};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn queued_jobs_run_in_order() {
    let generator = Arc::new(StubGenerator::new(Titles::Numbered));
    let store = Arc::new(MemoryStore::new());
    let worker = SeedWorker::spawn(seeder(generator, Arc::new(FailingEmbedder), store.clone(), 4), SeedWorker::DEFAULT_BUFFER);

    let first = worker.enqueue(GenerationJob::new("First Board", 2, 1)).await.expect("enqueue");
    let second = worker.enqueue(GenerationJob::new("Second Board", 3, 0)).await.expect("enqueue");

    let status = tokio::time::timeout(Duration::from_secs(5), worker.wait_for(second)).await.expect("finishes").expect("status");
    assert!(status.complete && !status.failed);
    assert_eq!(status.last.map(|e| e.stage), Some(Stage::Done));

    // The second job only starts once the first is done.
    let first_status = worker.status(first).expect("first status");
    assert!(first_status.complete);
    let first_done = worker.events(first).last().map(|e| e.timestamp).unwrap();
    let second_start = worker.events(second).first().map(|e| e.timestamp).unwrap();
    assert!(first_done <= second_start);

    assert_eq!(store.collections().len(), 2);
    assert_eq!(store.threads().len(), 5);
    worker.shutdown().await.expect("clean shutdown");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn abort_cancels_the_running_job() {
    let generator = Arc::new(StubGenerator::new(Titles::Numbered).with_delay(Duration::from_millis(500)));
    let worker = SeedWorker::spawn(seeder(generator, Arc::new(FailingEmbedder), Arc::new(MemoryStore::new()), 2), 4);

    let job_id = worker.enqueue(GenerationJob::new("Slow Board", 4, 2)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    worker.abort();

    let status = tokio::time::timeout(Duration::from_secs(5), worker.wait_for(job_id)).await.expect("finishes").expect("status");
    assert!(status.complete && status.failed);
    let last = status.last.unwrap();
    assert_eq!((last.stage, last.task, last.message.as_str()), (Stage::Error, None, "cancelled"));
    assert!(stages(&worker.events(job_id), Stage::Thread).is_empty());
    worker.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_drains_queued_jobs() {
    let generator = Arc::new(StubGenerator::new(Titles::Numbered).with_delay(Duration::from_millis(2)));
    let worker = SeedWorker::spawn(seeder(generator, Arc::new(FailingEmbedder), Arc::new(MemoryStore::new()), 2), 8);

    let mut ids = Vec::new();
    for name in ["One", "Two", "Three"] {
        ids.push(worker.enqueue(GenerationJob::new(name, 2, 1)).await.unwrap());
    }
    // `shutdown` consumes the worker, so keep a handle on the shared log.
    let log = worker.log().clone();
    worker.shutdown().await.expect("drained");

    for id in ids {
        assert!(log.is_complete(id), "job {id} finished before shutdown returned");
    }
}

#[tokio::test]
async fn unknown_jobs_have_no_status() {
    let generator = Arc::new(StubGenerator::new(Titles::Numbered));
    let worker = SeedWorker::spawn(seeder(generator, Arc::new(FailingEmbedder), Arc::new(MemoryStore::new()), 1), 1);
    assert!(worker.status(uuid::Uuid::new_v4()).is_none());
    assert!(worker.events(uuid::Uuid::new_v4()).is_empty());
    worker.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_recent_job_histories_are_kept() {
    let generator = Arc::new(StubGenerator::new(Titles::Numbered));
    let worker = SeedWorker::spawn_with_retention(seeder(generator, Arc::new(FailingEmbedder), Arc::new(MemoryStore::new()), 2), 8, 2);

    let mut ids = Vec::new();
    for name in ["Alpha", "Beta", "Gamma", "Delta"] {
        ids.push(worker.enqueue(GenerationJob::new(name, 1, 0)).await.unwrap());
    }
    let last = tokio::time::timeout(Duration::from_secs(5), worker.wait_for(ids[3])).await.expect("finishes").expect("status");
    assert!(last.complete);

    // Alpha was dropped once Gamma finished, so it is no longer pending and
    // waiting on it returns at once.
    let dropped = tokio::time::timeout(Duration::from_secs(1), worker.wait_for(ids[0])).await.expect("does not hang");
    assert!(dropped.is_none());
    let unknown = tokio::time::timeout(Duration::from_secs(1), worker.wait_for(uuid::Uuid::new_v4())).await.expect("does not hang");
    assert!(unknown.is_none());

    let log = worker.log().clone();
    worker.shutdown().await.unwrap();
    assert!(log.status(ids[0]).is_none());
    assert!(log.events(ids[1]).is_empty());
    assert!(log.is_complete(ids[2]));
    assert!(log.is_complete(ids[3]));
}
