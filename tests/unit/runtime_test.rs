//! Tests for tokio spawner utilities

use std::time::Duration;

use rate_gate::builders::SchedulerBuilder;
use rate_gate::core::Spawn;
use rate_gate::runtime::tokio_spawner::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[tokio::test]
async fn test_ambient_spawner_spawn() {
    let spawner = TokioSpawner::ambient();
    assert!(spawner.handle().is_none());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send("ok").unwrap();
    });
    assert_eq!(rx.await.unwrap(), "ok");
}

#[test]
fn test_owned_runtime_drives_scheduler() {
    let spawner = TokioSpawner::with_worker_threads(2).unwrap();
    let handle = spawner.handle().expect("owned runtime handle");
    let scheduler = SchedulerBuilder::new(1)
        .build_with_spawner(spawner.clone())
        .unwrap();

    let task = scheduler.schedule_fn(|| Ok(()), Duration::from_millis(5));
    handle.block_on(task.join()).unwrap();

    assert_eq!(scheduler.stats().completed, 1);
}

#[test]
fn test_schedule_without_runtime_abandons_task() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use rate_gate::core::{RateLimitedScheduler, SchedulerError, TaskState};

    let scheduler = RateLimitedScheduler::new(1).unwrap();
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);

    let handle = scheduler.schedule_fn(
        move || {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        },
        Duration::ZERO,
    );
    assert_eq!(handle.state(), TaskState::Pending);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    let err = runtime.block_on(handle.join()).unwrap_err();
    assert!(matches!(err, SchedulerError::Abandoned));
    assert!(!ran.load(Ordering::SeqCst));
    assert_eq!(scheduler.stats().admitted, 0);
}

#[tokio::test]
async fn test_dropping_owned_runtime_inside_async_context() {
    let spawner = TokioSpawner::with_worker_threads(1).unwrap();
    let scheduler = SchedulerBuilder::new(1)
        .build_with_spawner(spawner)
        .unwrap();

    scheduler
        .schedule_fn(|| Ok(()), Duration::from_millis(5))
        .join()
        .await
        .unwrap();

    // Last owner of the runtime goes away on a tokio worker.
    drop(scheduler);
}

#[tokio::test]
async fn test_pending_task_abandoned_when_owned_runtime_dropped() {
    use rate_gate::core::SchedulerError;

    let spawner = TokioSpawner::with_worker_threads(1).unwrap();
    let scheduler = SchedulerBuilder::new(1)
        .build_with_spawner(spawner)
        .unwrap();

    let parked = scheduler.schedule_fn(|| Ok(()), Duration::from_secs(3600));
    drop(scheduler);

    let err = parked.join().await.unwrap_err();
    assert!(matches!(err, SchedulerError::Abandoned));
}
