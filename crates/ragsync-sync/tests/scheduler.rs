//! Scheduler behavior: manual triggers, timer passes, shutdown

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{harness, FakeIndexService, FakeObjectStore};
use ragsync_core::domain::PassTrigger;
use ragsync_sync::policy::SizePolicy;
use ragsync_sync::scheduler::{SchedulerState, SyncScheduler};
use tokio_util::sync::CancellationToken;

fn scheduler(interval: Duration) -> (common::Harness, Arc<SyncScheduler>) {
    let h = harness(
        FakeObjectStore::new()
            .with_object("a.txt", b"a")
            .with_object("b.md", b"b"),
        FakeIndexService::new(),
        SizePolicy::unlimited(),
        "",
    );
    let scheduler = Arc::new(SyncScheduler::new(Arc::clone(&h.engine), interval));
    (h, scheduler)
}

#[tokio::test]
async fn test_trigger_runs_a_manual_pass() {
    let (h, scheduler) = scheduler(Duration::from_secs(3600));
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    let pass = scheduler.trigger();
    assert_eq!(scheduler.state(), SchedulerState::Running);

    let result = pass.handle.await.expect("pass task panicked");
    assert_eq!(result.pass_id, pass.pass_id);
    assert_eq!(result.trigger, PassTrigger::Manual);
    assert_eq!(result.succeeded, 2);
    assert_eq!(h.state.count(), 2);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[tokio::test]
async fn test_pass_results_are_broadcast() {
    let (_h, scheduler) = scheduler(Duration::from_secs(3600));
    let mut results = scheduler.subscribe();

    let pass = scheduler.trigger();
    let received = results.recv().await.expect("result broadcast");
    assert_eq!(received.pass_id, pass.pass_id);
    assert_eq!(received.total_found, 2);
}

#[tokio::test]
async fn test_concurrent_triggers_count_as_running() {
    let (h, scheduler) = scheduler(Duration::from_secs(3600));

    let first = scheduler.trigger();
    let second = scheduler.trigger();
    assert_eq!(scheduler.running_passes(), 2);
    assert_ne!(first.pass_id, second.pass_id);

    let a = first.handle.await.unwrap();
    let b = second.handle.await.unwrap();
    assert_eq!(a.succeeded + b.succeeded + a.skipped + b.skipped, 4);
    assert_eq!(h.state.count(), 2);
    assert_eq!(scheduler.running_passes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_timer_runs_initial_pass_then_interval() {
    let (_h, scheduler) = scheduler(Duration::from_secs(60));
    let mut results = scheduler.subscribe();
    let shutdown = CancellationToken::new();

    let runner = tokio::spawn(Arc::clone(&scheduler).run(shutdown.clone()));

    let initial = results.recv().await.expect("initial pass");
    assert_eq!(initial.trigger, PassTrigger::Timer);
    assert_eq!(initial.succeeded, 2);

    let next = results.recv().await.expect("interval pass");
    assert_eq!(next.trigger, PassTrigger::Timer);
    assert_eq!(next.skipped, 2);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("scheduler did not stop")
        .expect("scheduler task panicked");
}

#[tokio::test]
async fn test_cancelled_token_stops_loop() {
    let (_h, scheduler) = scheduler(Duration::from_secs(3600));
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    tokio::time::timeout(Duration::from_secs(5), Arc::clone(&scheduler).run(shutdown))
        .await
        .expect("scheduler did not stop");
}
