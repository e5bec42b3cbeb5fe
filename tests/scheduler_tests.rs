//! Scheduler behaviour end to end: timers, reconciliation, isolation.
//!
//! Most tests run on paused tokio time with monitors whose URL cannot be
//! parsed, so every probe fails immediately without touching the network.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;

use uptime_scheduler::config::{OverlapPolicy, SchedulerConfig};
use uptime_scheduler::monitor::{
    ActiveMonitor, InMemoryMonitorRepository, MonitorConfig, MonitorId, MonitorRepository,
    RepositoryError,
};
use uptime_scheduler::notify::{FailureNotifier, NotifyError};
use uptime_scheduler::probe::{ProbeExecutor, ProbeOutcome, INACTIVE_MESSAGE};
use uptime_scheduler::runs::MemoryRunRecorder;
use uptime_scheduler::scheduler::{HealthCheckPipeline, Scheduler, PANICKED_MESSAGE};

mod common;

enum Behaviour {
    Succeed,
    Fail,
    Panic,
    Stall(Duration),
}

struct TestNotifier {
    calls: AtomicUsize,
    behaviour: Behaviour,
}

impl TestNotifier {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            behaviour,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FailureNotifier for TestNotifier {
    async fn notify_failure(
        &self,
        _destination: &str,
        _monitor_name: &str,
        _url: &str,
        _outcome: &ProbeOutcome,
    ) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail => Err(NotifyError::Rejected {
                status: 502,
                body: "relay down".into(),
            }),
            Behaviour::Panic => panic!("notifier exploded"),
            Behaviour::Stall(d) => {
                time::sleep(d).await;
                Ok(())
            }
        }
    }
}

fn broken_monitor(id: &str, interval_secs: u64) -> MonitorConfig {
    let mut monitor = MonitorConfig::new(id, format!("Monitor {}", id), "not a url");
    monitor.interval_secs = interval_secs;
    monitor.notify_address = Some("owner@example.com".into());
    monitor
}

struct Harness {
    scheduler: Scheduler,
    repository: Arc<InMemoryMonitorRepository>,
    recorder: Arc<MemoryRunRecorder>,
}

fn harness(
    monitors: Vec<MonitorConfig>,
    notifier: Arc<TestNotifier>,
    overlap: OverlapPolicy,
) -> Harness {
    let repository = Arc::new(InMemoryMonitorRepository::with_monitors(monitors));
    let recorder = Arc::new(MemoryRunRecorder::default());
    let pipeline = HealthCheckPipeline::new(
        repository.clone(),
        recorder.clone(),
        notifier,
        ProbeExecutor::new(Duration::from_secs(2)).unwrap(),
    );
    let config = SchedulerConfig {
        reconcile_interval_secs: 60,
        probe_timeout_secs: 2,
        overlap,
    };
    Harness {
        scheduler: Scheduler::new(repository.clone(), pipeline, &config),
        repository,
        recorder,
    }
}

fn id(s: &str) -> MonitorId {
    MonitorId::new(s)
}

#[tokio::test(start_paused = true)]
async fn test_ten_second_monitor_fires_three_or_four_times_in_35s() {
    let h = harness(
        vec![broken_monitor("api", 10)],
        TestNotifier::new(Behaviour::Succeed),
        OverlapPolicy::Allow,
    );

    h.scheduler.start().await;
    time::sleep(Duration::from_secs(35)).await;

    let count = h.recorder.count_for(&id("api"));
    assert!((3..=4).contains(&count), "got {} outcomes", count);
    h.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_twice_keeps_one_timer() {
    let h = harness(
        vec![broken_monitor("api", 10)],
        TestNotifier::new(Behaviour::Succeed),
        OverlapPolicy::Allow,
    );

    h.scheduler.start().await;
    h.scheduler.start().await;
    for _ in 0..3 {
        h.scheduler.reconcile_now().await.unwrap();
    }

    let status = h.scheduler.status();
    assert!(status.running);
    assert_eq!(status.active_schedules, 1);

    time::sleep(Duration::from_secs(35)).await;
    let count = h.recorder.count_for(&id("api"));
    assert!((3..=4).contains(&count), "duplicate timers produced {} outcomes", count);
    h.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_everything() {
    let h = harness(
        vec![broken_monitor("a", 10), broken_monitor("b", 30)],
        TestNotifier::new(Behaviour::Succeed),
        OverlapPolicy::Allow,
    );

    h.scheduler.start().await;
    time::sleep(Duration::from_secs(5)).await;
    h.scheduler.stop().await;

    let status = h.scheduler.status();
    assert!(!status.running);
    assert_eq!(status.active_schedules, 0);
    assert!(status.monitors.is_empty());

    let before = h.recorder.total_count();
    time::sleep(Duration::from_secs(120)).await;
    assert_eq!(h.recorder.total_count(), before);
}

#[tokio::test(start_paused = true)]
async fn test_reconcile_loop_tracks_catalog_changes() {
    let h = harness(
        vec![broken_monitor("a", 10)],
        TestNotifier::new(Behaviour::Succeed),
        OverlapPolicy::Allow,
    );
    h.scheduler.start().await;

    h.repository.upsert(broken_monitor("b", 20));
    h.repository.set_active(&id("a"), false);
    time::sleep(Duration::from_secs(61)).await;

    let status = h.scheduler.status();
    assert_eq!(status.active_schedules, 1);
    assert_eq!(status.monitors[0].id, id("b"));
    assert_eq!(status.monitors[0].interval_seconds, 20);

    h.repository.set_interval(&id("b"), 45);
    time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.scheduler.status().monitors[0].interval_seconds, 45);
    h.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_deleted_monitor_leaves_status_and_stops_firing() {
    let h = harness(
        vec![broken_monitor("a", 10), broken_monitor("b", 10)],
        TestNotifier::new(Behaviour::Succeed),
        OverlapPolicy::Allow,
    );
    h.scheduler.start().await;
    time::sleep(Duration::from_secs(1)).await;

    h.repository.remove(&id("a"));
    time::sleep(Duration::from_secs(61)).await;

    let status = h.scheduler.status();
    assert_eq!(status.active_schedules, 1);
    assert_eq!(status.monitors.len(), 1);
    assert_eq!(status.monitors[0].id, id("b"));
    assert!(!h.scheduler.registry().has(&id("a")));

    let before = h.recorder.count_for(&id("a"));
    time::sleep(Duration::from_secs(120)).await;
    assert_eq!(h.recorder.count_for(&id("a")), before);
    h.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_deactivated_monitor_records_nothing_after_next_pass() {
    let h = harness(
        vec![broken_monitor("a", 10)],
        TestNotifier::new(Behaviour::Succeed),
        OverlapPolicy::Allow,
    );
    h.scheduler.start().await;
    time::sleep(Duration::from_secs(1)).await;

    h.repository.set_active(&id("a"), false);
    time::sleep(Duration::from_secs(61)).await;

    // Firings between the flag flip and the pass short-circuit.
    let history = h.recorder.history(&id("a"));
    assert!(history.iter().any(|o| o.message == INACTIVE_MESSAGE));
    assert_eq!(h.scheduler.status().active_schedules, 0);

    let before = h.recorder.count_for(&id("a"));
    time::sleep(Duration::from_secs(120)).await;
    assert_eq!(h.recorder.count_for(&id("a")), before);
    h.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_interval_change_takes_new_cadence() {
    let h = harness(
        vec![broken_monitor("a", 10)],
        TestNotifier::new(Behaviour::Succeed),
        OverlapPolicy::Allow,
    );
    h.scheduler.start().await;
    time::sleep(Duration::from_secs(1)).await;

    h.repository.set_interval(&id("a"), 30);
    // Pass at 60s restarts the timer, which fires at once.
    time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.scheduler.status().monitors[0].interval_seconds, 30);
    let before = h.recorder.count_for(&id("a"));

    // New timer fires at 90s, 120s and 150s; the old one would have fired 9 times.
    time::sleep(Duration::from_secs(95)).await;
    assert_eq!(h.recorder.count_for(&id("a")), before + 3);
    h.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_reconcile_after_stop_schedules_nothing() {
    let h = harness(
        vec![broken_monitor("a", 10), broken_monitor("b", 30)],
        TestNotifier::new(Behaviour::Succeed),
        OverlapPolicy::Allow,
    );
    h.scheduler.start().await;
    time::sleep(Duration::from_secs(5)).await;
    h.scheduler.stop().await;

    let report = h.scheduler.reconcile_now().await.unwrap();

    assert!(report.is_noop());
    assert!(h.scheduler.registry().is_empty());
    let status = h.scheduler.status();
    assert!(!status.running);
    assert_eq!(status.active_schedules, 0);

    let before = h.recorder.total_count();
    time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.recorder.total_count(), before);
}

/// Lists its monitors normally but panics when one is looked up.
struct PanickingLookup {
    inner: InMemoryMonitorRepository,
}

#[async_trait]
impl MonitorRepository for PanickingLookup {
    async fn list_active_monitors(&self) -> Result<Vec<ActiveMonitor>, RepositoryError> {
        self.inner.list_active_monitors().await
    }

    async fn get_monitor_config(&self, _id: &MonitorId) -> Result<MonitorConfig, RepositoryError> {
        panic!("lookup exploded");
    }
}

#[tokio::test(start_paused = true)]
async fn test_panicking_lookup_records_failure_each_firing() {
    let repository = Arc::new(PanickingLookup {
        inner: InMemoryMonitorRepository::with_monitors([broken_monitor("api", 10)]),
    });
    let recorder = Arc::new(MemoryRunRecorder::default());
    let notifier = TestNotifier::new(Behaviour::Succeed);
    let pipeline = HealthCheckPipeline::new(
        repository.clone(),
        recorder.clone(),
        notifier.clone(),
        ProbeExecutor::new(Duration::from_secs(2)).unwrap(),
    );
    let scheduler = Scheduler::new(repository, pipeline, &SchedulerConfig::default());

    scheduler.start().await;
    time::sleep(Duration::from_secs(25)).await;

    let history = recorder.history(&id("api"));
    assert_eq!(history.len(), 3);
    assert!(history.iter().all(|o| !o.success && o.message == PANICKED_MESSAGE));
    assert_eq!(notifier.calls(), 0);
    assert!(scheduler.registry().has(&id("api")));
    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_each_firing_records_exactly_once_and_notifies() {
    let notifier = TestNotifier::new(Behaviour::Succeed);
    let h = harness(
        vec![broken_monitor("api", 10)],
        notifier.clone(),
        OverlapPolicy::Allow,
    );

    h.scheduler.start().await;
    time::sleep(Duration::from_secs(25)).await;
    h.scheduler.stop().await;

    // Firings at 0s, 10s and 20s.
    assert_eq!(h.recorder.count_for(&id("api")), 3);
    assert_eq!(notifier.calls(), 3);
    assert!(h.recorder.history(&id("api")).iter().all(|o| !o.success));
}

#[tokio::test(start_paused = true)]
async fn test_notifier_error_does_not_stop_schedule() {
    let notifier = TestNotifier::new(Behaviour::Fail);
    let h = harness(
        vec![broken_monitor("api", 10)],
        notifier.clone(),
        OverlapPolicy::Allow,
    );

    h.scheduler.start().await;
    time::sleep(Duration::from_secs(25)).await;

    assert_eq!(h.recorder.count_for(&id("api")), 3);
    assert_eq!(notifier.calls(), 3);
    assert!(h.scheduler.registry().has(&id("api")));
    h.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_panicking_firing_is_isolated() {
    let notifier = TestNotifier::new(Behaviour::Panic);
    let h = harness(
        vec![broken_monitor("api", 10), broken_monitor("other", 10)],
        notifier.clone(),
        OverlapPolicy::Allow,
    );

    h.scheduler.start().await;
    time::sleep(Duration::from_secs(25)).await;

    assert_eq!(h.recorder.count_for(&id("api")), 3);
    assert_eq!(h.recorder.count_for(&id("other")), 3);
    assert_eq!(h.scheduler.status().active_schedules, 2);
    h.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_skip_policy_drops_overlapping_ticks() {
    let h = harness(
        vec![broken_monitor("slow", 10)],
        TestNotifier::new(Behaviour::Stall(Duration::from_secs(25))),
        OverlapPolicy::Skip,
    );

    h.scheduler.start().await;
    time::sleep(Duration::from_secs(35)).await;

    // 0s runs until 25s, 10s and 20s are dropped, 30s runs.
    assert_eq!(h.recorder.count_for(&id("slow")), 2);
    h.scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_allow_policy_runs_overlapping_ticks() {
    let h = harness(
        vec![broken_monitor("slow", 10)],
        TestNotifier::new(Behaviour::Stall(Duration::from_secs(25))),
        OverlapPolicy::Allow,
    );

    h.scheduler.start().await;
    time::sleep(Duration::from_secs(35)).await;

    let count = h.recorder.count_for(&id("slow"));
    assert!((3..=4).contains(&count), "got {} outcomes", count);
    h.scheduler.stop().await;
}

#[tokio::test]
async fn test_live_probe_failure_records_and_survives_notifier_error() {
    let addr: SocketAddr = "127.0.0.1:28401".parse().unwrap();
    common::start_programmable_backend(addr, || async { (503, "maintenance".into()) }).await;

    let notifier = TestNotifier::new(Behaviour::Fail);
    let mut monitor = common::monitor_for("live", addr);
    monitor.notify_address = Some("owner@example.com".into());
    let h = harness(vec![monitor], notifier.clone(), OverlapPolicy::Allow);

    h.scheduler.start().await;
    for _ in 0..50 {
        if h.recorder.count_for(&id("live")) > 0 {
            break;
        }
        time::sleep(Duration::from_millis(50)).await;
    }
    time::sleep(Duration::from_millis(100)).await;
    h.scheduler.stop().await;

    let history = h.recorder.history(&id("live"));
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status_code, Some(503));
    assert_eq!(history[0].message, "Expected status 200, got 503");
    assert_eq!(notifier.calls(), 1);
}

#[tokio::test]
async fn test_run_check_now_outside_schedule() {
    let addr: SocketAddr = "127.0.0.1:28402".parse().unwrap();
    common::start_programmable_backend(addr, || async { (200, "ok".into()) }).await;

    let notifier = TestNotifier::new(Behaviour::Succeed);
    let h = harness(
        vec![common::monitor_for("manual", addr)],
        notifier.clone(),
        OverlapPolicy::Allow,
    );

    let outcome = h.scheduler.run_check_now(&id("manual")).await;

    assert!(outcome.success);
    assert_eq!(outcome.status_code, Some(200));
    assert_eq!(h.recorder.count_for(&id("manual")), 1);
    assert_eq!(notifier.calls(), 0);
    assert!(!h.scheduler.is_running());
}
