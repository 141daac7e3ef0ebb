use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant};

use pollvisor::{
    AcquireError, AcquireSpec, BackoffPolicy, BlockingSource, CancelReason, Config, Detection,
    Event, EventKind, JitterPolicy, Outcome, RuntimeError, SourceError, SourceFn, SourceRef,
    Status, Subscribe, Supervisor,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Reader that reports a tag once it has been polled `hit_on` times in total.
fn reader(hit_on: u32) -> (SourceRef, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let src: SourceRef = SourceFn::arc("uhf-reader", move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if n >= hit_on {
                Ok::<Vec<Detection>, SourceError>(vec![Detection::new([0xE2, 0x00, n as u8])])
            } else {
                Ok(Vec::new())
            }
        }
    });
    (src, calls)
}

fn silent_reader() -> (SourceRef, Arc<AtomicU32>) {
    reader(u32::MAX)
}

fn supervisor(src: SourceRef) -> Arc<Supervisor> {
    Supervisor::builder(Config::default()).with_source(src).build()
}

#[tokio::test(start_paused = true)]
async fn detection_on_sixth_poll_wins() {
    let (src, calls) = reader(6);
    let sup = supervisor(src);

    let start = Instant::now();
    let out = sup.acquire(AcquireSpec::new(ms(100), ms(1000))).await;
    let elapsed = start.elapsed();

    assert_eq!(out.detection().unwrap().to_hex(), "E20006");
    assert!(elapsed >= ms(500) && elapsed < ms(600), "elapsed {elapsed:?}");
    assert_eq!(calls.load(Ordering::SeqCst), 6);

    time::sleep(ms(2000)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 6, "polled after resolution");
}

#[tokio::test(start_paused = true)]
async fn times_out_and_stops_polling() {
    let (src, calls) = silent_reader();
    let sup = supervisor(src);

    let start = Instant::now();
    let spec = AcquireSpec::new(ms(100), ms(350));
    let out = sup.acquire(spec).await;
    let elapsed = start.elapsed();

    assert!(matches!(out, Outcome::Timeout));
    assert!(elapsed >= ms(350) && elapsed <= ms(460), "elapsed {elapsed:?}");
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    match out.into_result(spec.timeout()) {
        Err(AcquireError::Timeout { timeout }) => assert_eq!(timeout, ms(350)),
        other => panic!("unexpected: {other:?}"),
    }

    time::sleep(ms(1000)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn immediate_detection_resolves_after_one_poll() {
    let (src, calls) = reader(1);
    let sup = supervisor(src);

    let start = Instant::now();
    let out = sup.acquire(AcquireSpec::new(ms(100), ms(1000))).await;

    assert!(out.is_success());
    assert!(start.elapsed() < ms(100));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_through_handle_stops_polling() {
    let (src, calls) = silent_reader();
    let sup = supervisor(src);

    let handle = sup.start(AcquireSpec::new(ms(100), ms(10_000))).await.unwrap();
    assert_eq!(handle.status(), Status::Pending);

    time::sleep(ms(250)).await;
    assert!(handle.cancel());
    assert!(!handle.cancel());

    assert!(matches!(
        handle.wait().await,
        Outcome::Cancelled(CancelReason::Caller)
    ));
    assert!(matches!(handle.result().await, Err(AcquireError::Cancelled)));
    handle.released().await;
    assert!(handle.is_released());

    let seen = calls.load(Ordering::SeqCst);
    assert_eq!(seen, 3);
    time::sleep(ms(1000)).await;
    assert_eq!(calls.load(Ordering::SeqCst), seen);
}

#[tokio::test(start_paused = true)]
async fn cancel_by_id_is_idempotent() {
    let (src, _calls) = silent_reader();
    let sup = supervisor(src);

    let first = sup.start(AcquireSpec::new(ms(100), ms(10_000))).await.unwrap();
    let second = sup.start(AcquireSpec::new(ms(100), ms(10_000))).await.unwrap();
    assert!(first.id() < second.id());
    assert_eq!(sup.list_pending().await, vec![first.id(), second.id()]);
    assert!(sup.is_pending(first.id()).await);

    assert!(sup.cancel(first.id()).await);
    assert!(!sup.cancel(first.id()).await);
    assert!(!sup.is_pending(first.id()).await);
    assert_eq!(sup.list_pending().await, vec![second.id()]);

    first.released().await;
    assert!(!sup.cancel(first.id()).await);
    assert!(sup.handle(first.id()).await.is_none());
    assert!(!sup.cancel(9_999).await);

    assert!(second.cancel());
    second.released().await;
    assert!(sup.list_pending().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_after_success_is_noop() {
    let (src, _calls) = reader(2);
    let sup = supervisor(src);

    let handle = sup.start(AcquireSpec::new(ms(100), ms(1000))).await.unwrap();
    let tag = handle.result().await.unwrap();
    assert_eq!(tag.as_bytes(), &[0xE2, 0x00, 0x02]);

    assert!(!handle.cancel());
    assert!(!sup.cancel(handle.id()).await);
    assert!(handle.wait().await.is_success());
}

#[tokio::test(start_paused = true)]
async fn dropping_acquire_cancels_it() {
    let (src, calls) = silent_reader();
    let sup = supervisor(src);

    let res = time::timeout(ms(250), sup.acquire(AcquireSpec::new(ms(100), ms(10_000)))).await;
    assert!(res.is_err());
    assert!(sup.list_pending().await.is_empty());

    let seen = calls.load(Ordering::SeqCst);
    time::sleep(ms(1000)).await;
    assert_eq!(calls.load(Ordering::SeqCst), seen);
}

#[tokio::test(start_paused = true)]
async fn source_error_is_delivered_with_message() {
    let src: SourceRef = SourceFn::arc("broken", || async {
        Err::<Vec<Detection>, _>(SourceError::new("antenna disconnected"))
    });
    let sup = supervisor(src);

    match sup.acquire(AcquireSpec::new(ms(100), ms(1000))).await {
        Outcome::Error(err) => {
            assert_eq!(err.code(), "ERROR");
            match err {
                AcquireError::Source { error } => {
                    assert_eq!(error.message(), "antenna disconnected")
                }
                other => panic!("unexpected: {other:?}"),
            }
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_source_resolves_as_error() {
    let src: SourceRef = SourceFn::arc("fragile", || async {
        if true {
            panic!("driver crashed");
        }
        Ok::<Vec<Detection>, SourceError>(Vec::new())
    });
    let sup = supervisor(src);

    let out = sup.acquire(AcquireSpec::new(ms(100), ms(1000))).await;
    match out {
        Outcome::Error(AcquireError::Source { error }) => {
            assert_eq!(error.message(), "poll driver terminated abnormally");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(sup.list_pending().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn missing_source_is_not_initialized() {
    let sup = Supervisor::builder(Config::default()).build();

    let handle = sup.start(AcquireSpec::new(ms(100), ms(1000))).await.unwrap();
    assert!(handle.is_released());
    assert_eq!(handle.polls(), 0);
    assert!(sup.list_pending().await.is_empty());

    let out = sup.acquire(AcquireSpec::new(ms(100), ms(1000))).await;
    match out {
        Outcome::Error(err) => {
            assert!(matches!(err, AcquireError::NotInitialized));
            assert_eq!(err.code(), "NOT_INITIALIZED");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn invalid_spec_is_rejected() {
    let (src, calls) = silent_reader();
    let sup = supervisor(src);

    let zero_interval = AcquireSpec::new(Duration::ZERO, ms(1000));
    assert!(matches!(
        sup.start(zero_interval).await,
        Err(AcquireError::InvalidSpec { .. })
    ));

    let zero_timeout = AcquireSpec::new(ms(100), Duration::ZERO);
    match sup.acquire(zero_timeout).await {
        Outcome::Error(err) => assert_eq!(err.code(), "INVALID_SPEC"),
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_interrupts_pending_and_refuses_new() {
    let (src, calls) = silent_reader();
    let sup = supervisor(src);

    let handle = sup.start(AcquireSpec::new(ms(100), ms(10_000))).await.unwrap();
    time::sleep(ms(150)).await;

    sup.shutdown().await.unwrap();
    assert!(sup.is_shut_down());
    assert!(handle.is_released());

    let out = handle.wait().await;
    assert_eq!(out.as_label(), "interrupted");
    assert!(matches!(
        out.into_result(handle.timeout()),
        Err(AcquireError::Interrupted)
    ));

    let seen = calls.load(Ordering::SeqCst);
    time::sleep(ms(1000)).await;
    assert_eq!(calls.load(Ordering::SeqCst), seen);

    let late = sup.start(AcquireSpec::new(ms(100), ms(1000))).await.unwrap();
    assert!(matches!(
        late.wait().await,
        Outcome::Cancelled(CancelReason::Shutdown)
    ));
    assert!(late.is_released());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_reports_operations_stuck_past_grace() {
    // Blocks the worker thread inside the poll future itself.
    let src: SourceRef = SourceFn::arc("wedged", || async {
        std::thread::sleep(Duration::from_millis(500));
        Ok::<Vec<Detection>, SourceError>(Vec::new())
    });
    let cfg = Config {
        grace: ms(50),
        ..Config::default()
    };
    let sup = Supervisor::builder(cfg).with_source(src).build();

    let handle = sup.start(AcquireSpec::new(ms(100), ms(10_000))).await.unwrap();
    time::sleep(ms(50)).await;

    match sup.shutdown().await {
        Err(RuntimeError::GraceExceeded { grace, stuck }) => {
            assert_eq!(grace, ms(50));
            assert_eq!(stuck, vec![handle.id()]);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(matches!(
        handle.wait().await,
        Outcome::Cancelled(CancelReason::Shutdown)
    ));
}

#[tokio::test(start_paused = true)]
async fn concurrency_limit_serializes_acquisitions() {
    let (src, _calls) = reader(4);
    let cfg = Config {
        max_concurrent: 1,
        ..Config::default()
    };
    let sup = Supervisor::builder(cfg).with_source(src).build();

    let first = sup.start(AcquireSpec::new(ms(100), ms(250))).await.unwrap();
    let second = sup.start(AcquireSpec::new(ms(100), ms(2000))).await.unwrap();

    time::sleep(ms(200)).await;
    assert_eq!(second.polls(), 0);
    assert_eq!(second.status(), Status::Pending);

    assert!(matches!(first.wait().await, Outcome::Timeout));
    assert_eq!(first.polls(), 3);

    let tag = second.result().await.unwrap();
    assert_eq!(tag.as_bytes(), &[0xE2, 0x00, 0x04]);
    assert_eq!(second.polls(), 1);
}

#[tokio::test(start_paused = true)]
async fn backoff_pacing_spaces_polls() {
    let (src, _calls) = reader(4);
    let sup = supervisor(src);

    let pacing = BackoffPolicy {
        first: ms(100),
        max: ms(1000),
        factor: 2.0,
        jitter: JitterPolicy::None,
    };
    let spec = AcquireSpec::new(ms(100), ms(5000)).with_pacing(pacing);

    let start = Instant::now();
    assert!(sup.acquire(spec).await.is_success());
    let elapsed = start.elapsed();
    // 100 + 200 + 400
    assert!(elapsed >= ms(699) && elapsed < ms(710), "elapsed {elapsed:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blocking_source_runs_off_the_runtime() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let src: SourceRef = BlockingSource::arc("serial-reader", move || {
        let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
        std::thread::sleep(Duration::from_millis(5));
        if n < 3 {
            Ok::<Vec<Detection>, SourceError>(Vec::new())
        } else {
            Ok(vec![Detection::new(vec![0x30, 0x00, 0x11])])
        }
    });
    let sup = supervisor(src);

    let out = sup.acquire(AcquireSpec::new(ms(10), ms(5000))).await;
    assert_eq!(out.into_hex(ms(5000)).unwrap(), "300011");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

struct Recorder {
    seen: Mutex<Vec<EventKind>>,
    delay: Duration,
}

impl Recorder {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            delay,
        })
    }

    fn seen(&self) -> Vec<EventKind> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        if !self.delay.is_zero() {
            time::sleep(self.delay).await;
        }
        self.seen.lock().unwrap().push(ev.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

#[tokio::test(start_paused = true)]
async fn subscribers_observe_the_lifecycle() {
    let (src, _calls) = reader(2);
    let recorder = Recorder::new(Duration::ZERO);
    let sup = Supervisor::builder(Config::default())
        .with_source(src)
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();

    assert!(sup.acquire(AcquireSpec::new(ms(100), ms(1000))).await.is_success());
    time::sleep(ms(10)).await;

    assert_eq!(
        recorder.seen(),
        vec![
            EventKind::AcquireStarted,
            EventKind::PollEmpty,
            EventKind::DetectionFound,
            EventKind::OperationReleased,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn shutdown_hands_final_events_to_slow_subscribers() {
    let (src, _calls) = silent_reader();
    let recorder = Recorder::new(ms(20));
    let sup = Supervisor::builder(Config::default())
        .with_source(src)
        .with_subscribers(vec![recorder.clone() as Arc<dyn Subscribe>])
        .build();

    let _handle = sup.start(AcquireSpec::new(ms(100), ms(10_000))).await.unwrap();
    time::sleep(ms(150)).await;
    sup.shutdown().await.unwrap();

    // No extra sleep: everything published before shutdown returned is already delivered.
    let seen = recorder.seen();
    assert_eq!(seen.first(), Some(&EventKind::AcquireStarted));
    assert_eq!(seen.last(), Some(&EventKind::AllStoppedWithin));
    assert!(seen.contains(&EventKind::ShutdownRequested));
    assert!(seen.contains(&EventKind::AcquireInterrupted));
    assert!(seen.contains(&EventKind::OperationReleased));

    // A second shutdown has nothing left to flush.
    sup.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unbounded_timeout_still_delivers_detection() {
    let (src, calls) = reader(3);
    let sup = supervisor(src);

    let handle = sup.start(AcquireSpec::new(ms(100), Duration::MAX)).await.unwrap();
    assert!(handle.deadline() > handle.started_at());
    assert_eq!(handle.timeout(), Duration::MAX);

    let tag = handle.result().await.unwrap();
    assert_eq!(tag.as_bytes(), &[0xE2, 0x00, 0x03]);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn unbounded_interval_polls_once_then_times_out() {
    let (src, calls) = silent_reader();
    let sup = supervisor(src);

    let out = sup.acquire(AcquireSpec::new(Duration::MAX, ms(500))).await;
    assert!(matches!(out, Outcome::Timeout));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
