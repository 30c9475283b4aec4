use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use track_awesome::limiter::run_limited;
use track_awesome::TrackerError;

#[derive(Default)]
struct Probe {
    started: AtomicUsize,
    completed: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    // completed count observed when each batch's first job was started
    batch_starts: Mutex<Vec<usize>>,
}

fn probed_jobs(
    probe: &Arc<Probe>,
    count: usize,
    limit: usize,
    fail_at: Option<usize>,
) -> Vec<impl FnOnce() -> futures::future::BoxFuture<'static, track_awesome::Result<usize>>> {
    (0..count)
        .map(|i| {
            let probe = probe.clone();
            move || {
                let position = probe.started.fetch_add(1, Ordering::SeqCst);
                if position % limit == 0 {
                    let done = probe.completed.load(Ordering::SeqCst);
                    probe.batch_starts.lock().unwrap().push(done);
                }
                let fut: futures::future::BoxFuture<'static, track_awesome::Result<usize>> = Box::pin(async move {
                    let now = probe.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    probe.max_in_flight.fetch_max(now, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    probe.in_flight.fetch_sub(1, Ordering::SeqCst);
                    probe.completed.fetch_add(1, Ordering::SeqCst);
                    if Some(i) == fail_at {
                        Err(TrackerError::InvalidDate(format!("job {} failed", i)))
                    } else {
                        Ok(i)
                    }
                });
                fut
            }
        })
        .collect()
}

#[tokio::test]
async fn test_runs_in_batches_and_keeps_order() {
    let probe = Arc::new(Probe::default());
    let jobs = probed_jobs(&probe, 2500, 1000, None);

    let results = run_limited(jobs, 1000).await.unwrap();

    assert_eq!(results, (0..2500).collect::<Vec<_>>());
    assert_eq!(*probe.batch_starts.lock().unwrap(), vec![0, 1000, 2000]);
    assert!(probe.max_in_flight.load(Ordering::SeqCst) <= 1000);
    assert_eq!(probe.completed.load(Ordering::SeqCst), 2500);
}

#[tokio::test]
async fn test_failure_stops_later_batches() {
    let probe = Arc::new(Probe::default());
    let jobs = probed_jobs(&probe, 2500, 1000, Some(7));

    let err = run_limited(jobs, 1000).await.unwrap_err();

    match err {
        TrackerError::BatchFailed { batch, index, source } => {
            assert_eq!(batch, 0);
            assert_eq!(index, 7);
            assert!(matches!(*source, TrackerError::InvalidDate(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(probe.started.load(Ordering::SeqCst), 1000);
    assert_eq!(*probe.batch_starts.lock().unwrap(), vec![0]);
}

#[tokio::test]
async fn test_failure_in_middle_batch_reports_global_index() {
    let probe = Arc::new(Probe::default());
    let jobs = probed_jobs(&probe, 2500, 1000, Some(1500));

    let err = run_limited(jobs, 1000).await.unwrap_err();

    assert!(matches!(err, TrackerError::BatchFailed { batch: 1, index: 1500, .. }));
    assert_eq!(probe.started.load(Ordering::SeqCst), 2000);
}

#[tokio::test]
async fn test_limit_of_one_runs_sequentially() {
    let probe = Arc::new(Probe::default());
    let jobs = probed_jobs(&probe, 20, 1, None);

    let results = run_limited(jobs, 1).await.unwrap();

    assert_eq!(results.len(), 20);
    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(*probe.batch_starts.lock().unwrap(), (0..20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_empty_job_list() {
    let jobs: Vec<fn() -> futures::future::Ready<track_awesome::Result<u8>>> = Vec::new();
    assert!(run_limited(jobs, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_running_siblings_are_not_cancelled() {
    let finished = Arc::new(AtomicBool::new(false));
    let slow_finished = finished.clone();

    let jobs: Vec<Box<dyn FnOnce() -> futures::future::BoxFuture<'static, track_awesome::Result<()>>>> = vec![
        Box::new(move || {
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                slow_finished.store(true, Ordering::SeqCst);
                Ok(())
            })
        }),
        Box::new(|| Box::pin(async { Err(TrackerError::Config("boom".to_string())) })),
    ];

    let err = run_limited(jobs, 10).await.unwrap_err();
    assert!(matches!(err, TrackerError::BatchFailed { index: 1, .. }));
    assert!(!finished.load(Ordering::SeqCst));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(finished.load(Ordering::SeqCst));
}

async fn explode() -> track_awesome::Result<u8> {
    panic!("job blew up")
}

#[tokio::test]
async fn test_panicking_job_is_reported_as_batch_failure() {
    let jobs: Vec<Box<dyn FnOnce() -> futures::future::BoxFuture<'static, track_awesome::Result<u8>>>> = vec![
        Box::new(|| Box::pin(async { Ok(1) })),
        Box::new(|| Box::pin(explode())),
        Box::new(|| Box::pin(async { Ok(3) })),
    ];

    let err = run_limited(jobs, 2).await.unwrap_err();

    match err {
        TrackerError::BatchFailed { batch, index, source } => {
            assert_eq!(batch, 0);
            assert_eq!(index, 1);
            assert!(matches!(*source, TrackerError::Join(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
}
