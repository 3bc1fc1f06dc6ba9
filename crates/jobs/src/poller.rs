//! Media-job polling.
//!
//! The poller owns a set of tracked job ids and, on each cycle,
//! fetches their current rows and republishes a snapshot through a
//! watch channel. Reconciliation rules:
//!
//! - a partial response retains the previous state for missing ids —
//!   "no row" means "no news", never deletion;
//! - one cycle runs at a time (in-flight guard), and every applied
//!   response carries a monotonic sequence number so a response that
//!   somehow loses the race is dropped instead of clobbering newer
//!   state;
//! - fetch failures leave state untouched, with no retry — the next
//!   tick is the retry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use cf_domain::error::Result;
use cf_domain::trace::TraceEvent;
use cf_store::tables::{JobKind, MediaJobRow};
use cf_store::StoreClient;

use crate::status::{JobKey, JobSnapshot, MediaJobStatus};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Job source
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where job rows come from. The store client is the real source;
/// tests fake it.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_jobs(&self, kind: JobKind, ids: &[String]) -> Result<Vec<MediaJobRow>>;
}

#[async_trait]
impl JobSource for StoreClient {
    async fn fetch_jobs(&self, kind: JobKind, ids: &[String]) -> Result<Vec<MediaJobRow>> {
        self.fetch_media_jobs(kind, ids).await
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Poller
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What one `poll_once` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Fetched and applied; carries the number of jobs whose state changed.
    Applied { updated: usize },
    /// Nothing tracked — the source was not contacted.
    Idle,
    /// Another cycle was already running.
    SkippedInFlight,
    /// The response was older than the last applied one and was dropped.
    DroppedStale,
    /// The fetch failed; previous state retained.
    Failed,
}

struct Tracked {
    status: MediaJobStatus,
    /// Cycles this job has spent in a terminal-looking state.
    terminal_cycles: u32,
}

pub struct MediaJobPoller {
    source: Arc<dyn JobSource>,
    tracked: RwLock<HashMap<JobKey, Tracked>>,
    snapshot_tx: watch::Sender<JobSnapshot>,
    in_flight: AtomicBool,
    next_seq: AtomicU64,
    last_applied_seq: AtomicU64,
    evict_after_cycles: u32,
}

impl MediaJobPoller {
    pub fn new(source: Arc<dyn JobSource>, evict_after_cycles: u32) -> Self {
        Self {
            source,
            tracked: RwLock::new(HashMap::new()),
            snapshot_tx: watch::channel(JobSnapshot::new()).0,
            in_flight: AtomicBool::new(false),
            next_seq: AtomicU64::new(0),
            last_applied_seq: AtomicU64::new(0),
            evict_after_cycles,
        }
    }

    /// Start tracking a job. Until the store reports it, the snapshot
    /// shows it pending at 0% progress.
    pub fn track(&self, key: JobKey) {
        {
            let mut tracked = self.tracked.write();
            tracked.entry(key.clone()).or_insert_with(|| Tracked {
                status: MediaJobStatus::pending(key.id.clone()),
                terminal_cycles: 0,
            });
        }
        self.publish();
    }

    pub fn untrack(&self, key: &JobKey) {
        self.tracked.write().remove(key);
        self.publish();
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.read().len()
    }

    /// Current snapshot (job-id → last-known status).
    pub fn snapshot(&self) -> JobSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Subscribe to snapshot updates. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> watch::Receiver<JobSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Run one refresh cycle.
    pub async fn poll_once(&self) -> PollOutcome {
        // Group tracked ids by collection up front; bail when idle.
        let ids_by_kind: HashMap<JobKind, Vec<String>> = {
            let tracked = self.tracked.read();
            if tracked.is_empty() {
                return PollOutcome::Idle;
            }
            let mut map: HashMap<JobKind, Vec<String>> = HashMap::new();
            for key in tracked.keys() {
                map.entry(key.kind).or_default().push(key.id.clone());
            }
            map
        };

        // Single in-flight cycle at a time.
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return PollOutcome::SkippedInFlight;
        }

        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let mut fetched: Vec<(JobKind, MediaJobRow)> = Vec::new();
        let mut failed = false;
        for (kind, ids) in &ids_by_kind {
            match self.source.fetch_jobs(*kind, ids).await {
                Ok(rows) => fetched.extend(rows.into_iter().map(|r| (*kind, r))),
                Err(e) => {
                    tracing::warn!(kind = ?kind, error = %e, "job fetch failed, keeping previous state");
                    failed = true;
                    break;
                }
            }
        }

        let outcome = if failed {
            PollOutcome::Failed
        } else {
            self.apply(seq, fetched)
        };

        self.in_flight.store(false, Ordering::SeqCst);
        outcome
    }

    /// Apply a fetched response, unless a newer one was applied already.
    fn apply(&self, seq: u64, fetched: Vec<(JobKind, MediaJobRow)>) -> PollOutcome {
        // Monotonic sequencing: only ever move forward.
        let last = self.last_applied_seq.load(Ordering::SeqCst);
        if seq <= last {
            TraceEvent::JobsPolled {
                tracked: self.tracked_count(),
                updated: 0,
                dropped_stale: true,
            }
            .emit();
            return PollOutcome::DroppedStale;
        }
        self.last_applied_seq.store(seq, Ordering::SeqCst);

        let mut updated = 0usize;
        {
            let mut tracked = self.tracked.write();

            // Update jobs the store reported; ids it did not report
            // keep whatever we knew before.
            for (kind, row) in fetched {
                let key = JobKey::new(kind, row.id.clone());
                if let Some(entry) = tracked.get_mut(&key) {
                    let next = MediaJobStatus::from_row(&row);
                    if next != entry.status {
                        updated += 1;
                    }
                    entry.status = next;
                }
            }

            // Settled jobs eventually leave the tracked set.
            for entry in tracked.values_mut() {
                if entry.status.looks_terminal() {
                    entry.terminal_cycles += 1;
                } else {
                    entry.terminal_cycles = 0;
                }
            }
            let evict_after = self.evict_after_cycles;
            tracked.retain(|_, entry| entry.terminal_cycles <= evict_after);
        }

        self.publish();
        TraceEvent::JobsPolled {
            tracked: self.tracked_count(),
            updated,
            dropped_stale: false,
        }
        .emit();
        PollOutcome::Applied { updated }
    }

    fn publish(&self) {
        let snapshot: JobSnapshot = self
            .tracked
            .read()
            .values()
            .map(|entry| (entry.status.id.clone(), entry.status.clone()))
            .collect();
        let _ = self.snapshot_tx.send(snapshot);
    }

    /// Interval loop. Returns when the cancellation token fires; the
    /// interval is the only thing torn down — an in-flight fetch is
    /// left to finish on its own.
    pub async fn run(&self, interval_ms: u64, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("media job poller stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use cf_domain::error::Error;
    use std::collections::VecDeque;
    use tokio::sync::Notify;

    /// Scripted job source: pops one canned response per fetch.
    struct FakeSource {
        responses: parking_lot::Mutex<VecDeque<Result<Vec<MediaJobRow>>>>,
        /// When set, each fetch waits for a notification before returning.
        gate: Option<Arc<Notify>>,
        calls: AtomicU64,
    }

    impl FakeSource {
        fn scripted(responses: Vec<Result<Vec<MediaJobRow>>>) -> Arc<Self> {
            Arc::new(Self {
                responses: parking_lot::Mutex::new(responses.into()),
                gate: None,
                calls: AtomicU64::new(0),
            })
        }

        fn gated(responses: Vec<Result<Vec<MediaJobRow>>>, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                responses: parking_lot::Mutex::new(responses.into()),
                gate: Some(gate),
                calls: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl JobSource for FakeSource {
        async fn fetch_jobs(&self, _kind: JobKind, _ids: &[String]) -> Result<Vec<MediaJobRow>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(ref gate) = self.gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn row(id: &str, status: &str, progress: Option<u8>) -> MediaJobRow {
        MediaJobRow {
            id: id.into(),
            status: status.into(),
            result_url: None,
            progress,
        }
    }

    // ── reconciliation ──────────────────────────────────────────────

    #[tokio::test]
    async fn partial_response_retains_missing_ids() {
        let source = FakeSource::scripted(vec![
            Ok(vec![
                row("a", "rendering", Some(10)),
                row("b", "rendering", Some(20)),
                row("c", "rendering", Some(30)),
            ]),
            // Second cycle: the store only returns two rows.
            Ok(vec![
                row("a", "rendering", Some(50)),
                row("b", "rendering", Some(60)),
            ]),
        ]);
        let poller = MediaJobPoller::new(source, 12);
        for id in ["a", "b", "c"] {
            poller.track(JobKey::new(JobKind::Image, id));
        }

        poller.poll_once().await;
        poller.poll_once().await;

        let snapshot = poller.snapshot();
        assert_eq!(snapshot["a"].progress, 50);
        assert_eq!(snapshot["b"].progress, 60);
        // "c" was missing from the second response — previous state kept.
        assert_eq!(snapshot["c"].progress, 30);
        assert_eq!(snapshot["c"].status, "rendering");
    }

    #[tokio::test]
    async fn progress_defaults_to_100_without_column() {
        let source = FakeSource::scripted(vec![Ok(vec![row("a", "done_maybe", None)])]);
        let poller = MediaJobPoller::new(source, 12);
        poller.track(JobKey::new(JobKind::Image, "a"));

        poller.poll_once().await;
        assert_eq!(poller.snapshot()["a"].progress, 100);
    }

    #[tokio::test]
    async fn fetch_failure_keeps_previous_state() {
        let source = FakeSource::scripted(vec![
            Ok(vec![row("a", "rendering", Some(40))]),
            Err(Error::store("image_generation_jobs", "boom")),
        ]);
        let poller = MediaJobPoller::new(source, 12);
        poller.track(JobKey::new(JobKind::Image, "a"));

        assert_eq!(
            poller.poll_once().await,
            PollOutcome::Applied { updated: 1 }
        );
        assert_eq!(poller.poll_once().await, PollOutcome::Failed);
        assert_eq!(poller.snapshot()["a"].progress, 40);
    }

    #[tokio::test]
    async fn idle_when_nothing_tracked() {
        let source = FakeSource::scripted(vec![]);
        let poller = MediaJobPoller::new(source.clone(), 12);
        assert_eq!(poller.poll_once().await, PollOutcome::Idle);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    // ── overlap protection ──────────────────────────────────────────

    #[tokio::test]
    async fn overlapping_cycle_is_skipped() {
        let gate = Arc::new(Notify::new());
        let source = FakeSource::gated(vec![Ok(vec![row("a", "rendering", None)])], gate.clone());
        let poller = Arc::new(MediaJobPoller::new(source, 12));
        poller.track(JobKey::new(JobKind::Image, "a"));

        let first = {
            let poller = poller.clone();
            tokio::spawn(async move { poller.poll_once().await })
        };
        // Let the first cycle reach its fetch.
        tokio::task::yield_now().await;

        assert_eq!(poller.poll_once().await, PollOutcome::SkippedInFlight);

        gate.notify_one();
        assert_eq!(
            first.await.unwrap(),
            PollOutcome::Applied { updated: 1 }
        );
    }

    #[tokio::test]
    async fn stale_response_is_dropped() {
        let source = FakeSource::scripted(vec![]);
        let poller = MediaJobPoller::new(source, 12);
        poller.track(JobKey::new(JobKind::Image, "a"));

        // Sequence 2 lands first; the older sequence 1 must not apply.
        assert_eq!(
            poller.apply(2, vec![(JobKind::Image, row("a", "rendering", Some(80)))]),
            PollOutcome::Applied { updated: 1 }
        );
        assert_eq!(
            poller.apply(1, vec![(JobKind::Image, row("a", "rendering", Some(10)))]),
            PollOutcome::DroppedStale
        );
        assert_eq!(poller.snapshot()["a"].progress, 80);
    }

    // ── eviction ────────────────────────────────────────────────────

    #[tokio::test]
    async fn settled_jobs_are_evicted_after_configured_cycles() {
        let source = FakeSource::scripted(vec![
            Ok(vec![row("a", "completed", None)]),
            Ok(vec![]),
            Ok(vec![]),
        ]);
        let poller = MediaJobPoller::new(source, 1);
        poller.track(JobKey::new(JobKind::Image, "a"));

        poller.poll_once().await; // terminal_cycles = 1
        assert_eq!(poller.tracked_count(), 1);
        poller.poll_once().await; // terminal_cycles = 2 > 1 → evicted
        assert_eq!(poller.tracked_count(), 0);
        assert!(poller.snapshot().is_empty());
    }

    // ── subscription ────────────────────────────────────────────────

    #[tokio::test]
    async fn subscribers_see_updates() {
        let source = FakeSource::scripted(vec![Ok(vec![row("a", "rendering", Some(5))])]);
        let poller = MediaJobPoller::new(source, 12);
        let mut rx = poller.subscribe();

        poller.track(JobKey::new(JobKind::Image, "a"));
        poller.poll_once().await;

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow()["a"].progress, 5);
    }

    // ── run loop ────────────────────────────────────────────────────

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let source = FakeSource::scripted(vec![]);
        let poller = Arc::new(MediaJobPoller::new(source, 12));
        let cancel = CancellationToken::new();

        let handle = {
            let poller = poller.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { poller.run(10, cancel).await })
        };

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("run loop should exit promptly")
            .unwrap();
    }
}
