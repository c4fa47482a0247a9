//! Per-kind coalescing of high-frequency occurrences.
//!
//! Each [`Debouncer`] owns one worker task fed through a bounded queue. With
//! [`Coalesce::Latest`] the worker keeps only the most recent occurrence and a
//! retriggerable quiet-period timer: every push replaces the pending value and
//! restarts the timer, and the pending value is committed only once the timer
//! runs out (trailing-edge debounce). [`Coalesce::Every`] commits each
//! occurrence in arrival order.
//!
//! Committed events carry the commit time, not the time of the push.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use ct_core::{Event, EventData, EventKind, SessionId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::RecorderError;

/// Receives events committed by a debounce worker.
///
/// Commits happen on the worker task, outside any caller's error path, so
/// implementations must report their own failures.
pub trait EventSink: Send + Sync + 'static {
    fn commit(&self, event: Event);
}

/// How a worker treats occurrences that arrive in a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coalesce {
    /// Keep only the latest occurrence; commit after a quiet period.
    Latest,
    /// Commit every occurrence immediately, never dropping any.
    Every,
}

/// Queue and timer settings for one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceSettings {
    pub quiet_period: Duration,
    pub capacity: usize,
}

enum Command<T> {
    Push(T),
    Flush(oneshot::Sender<()>),
}

/// Handle to a running per-kind worker.
pub struct Debouncer<T> {
    session: SessionId,
    kind: EventKind,
    tx: mpsc::Sender<Command<T>>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Debouncer<T>
where
    T: Into<EventData> + Send + 'static,
{
    /// Spawns the worker on the current tokio runtime.
    ///
    /// The worker stops when `cancel` fires, when [`Debouncer::shutdown`] is
    /// called, or when the handle is dropped.
    pub fn spawn(
        session: SessionId,
        kind: EventKind,
        policy: Coalesce,
        settings: DebounceSettings,
        sink: Arc<dyn EventSink>,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel(settings.capacity.max(1));
        let worker = Worker {
            session: session.clone(),
            kind,
            policy,
            quiet_period: settings.quiet_period,
            sink,
        };
        let handle = tokio::spawn(worker.run(rx, cancel.clone()));

        Self {
            session,
            kind,
            tx,
            cancel,
            worker: Mutex::new(Some(handle)),
        }
    }

    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Hands an occurrence to the worker.
    ///
    /// Returns as soon as the occurrence is queued. Waits only while the
    /// queue is full.
    pub async fn push(&self, occurrence: T) -> Result<(), RecorderError> {
        self.tx
            .send(Command::Push(occurrence))
            .await
            .map_err(|_| self.closed())
    }

    /// Commits the pending occurrence now, if any, and waits for the commit.
    pub async fn flush(&self) -> Result<(), RecorderError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack))
            .await
            .map_err(|_| self.closed())?;
        done.await.map_err(|_| self.closed())
    }

    /// Stops the worker and waits for it to exit.
    ///
    /// A pending occurrence that has not been flushed is dropped.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(session = %self.session, kind = %self.kind, error = %e, "debounce worker failed");
            }
        }
    }

    fn closed(&self) -> RecorderError {
        RecorderError::PipelineClosed {
            id: self.session.clone(),
            kind: self.kind,
        }
    }
}

struct Worker {
    session: SessionId,
    kind: EventKind,
    policy: Coalesce,
    quiet_period: Duration,
    sink: Arc<dyn EventSink>,
}

impl Worker {
    async fn run<T: Into<EventData>>(
        self,
        mut rx: mpsc::Receiver<Command<T>>,
        cancel: CancellationToken,
    ) {
        let mut pending: Option<T> = None;
        let timer = tokio::time::sleep(self.quiet_period);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    self.abandon(pending.is_some(), "shutdown");
                    break;
                }
                command = rx.recv() => match command {
                    Some(Command::Push(occurrence)) => match self.policy {
                        Coalesce::Latest => {
                            if pending.replace(occurrence).is_some() {
                                tracing::trace!(session = %self.session, kind = %self.kind, "coalesced occurrence");
                            }
                            timer.as_mut().reset(Instant::now() + self.quiet_period);
                        }
                        Coalesce::Every => self.commit(occurrence),
                    },
                    Some(Command::Flush(ack)) => {
                        if let Some(occurrence) = pending.take() {
                            self.commit(occurrence);
                        }
                        let _ = ack.send(());
                    }
                    None => {
                        self.abandon(pending.is_some(), "handle dropped");
                        break;
                    }
                },
                () = &mut timer, if pending.is_some() => {
                    if let Some(occurrence) = pending.take() {
                        self.commit(occurrence);
                    }
                }
            }
        }
    }

    fn commit<T: Into<EventData>>(&self, occurrence: T) {
        let event = Event::new(self.kind, occurrence.into(), Utc::now());
        tracing::debug!(session = %self.session, kind = %self.kind, "committing debounced event");
        self.sink.commit(event);
    }

    fn abandon(&self, had_pending: bool, reason: &'static str) {
        if had_pending {
            tracing::debug!(session = %self.session, kind = %self.kind, reason, "dropping pending occurrence");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::task::Poll;

    use ct_core::CursorOccurrence;
    use tokio::time::sleep;

    #[derive(Default)]
    struct Collect(Mutex<Vec<Event>>);

    impl EventSink for Collect {
        fn commit(&self, event: Event) {
            self.0.lock().unwrap().push(event);
        }
    }

    impl Collect {
        fn lines(&self) -> Vec<u32> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.data.line.unwrap())
                .collect()
        }
    }

    fn cursor(line: u32) -> CursorOccurrence {
        CursorOccurrence {
            filename: "main.rs".to_string(),
            line,
            column: 1,
        }
    }

    fn spawn(policy: Coalesce, sink: &Arc<Collect>) -> Debouncer<CursorOccurrence> {
        Debouncer::spawn(
            SessionId::new("s1").unwrap(),
            EventKind::CursorMove,
            policy,
            DebounceSettings {
                quiet_period: Duration::from_millis(500),
                capacity: 8,
            },
            Arc::clone(sink) as Arc<dyn EventSink>,
            CancellationToken::new(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn burst_commits_only_the_last_occurrence() {
        let sink = Arc::new(Collect::default());
        let debouncer = spawn(Coalesce::Latest, &sink);

        for line in 1..=5 {
            debouncer.push(cursor(line)).await.unwrap();
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_millis(600)).await;

        assert_eq!(sink.lines(), vec![5]);
        let events = sink.0.lock().unwrap();
        assert_eq!(events[0].kind, EventKind::CursorMove);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_commits_inside_the_quiet_period() {
        let sink = Arc::new(Collect::default());
        let debouncer = spawn(Coalesce::Latest, &sink);

        debouncer.push(cursor(1)).await.unwrap();
        sleep(Duration::from_millis(400)).await;
        assert!(sink.lines().is_empty());

        sleep(Duration::from_millis(200)).await;
        assert_eq!(sink.lines(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn each_push_restarts_the_timer() {
        let sink = Arc::new(Collect::default());
        let debouncer = spawn(Coalesce::Latest, &sink);

        debouncer.push(cursor(1)).await.unwrap();
        sleep(Duration::from_millis(400)).await;
        debouncer.push(cursor(2)).await.unwrap();
        sleep(Duration::from_millis(400)).await;
        assert!(sink.lines().is_empty(), "timer should have restarted");

        sleep(Duration::from_millis(200)).await;
        assert_eq!(sink.lines(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_commit_separately() {
        let sink = Arc::new(Collect::default());
        let debouncer = spawn(Coalesce::Latest, &sink);

        debouncer.push(cursor(1)).await.unwrap();
        sleep(Duration::from_millis(700)).await;
        debouncer.push(cursor(2)).await.unwrap();
        debouncer.push(cursor(3)).await.unwrap();
        sleep(Duration::from_millis(700)).await;

        assert_eq!(sink.lines(), vec![1, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_commits_pending_immediately() {
        let sink = Arc::new(Collect::default());
        let debouncer = spawn(Coalesce::Latest, &sink);

        debouncer.push(cursor(7)).await.unwrap();
        debouncer.flush().await.unwrap();
        assert_eq!(sink.lines(), vec![7]);

        // Nothing left for the timer to commit.
        sleep(Duration::from_millis(600)).await;
        assert_eq!(sink.lines(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_without_pending_is_a_no_op() {
        let sink = Arc::new(Collect::default());
        let debouncer = spawn(Coalesce::Latest, &sink);

        debouncer.flush().await.unwrap();
        assert!(sink.lines().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_pending_occurrence() {
        let sink = Arc::new(Collect::default());
        let debouncer = spawn(Coalesce::Latest, &sink);

        debouncer.push(cursor(1)).await.unwrap();
        debouncer.shutdown().await;
        sleep(Duration::from_millis(600)).await;

        assert!(sink.lines().is_empty());
        let err = debouncer.push(cursor(2)).await.unwrap_err();
        assert!(matches!(err, RecorderError::PipelineClosed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn every_policy_commits_each_occurrence_in_order() {
        let sink = Arc::new(Collect::default());
        let debouncer = spawn(Coalesce::Every, &sink);

        for line in 1..=3 {
            debouncer.push(cursor(line)).await.unwrap();
        }
        debouncer.flush().await.unwrap();

        assert_eq!(sink.lines(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_the_worker() {
        let sink = Arc::new(Collect::default());
        let parent = CancellationToken::new();
        let debouncer: Debouncer<CursorOccurrence> = Debouncer::spawn(
            SessionId::new("s1").unwrap(),
            EventKind::CursorMove,
            Coalesce::Latest,
            DebounceSettings {
                quiet_period: Duration::from_millis(500),
                capacity: 8,
            },
            Arc::clone(&sink) as Arc<dyn EventSink>,
            parent.child_token(),
        );

        debouncer.push(cursor(1)).await.unwrap();
        parent.cancel();
        sleep(Duration::from_millis(600)).await;

        assert!(sink.lines().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn push_waits_for_space_when_queue_is_full() {
        let sink = Arc::new(Collect::default());
        let debouncer = Debouncer::spawn(
            SessionId::new("s1").unwrap(),
            EventKind::CursorMove,
            Coalesce::Latest,
            DebounceSettings {
                quiet_period: Duration::from_millis(500),
                capacity: 1,
            },
            Arc::clone(&sink) as Arc<dyn EventSink>,
            CancellationToken::new(),
        );

        // The worker has not run yet on this single-threaded runtime, so the
        // first push takes the only slot.
        debouncer.push(cursor(1)).await.unwrap();
        let second = debouncer.push(cursor(2));
        tokio::pin!(second);
        let polled = std::future::poll_fn(|cx| Poll::Ready(second.as_mut().poll(cx))).await;
        assert!(polled.is_pending(), "push should wait while the queue is full");

        // Yielding lets the worker drain the slot.
        second.await.unwrap();
        for line in 3..=20 {
            debouncer.push(cursor(line)).await.unwrap();
        }
        sleep(Duration::from_millis(600)).await;

        assert_eq!(sink.lines(), vec![20]);
    }
}
