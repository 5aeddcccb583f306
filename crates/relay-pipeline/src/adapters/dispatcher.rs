//! # Event Dispatcher
//!
//! Decouples the relay path from the event sink.
//!
//! ```text
//! relay task ──try_send──▶ [bounded queue] ──▶ worker ──record──▶ EventSink
//! ```
//!
//! `dispatch` never awaits. A full queue drops the event and counts it; a
//! sink error is logged and counted. Neither reaches the caller.

use crate::domain::DispatchCounters;
use crate::ports::EventSink;
use parking_lot::Mutex;
use shared_types::DetectionEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default queue depth between the relay and the sink worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    dropped: AtomicU64,
    persisted: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DispatchCounters {
        DispatchCounters {
            dispatched: self.dispatched.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Fire-and-forget front end of an [`EventSink`].
pub struct EventDispatcher {
    sender: mpsc::Sender<DetectionEvent>,
    counters: Arc<Counters>,
    shutdown: Mutex<Option<oneshot::Sender<()>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl EventDispatcher {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(sink: Arc<dyn EventSink>, queue_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let counters = Arc::new(Counters::default());

        let worker = tokio::spawn(run_worker(receiver, sink, counters.clone(), shutdown_rx));

        Self {
            sender,
            counters,
            shutdown: Mutex::new(Some(shutdown_tx)),
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Queue `event` for the sink. Returns false if it was dropped.
    pub fn dispatch(&self, event: DetectionEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => {
                self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(kind = %event.kind, "Event queue full, detection event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(kind = %event.kind, "Event dispatcher closed, detection event dropped");
                false
            }
        }
    }

    pub fn counters(&self) -> DispatchCounters {
        self.counters.snapshot()
    }

    /// Stop accepting events and wait until every queued event has reached
    /// the sink. Idempotent.
    pub async fn shutdown(&self) {
        if let Some(signal) = self.shutdown.lock().take() {
            let _ = signal.send(());
        }
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "Event dispatcher worker ended abnormally");
            }
        }
    }
}

async fn run_worker(
    mut receiver: mpsc::Receiver<DetectionEvent>,
    sink: Arc<dyn EventSink>,
    counters: Arc<Counters>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                receiver.close();
                break;
            }
            next = receiver.recv() => match next {
                Some(event) => persist(sink.as_ref(), &counters, event).await,
                None => return,
            },
        }
    }

    let mut drained = 0usize;
    while let Some(event) = receiver.recv().await {
        persist(sink.as_ref(), &counters, event).await;
        drained += 1;
    }
    info!(drained, "Event dispatcher drained");
}

async fn persist(sink: &dyn EventSink, counters: &Counters, event: DetectionEvent) {
    let kind = event.kind;
    match sink.record(event).await {
        Ok(()) => {
            counters.persisted.fetch_add(1, Ordering::Relaxed);
            debug!(kind = %kind, "Detection event persisted");
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(kind = %kind, error = %e, "Failed to persist detection event");
        }
    }
}
