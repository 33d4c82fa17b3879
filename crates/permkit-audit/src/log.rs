//! The asynchronous audit log.
//!
//! [`AuditLog::record`] stamps an entry and enqueues it on an unbounded
//! channel; it never waits on the sink. A single worker delivers entries to
//! the [`AuditSink`] in sequence order. Delivery failures are logged and sent,
//! together with the entry, on the failure channel so nothing is dropped
//! without a trace.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use permkit_core::{now_millis, HolderId};

use crate::entry::{ActionRecord, AuditEntry};
use crate::error::{AuditError, Result};
use crate::sink::AuditSink;

/// Configuration for the audit log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Also log every delivered entry at debug level.
    pub echo_to_tracing: bool,
}

/// An entry the sink failed to store.
#[derive(Debug, Clone)]
pub struct AuditFailure {
    pub entry: Arc<AuditEntry>,
    pub error: AuditError,
}

/// Receiving end of the audit failure channel.
pub type AuditFailureReceiver = mpsc::UnboundedReceiver<AuditFailure>;

/// Source of Unix-millisecond timestamps.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

enum Command {
    Deliver(Arc<AuditEntry>),
    Flush(oneshot::Sender<()>),
}

struct Sequencer {
    next_seq: u64,
    last_timestamp: HashMap<HolderId, i64>,
}

/// Ordered audit trail with asynchronous delivery.
pub struct AuditLog {
    tx: mpsc::UnboundedSender<Command>,
    sequencer: Mutex<Sequencer>,
    clock: Clock,
}

impl AuditLog {
    /// Spawn the delivery worker using the system clock.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(sink: Arc<dyn AuditSink>, config: AuditConfig) -> (Self, AuditFailureReceiver) {
        Self::spawn_with_clock(sink, config, Arc::new(now_millis))
    }

    /// Spawn the delivery worker with a custom clock.
    pub fn spawn_with_clock(
        sink: Arc<dyn AuditSink>,
        config: AuditConfig,
        clock: Clock,
    ) -> (Self, AuditFailureReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (failures, failure_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_worker(sink, rx, failures, config.echo_to_tracing));

        let log = Self {
            tx,
            sequencer: Mutex::new(Sequencer {
                next_seq: 1,
                last_timestamp: HashMap::new(),
            }),
            clock,
        };
        (log, failure_rx)
    }

    /// Stamp `action` and hand it to the sink.
    ///
    /// Sequence assignment and enqueueing happen under one lock, so channel
    /// order always matches sequence order.
    pub fn record(&self, action: ActionRecord) -> Result<Arc<AuditEntry>> {
        let mut sequencer = self
            .sequencer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let now = (self.clock)();
        let timestamp = match sequencer.last_timestamp.get(action.holder_id()) {
            Some(&last) => now.max(last),
            None => now,
        };

        let seq = sequencer.next_seq;
        let holder = action.holder_id().clone();
        let entry = Arc::new(action.stamp(seq, timestamp));

        self.tx
            .send(Command::Deliver(entry.clone()))
            .map_err(|_| AuditError::Closed)?;

        sequencer.next_seq += 1;
        sequencer.last_timestamp.insert(holder, timestamp);
        Ok(entry)
    }

    /// Number of entries recorded so far.
    pub fn recorded(&self) -> u64 {
        self.sequencer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_seq
            - 1
    }

    /// Wait until every entry recorded before this call has been delivered
    /// or reported as failed.
    pub async fn flush(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.tx
            .send(Command::Flush(done))
            .map_err(|_| AuditError::Closed)?;
        wait.await.map_err(|_| AuditError::Closed)
    }
}

async fn run_worker(
    sink: Arc<dyn AuditSink>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    failures: mpsc::UnboundedSender<AuditFailure>,
    echo: bool,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Deliver(entry) => match sink.submit(&entry).await {
                Ok(()) => {
                    if echo {
                        tracing::debug!(seq = entry.seq(), "{}", entry.describe());
                    }
                }
                Err(error) => {
                    tracing::warn!(seq = entry.seq(), error = %error, "failed to deliver audit entry");
                    if failures.send(AuditFailure { entry, error }).is_err() {
                        tracing::warn!("audit failure dropped: no failure receiver");
                    }
                }
            },
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
