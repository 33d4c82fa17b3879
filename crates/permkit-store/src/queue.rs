//! Bounded, ordered save queue in front of a [`Storage`] backend.
//!
//! Mutations submit the enduring collection they just published. A single
//! worker task drains the queue in FIFO order, so saves for one holder land
//! in the order their mutations happened. Failures never reach the mutation
//! that caused them; they are logged and sent on the failure channel.
//!
//! When the queue is full the [`OverflowPolicy`] decides, deterministically,
//! what happens: `Block` waits for capacity, `Reject` reports
//! [`StorageFailure::QueueFull`] and returns [`SaveStatus::Rejected`].
//! Capacity is taken up front with [`PersistenceQueue::reserve`]; the
//! resulting [`SaveSlot`] sends without waiting.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use permkit_core::{HolderId, Node};

use crate::error::{Result, StoreError};
use crate::traits::{SaveOutcome, Storage};

/// What to do with a save request when the queue is saturated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Wait for capacity.
    Block,
    /// Refuse the request and report an overflow.
    Reject,
}

/// Configuration for the persistence queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Maximum number of queued save requests.
    pub queue_capacity: usize,
    /// Behaviour when the queue is full.
    pub overflow: OverflowPolicy,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            overflow: OverflowPolicy::Block,
        }
    }
}

/// What happened to a save request at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// Accepted by the queue.
    Queued,
    /// Refused; a [`StorageFailure`] was reported.
    Rejected,
    /// Nothing to save (transient-only change).
    Skipped,
}

/// An asynchronously reported persistence problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageFailure {
    /// The backend failed to save the holder.
    SaveFailed { holder: HolderId, error: String },
    /// The queue was full and the overflow policy is `Reject`.
    QueueFull { holder: HolderId },
}

impl StorageFailure {
    pub fn holder(&self) -> &HolderId {
        match self {
            StorageFailure::SaveFailed { holder, .. } | StorageFailure::QueueFull { holder } => {
                holder
            }
        }
    }
}

/// Receiving end of the failure channel.
pub type FailureReceiver = mpsc::UnboundedReceiver<StorageFailure>;

enum Command {
    Save {
        holder: HolderId,
        nodes: Arc<Vec<Node>>,
    },
    Flush(oneshot::Sender<()>),
}

/// Handle to the save queue. Cheap to clone.
#[derive(Clone)]
pub struct PersistenceQueue {
    tx: mpsc::Sender<Command>,
    failures: mpsc::UnboundedSender<StorageFailure>,
    overflow: OverflowPolicy,
}

impl PersistenceQueue {
    /// Spawn the worker task and return the queue plus its failure channel.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(storage: Arc<dyn Storage>, config: PersistenceConfig) -> (Self, FailureReceiver) {
        let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
        let (failures, failure_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_worker(storage, rx, failures.clone()));

        let queue = Self {
            tx,
            failures,
            overflow: config.overflow,
        };
        (queue, failure_rx)
    }

    /// Reserve room for one save of `holder`.
    ///
    /// Under `Block` this waits for capacity; under `Reject` it never waits.
    /// Nothing is queued until [`SaveSlot::send`] is called, and dropping the
    /// slot gives the capacity back. Callers reserve before changing
    /// anything so that a cancelled wait leaves no unsaved change behind.
    pub async fn reserve(&self, holder: &HolderId) -> SaveSlot {
        let permit = match self.overflow {
            OverflowPolicy::Block => self
                .tx
                .clone()
                .reserve_owned()
                .await
                .map_err(|_| SlotError::Closed),
            OverflowPolicy::Reject => self.tx.clone().try_reserve_owned().map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => SlotError::Full,
                mpsc::error::TrySendError::Closed(_) => SlotError::Closed,
            }),
        };
        SaveSlot {
            holder: holder.clone(),
            permit,
            failures: self.failures.clone(),
        }
    }

    /// Queue a save of `holder`'s enduring collection.
    pub async fn submit(&self, holder: HolderId, nodes: Arc<Vec<Node>>) -> SaveStatus {
        self.reserve(&holder).await.send(nodes)
    }

    /// Wait until every save submitted before this call has been attempted.
    pub async fn flush(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.tx
            .send(Command::Flush(done))
            .await
            .map_err(|_| StoreError::QueueClosed)?;
        wait.await.map_err(|_| StoreError::QueueClosed)
    }
}

enum SlotError {
    Full,
    Closed,
}

/// Capacity for one save request, taken by [`PersistenceQueue::reserve`].
///
/// Sending never waits, so it can follow an in-memory publication directly.
pub struct SaveSlot {
    holder: HolderId,
    permit: std::result::Result<mpsc::OwnedPermit<Command>, SlotError>,
    failures: mpsc::UnboundedSender<StorageFailure>,
}

impl SaveSlot {
    /// Whether the reservation got capacity.
    pub fn is_reserved(&self) -> bool {
        self.permit.is_ok()
    }

    /// Queue the save, or report why it could not be queued.
    pub fn send(self, nodes: Arc<Vec<Node>>) -> SaveStatus {
        let holder = self.holder;
        match self.permit {
            Ok(permit) => {
                permit.send(Command::Save {
                    holder: holder.clone(),
                    nodes,
                });
                tracing::debug!(holder = %holder, "save queued");
                SaveStatus::Queued
            }
            Err(SlotError::Full) => {
                tracing::warn!(holder = %holder, "persistence queue full, save rejected");
                report(&self.failures, StorageFailure::QueueFull { holder });
                SaveStatus::Rejected
            }
            Err(SlotError::Closed) => {
                tracing::warn!(holder = %holder, "persistence queue closed, save rejected");
                report(
                    &self.failures,
                    StorageFailure::SaveFailed {
                        holder,
                        error: StoreError::QueueClosed.to_string(),
                    },
                );
                SaveStatus::Rejected
            }
        }
    }
}

fn report(failures: &mpsc::UnboundedSender<StorageFailure>, failure: StorageFailure) {
    if failures.send(failure).is_err() {
        tracing::warn!("storage failure dropped: no failure receiver");
    }
}

async fn run_worker(
    storage: Arc<dyn Storage>,
    mut rx: mpsc::Receiver<Command>,
    failures: mpsc::UnboundedSender<StorageFailure>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Save { holder, nodes } => match storage.save(&holder, &nodes).await {
                Ok(SaveOutcome::Written) => {
                    tracing::debug!(holder = %holder, nodes = nodes.len(), "holder saved");
                }
                Ok(SaveOutcome::Unchanged) => {
                    tracing::debug!(holder = %holder, "holder unchanged, save skipped");
                }
                Err(e) => {
                    tracing::warn!(holder = %holder, error = %e, "failed to save holder");
                    let failure = StorageFailure::SaveFailed {
                        holder,
                        error: e.to_string(),
                    };
                    report(&failures, failure);
                }
            },
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}
