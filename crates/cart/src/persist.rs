//! Background writer that keeps storage in sync with the in-memory cart.
//!
//! Every mutation publishes a new revision of the cart on a `watch` channel.
//! A single spawned task writes whatever revision is newest when it gets to
//! run, so writes never overlap and never land out of order. Revisions
//! published while a write is in flight collapse into one follow-up write of
//! the latest state.
//!
//! Write results are published on a second `watch` channel as
//! [`PersistStatus`]. Callers that need durability (shutdown, tests) await
//! [`PersistHandle::flush`].

use std::sync::Arc;

use go_marketplace_core::Cart;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, instrument, warn};

use crate::codec;
use crate::config::PersistConfig;
use crate::storage::KeyValueStore;

/// Errors reported by [`PersistHandle::flush`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistError {
    /// Every write attempt for the revision failed.
    #[error("Failed to persist cart revision {revision} after {attempts} attempt(s): {message}")]
    WriteFailed {
        /// Revision that could not be written.
        revision: u64,
        /// Attempts made.
        attempts: u32,
        /// Last storage error.
        message: String,
    },

    /// The writer task is gone.
    #[error("Cart writer task stopped")]
    WriterStopped,
}

/// Outcome of the most recent write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Nothing has been written since the cart was loaded.
    Idle,
    /// The revision is in storage.
    Written,
    /// The revision failed and a newer one was already queued.
    Superseded,
    /// All attempts for the revision failed.
    Failed {
        /// Attempts made.
        attempts: u32,
        /// Last error message.
        message: String,
    },
}

/// Latest write result published by the writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistStatus {
    /// Revision the outcome refers to. Revision 0 is the loaded state.
    pub revision: u64,
    /// What happened to it.
    pub outcome: PersistOutcome,
}

impl PersistStatus {
    const fn loaded() -> Self {
        Self {
            revision: 0,
            outcome: PersistOutcome::Idle,
        }
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    revision: u64,
    cart: Arc<Cart>,
}

/// Owner side of the writer task.
///
/// Dropping the handle closes the snapshot channel; the task writes any
/// revision it has not seen yet and then exits.
#[derive(Debug)]
pub struct PersistHandle {
    snapshots: watch::Sender<Snapshot>,
    status: watch::Receiver<PersistStatus>,
    revision: u64,
}

impl PersistHandle {
    /// Spawn the writer task for `key`.
    ///
    /// `initial` is the state already in storage and is not written again.
    /// Must be called from within a Tokio runtime.
    pub fn spawn<S>(store: Arc<S>, key: String, config: PersistConfig, initial: Arc<Cart>) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let (snapshots, snapshot_rx) = watch::channel(Snapshot {
            revision: 0,
            cart: initial,
        });
        let (status_tx, status) = watch::channel(PersistStatus::loaded());

        tokio::spawn(run_writer(store, key, config, snapshot_rx, status_tx));

        Self {
            snapshots,
            status,
            revision: 0,
        }
    }

    /// Queue `cart` for writing and return its revision.
    ///
    /// Never blocks; an older queued revision that has not started writing
    /// is replaced.
    pub fn schedule(&mut self, cart: Arc<Cart>) -> u64 {
        self.revision += 1;
        self.snapshots.send_replace(Snapshot {
            revision: self.revision,
            cart,
        });
        self.revision
    }

    /// Result of the most recent write.
    #[must_use]
    pub fn status(&self) -> PersistStatus {
        self.status.borrow().clone()
    }

    /// Subscribe to write results.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PersistStatus> {
        self.status.clone()
    }

    /// Wait until the latest scheduled revision has been written.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::WriteFailed` if the writer gave up on that
    /// revision, or `PersistError::WriterStopped` if the task is gone.
    pub async fn flush(&self) -> Result<(), PersistError> {
        let target = self.revision;
        let mut status = self.status.clone();
        let settled = status
            .wait_for(|status| status.revision >= target)
            .await
            .map_err(|_| PersistError::WriterStopped)?
            .clone();

        match settled.outcome {
            PersistOutcome::Failed { attempts, message } => Err(PersistError::WriteFailed {
                revision: settled.revision,
                attempts,
                message,
            }),
            PersistOutcome::Idle | PersistOutcome::Written | PersistOutcome::Superseded => Ok(()),
        }
    }
}

async fn run_writer<S>(
    store: Arc<S>,
    key: String,
    config: PersistConfig,
    mut snapshots: watch::Receiver<Snapshot>,
    status: watch::Sender<PersistStatus>,
) where
    S: KeyValueStore,
{
    debug!(key = %key, "Cart writer started");

    while snapshots.changed().await.is_ok() {
        let snapshot = snapshots.borrow_and_update().clone();
        let outcome = write_snapshot(store.as_ref(), &key, config, &snapshot, &snapshots).await;
        status.send_replace(PersistStatus {
            revision: snapshot.revision,
            outcome,
        });
    }

    debug!(key = %key, "Cart writer stopped");
}

#[instrument(skip_all, fields(revision = snapshot.revision, items = snapshot.cart.len()))]
async fn write_snapshot<S>(
    store: &S,
    key: &str,
    config: PersistConfig,
    snapshot: &Snapshot,
    snapshots: &watch::Receiver<Snapshot>,
) -> PersistOutcome
where
    S: KeyValueStore,
{
    let bytes = match codec::encode(&snapshot.cart) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = %e, "Failed to encode cart");
            return PersistOutcome::Failed {
                attempts: 0,
                message: e.to_string(),
            };
        }
    };

    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.initial_backoff;
    let mut attempt = 1;

    loop {
        match store.set(key, &bytes).await {
            Ok(()) => {
                debug!(attempt, bytes = bytes.len(), "Persisted cart");
                return PersistOutcome::Written;
            }
            Err(e) if snapshots.has_changed().unwrap_or(false) => {
                warn!(error = %e, attempt, "Cart write failed, newer revision pending");
                return PersistOutcome::Superseded;
            }
            Err(e) if attempt < max_attempts => {
                warn!(error = %e, attempt, retry_in_ms = delay.as_millis(), "Cart write failed, retrying");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => {
                error!(error = %e, attempts = attempt, "Giving up on cart write");
                return PersistOutcome::Failed {
                    attempts: attempt,
                    message: e.to_string(),
                };
            }
        }
    }
}
