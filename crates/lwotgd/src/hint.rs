//! Best-effort hint delivery.
//!
//! Hints travel over a bounded [`mpsc`] channel. Senders never wait: a full
//! or closed channel drops the hint and bumps a counter, so a slow consumer
//! cannot stall configuration processing.

use lwotg_types::{Hint, HintGroup};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

/// Default capacity of the hint channel.
pub const DEFAULT_HINT_CAPACITY: usize = 64;

/// Creates a bounded hint channel.
pub fn hint_channel(capacity: usize) -> (mpsc::Sender<Hint>, mpsc::Receiver<Hint>) {
    mpsc::channel(capacity.max(1))
}

/// Shared, swappable sending side of the hint channel.
///
/// Cloning yields a handle to the same slot, so a sender installed on the
/// server is also seen by the handlers constructed from it.
#[derive(Debug, Clone, Default)]
pub struct HintSink {
    tx: Arc<RwLock<Option<mpsc::Sender<Hint>>>>,
    dropped: Arc<AtomicU64>,
}

impl HintSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `tx`, replacing any previous sender.
    pub fn set(&self, tx: mpsc::Sender<Hint>) {
        *self.tx.write() = Some(tx);
    }

    /// Returns true if a sender has been installed.
    pub fn is_connected(&self) -> bool {
        self.tx.read().is_some()
    }

    /// Enqueues `hint` without waiting. Returns true if it was accepted.
    pub fn send(&self, hint: Hint) -> bool {
        let guard = self.tx.read();
        let Some(tx) = guard.as_ref() else {
            return false;
        };

        match tx.try_send(hint) {
            Ok(()) => true,
            Err(TrySendError::Full(hint)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!(group = %hint.group, key = %hint.key, "Hint channel full, dropping hint");
                false
            }
            Err(TrySendError::Closed(hint)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                trace!(group = %hint.group, key = %hint.key, "Hint channel closed, dropping hint");
                false
            }
        }
    }

    /// Number of hints dropped because the channel was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Spawns a consumer that logs every hint until all senders are gone.
pub fn spawn_hint_logger(mut rx: mpsc::Receiver<Hint>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(hint) = rx.recv().await {
            if hint.is_group(HintGroup::Meta) {
                debug!(group = %hint.group, key = %hint.key, value = %hint.value, "hint");
            } else {
                info!(group = %hint.group, key = %hint.key, value = %hint.value, "hint");
            }
        }
        debug!("Hint channel closed, logger exiting");
    })
}
