//! Injectable waiting primitive.
//!
//! Every suspension in the dipzy clients (batch pauses, retry backoff,
//! polling intervals) goes through a [`Clock`], so waits can be cancelled in
//! production and observed without real time passing in tests.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use tokio::sync::watch;

use crate::errors::{ApiError, Result};

/// Something that can wait for a duration.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Wait for `duration`. Returns [`ApiError::Cancelled`] if the wait was cut short.
    async fn sleep(&self, duration: Duration) -> Result<()>;
}

/// Cloneable cancellation flag.
///
/// Once cancelled it stays cancelled; every clone observes the same state.
#[derive(Clone, Debug)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called on any clone.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender is owned by `self`, so the channel cannot close under us.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Real clock backed by `tokio::time::sleep`.
#[derive(Clone, Debug, Default)]
pub struct SystemClock {
    cancel: Option<CancelToken>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock whose waits end early with `Cancelled` when `token` fires.
    pub fn cancellable(token: CancelToken) -> Self {
        Self {
            cancel: Some(token),
        }
    }
}

#[async_trait]
impl Clock for SystemClock {
    async fn sleep(&self, duration: Duration) -> Result<()> {
        let Some(token) = &self.cancel else {
            tokio::time::sleep(duration).await;
            return Ok(());
        };

        if token.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = token.cancelled() => Err(ApiError::Cancelled),
        }
    }
}

/// Clock that never waits and remembers every requested duration.
///
/// Useful for asserting how many pauses a batch run performed.
#[derive(Debug, Default)]
pub struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
    cancel: Option<CancelToken>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A recording clock that fails every wait once `token` is cancelled.
    pub fn cancellable(token: CancelToken) -> Self {
        Self {
            sleeps: Mutex::new(Vec::new()),
            cancel: Some(token),
        }
    }

    /// All durations requested so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.lock_sleeps().clone()
    }

    pub fn sleep_count(&self) -> usize {
        self.lock_sleeps().len()
    }

    fn lock_sleeps(&self) -> MutexGuard<'_, Vec<Duration>> {
        self.sleeps.lock().unwrap_or_else(|poisoned| {
            warn!("Recording clock mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(ApiError::Cancelled);
        }
        self.lock_sleeps().push(duration);
        Ok(())
    }
}
