//! Cancellation propagation for a pipeline run

use crate::core::step::StepError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Caller-supplied cancellation signal threaded through every step invocation.
///
/// The executor checks the token between steps; long-running steps check it
/// inside their own polling loops. Cancelling an in-flight run still triggers
/// rollback of already-completed steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation. Idempotent; wakes every waiter.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve as soon as the token is cancelled.
    pub async fn cancelled(&self) {
        while !self.is_cancelled() {
            let notified = self.inner.notify.notified();
            // Re-check after registering so a cancel between the load and
            // the registration is not missed.
            if self.is_cancelled() {
                break;
            }
            notified.await;
        }
    }

    /// Bail out of a step with `StepError::Cancelled` if the run was cancelled.
    pub fn ensure_active(&self) -> Result<(), StepError> {
        if self.is_cancelled() {
            Err(StepError::Cancelled)
        } else {
            Ok(())
        }
    }
}
