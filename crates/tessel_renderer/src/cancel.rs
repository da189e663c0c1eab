//! Cooperative cancellation of render passes.
//!
//! The renderer polls a [`CancelToken`] before each row. A cancelled pass
//! stops picking up new rows; rows already in flight finish normally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared flag observed by one render pass.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Hands out one token per pass; starting a pass cancels the previous one.
#[derive(Debug, Default)]
pub struct CancelSource {
    current: Mutex<CancelToken>,
}

impl CancelSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the in-flight pass, if any, and return a token for the next one.
    pub fn begin_pass(&self) -> CancelToken {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        current.cancel();
        *current = CancelToken::new();
        current.clone()
    }

    /// Cancel the in-flight pass without starting another.
    pub fn cancel_current(&self) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}
