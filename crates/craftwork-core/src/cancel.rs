//! Cooperative cancellation.
//!
//! A [`CancelFlag`] is shared between the scheduler and every capability
//! call made on behalf of one goal. Raising it never interrupts anything by
//! itself: the scheduler polls it at step boundaries, and long-running
//! capability implementations are expected to poll it too.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared, clonable cancellation flag.
///
/// Clones observe the same flag. Once raised it stays raised; the scheduler
/// hands the next goal a fresh flag instead of lowering this one.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether the flag has been raised.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
