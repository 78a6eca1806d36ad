//! Cooperative cancellation for long history traversals.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use faultline_core::FaultlineError;

/// A cancellation flag with an optional deadline, checked before every
/// backend call.
///
/// Clones share the same flag.
///
/// # Examples
///
/// ```
/// use faultline_history::CancelToken;
///
/// let token = CancelToken::new();
/// let clone = token.clone();
/// assert!(token.check().is_ok());
/// clone.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    /// A token that only fires when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also fires once `timeout` has elapsed from now.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use faultline_history::CancelToken;
    ///
    /// let token = CancelToken::with_timeout(Duration::ZERO);
    /// assert!(token.is_cancelled());
    /// ```
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::default(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested or the deadline passed.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// `Err(FaultlineError::Cancelled)` once the token has fired.
    pub fn check(&self) -> Result<(), FaultlineError> {
        if self.is_cancelled() {
            Err(FaultlineError::Cancelled)
        } else {
            Ok(())
        }
    }
}
