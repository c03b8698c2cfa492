//! # One-shot, reason-carrying cancellation signal.
//!
//! [`CancelSignal`] wraps a [`CancellationToken`] and attaches a
//! [`CancelReason`] so observers can distinguish "deadline elapsed" from
//! "explicitly cancelled" once the signal has fired.
//!
//! ## Rules
//! - **One-shot**: the signal fires at most once and never resets.
//! - **Broadcast**: clones share the same underlying token; any number of
//!   observers may check or await it.
//! - **Reason-before-done**: the reason slot is written before the token is
//!   cancelled, so an observer that sees `is_cancelled() == true` also sees
//!   the reason.
//!
//! ## Example
//! ```
//! use cmdvisor::{CancelReason, CancelSignal};
//!
//! let signal = CancelSignal::new();
//! assert!(!signal.is_cancelled());
//! assert_eq!(signal.reason(), None);
//!
//! signal.cancel();
//! assert!(signal.is_cancelled());
//! assert_eq!(signal.reason(), Some(CancelReason::Canceled));
//! ```

use std::io;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::RunError;

/// Why a [`CancelSignal`] fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelReason {
    /// The deadline attached to the signal elapsed.
    TimedOut {
        /// The deadline that elapsed.
        after: Duration,
    },
    /// The signal was cancelled explicitly (programmatic or OS shutdown).
    Canceled,
}

impl CancelReason {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CancelReason::TimedOut { .. } => "timed_out",
            CancelReason::Canceled => "canceled",
        }
    }
}

/// One-shot cancellation signal with an attached reason.
///
/// Cheap to clone; all clones observe the same firing. The core only ever
/// *observes* the signal — firing it (directly, via a deadline, or via an OS
/// shutdown signal) is the caller's choice at construction time.
#[derive(Clone, Debug, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    reason: Arc<OnceLock<CancelReason>>,
}

impl CancelSignal {
    /// Creates an inert signal that only fires via [`CancelSignal::cancel`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a signal that fires with [`CancelReason::TimedOut`] once
    /// `after` elapses.
    ///
    /// Must be called within a Tokio runtime; the deadline is driven by a
    /// spawned timer task. The signal can still be cancelled explicitly
    /// before the deadline, in which case the explicit reason wins.
    pub fn timeout(after: Duration) -> Self {
        let signal = Self::new();
        let armed = signal.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            armed.fire(CancelReason::TimedOut { after });
        });
        signal
    }

    /// Creates a signal that fires with [`CancelReason::Canceled`] when the
    /// current process receives a shutdown signal.
    ///
    /// On Unix this listens for SIGINT, SIGTERM and SIGQUIT (with
    /// [`tokio::signal::ctrl_c`] as a fallback); elsewhere only Ctrl-C is
    /// awaited. Must be called within a Tokio runtime.
    pub fn on_shutdown_signal() -> Self {
        let signal = Self::new();
        let armed = signal.clone();
        tokio::spawn(async move {
            if wait_for_shutdown().await.is_ok() {
                armed.fire(CancelReason::Canceled);
            }
        });
        signal
    }

    /// Fires the signal with [`CancelReason::Canceled`].
    ///
    /// Idempotent: repeated calls (or a call racing a deadline) keep the
    /// first recorded reason.
    pub fn cancel(&self) {
        self.fire(CancelReason::Canceled);
    }

    /// Returns `true` once the signal has fired. Never resets.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the signal fires; completes immediately if it already
    /// has.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Returns the firing reason, or `None` while the signal is pending.
    pub fn reason(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            self.reason.get().copied()
        } else {
            None
        }
    }

    /// Returns the firing reason in its error form, or `None` while the
    /// signal is pending.
    pub fn err(&self) -> Option<RunError> {
        self.reason().map(RunError::from)
    }

    fn fire(&self, reason: CancelReason) {
        // Reason first: observers woken by the token must see it.
        let _ = self.reason.set(reason);
        self.token.cancel();
    }
}

#[cfg(unix)]
async fn wait_for_shutdown() -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}
