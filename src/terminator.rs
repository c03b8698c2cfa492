//! # Pluggable graceful-then-forced shutdown strategy.
//!
//! [`Terminate`] is the seam between the runner and the termination policy:
//! given a started [`ProcHandle`], the governing [`CancelSignal`], and the
//! run's event [`Bus`], a strategy attempts shutdown and returns the
//! definitive error (or `Ok` for a clean graceful exit). [`GracefulStop`]
//! is the default; tests and callers with special needs inject their own
//! via [`CmdRunner::with_terminator`](crate::CmdRunner::with_terminator).
//!
//! ## Default algorithm
//! ```text
//! interrupt (SIGINT) ──► terminate (SIGTERM)      best-effort, errors ignored
//!        │
//!        ▼
//! signal already fired?
//!        ├─ yes ──► force-kill ──► publish ProcKilled ──► Err(signal reason)
//!        └─ no  ──► wait for natural exit ──► Ok / Err(exit status)
//! ```
//!
//! Note the branch is a **non-blocking check, not a timed grace period**:
//! the strategy decides on whether the signal is already fired at the moment
//! of invocation. A caller that wants "ask nicely for N seconds, then kill"
//! composes that window into the signal's deadline instead.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cancel::CancelSignal;
use crate::error::RunError;
use crate::events::{Bus, Event, EventKind};
use crate::process::ProcHandle;

/// Shared handle to a termination strategy.
pub type TerminateRef = Arc<dyn Terminate>;

/// # Termination strategy for a running process.
///
/// Invoked by [`CmdRunner`](crate::CmdRunner) when the cancellation signal
/// fires during `wait`, or directly via `stop`. Implementations must be safe
/// to invoke on an already-finished process: the signal-delivery step is a
/// no-op there and the wait/kill step must neither hang nor double-wait.
/// The bus is for observability only; publishing is optional and never
/// affects the outcome.
#[async_trait]
pub trait Terminate: Send + Sync + 'static {
    /// Attempts graceful shutdown, falling back to a forced kill, and
    /// returns the definitive outcome of the termination attempt.
    async fn terminate(
        &self,
        proc: &mut ProcHandle,
        signal: &CancelSignal,
        bus: &Bus,
    ) -> Result<(), RunError>;
}

/// Default strategy: interrupt, terminate, then kill if the signal has
/// already fired.
///
/// Returning the signal's *reason* from the kill branch (rather than a
/// generic kill message) is deliberate: it tells the caller "we killed it
/// because of the timeout/cancel", which a plain kill error would not.
#[derive(Clone, Copy, Debug, Default)]
pub struct GracefulStop;

#[async_trait]
impl Terminate for GracefulStop {
    async fn terminate(
        &self,
        proc: &mut ProcHandle,
        signal: &CancelSignal,
        bus: &Bus,
    ) -> Result<(), RunError> {
        // Best-effort nudge; delivery to an already-dead process is a no-op
        // and any other delivery error is not worth aborting shutdown over.
        let _ = proc.interrupt();
        let _ = proc.terminate();

        match signal.reason() {
            // The common case: we are here because the signal fired.
            Some(reason) => {
                proc.force_kill()
                    .map_err(|source| RunError::Kill { source })?;
                bus.publish(
                    Event::now(EventKind::ProcKilled)
                        .with_pid(proc.id())
                        .with_reason(reason.as_label()),
                );
                Err(reason.into())
            }
            // Defensive invocation (e.g. a direct `stop` with a pending
            // signal): let the process exit on its own.
            None => {
                let status = proc
                    .wait()
                    .await
                    .map_err(|source| RunError::Wait { source })?;
                if status.success() {
                    Ok(())
                } else {
                    Err(RunError::Exit { status })
                }
            }
        }
    }
}
