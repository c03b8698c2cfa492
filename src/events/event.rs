//! # Lifecycle events emitted by a command run.
//!
//! [`EventKind`] classifies the points a run passes through; [`Event`]
//! carries the metadata (pid, reason, exit code) plus a wall-clock timestamp
//! and a globally monotonic sequence number for ordering.
//!
//! ## Example
//! ```
//! use cmdvisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::ProcSpawned).with_pid(4242);
//! assert_eq!(ev.kind, EventKind::ProcSpawned);
//! assert_eq!(ev.pid, Some(4242));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of run lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The child process was spawned.
    ///
    /// Sets: `pid`.
    ProcSpawned,

    /// The governing cancellation signal fired while `wait` was suspended.
    ///
    /// Sets: `reason` (the signal's reason label).
    CancelFired,

    /// Termination was requested directly via `stop`.
    ///
    /// Sets: `pid`.
    StopRequested,

    /// The terminator strategy is about to run.
    ///
    /// Sets: `pid`.
    Terminating,

    /// The forced-kill branch of the terminator ran. Delivery to a process
    /// that already finished on its own is a no-op, but the branch is still
    /// reported.
    ///
    /// Sets: `pid`, `reason` (the signal's reason label).
    ProcKilled,

    /// A terminal status was recorded for the process.
    ///
    /// Sets: `exit_code` (absent when the process died to a signal).
    ProcExited,
}

/// Run lifecycle event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// OS pid of the child, if known at emission time.
    pub pid: Option<u32>,
    /// Human-readable reason (cancellation reason label, etc.).
    pub reason: Option<Arc<str>>,
    /// Exit code, when the process exited normally.
    pub exit_code: Option<i32>,
}

impl Event {
    /// Creates an event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            pid: None,
            reason: None,
            exit_code: None,
        }
    }

    /// Attaches the child pid.
    #[inline]
    pub fn with_pid(mut self, pid: impl Into<Option<u32>>) -> Self {
        self.pid = pid.into();
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the recorded exit code.
    #[inline]
    pub fn with_exit_code(mut self, code: impl Into<Option<i32>>) -> Self {
        self.exit_code = code.into();
        self
    }
}
