//! Error types returned by command runs.
//!
//! Everything funnels into a single [`RunError`] enum so a caller always
//! receives exactly one error value (or `Ok`) per run. The variants mirror
//! the run outcome taxonomy:
//!
//! - [`RunError::Spawn`] — the OS could not launch the program; fatal, no
//!   termination logic runs.
//! - [`RunError::Exit`] — the process ran and exited with a non-zero or
//!   abnormal status; surfaced verbatim, never retried.
//! - [`RunError::TimedOut`] / [`RunError::Canceled`] — the governing
//!   [`CancelSignal`](crate::CancelSignal)'s reason, surfaced when
//!   termination was driven by the signal.
//! - [`RunError::Kill`] / [`RunError::Wait`] — genuine OS failures while
//!   force-killing or reaping the process. Best-effort signal delivery to an
//!   already-finished process is *not* represented here; it is a no-op.
//!
//! The helpers (`as_label`, `as_message`) provide stable snake_case labels
//! for logging/metrics consumers.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use crate::cancel::CancelReason;

/// # Errors produced by a supervised command run.
///
/// One value of this type (or `Ok(())`) is the complete outcome of a run;
/// nothing is logged or retried internally.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunError {
    /// The OS could not launch the program (bad path, permissions, ...).
    #[error("failed to spawn command: {source}")]
    Spawn {
        /// The underlying spawn error.
        #[source]
        source: io::Error,
    },

    /// `start` was called on a runner that already holds a live process.
    #[error("command already started")]
    AlreadyStarted,

    /// `wait`/`stop` was called before a successful `start`.
    #[error("command was never started")]
    NotStarted,

    /// The process ran and exited with a non-zero or abnormal status.
    #[error("command failed: {status}")]
    Exit {
        /// The recorded terminal status.
        status: ExitStatus,
    },

    /// The cancellation deadline elapsed and the run was terminated.
    #[error("timed out after {after:?}")]
    TimedOut {
        /// The deadline that elapsed.
        after: Duration,
    },

    /// The run was explicitly cancelled.
    #[error("run canceled")]
    Canceled,

    /// Force-killing the process failed. Killing an already-finished
    /// process is a no-op, not this error.
    #[error("failed to kill process: {source}")]
    Kill {
        /// The underlying kill error.
        #[source]
        source: io::Error,
    },

    /// The OS-level wait on the process failed.
    #[error("failed to wait on process: {source}")]
    Wait {
        /// The underlying wait error.
        #[source]
        source: io::Error,
    },
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cmdvisor::RunError;
    ///
    /// assert_eq!(RunError::Canceled.as_label(), "run_canceled");
    /// assert_eq!(RunError::NotStarted.as_label(), "run_not_started");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::Spawn { .. } => "run_spawn_failed",
            RunError::AlreadyStarted => "run_already_started",
            RunError::NotStarted => "run_not_started",
            RunError::Exit { .. } => "run_exit_status",
            RunError::TimedOut { .. } => "run_timed_out",
            RunError::Canceled => "run_canceled",
            RunError::Kill { .. } => "run_kill_failed",
            RunError::Wait { .. } => "run_wait_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RunError::Spawn { source } => format!("spawn failed: {source}"),
            RunError::AlreadyStarted => "already started".to_string(),
            RunError::NotStarted => "never started".to_string(),
            RunError::Exit { status } => format!("exited: {status}"),
            RunError::TimedOut { after } => format!("timed out after {after:?}"),
            RunError::Canceled => "canceled".to_string(),
            RunError::Kill { source } => format!("kill failed: {source}"),
            RunError::Wait { source } => format!("wait failed: {source}"),
        }
    }

    /// Returns the process exit code, if this error carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RunError::Exit { status } => status.code(),
            _ => None,
        }
    }

    /// Indicates whether the error was caused by the cancellation signal
    /// rather than by the process itself.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use cmdvisor::RunError;
    ///
    /// let err = RunError::TimedOut { after: Duration::from_secs(1) };
    /// assert!(err.is_cancellation());
    /// assert!(!RunError::NotStarted.is_cancellation());
    /// ```
    pub fn is_cancellation(&self) -> bool {
        matches!(self, RunError::TimedOut { .. } | RunError::Canceled)
    }
}

impl From<CancelReason> for RunError {
    /// Maps a fired signal's reason to its error form.
    fn from(reason: CancelReason) -> Self {
        match reason {
            CancelReason::TimedOut { after } => RunError::TimedOut { after },
            CancelReason::Canceled => RunError::Canceled,
        }
    }
}
