//! # cmdvisor
//!
//! **cmdvisor** runs external commands under context-style cancellation:
//! start a child process, suspend on a one-shot cancellation signal, and
//! when the signal fires attempt graceful termination (interrupt, then
//! terminate) before escalating to a forced kill — always returning exactly
//! one definitive outcome to the caller.
//!
//! ## Architecture
//! ```text
//!     caller assembles                caller constructs
//!   ┌────────────────────┐        ┌──────────────────────┐
//!   │ tokio::process::   │        │     CancelSignal     │
//!   │      Command       │        │ (timeout / explicit /│
//!   └─────────┬──────────┘        │     OS shutdown)     │
//!             │                   └──────────┬───────────┘
//!             ▼                              │
//!   ┌───────────────────────────────────────────────────────┐
//!   │  CmdRunner (one run, one outcome)                     │
//!   │   start() ──► ProcHandle (spawned child)              │
//!   │   wait()  ──► suspend on signal ──► Terminate ──┐     │
//!   │   stop()  ──────────────────────────────────────┤     │
//!   │                                                 ▼     │
//!   │                              GracefulStop (default)   │
//!   │                              SIGINT ► SIGTERM ► kill  │
//!   └───────────────┬───────────────────────────────────────┘
//!                   ▼
//!        Bus ──► lifecycle Events (spawned / cancel-fired / terminating /
//!                                  killed / exited)
//! ```
//!
//! ## Outcome composition
//! A run returns `Ok(())` or one [`RunError`], composed in priority order:
//! the terminator's error, then the process's exit-status error, then the
//! signal's reason. A process that exits cleanly while the signal is still
//! pending is not observed until the signal fires, and the outcome then
//! carries the signal's reason — `wait` blocks solely on the signal, by
//! design (see [`CmdRunner::wait`]).
//!
//! ## Grace periods
//! The default [`GracefulStop`] strategy does not own a grace timer: it
//! checks whether the signal has *already* fired at the moment it runs and
//! kills immediately if so. Compose "ask nicely, then kill" windows into the
//! [`CancelSignal`] deadline at the call site.
//!
//! ## Example
//! ```no_run
//! use std::time::Duration;
//! use cmdvisor::{CancelSignal, CmdRunner};
//! use tokio::process::Command;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     // Kill the command if it is still running after 2 seconds.
//!     let signal = CancelSignal::timeout(Duration::from_secs(2));
//!
//!     let mut cmd = Command::new("sh");
//!     cmd.arg("-c").arg("while true; do sleep 1; done");
//!
//!     let mut runner = CmdRunner::new(cmd);
//!     if let Err(e) = runner.run(&signal).await {
//!         eprintln!("run ended: {e}");
//!     }
//! }
//! ```
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.

mod cancel;
mod error;
mod events;
mod process;
mod runner;
mod terminator;

#[cfg(feature = "logging")]
mod logwriter;

pub use cancel::{CancelReason, CancelSignal};
pub use error::RunError;
pub use events::{Bus, Event, EventKind};
pub use process::ProcHandle;
pub use runner::CmdRunner;
pub use terminator::{GracefulStop, Terminate, TerminateRef};

#[cfg(feature = "logging")]
pub use logwriter::LogWriter;
