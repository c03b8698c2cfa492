//! # Simple stdout event printer for debugging and demos.
//!
//! Enabled via the `logging` feature. [`LogWriter`] drains a bus receiver on
//! a spawned task and prints each event in a compact human-readable form:
//!
//! ```text
//! [spawned] pid=4242
//! [cancel-fired] reason=timed_out
//! [exited] code=0
//! ```
//!
//! Not intended for production use; subscribe to the bus directly for
//! structured logging or metrics.

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;

use crate::events::{Event, EventKind};

/// Stdout printer for run lifecycle events.
pub struct LogWriter;

impl LogWriter {
    /// Spawns a task that prints every event from the receiver until the
    /// bus is closed. Lagged gaps are skipped silently.
    pub fn spawn(mut rx: Receiver<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => Self::print(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    fn print(ev: &Event) {
        match ev.kind {
            EventKind::ProcSpawned => {
                println!("[spawned] pid={:?}", ev.pid);
            }
            EventKind::CancelFired => {
                println!("[cancel-fired] reason={:?}", ev.reason);
            }
            EventKind::StopRequested => {
                println!("[stop-requested] pid={:?}", ev.pid);
            }
            EventKind::Terminating => {
                println!("[terminating] pid={:?}", ev.pid);
            }
            EventKind::ProcKilled => {
                println!("[killed] pid={:?} reason={:?}", ev.pid, ev.reason);
            }
            EventKind::ProcExited => {
                println!("[exited] code={:?}", ev.exit_code);
            }
        }
    }
}
