//! # Example: run_with_timeout
//!
//! Runs a command that never finishes under a 2-second deadline.
//!
//! Shows how to:
//! - Build a [`CancelSignal`] with a deadline
//! - Drive a command with [`CmdRunner::run`]
//! - Inspect the composed outcome and the recorded exit status
//!
//! ## Run
//! ```bash
//! cargo run --example run_with_timeout
//! ```

use std::time::Duration;

use cmdvisor::{CancelSignal, CmdRunner};
use tokio::process::Command;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== run_with_timeout example ===\n");

    // Fires with a TimedOut reason after 2 seconds.
    let signal = CancelSignal::timeout(Duration::from_secs(2));

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg("while true; do sleep 1; done");

    let mut runner = CmdRunner::new(cmd);

    // Optional: watch lifecycle events (requires the "logging" feature).
    #[cfg(feature = "logging")]
    let _printer = cmdvisor::LogWriter::spawn(runner.subscribe());

    println!("[main] running command under a 2s deadline...");
    match runner.run(&signal).await {
        Ok(()) => println!("[main] clean exit"),
        Err(e) => println!("[main] run ended: {e} (label={})", e.as_label()),
    }

    println!("[main] finished={}", runner.is_finished());
    println!("[main] exit status={:?}", runner.exit_status());

    println!("\n=== example completed ===");
    Ok(())
}
