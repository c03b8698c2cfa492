//! # Example: graceful_stop
//!
//! Pre-emptively stops a well-behaved command without waiting for a
//! deadline.
//!
//! Shows how to:
//! - Start a command with [`CmdRunner::start`]
//! - Terminate it directly via [`CmdRunner::stop`] with a pending signal,
//!   letting the program's own INT/TERM handler exit cleanly
//!
//! ## Run
//! ```bash
//! cargo run --example graceful_stop
//! ```

use std::time::Duration;

use cmdvisor::{CancelSignal, CmdRunner};
use tokio::process::Command;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("=== graceful_stop example ===\n");

    // The script traps INT/TERM and exits 0 when asked to stop.
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(r#"trap "echo '[child] stopping'; exit 0" INT TERM; while true; do sleep 1; done"#);

    let mut runner = CmdRunner::new(cmd);
    runner.start()?;
    println!("[main] command started, letting it run for a second...");
    tokio::time::sleep(Duration::from_secs(1)).await;

    // The signal is still pending, so stop() delivers INT/TERM and waits
    // for the child to exit on its own instead of killing it.
    println!("[main] stopping gracefully...");
    let signal = CancelSignal::new();
    match runner.stop(&signal).await {
        Ok(()) => println!("[main] stopped cleanly"),
        Err(e) => println!("[main] stop ended: {e}"),
    }

    println!("[main] finished={}", runner.is_finished());
    println!("[main] exit status={:?}", runner.exit_status());

    println!("\n=== example completed ===");
    Ok(())
}
