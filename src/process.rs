//! # Process handle with guarded terminal wait.
//!
//! [`ProcHandle`] wraps a spawned [`tokio::process::Child`] and adds the two
//! things termination needs on top of the raw child:
//!
//! - **Graceful signal delivery**: [`ProcHandle::interrupt`] and
//!   [`ProcHandle::terminate`] deliver SIGINT/SIGTERM to the child pid on
//!   Unix. Signaling a process that has already finished is a no-op, never
//!   an error.
//! - **Exactly-once terminal wait**: the first completed
//!   [`ProcHandle::wait`] records the exit status; every later call returns
//!   the recorded status immediately. Concurrent or repeated stop/wait paths
//!   therefore cannot double-wait the underlying child.
//!
//! The handle is exclusively driven by one owner; it is never `Clone`.

use std::io;
use std::process::ExitStatus;

use tokio::process::Child;

/// A spawned child process plus its recorded terminal status.
///
/// Finished state is terminal: once [`ProcHandle::is_finished`] returns
/// `true` it stays `true`, and the recorded [`ExitStatus`] never changes.
#[derive(Debug)]
pub struct ProcHandle {
    child: Child,
    status: Option<ExitStatus>,
}

impl ProcHandle {
    /// Wraps an already-spawned child.
    pub fn new(child: Child) -> Self {
        Self {
            child,
            status: None,
        }
    }

    /// Returns the OS pid while the child is running, `None` after it has
    /// been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Sends an interrupt-style signal (SIGINT on Unix).
    ///
    /// No-op `Ok(())` if the process has already finished. On non-Unix
    /// targets there is no interrupt signal and this forwards to
    /// [`ProcHandle::force_kill`].
    pub fn interrupt(&mut self) -> io::Result<()> {
        #[cfg(unix)]
        {
            self.send(nix::sys::signal::Signal::SIGINT)
        }
        #[cfg(not(unix))]
        {
            self.force_kill()
        }
    }

    /// Sends a terminate-style signal (SIGTERM on Unix).
    ///
    /// No-op `Ok(())` if the process has already finished. On non-Unix
    /// targets this forwards to [`ProcHandle::force_kill`].
    pub fn terminate(&mut self) -> io::Result<()> {
        #[cfg(unix)]
        {
            self.send(nix::sys::signal::Signal::SIGTERM)
        }
        #[cfg(not(unix))]
        {
            self.force_kill()
        }
    }

    /// Force-kills the process (SIGKILL on Unix) without waiting for it.
    ///
    /// Killing an already-finished process is a no-op `Ok(())`; any other
    /// delivery failure is surfaced.
    pub fn force_kill(&mut self) -> io::Result<()> {
        if self.status.is_some() {
            return Ok(());
        }
        match self.child.start_kill() {
            // start_kill reports InvalidInput once the child has been reaped.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            res => res,
        }
    }

    /// Waits for the child to exit and records its terminal status.
    ///
    /// Idempotent: the first completed call consumes the OS wait; later
    /// calls return the recorded status immediately.
    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        if let Some(status) = self.status {
            return Ok(status);
        }
        let status = self.child.wait().await?;
        self.status = Some(status);
        Ok(status)
    }

    /// Non-blocking completion check; records the status when the child has
    /// exited.
    pub fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        if let Some(status) = self.status {
            return Ok(Some(status));
        }
        let status = self.child.try_wait()?;
        if let Some(status) = status {
            self.status = Some(status);
        }
        Ok(status)
    }

    /// `true` once a terminal status has been recorded. Stays `true`.
    pub fn is_finished(&self) -> bool {
        self.status.is_some()
    }

    /// The recorded terminal status, if any.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.status
    }

    #[cfg(unix)]
    fn send(&self, sig: nix::sys::signal::Signal) -> io::Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        if self.status.is_some() {
            return Ok(());
        }
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        match kill(Pid::from_raw(pid as i32), sig) {
            Ok(()) => Ok(()),
            // The process died between the id lookup and the kill call.
            Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(io::Error::from_raw_os_error(e as i32)),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Stdio;
    use tokio::process::Command;

    fn spawn_sh(script: &str) -> ProcHandle {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(script)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        ProcHandle::new(cmd.spawn().expect("failed to spawn sh"))
    }

    #[tokio::test]
    async fn test_wait_records_status_and_is_idempotent() {
        let mut proc = spawn_sh("exit 0");
        let first = proc.wait().await.expect("wait failed");
        let second = proc.wait().await.expect("second wait failed");

        assert!(first.success());
        assert_eq!(first, second);
        assert!(proc.is_finished());
        assert_eq!(proc.exit_status(), Some(first));
    }

    #[tokio::test]
    async fn test_exit_code_is_preserved() {
        let mut proc = spawn_sh("exit 3");
        let status = proc.wait().await.expect("wait failed");
        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_signaling_finished_process_is_noop() {
        let mut proc = spawn_sh("exit 0");
        proc.wait().await.expect("wait failed");

        assert!(proc.interrupt().is_ok());
        assert!(proc.terminate().is_ok());
        assert!(proc.force_kill().is_ok());
    }

    #[tokio::test]
    async fn test_force_kill_stops_running_process() {
        let mut proc = spawn_sh("while true; do sleep 1; done");
        proc.force_kill().expect("kill failed");
        let status = proc.wait().await.expect("wait failed");

        assert!(!status.success());
        assert!(proc.is_finished());
    }

    #[tokio::test]
    async fn test_try_wait_records_after_exit() {
        let mut proc = spawn_sh("exit 0");
        // Reap through the blocking path, then observe via try_wait.
        proc.wait().await.expect("wait failed");
        let status = proc.try_wait().expect("try_wait failed");

        assert!(matches!(status, Some(s) if s.success()));
    }
}
