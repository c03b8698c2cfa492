//! # Supervised command run.
//!
//! [`CmdRunner`] binds one caller-assembled [`Command`], one
//! [`CancelSignal`], and one [`Terminate`] strategy into a single run with a
//! single outcome.
//!
//! ## Lifecycle
//! ```text
//! NOT_STARTED ──start()──► RUNNING ──(signal fires)──► TERMINATING ──► FINISHED
//!       │                                                    │
//!       └─(spawn fails)──► FAILED_START [terminal]           └─(terminator /
//!                                                               exit error)──► FINISHED
//! ```
//!
//! ## Wait semantics
//! `wait` suspends **solely on the cancellation signal** — it does not race
//! natural process completion. A process that exits cleanly on its own while
//! the signal is still pending is not observed until the signal eventually
//! fires, and the returned error is then the signal's reason. This makes the
//! runner a fit for bounded-lifetime or explicitly-cancelled executions, not
//! for commands expected to finish before any deadline is set; callers who
//! need "return as soon as the command finishes" should drive the child
//! directly instead.
//!
//! ## Error priority
//! When several error sources are available at once, the composed outcome
//! is, in order: terminator error, then the terminal wait's error, then the
//! signal's reason. This lets callers distinguish "we killed it" from "it
//! died on its own for an unrelated reason".

use std::process::ExitStatus;
use std::sync::Arc;

use tokio::process::Command;
use tokio::sync::broadcast;

use crate::cancel::CancelSignal;
use crate::error::RunError;
use crate::events::{Bus, Event, EventKind, DEFAULT_BUS_CAPACITY};
use crate::process::ProcHandle;
use crate::terminator::{GracefulStop, TerminateRef};

/// # Orchestrator for one cancellation-governed command execution.
///
/// The command descriptor (program, arguments, I/O streams) is assembled by
/// the caller and opaque to the runner. The runner owns the spawned
/// [`ProcHandle`] exclusively; the terminator strategy is fixed once the run
/// starts.
///
/// ## Example
/// ```no_run
/// use std::time::Duration;
/// use cmdvisor::{CancelSignal, CmdRunner};
/// use tokio::process::Command;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let signal = CancelSignal::timeout(Duration::from_secs(2));
///     let mut cmd = Command::new("sh");
///     cmd.arg("-c").arg("while true; do sleep 1; done");
///
///     let mut runner = CmdRunner::new(cmd);
///     match runner.run(&signal).await {
///         Ok(()) => println!("clean exit"),
///         Err(e) => println!("{e}"), // "timed out after 2s"
///     }
/// }
/// ```
pub struct CmdRunner {
    cmd: Command,
    proc: Option<ProcHandle>,
    terminator: TerminateRef,
    bus: Bus,
}

impl CmdRunner {
    /// Creates a runner for the given command with the default
    /// [`GracefulStop`] terminator.
    pub fn new(cmd: Command) -> Self {
        Self {
            cmd,
            proc: None,
            terminator: Arc::new(GracefulStop),
            bus: Bus::new(DEFAULT_BUS_CAPACITY),
        }
    }

    /// Replaces the termination strategy.
    ///
    /// Must be done before the run; once `start` has been called the
    /// strategy is treated as immutable for the run's duration.
    pub fn with_terminator(mut self, terminator: TerminateRef) -> Self {
        self.terminator = terminator;
        self
    }

    /// Subscribes to the runner's lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Spawns the child process without waiting for it.
    ///
    /// Fails with [`RunError::Spawn`] when the OS cannot launch the program
    /// and [`RunError::AlreadyStarted`] on a repeated call. No cancellation
    /// semantics apply before start.
    pub fn start(&mut self) -> Result<(), RunError> {
        if self.proc.is_some() {
            return Err(RunError::AlreadyStarted);
        }
        let child = self.cmd.spawn().map_err(|source| RunError::Spawn { source })?;
        self.bus
            .publish(Event::now(EventKind::ProcSpawned).with_pid(child.id()));
        self.proc = Some(ProcHandle::new(child));
        Ok(())
    }

    /// Starts the command and waits for the run to complete.
    ///
    /// Equivalent to [`CmdRunner::start`] followed by [`CmdRunner::wait`],
    /// short-circuiting on start failure.
    pub async fn run(&mut self, signal: &CancelSignal) -> Result<(), RunError> {
        self.start()?;
        self.wait(signal).await
    }

    /// Suspends until the cancellation signal fires, then terminates the
    /// process and returns the composed outcome.
    ///
    /// See the module docs for the wait semantics and error priority. The
    /// terminal wait on the process happens at most once across the whole
    /// run; a prior `stop` or a graceful terminator path that already reaped
    /// the child is observed through the recorded status.
    pub async fn wait(&mut self, signal: &CancelSignal) -> Result<(), RunError> {
        let terminator = Arc::clone(&self.terminator);
        let bus = self.bus.clone();
        let proc = self.proc.as_mut().ok_or(RunError::NotStarted)?;

        signal.cancelled().await;
        // The reason slot is written before the token fires (see cancel.rs),
        // so a woken waiter always observes it.
        let reason = signal
            .reason()
            .expect("reason is recorded before the signal fires");
        bus.publish(Event::now(EventKind::CancelFired).with_reason(reason.as_label()));
        bus.publish(Event::now(EventKind::Terminating).with_pid(proc.id()));

        let stopped = terminator.terminate(proc, signal, &bus).await;
        let waited = proc.wait().await;

        let exited = Event::now(EventKind::ProcExited);
        bus.publish(match &waited {
            Ok(status) => exited.with_exit_code(status.code()),
            Err(_) => exited,
        });

        stopped?;
        let status = waited.map_err(|source| RunError::Wait { source })?;
        if !status.success() {
            return Err(RunError::Exit { status });
        }
        match signal.reason() {
            Some(reason) => Err(reason.into()),
            None => Ok(()),
        }
    }

    /// Invokes the terminator directly, bypassing the suspend-until-signal
    /// path.
    ///
    /// Usable by a caller that wants to pre-emptively terminate. With a
    /// pending signal this waits for the process to exit gracefully; with a
    /// fired signal it kills immediately. Safe to call repeatedly on a
    /// finished process.
    pub async fn stop(&mut self, signal: &CancelSignal) -> Result<(), RunError> {
        let terminator = Arc::clone(&self.terminator);
        let bus = self.bus.clone();
        let proc = self.proc.as_mut().ok_or(RunError::NotStarted)?;

        bus.publish(Event::now(EventKind::StopRequested).with_pid(proc.id()));
        bus.publish(Event::now(EventKind::Terminating).with_pid(proc.id()));
        let res = terminator.terminate(proc, signal, &bus).await;

        // A graceful terminator path reaps the child itself; surface the
        // recorded status to subscribers the same way wait-driven runs do.
        if let Some(status) = proc.exit_status() {
            bus.publish(Event::now(EventKind::ProcExited).with_exit_code(status.code()));
        }
        res
    }

    /// `true` once the process has a recorded terminal status. Idempotent;
    /// stays `true` once set.
    pub fn is_finished(&self) -> bool {
        self.proc.as_ref().is_some_and(ProcHandle::is_finished)
    }

    /// The recorded terminal status, if any.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        self.proc.as_ref().and_then(ProcHandle::exit_status)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Stdio;
    use std::time::{Duration, Instant};

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(script)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    #[tokio::test]
    async fn test_wait_returns_deadline_reason_after_clean_exit() {
        // The process exits 0 immediately, but wait blocks on the signal and
        // the outcome is the deadline's reason once it fires.
        let after = Duration::from_millis(300);
        let signal = CancelSignal::timeout(after);
        let mut runner = CmdRunner::new(sh("exit 0"));

        let res = runner.run(&signal).await;
        assert!(matches!(res, Err(RunError::TimedOut { after: a }) if a == after));
        assert!(runner.is_finished());
        assert!(runner.exit_status().expect("no status").success());
    }

    #[tokio::test]
    async fn test_wait_kills_process_that_ignores_signals() {
        let after = Duration::from_millis(500);
        let signal = CancelSignal::timeout(after);
        let mut runner = CmdRunner::new(sh(r#"trap "" INT TERM; while true; do sleep 1; done"#));

        let started = Instant::now();
        let res = runner.run(&signal).await;
        let elapsed = started.elapsed();

        assert!(matches!(res, Err(RunError::TimedOut { .. })));
        assert!(runner.is_finished());
        assert!(!runner.exit_status().expect("no status").success());
        assert!(elapsed >= Duration::from_millis(400), "returned too early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(5), "kill path hung: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_wait_reports_reason_even_when_trap_would_exit_zero() {
        // The program traps INT/TERM and would exit 0 on request, but the
        // terminator sees the signal already fired and kills immediately;
        // the outcome is the deadline's reason either way.
        let signal = CancelSignal::timeout(Duration::from_millis(500));
        let mut runner =
            CmdRunner::new(sh(r#"trap "exit 0" INT TERM; while true; do sleep 1; done"#));

        let res = runner.run(&signal).await;
        assert!(matches!(res, Err(RunError::TimedOut { .. })));
        assert!(runner.is_finished());
    }

    #[tokio::test]
    async fn test_explicit_cancel_returns_canceled() {
        let signal = CancelSignal::new();
        let mut runner = CmdRunner::new(sh("while true; do sleep 1; done"));
        {
            let signal = signal.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                signal.cancel();
            });
        }

        let res = runner.run(&signal).await;
        assert!(matches!(res, Err(RunError::Canceled)));
        assert!(runner.is_finished());
    }

    #[tokio::test]
    async fn test_bad_executable_fails_start_and_keeps_runner_inert() {
        let signal = CancelSignal::new();
        signal.cancel();
        let mut runner = CmdRunner::new(Command::new("/nonexistent/definitely-not-a-binary"));

        assert!(matches!(runner.start(), Err(RunError::Spawn { .. })));
        assert!(matches!(runner.wait(&signal).await, Err(RunError::NotStarted)));
        assert!(matches!(runner.stop(&signal).await, Err(RunError::NotStarted)));
        assert!(!runner.is_finished());
        assert!(runner.exit_status().is_none());
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let mut runner = CmdRunner::new(sh("exit 0"));
        runner.start().expect("first start failed");
        assert!(matches!(runner.start(), Err(RunError::AlreadyStarted)));
    }

    #[tokio::test]
    async fn test_stop_with_pending_signal_lets_trap_exit_gracefully() {
        let signal = CancelSignal::new();
        let mut runner =
            CmdRunner::new(sh(r#"trap "exit 0" INT TERM; while true; do sleep 1; done"#));
        let mut rx = runner.subscribe();
        runner.start().expect("start failed");
        // Give the shell a moment to install its trap handlers.
        tokio::time::sleep(Duration::from_millis(300)).await;

        let res = runner.stop(&signal).await;
        assert!(res.is_ok(), "expected graceful stop, got {res:?}");
        assert!(runner.is_finished());
        assert!(runner.exit_status().expect("no status").success());

        // The stop-driven terminal status is published like a wait-driven one.
        let mut exited = None;
        while let Ok(ev) = rx.try_recv() {
            if ev.kind == EventKind::ProcExited {
                exited = Some(ev);
            }
        }
        let exited = exited.expect("missing exit event");
        assert_eq!(exited.exit_code, Some(0));
    }

    #[tokio::test]
    async fn test_double_stop_on_finished_process_is_safe() {
        let signal = CancelSignal::new();
        let mut runner = CmdRunner::new(sh("exit 0"));
        runner.start().expect("start failed");
        // Reap the child first so both stops exercise the finished-process
        // path instead of racing the signal nudge against `exit`.
        runner
            .proc
            .as_mut()
            .expect("proc missing")
            .wait()
            .await
            .expect("wait failed");

        let first = runner.stop(&signal).await;
        let second = runner.stop(&signal).await;

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert!(runner.is_finished());
    }

    #[tokio::test]
    async fn test_lifecycle_events_are_published_in_order() {
        let signal = CancelSignal::timeout(Duration::from_millis(200));
        let mut runner = CmdRunner::new(sh("exit 0"));
        let mut rx = runner.subscribe();

        runner.run(&signal).await.expect_err("deadline should win");

        let spawned = rx.recv().await.expect("missing spawn event");
        let fired = rx.recv().await.expect("missing cancel event");
        let terminating = rx.recv().await.expect("missing terminating event");
        let killed = rx.recv().await.expect("missing kill event");
        let exited = rx.recv().await.expect("missing exit event");

        assert_eq!(spawned.kind, EventKind::ProcSpawned);
        assert!(spawned.pid.is_some());
        assert_eq!(fired.kind, EventKind::CancelFired);
        assert_eq!(fired.reason.as_deref(), Some("timed_out"));
        assert_eq!(terminating.kind, EventKind::Terminating);
        assert_eq!(killed.kind, EventKind::ProcKilled);
        assert_eq!(exited.kind, EventKind::ProcExited);
        assert_eq!(exited.exit_code, Some(0));
        assert!(spawned.seq < fired.seq && fired.seq < exited.seq);
    }

    #[tokio::test]
    async fn test_forced_kill_is_visible_on_the_bus() {
        let signal = CancelSignal::timeout(Duration::from_millis(300));
        let mut runner = CmdRunner::new(sh(r#"trap "" INT TERM; while true; do sleep 1; done"#));
        let mut rx = runner.subscribe();

        let res = runner.run(&signal).await;
        assert!(matches!(res, Err(RunError::TimedOut { .. })));

        let mut kinds = Vec::new();
        loop {
            let ev = rx.recv().await.expect("bus closed early");
            let kind = ev.kind;
            kinds.push(kind);
            if kind == EventKind::ProcExited {
                break;
            }
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::ProcSpawned,
                EventKind::CancelFired,
                EventKind::Terminating,
                EventKind::ProcKilled,
                EventKind::ProcExited,
            ]
        );
    }

    #[tokio::test]
    async fn test_injected_terminator_is_used() {
        use crate::terminator::Terminate;
        use async_trait::async_trait;

        struct KillNow;

        #[async_trait]
        impl Terminate for KillNow {
            async fn terminate(
                &self,
                proc: &mut ProcHandle,
                _signal: &CancelSignal,
                _bus: &Bus,
            ) -> Result<(), RunError> {
                proc.force_kill()
                    .map_err(|source| RunError::Kill { source })?;
                proc.wait()
                    .await
                    .map_err(|source| RunError::Wait { source })?;
                Ok(())
            }
        }

        let signal = CancelSignal::timeout(Duration::from_millis(200));
        let mut runner = CmdRunner::new(sh("while true; do sleep 1; done"))
            .with_terminator(Arc::new(KillNow));

        // KillNow returns Ok, the killed status is abnormal, so the exit
        // error wins per the composition order.
        let res = runner.run(&signal).await;
        assert!(matches!(res, Err(RunError::Exit { .. })));
        assert!(runner.is_finished());
    }
}
