//! Process-level failure handling.
//!
//! Two signals exist. An unhandled rejection is an async failure nobody
//! awaited; it is logged and the process keeps going. An infrastructure
//! error means the test environment itself is broken (a browser did not
//! launch, the runner died); the process exits non-zero at once so a broken
//! environment can never report a passing run.
//!
//! The policy is an explicit value with an injectable [`Exit`], installed
//! once at startup through [`spawn_monitor`]. Tasks report through a
//! cloneable [`FailureReporter`]. A caller that owns child processes uses
//! [`DeferredExit`] so it can reap them before the process goes away.

use std::fmt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Exit code used when the test infrastructure fails.
pub const INFRASTRUCTURE_EXIT_CODE: i32 = 1;

/// A failure observed somewhere in the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    UnhandledRejection(String),
    InfrastructureError(String),
}

/// What the process does after a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Terminate { exit_code: i32 },
}

/// Terminates the process.
pub trait Exit: Send + Sync {
    fn exit(&self, code: i32, reason: &str);
}

/// Exits the real process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExit;

impl Exit for ProcessExit {
    fn exit(&self, code: i32, _reason: &str) {
        std::process::exit(code);
    }
}

/// A termination requested through [`DeferredExit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    pub exit_code: i32,
    pub reason: String,
}

/// Records the termination instead of exiting, leaving the exit to the
/// holder of the paired [`TerminationWatch`].
#[derive(Debug)]
pub struct DeferredExit {
    tx: watch::Sender<Option<Termination>>,
}

impl DeferredExit {
    #[must_use]
    pub fn new() -> (Self, TerminationWatch) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, TerminationWatch { rx })
    }
}

impl Exit for DeferredExit {
    fn exit(&self, code: i32, reason: &str) {
        // First request wins.
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(Termination {
                exit_code: code,
                reason: reason.to_string(),
            });
            true
        });
    }
}

/// Receiving side of a [`DeferredExit`].
#[derive(Debug, Clone)]
pub struct TerminationWatch {
    rx: watch::Receiver<Option<Termination>>,
}

impl TerminationWatch {
    /// The termination requested so far, if any.
    #[must_use]
    pub fn current(&self) -> Option<Termination> {
        self.rx.borrow().clone()
    }

    /// Wait until a termination is requested. Never resolves if the policy
    /// is dropped without requesting one.
    pub async fn requested(&mut self) -> Termination {
        loop {
            if let Some(termination) = self.rx.borrow_and_update().clone() {
                return termination;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Decides and carries out the response to each [`Signal`].
pub struct FailurePolicy<E: Exit = ProcessExit> {
    exit: E,
}

impl FailurePolicy<ProcessExit> {
    #[must_use]
    pub fn new() -> Self {
        Self { exit: ProcessExit }
    }
}

impl Default for FailurePolicy<ProcessExit> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Exit> FailurePolicy<E> {
    /// A policy that terminates through `exit`.
    pub fn with_exit(exit: E) -> Self {
        Self { exit }
    }

    /// Log and carry on.
    pub fn on_unhandled_rejection(&self, reason: &str) -> Disposition {
        tracing::error!(reason, "unhandled rejection");
        Disposition::Continue
    }

    /// Log and terminate.
    pub fn on_infrastructure_error(&self, detail: &str) -> Disposition {
        tracing::error!(detail, "infrastructure_error");
        self.exit.exit(INFRASTRUCTURE_EXIT_CODE, detail);
        Disposition::Terminate {
            exit_code: INFRASTRUCTURE_EXIT_CODE,
        }
    }

    pub fn handle(&self, signal: &Signal) -> Disposition {
        match signal {
            Signal::UnhandledRejection(reason) => self.on_unhandled_rejection(reason),
            Signal::InfrastructureError(detail) => self.on_infrastructure_error(detail),
        }
    }
}

/// Sends signals to the monitor installed by [`spawn_monitor`].
#[derive(Debug, Clone)]
pub struct FailureReporter {
    tx: mpsc::UnboundedSender<Signal>,
}

impl FailureReporter {
    pub fn unhandled_rejection(&self, reason: impl Into<String>) {
        self.send(Signal::UnhandledRejection(reason.into()));
    }

    pub fn infrastructure_error(&self, detail: impl Into<String>) {
        self.send(Signal::InfrastructureError(detail.into()));
    }

    fn send(&self, signal: Signal) {
        // The monitor only stops after terminating; nothing is left to tell.
        let _ = self.tx.send(signal);
    }

    /// Await a background task, reporting its failure as an unhandled
    /// rejection instead of propagating it.
    pub async fn observe<T, Err>(&self, task: JoinHandle<Result<T, Err>>) -> Option<T>
    where
        Err: fmt::Display,
    {
        match task.await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.unhandled_rejection(e.to_string());
                None
            }
            Err(join_err) => {
                self.unhandled_rejection(join_err.to_string());
                None
            }
        }
    }
}

/// Install `policy` as the process-wide failure handler.
///
/// The returned task runs until every reporter is dropped or a signal
/// terminates; it yields the dispositions it produced, in order.
pub fn spawn_monitor<E>(policy: FailurePolicy<E>) -> (FailureReporter, JoinHandle<Vec<Disposition>>)
where
    E: Exit + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move {
        let mut dispositions = Vec::new();
        while let Some(signal) = rx.recv().await {
            let disposition = policy.handle(&signal);
            dispositions.push(disposition);
            if matches!(disposition, Disposition::Terminate { .. }) {
                break;
            }
        }
        dispositions
    });

    (FailureReporter { tx }, handle)
}
