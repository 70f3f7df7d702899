//! Per-worker lifecycle state.

/// State of one supervised worker.
///
/// ```text
/// Running ──► Completed   (normal exit)
///         ──► Stopped     (scope done, graceful exit)
///         ──► Failed      (error exit)
/// ```
///
/// The three non-running states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// The worker is still executing.
    Running,
    /// The worker finished its work and exited normally.
    Completed,
    /// The worker observed its scope become done and exited cooperatively.
    Stopped,
    /// The worker exited with a non-graceful error.
    Failed,
}

impl WorkerState {
    /// `true` for any state other than [`WorkerState::Running`].
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerState::Running)
    }
}
