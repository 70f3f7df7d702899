//! # LogWriter: a simple built-in stderr subscriber.
//!
//! Reference implementation of [`Subscribe`] intended for demos and local
//! debugging; production users are expected to plug in their own sink.

use async_trait::async_trait;

use super::Subscribe;
use crate::events::{Event, EventKind};

/// Writes one line per event to stderr.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    pub fn new() -> Self {
        Self
    }

    fn label(kind: EventKind) -> &'static str {
        match kind {
            EventKind::WorkerSpawned => "worker_spawned",
            EventKind::WorkerCompleted => "worker_completed",
            EventKind::WorkerStopped => "worker_stopped",
            EventKind::WorkerFailed => "worker_failed",
            EventKind::WorkerPanicked => "worker_panicked",
            EventKind::SupervisorCancelled => "supervisor_cancelled",
            EventKind::AllWorkersJoined => "all_workers_joined",
            EventKind::GraceExceeded => "grace_exceeded",
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        let worker = event.worker.as_deref().unwrap_or("-");
        let reason = event.reason.as_deref().unwrap_or("-");
        eprintln!(
            "[taskscope] seq={} kind={} worker={} reason={}",
            event.seq,
            Self::label(event.kind),
            worker,
            reason
        );
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
