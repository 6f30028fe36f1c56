//! Supervisor event log: turns taskvisor runtime events into `tracing` records.
use async_trait::async_trait;
use taskvisor::{BackoffSource, Event, EventKind, Subscribe};
use tracing::{debug, error, info, trace, warn};

/// Subscriber that writes every supervisor event through the installed logger.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaskLog;

impl TaskLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for TaskLog {
    async fn on_event(&self, event: &Event) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "task-log"
    }

    fn queue_capacity(&self) -> usize {
        2048
    }
}

/// Short description of an event kind, used as the record message.
pub fn describe(kind: EventKind) -> &'static str {
    match kind {
        EventKind::TaskAddRequested => "task submitted",
        EventKind::TaskAdded => "task registered",
        EventKind::TaskRemoveRequested => "task removal requested",
        EventKind::TaskRemoved => "task removed",
        EventKind::TaskStarting => "task attempt starting",
        EventKind::TaskStopped => "task attempt finished",
        EventKind::TaskFailed => "task attempt failed",
        EventKind::TimeoutHit => "task attempt timed out",
        EventKind::BackoffScheduled => "next attempt scheduled",
        EventKind::ActorExhausted => "task will not be restarted",
        EventKind::ActorDead => "task stopped for good",
        EventKind::ShutdownRequested => "shutdown requested",
        EventKind::AllStoppedWithinGrace => "all tasks stopped within grace period",
        EventKind::GraceExceeded => "grace exceeded; some tasks did not stop in time",
        EventKind::SubscriberOverflow => "event dropped by a slow subscriber",
        EventKind::SubscriberPanicked => "subscriber panicked",
    }
}

pub fn log_event(event: &Event) {
    let msg = describe(event.kind);
    let task = event.task.as_deref().unwrap_or("-");
    let reason = event.reason.as_deref().unwrap_or("-");
    let attempt = event.attempt.unwrap_or(0);

    match event.kind {
        EventKind::TaskAddRequested | EventKind::TaskRemoveRequested | EventKind::TaskStopped => {
            trace!(task, "{msg}")
        }
        EventKind::TaskAdded | EventKind::TaskRemoved => debug!(task, "{msg}"),
        // Both loops restart after every attempt, so starts are frequent.
        EventKind::TaskStarting => trace!(task, attempt, "{msg}"),
        EventKind::TaskFailed => warn!(task, attempt, reason, "{msg}"),
        EventKind::TimeoutHit => warn!(task, timeout_ms = event.timeout_ms.unwrap_or(0), "{msg}"),
        EventKind::BackoffScheduled => {
            let delay_ms = event.delay_ms.unwrap_or(0);
            match event.backoff_source {
                Some(BackoffSource::Failure) => {
                    info!(task, attempt, delay_ms, reason, "retry scheduled after failure")
                }
                _ => trace!(task, attempt, delay_ms, "{msg}"),
            }
        }
        EventKind::ActorExhausted => info!(task, reason, "{msg}"),
        EventKind::ActorDead => error!(task, reason, "{msg}"),
        EventKind::ShutdownRequested | EventKind::AllStoppedWithinGrace => info!("{msg}"),
        EventKind::GraceExceeded => warn!("{msg}"),
        EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
            error!(task, reason, "{msg}")
        }
    }
}
