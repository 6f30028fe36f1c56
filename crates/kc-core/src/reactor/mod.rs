//! Console event watcher (game world -> workload directory).
use std::{sync::Arc, time::Duration};

use kc_model::BackoffStrategy;
use taskvisor::{RestartPolicy, TaskError, TaskFn, TaskRef, TaskSpec};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{
    channel::{CommandChannel, Connector},
    deadline::with_deadline,
    directory::WorkloadDirectory,
    error::CoreError,
    map::{to_backoff_policy, to_task_error},
    parser::MessageParser,
};

const READ_OP: &str = "console read";

#[derive(Clone, Debug)]
pub struct ReactorConfig {
    /// Deadline for connect, close and delete calls.
    pub call_timeout: Duration,
    /// Reconnect when the console stays silent this long. `None` waits forever.
    pub read_idle_timeout: Option<Duration>,
    pub backoff: BackoffStrategy,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            read_idle_timeout: Some(Duration::from_secs(300)),
            backoff: BackoffStrategy::default(),
        }
    }
}

impl ReactorConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.call_timeout.is_zero() {
            return Err(CoreError::InvalidConfig("call timeout must be positive".into()));
        }
        if self.read_idle_timeout.is_some_and(|t| t.is_zero()) {
            return Err(CoreError::InvalidConfig("read idle timeout must be positive".into()));
        }
        self.backoff
            .validate()
            .map_err(|e| CoreError::InvalidConfig(e.into()))
    }
}

/// Task name under which the reactor is supervised.
pub const REACTOR_TASK: &str = "kc-reactor";

enum WatchEnd {
    Cancelled,
    Closed,
    Idle,
    Failed(CoreError),
}

pub struct Reactor {
    cfg: ReactorConfig,
    directory: Arc<dyn WorkloadDirectory>,
    connector: Arc<dyn Connector>,
    parser: Arc<dyn MessageParser>,
}

impl Reactor {
    pub fn new(
        cfg: ReactorConfig,
        directory: Arc<dyn WorkloadDirectory>,
        connector: Arc<dyn Connector>,
        parser: Arc<dyn MessageParser>,
    ) -> Self {
        Self {
            cfg,
            directory,
            connector,
            parser,
        }
    }

    /// Wrap the reactor into a supervised task.
    ///
    /// Every attempt holds one console connection. A healthy attempt is followed by an immediate
    /// reconnect and resets the backoff; a failed one waits for the backoff.
    pub fn into_task(self) -> TaskSpec {
        let backoff = to_backoff_policy(&self.cfg.backoff);
        let reactor = Arc::new(self);

        let task: TaskRef = TaskFn::arc(REACTOR_TASK, move |ctx: CancellationToken| {
            let reactor = Arc::clone(&reactor);
            async move { reactor.attempt(&ctx).await }
        });
        TaskSpec::new(task, RestartPolicy::Always { interval: None }, backoff, None)
    }

    /// Connect, watch until the stream ends, close.
    ///
    /// The connection was healthy if it delivered at least one event or stayed up until the idle
    /// deadline. A refused connect, or a stream that ended before its first event, is a failure.
    async fn attempt(&self, ctx: &CancellationToken) -> Result<(), TaskError> {
        if ctx.is_cancelled() {
            return Err(TaskError::Canceled);
        }
        let timeout = self.cfg.call_timeout;
        let connected = tokio::select! {
            _ = ctx.cancelled() => return Err(TaskError::Canceled),
            res = with_deadline("console connect", timeout, self.connector.connect()) => res,
        };
        let mut channel = match connected {
            Ok(channel) => channel,
            Err(e) => {
                warn!(error = %e, "failed to connect to console");
                return Err(to_task_error(e));
            }
        };

        info!("watching console events");
        let (end, received) = self.watch(channel.as_mut(), ctx).await;
        if let Err(e) = with_deadline("console close", timeout, channel.close()).await {
            debug!(error = %e, "failed to close console connection");
        }

        match end {
            WatchEnd::Cancelled => {
                info!(received, "reactor stopped");
                Err(TaskError::Canceled)
            }
            WatchEnd::Idle => {
                debug!(received, "console idle; reconnecting");
                Ok(())
            }
            WatchEnd::Closed if received > 0 => {
                info!(received, "console closed the event stream");
                Ok(())
            }
            WatchEnd::Closed => {
                warn!("console closed the event stream before any event");
                Err(TaskError::Fail {
                    reason: "console closed without events".to_string(),
                })
            }
            WatchEnd::Failed(e) => {
                warn!(error = %e, received, "console watch failed");
                if received > 0 {
                    Ok(())
                } else {
                    Err(to_task_error(e))
                }
            }
        }
    }

    async fn watch(&self, channel: &mut dyn CommandChannel, ctx: &CancellationToken) -> (WatchEnd, u64) {
        let mut received = 0;
        loop {
            let next = tokio::select! {
                _ = ctx.cancelled() => return (WatchEnd::Cancelled, received),
                res = self.read(&mut *channel) => res,
            };
            match next {
                Ok(Some(raw)) => {
                    received += 1;
                    self.handle(&raw).await;
                }
                Ok(None) => return (WatchEnd::Closed, received),
                Err(CoreError::Timeout { op: READ_OP, .. }) => return (WatchEnd::Idle, received),
                Err(e) => return (WatchEnd::Failed(e), received),
            }
        }
    }

    async fn read(&self, channel: &mut dyn CommandChannel) -> Result<Option<String>, CoreError> {
        match self.cfg.read_idle_timeout {
            Some(limit) => with_deadline(READ_OP, limit, channel.recv()).await,
            None => channel.recv().await.map_err(CoreError::from),
        }
    }

    /// React to one console payload. Every failure here is logged and swallowed.
    pub async fn handle(&self, raw: &str) {
        let notification = match self.parser.parse(raw) {
            Ok(Some(n)) => n,
            Ok(None) => {
                trace!("console event carries no kill notification");
                return;
            }
            Err(e) => {
                warn!(error = %e, "failed to parse console event");
                return;
            }
        };

        let deleted = with_deadline(
            "delete instance",
            self.cfg.call_timeout,
            self.directory
                .delete_instance(&notification.namespace, &notification.name),
        )
        .await;
        match deleted {
            Ok(()) => info!(
                namespace = %notification.namespace,
                name = %notification.name,
                "deleted workload instance"
            ),
            Err(e) => warn!(
                error = %e,
                namespace = %notification.namespace,
                name = %notification.name,
                "failed to delete workload instance"
            ),
        }
    }
}
