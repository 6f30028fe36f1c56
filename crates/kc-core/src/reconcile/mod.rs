//! Periodic world reconciliation (workload directory -> game world).
mod state;
pub use state::{Plan, ReconcileState};

use std::{
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use kc_model::{BackoffStrategy, EntityLabel, WorkloadInstance};
use taskvisor::{BackoffPolicy, RestartPolicy, TaskError, TaskFn, TaskRef, TaskSpec};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{
    channel::{CommandChannel, Connector},
    command::{Command, EntityKind, Position},
    deadline::with_deadline,
    directory::WorkloadDirectory,
    error::CoreError,
    map::{to_backoff_policy, to_task_error},
};

/// Task name under which the reconciler is supervised.
pub const RECONCILER_TASK: &str = "kc-reconciler";

#[derive(Clone, Debug)]
pub struct ReconcilerConfig {
    /// Namespace label selector, e.g. `flinktoid=true`.
    pub selector: String,
    /// Pause between two successful ticks.
    pub period: Duration,
    /// Deadline for every directory and console call.
    pub call_timeout: Duration,
    pub position: Position,
    pub backoff: BackoffStrategy,
    /// List once before the first tick and treat the result as already known.
    pub seed_known: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            selector: "flinktoid=true".to_string(),
            period: Duration::from_secs(30),
            call_timeout: Duration::from_secs(10),
            position: Position::default(),
            backoff: BackoffStrategy::default(),
            seed_known: false,
        }
    }
}

impl ReconcilerConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.selector.trim().is_empty() {
            return Err(CoreError::InvalidConfig("selector must not be empty".into()));
        }
        if self.period.is_zero() {
            return Err(CoreError::InvalidConfig("period must be positive".into()));
        }
        if self.call_timeout.is_zero() {
            return Err(CoreError::InvalidConfig("call timeout must be positive".into()));
        }
        self.backoff
            .validate()
            .map_err(|e| CoreError::InvalidConfig(e.into()))
    }
}

/// Outcome of one committed tick.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickReport {
    pub listed: usize,
    pub spawned: usize,
    pub despawned: usize,
}

pub struct Reconciler {
    cfg: ReconcilerConfig,
    directory: Arc<dyn WorkloadDirectory>,
    connector: Arc<dyn Connector>,
    state: Mutex<ReconcileState>,
    seed_pending: AtomicBool,
}

impl Reconciler {
    pub fn new(
        cfg: ReconcilerConfig,
        directory: Arc<dyn WorkloadDirectory>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let seed_pending = AtomicBool::new(cfg.seed_known);
        Self {
            cfg,
            directory,
            connector,
            state: Mutex::new(ReconcileState::new()),
            seed_pending,
        }
    }

    pub fn with_state(mut self, state: ReconcileState) -> Self {
        self.state = Mutex::new(state);
        self
    }

    /// Snapshot of the state carried between ticks.
    pub async fn state(&self) -> ReconcileState {
        self.state.lock().await.clone()
    }

    /// Fill the known set from one directory listing.
    pub async fn seed(&self) -> Result<usize, CoreError> {
        let instances = self.list().await?;
        let count = instances.len();
        self.state
            .lock()
            .await
            .seed_known(instances.iter().map(WorkloadInstance::label));
        info!(count, "seeded known entities from workload directory");
        Ok(count)
    }

    /// One compare-and-act cycle.
    ///
    /// Nothing is committed unless the listing and every command succeeded, so a failed or
    /// cancelled tick leaves the state exactly as it was. An open console connection is closed
    /// on every path, cancellation included.
    #[instrument(level = "debug", skip_all, fields(selector = %self.cfg.selector))]
    pub async fn tick(&self, ctx: &CancellationToken) -> Result<TickReport, CoreError> {
        let instances = tokio::select! {
            _ = ctx.cancelled() => return Err(CoreError::Cancelled),
            res = self.list() => res?,
        };
        let desired: BTreeSet<EntityLabel> =
            instances.iter().map(WorkloadInstance::label).collect();

        let mut state = self.state.lock().await;
        let plan = state.plan(&desired);
        if plan.is_empty() {
            debug!(listed = instances.len(), "world already matches the directory");
        }
        let commands = self.commands(&plan);

        let timeout = self.cfg.call_timeout;
        let mut channel = tokio::select! {
            _ = ctx.cancelled() => return Err(CoreError::Cancelled),
            res = with_deadline("console connect", timeout, self.connector.connect()) => res?,
        };
        let sent = tokio::select! {
            _ = ctx.cancelled() => Err(CoreError::Cancelled),
            res = send_all(channel.as_mut(), &commands, timeout) => res,
        };
        if let Err(e) = with_deadline("console close", timeout, channel.close()).await {
            debug!(error = %e, "failed to close console connection");
        }
        sent?;

        for label in &plan.to_spawn {
            info!(label = %label, "created new entity");
        }
        for label in &plan.to_despawn {
            info!(label = %label, "removed entity");
        }

        let report = TickReport {
            listed: instances.len(),
            spawned: plan.to_spawn.len(),
            despawned: plan.to_despawn.len(),
        };
        state.commit(desired, &plan);
        Ok(report)
    }

    /// Wrap the reconciler into a supervised task.
    ///
    /// Every attempt runs one tick. The supervisor waits `period` after a successful tick and
    /// backs off after a failed one; the backoff never drops below `period`.
    pub fn into_task(self) -> TaskSpec {
        let restart = RestartPolicy::Always {
            interval: Some(self.cfg.period),
        };
        let backoff = reconcile_backoff(&self.cfg.backoff, self.cfg.period);
        let reconciler = Arc::new(self);

        let task: TaskRef = TaskFn::arc(RECONCILER_TASK, move |ctx: CancellationToken| {
            let reconciler = Arc::clone(&reconciler);
            async move { reconciler.attempt(&ctx).await }
        });
        TaskSpec::new(task, restart, backoff, None)
    }

    async fn attempt(&self, ctx: &CancellationToken) -> Result<(), TaskError> {
        if ctx.is_cancelled() {
            return Err(TaskError::Canceled);
        }
        if self.seed_pending.swap(false, Ordering::AcqRel) {
            tokio::select! {
                _ = ctx.cancelled() => return Err(TaskError::Canceled),
                res = self.seed() => if let Err(e) = res {
                    warn!(error = %e, "failed to seed known entities; starting empty");
                },
            }
        }

        match self.tick(ctx).await {
            Ok(report) => {
                info!(
                    listed = report.listed,
                    spawned = report.spawned,
                    despawned = report.despawned,
                    "reconciliation tick completed"
                );
                Ok(())
            }
            Err(CoreError::Cancelled) => {
                info!("reconciler stopped");
                Err(TaskError::Canceled)
            }
            Err(e) => {
                warn!(error = %e, "reconciliation tick failed");
                Err(to_task_error(e))
            }
        }
    }

    async fn list(&self) -> Result<Vec<WorkloadInstance>, CoreError> {
        let timeout = self.cfg.call_timeout;
        let namespaces = with_deadline(
            "list namespaces",
            timeout,
            self.directory.list_namespaces(&self.cfg.selector),
        )
        .await?;

        let mut instances = Vec::new();
        for namespace in &namespaces {
            let listed = with_deadline(
                "list instances",
                timeout,
                self.directory.list_instances(namespace),
            )
            .await?;
            debug!(namespace = %namespace, count = listed.len(), "listed workload instances");
            instances.extend(listed);
        }
        Ok(instances)
    }

    fn commands(&self, plan: &Plan) -> Vec<Command> {
        let mut rng = rand::thread_rng();
        let mut commands = Vec::with_capacity(1 + plan.to_spawn.len() + plan.to_despawn.len());
        commands.push(Command::Cleanup);
        commands.extend(plan.to_spawn.iter().map(|label| Command::Spawn {
            kind: EntityKind::random(&mut rng),
            position: self.cfg.position,
            label: label.clone(),
        }));
        commands.extend(
            plan.to_despawn
                .iter()
                .map(|label| Command::Despawn { label: label.clone() }),
        );
        commands
    }
}

fn reconcile_backoff(backoff: &BackoffStrategy, period: Duration) -> BackoffPolicy {
    let mut policy = to_backoff_policy(backoff);
    policy.first = policy.first.max(period);
    policy.max = policy.max.max(period);
    policy
}

async fn send_all(
    channel: &mut dyn CommandChannel,
    commands: &[Command],
    timeout: Duration,
) -> Result<(), CoreError> {
    for command in commands {
        let line = command.render();
        debug!(command = %line, "sending console command");
        with_deadline("console write", timeout, channel.send(&line)).await?;
    }
    Ok(())
}
