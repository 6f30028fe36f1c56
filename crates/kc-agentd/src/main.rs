mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use kc_console::WsConnector;
use kc_core::{Connector, Reactor, Reconciler, SlainMessageParser, WorkloadDirectory};
use kc_kube::KubeDirectory;
use kc_observe::{TaskLog, logger_init};
use taskvisor::{Subscribe, Supervisor};

use crate::config::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1) Logger
    logger_init(&args.logger()?)?;
    info!("logger initialized");

    // 2) Collaborators
    let kube = args.kube().context("kubernetes configuration")?;
    let directory: Arc<dyn WorkloadDirectory> =
        Arc::new(KubeDirectory::new(&kube).context("kubernetes client")?);
    let connector: Arc<dyn Connector> =
        Arc::new(WsConnector::new(args.console()).context("console configuration")?);
    info!(api_server = %kube.api_server, console = %args.console_url, "collaborators configured");

    // 3) Tasks
    let reconciler_cfg = args.reconciler();
    reconciler_cfg.validate()?;
    let reactor_cfg = args.reactor();
    reactor_cfg.validate()?;

    let reconciler =
        Reconciler::new(reconciler_cfg, Arc::clone(&directory), Arc::clone(&connector)).into_task();
    let reactor = Reactor::new(
        reactor_cfg,
        directory,
        connector,
        Arc::new(SlainMessageParser::new()),
    )
    .into_task();

    // 4) Supervisor: runs both loops until SIGINT/SIGTERM, then waits out the grace period
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(TaskLog::new())];
    let supervisor = Supervisor::new(args.supervisor(), subscribers);
    info!(selector = %args.selector, "reconciler and reactor submitted");

    supervisor.run(vec![reconciler, reactor]).await?;
    info!("agent stopped");
    Ok(())
}
