use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

use kc_console::ConsoleConfig;
use kc_core::{Position, ReactorConfig, ReconcilerConfig};
use kc_kube::{KubeConfig, KubeError};
use kc_model::{BackoffStrategy, JitterStrategy};
use kc_observe::{LoggerConfig, LoggerError};
use taskvisor::SupervisorConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Jitter {
    None,
    Full,
    Equal,
    Decorrelated,
}

impl From<Jitter> for JitterStrategy {
    fn from(j: Jitter) -> Self {
        match j {
            Jitter::None => JitterStrategy::None,
            Jitter::Full => JitterStrategy::Full,
            Jitter::Equal => JitterStrategy::Equal,
            Jitter::Decorrelated => JitterStrategy::Decorrelated,
        }
    }
}

/// Mirror cluster workloads into a game world, and remove workloads whose entity gets slain.
#[derive(Debug, Parser)]
#[command(name = "kc-agentd", version)]
pub struct Args {
    /// Websocket URL of the game server console.
    #[arg(long, env = "KC_CONSOLE_URL", default_value = "ws://127.0.0.1:4567/v1/ws/console")]
    pub console_url: String,

    /// Kubernetes API server base URL.
    #[arg(long, env = "KC_API_SERVER", default_value = "https://kubernetes.default.svc")]
    pub api_server: String,

    /// Bearer token for the API server.
    #[arg(long, env = "KC_TOKEN", hide_env_values = true, conflicts_with = "token_file")]
    pub token: Option<String>,

    /// File holding the bearer token. Defaults to the in-cluster service account token.
    #[arg(long, env = "KC_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    /// Extra PEM bundle to trust for the API server.
    #[arg(long, env = "KC_CA_FILE")]
    pub ca_file: Option<PathBuf>,

    #[arg(long, env = "KC_INSECURE_SKIP_TLS_VERIFY")]
    pub insecure_skip_tls_verify: bool,

    /// Label selector of the namespaces to mirror.
    #[arg(long, env = "KC_SELECTOR", default_value = "flinktoid=true")]
    pub selector: String,

    #[arg(long, env = "KC_PERIOD_MS", default_value_t = 30_000)]
    pub period_ms: u64,

    /// Deadline for every API server and console call.
    #[arg(long, env = "KC_CALL_TIMEOUT_MS", default_value_t = 10_000)]
    pub call_timeout_ms: u64,

    /// Reconnect to a silent console after this long; 0 waits forever.
    #[arg(long, env = "KC_READ_IDLE_TIMEOUT_MS", default_value_t = 300_000)]
    pub read_idle_timeout_ms: u64,

    #[arg(long, env = "KC_BACKOFF_FIRST_MS", default_value_t = 1_000)]
    pub backoff_first_ms: u64,

    #[arg(long, env = "KC_BACKOFF_MAX_MS", default_value_t = 60_000)]
    pub backoff_max_ms: u64,

    #[arg(long, env = "KC_BACKOFF_FACTOR", default_value_t = 2.0)]
    pub backoff_factor: f64,

    #[arg(long, env = "KC_JITTER", value_enum, default_value_t = Jitter::Equal)]
    pub jitter: Jitter,

    /// Treat the first listing as already present in the world.
    #[arg(long, env = "KC_SEED_KNOWN")]
    pub seed_known: bool,

    #[arg(long, env = "KC_SPAWN_X", default_value_t = -201, allow_negative_numbers = true)]
    pub spawn_x: i32,

    #[arg(long, env = "KC_SPAWN_Y", default_value_t = 64, allow_negative_numbers = true)]
    pub spawn_y: i32,

    #[arg(long, env = "KC_SPAWN_Z", default_value_t = -499, allow_negative_numbers = true)]
    pub spawn_z: i32,

    #[arg(long, env = "KC_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// text | json | journald
    #[arg(long, env = "KC_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log busy/idle time of every closed span (reconciliation ticks, API calls).
    #[arg(long, env = "KC_LOG_SPAN_TIMINGS")]
    pub log_span_timings: bool,

    /// How long the supervisor waits for both loops after a shutdown signal.
    #[arg(long, env = "KC_SHUTDOWN_GRACE_MS", default_value_t = 5_000)]
    pub shutdown_grace_ms: u64,
}

impl Args {
    pub fn logger(&self) -> Result<LoggerConfig, LoggerError> {
        Ok(LoggerConfig {
            format: self.log_format.parse()?,
            level: self.log_level.clone(),
            span_timings: self.log_span_timings,
            ..LoggerConfig::default()
        })
    }

    pub fn kube(&self) -> Result<KubeConfig, KubeError> {
        let mut cfg = KubeConfig::new(&self.api_server);
        cfg.timeout = self.call_timeout();
        cfg.insecure_skip_tls_verify = self.insecure_skip_tls_verify;

        if let Some(token) = &self.token {
            cfg = cfg.with_token(token);
        } else if let Some(path) = &self.token_file {
            cfg = cfg.with_token_file(path)?;
        }
        if let Some(path) = &self.ca_file {
            cfg = cfg.with_ca_file(path)?;
        }
        cfg.with_service_account()
    }

    pub fn console(&self) -> ConsoleConfig {
        ConsoleConfig::new(&self.console_url)
    }

    pub fn reconciler(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            selector: self.selector.clone(),
            period: Duration::from_millis(self.period_ms),
            call_timeout: self.call_timeout(),
            position: Position {
                x: self.spawn_x,
                y: self.spawn_y,
                z: self.spawn_z,
            },
            backoff: self.backoff(),
            seed_known: self.seed_known,
        }
    }

    pub fn reactor(&self) -> ReactorConfig {
        ReactorConfig {
            call_timeout: self.call_timeout(),
            read_idle_timeout: (self.read_idle_timeout_ms > 0)
                .then(|| Duration::from_millis(self.read_idle_timeout_ms)),
            backoff: self.backoff(),
        }
    }

    pub fn supervisor(&self) -> SupervisorConfig {
        SupervisorConfig {
            grace: Duration::from_millis(self.shutdown_grace_ms),
            ..SupervisorConfig::default()
        }
    }

    fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    fn backoff(&self) -> BackoffStrategy {
        BackoffStrategy {
            jitter: self.jitter.into(),
            first_ms: self.backoff_first_ms,
            max_ms: self.backoff_max_ms,
            factor: self.backoff_factor,
        }
    }
}
