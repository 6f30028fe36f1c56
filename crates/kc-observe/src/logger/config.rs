use std::io::IsTerminal;

use crate::logger::format::LoggerFormat;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `kc_core=debug,info`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
    /// Emit one record when an instrumented span (a reconciliation tick, a directory call) closes,
    /// carrying its busy and idle time. Ignored by journald.
    pub span_timings: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: "info".to_string(),
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
            span_timings: false,
        }
    }
}
