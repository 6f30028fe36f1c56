use serde::Deserialize;

/// Severity of the only events that may carry a kill notification.
pub const LEVEL_INFO: &str = "INFO";

/// Log record pushed by the game server console.
///
/// Example payload:
/// `{"message": "... died: default_nginx was slain by Steve", "timestampMillis": 1631834015918, "loggerName": "", "level": "INFO"}`
///
/// Missing fields fall back to their defaults; a field of the wrong type is a decode error.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsoleEvent {
    pub message: String,
    pub timestamp_millis: i64,
    pub logger_name: String,
    pub level: String,
}

impl ConsoleEvent {
    #[inline]
    pub fn is_info(&self) -> bool {
        self.level == LEVEL_INFO
    }
}
