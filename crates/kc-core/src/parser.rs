//! Console event decoding.
//!
//! The game server reports an entity kill only as a human-readable log line. Since every entity
//! is named after its workload instance, the line `<namespace>_<name> was slain by <player>` is
//! enough to recover which instance the player targeted.
use std::sync::LazyLock;

use kc_model::{ConsoleEvent, KillNotification};
use regex::Regex;

use crate::error::ParseError;

/// Turns one raw console payload into an optional kill request.
///
/// - `Ok(Some(_))`: the event names a workload instance to terminate.
/// - `Ok(None)`: a valid event that carries no request.
/// - `Err(_)`: the payload is not an event record at all.
pub trait MessageParser: Send + Sync {
    fn parse(&self, raw: &str) -> Result<Option<KillNotification>, ParseError>;
}

// The victim must start at a word boundary: `Default_nginx` must not yield namespace `efault`.
static SLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_-])([a-z0-9-]+)_([a-z0-9-]+) was slain by ")
        .expect("slain pattern is valid")
});

/// Matches the vanilla `"<victim> was slain by <killer>"` death message.
#[derive(Clone, Debug)]
pub struct SlainMessageParser {
    pattern: Regex,
}

impl SlainMessageParser {
    pub fn new() -> Self {
        Self {
            pattern: SLAIN.clone(),
        }
    }

    fn extract(&self, message: &str) -> Option<KillNotification> {
        let mut hits = self.pattern.captures_iter(message);
        let caps = hits.next()?;
        if hits.next().is_some() {
            return None;
        }
        Some(KillNotification::new(&caps[1], &caps[2]))
    }
}

impl Default for SlainMessageParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageParser for SlainMessageParser {
    fn parse(&self, raw: &str) -> Result<Option<KillNotification>, ParseError> {
        let event: ConsoleEvent = serde_json::from_str(raw)?;
        if !event.is_info() {
            return Ok(None);
        }
        Ok(self.extract(&event.message))
    }
}
