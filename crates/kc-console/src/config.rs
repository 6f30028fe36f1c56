use crate::error::ConsoleError;

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Full websocket URL, e.g. `ws://127.0.0.1:4567/v1/ws/console`.
    pub url: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:4567/v1/ws/console".to_string(),
        }
    }
}

impl ConsoleConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn validate(&self) -> Result<(), ConsoleError> {
        let rest = self
            .url
            .strip_prefix("ws://")
            .or_else(|| self.url.strip_prefix("wss://"))
            .ok_or_else(|| ConsoleError::InvalidUrl(self.url.clone()))?;
        if rest.is_empty() || rest.starts_with('/') {
            return Err(ConsoleError::InvalidUrl(self.url.clone()));
        }
        Ok(())
    }
}
