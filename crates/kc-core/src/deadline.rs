use std::{future::Future, time::Duration};

use crate::error::CoreError;

/// Run `fut` with an upper bound on its duration.
///
/// Expiry is reported as [`CoreError::Timeout`] tagged with `op`.
pub async fn with_deadline<T, E, F>(op: &'static str, limit: Duration, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, E>>,
    CoreError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res.map_err(CoreError::from),
        Err(_) => Err(CoreError::Timeout {
            op,
            ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
