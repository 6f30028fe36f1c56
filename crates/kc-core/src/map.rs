//! Adapter between `kc-model` retry values and the taskvisor runtime.
use std::time::Duration;

use kc_model::{BackoffStrategy, JitterStrategy};
use taskvisor::{BackoffPolicy, JitterPolicy, TaskError};

use crate::error::CoreError;

pub fn to_jitter_policy(jitter: JitterStrategy) -> JitterPolicy {
    match jitter {
        JitterStrategy::None => JitterPolicy::None,
        JitterStrategy::Full => JitterPolicy::Full,
        JitterStrategy::Equal => JitterPolicy::Equal,
        JitterStrategy::Decorrelated => JitterPolicy::Decorrelated,
    }
}

pub fn to_backoff_policy(backoff: &BackoffStrategy) -> BackoffPolicy {
    BackoffPolicy {
        first: Duration::from_millis(backoff.first_ms),
        max: Duration::from_millis(backoff.max_ms),
        factor: backoff.factor,
        jitter: to_jitter_policy(backoff.jitter),
    }
}

/// Failed attempts are retried by the supervisor unless the error can never heal.
pub fn to_task_error(err: CoreError) -> TaskError {
    match err {
        CoreError::Cancelled => TaskError::Canceled,
        e if e.is_transient() => TaskError::Fail {
            reason: e.to_string(),
        },
        e => TaskError::Fatal {
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChannelError;

    #[test]
    fn backoff_is_carried_over_in_milliseconds() {
        let policy = to_backoff_policy(&BackoffStrategy {
            jitter: JitterStrategy::None,
            first_ms: 250,
            max_ms: 4_000,
            factor: 3.0,
        });
        assert_eq!(policy.first, Duration::from_millis(250));
        assert_eq!(policy.max, Duration::from_secs(4));
        assert_eq!(policy.factor, 3.0);
        assert_eq!(policy.jitter, JitterPolicy::None);
    }

    #[test]
    fn every_jitter_has_a_counterpart() {
        assert_eq!(to_jitter_policy(JitterStrategy::Full), JitterPolicy::Full);
        assert_eq!(to_jitter_policy(JitterStrategy::Equal), JitterPolicy::Equal);
        assert_eq!(
            to_jitter_policy(JitterStrategy::Decorrelated),
            JitterPolicy::Decorrelated
        );
    }

    #[test]
    fn connectivity_errors_are_retryable() {
        let err = to_task_error(CoreError::Channel(ChannelError::Closed));
        assert!(err.is_retryable());
        let err = to_task_error(CoreError::Timeout {
            op: "console connect",
            ms: 10,
        });
        assert!(err.is_retryable());
    }

    #[test]
    fn config_errors_are_fatal_and_cancel_is_cancel() {
        assert!(to_task_error(CoreError::InvalidConfig("bad".into())).is_fatal());
        assert!(matches!(
            to_task_error(CoreError::Cancelled),
            TaskError::Canceled
        ));
    }
}
