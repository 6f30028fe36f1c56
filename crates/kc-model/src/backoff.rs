/// Randomisation applied on top of the exponential delay.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum JitterStrategy {
    /// Use the computed delay as is.
    None,
    /// Uniform in `[0, delay]`.
    Full,
    /// Uniform in `[delay / 2, delay]`.
    #[default]
    Equal,
    /// Uniform between the first delay and three times the previous one, capped.
    Decorrelated,
}

/// Exponential retry policy: the first delay is `first_ms`, every following one is the previous
/// delay times `factor`, capped at `max_ms`, then jittered.
#[derive(Clone, Debug, PartialEq)]
pub struct BackoffStrategy {
    pub jitter: JitterStrategy,
    pub first_ms: u64,
    pub max_ms: u64,
    pub factor: f64,
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self {
            jitter: JitterStrategy::Equal,
            first_ms: 1_000,
            max_ms: 60_000,
            factor: 2.0,
        }
    }
}

impl BackoffStrategy {
    /// A zero delay or a shrinking factor would turn retries into a busy loop.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.first_ms == 0 {
            return Err("backoff first delay must be positive");
        }
        if self.max_ms < self.first_ms {
            return Err("backoff max delay must not be below the first delay");
        }
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err("backoff factor must be a finite number >= 1.0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(first_ms: u64, max_ms: u64, factor: f64) -> BackoffStrategy {
        BackoffStrategy {
            jitter: JitterStrategy::None,
            first_ms,
            max_ms,
            factor,
        }
    }

    #[test]
    fn default_is_valid() {
        assert_eq!(BackoffStrategy::default().validate(), Ok(()));
    }

    #[test]
    fn zero_delays_are_rejected() {
        assert!(strategy(0, 0, 2.0).validate().is_err());
        assert!(strategy(0, 1_000, 2.0).validate().is_err());
    }

    #[test]
    fn cap_below_first_delay_is_rejected() {
        assert!(strategy(500, 100, 2.0).validate().is_err());
        assert_eq!(strategy(500, 500, 1.0).validate(), Ok(()));
    }

    #[test]
    fn shrinking_or_nan_factor_is_rejected() {
        assert!(strategy(100, 1_000, 0.5).validate().is_err());
        assert!(strategy(100, 1_000, f64::NAN).validate().is_err());
        assert!(strategy(100, 1_000, f64::INFINITY).validate().is_err());
    }
}
