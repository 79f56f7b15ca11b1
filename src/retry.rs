use rand::Rng;
use std::time::Duration;

/// Retry budget for detail-page loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// Total attempts including the first one
    pub fn attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Calculate retry delay with exponential backoff and jitter
    pub fn delay_for(&self, attempt: usize) -> Duration {
        if self.initial_delay_ms == 0 {
            return Duration::ZERO;
        }

        // Exponential backoff: base_delay * 2^attempt
        let exp = u32::try_from(attempt).unwrap_or(u32::MAX).min(16);
        let delay_ms = self
            .initial_delay_ms
            .saturating_mul(2u64.pow(exp))
            .min(self.max_delay_ms);

        // Up to 25% jitter
        let jitter = rand::thread_rng().gen_range(0..=delay_ms / 4);

        Duration::from_millis(delay_ms + jitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_retries: usize, initial_delay_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay_ms,
            max_delay_ms: 4000,
        }
    }

    #[test]
    fn test_attempts() {
        assert_eq!(policy(1, 500).attempts(), 2);
        assert_eq!(policy(0, 500).attempts(), 1);
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = RetryPolicy {
            max_retries: 5,
            initial_delay_ms: 100,
            max_delay_ms: 1000,
        };

        let first = policy.delay_for(0);
        assert!(first >= Duration::from_millis(100) && first <= Duration::from_millis(125));

        let third = policy.delay_for(2);
        assert!(third >= Duration::from_millis(400) && third <= Duration::from_millis(500));

        let capped = policy.delay_for(10);
        assert!(capped >= Duration::from_millis(1000) && capped <= Duration::from_millis(1250));
    }

    #[test]
    fn test_zero_delay_policy() {
        assert_eq!(policy(3, 0).delay_for(3), Duration::ZERO);
    }
}
