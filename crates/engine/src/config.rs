//! Engine configuration.

use std::time::Duration;

use truetag_core::{DomainError, DomainResult};

/// Tunables for the arbitration policy and oracle calls.
///
/// Constructed once at process start; the engine is stateless between calls
/// aside from this and the token secret.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Inclusive trust-score threshold for auto-approving a return.
    pub approval_threshold: f64,
    /// Per-call deadline for oracle requests.
    pub oracle_timeout: Duration,
    /// Compare-and-set retries before a return request gives up with a
    /// concurrency conflict.
    pub max_save_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            approval_threshold: 0.7,
            oracle_timeout: Duration::from_secs(5),
            max_save_retries: 3,
        }
    }
}

impl EngineConfig {
    /// Load overrides from the environment (`APPROVAL_THRESHOLD`,
    /// `ORACLE_TIMEOUT_MS`), falling back to defaults.
    pub fn from_env() -> DomainResult<Self> {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("APPROVAL_THRESHOLD") {
            let threshold: f64 = raw.parse().map_err(|_| {
                DomainError::configuration(format!("APPROVAL_THRESHOLD not a number: {raw}"))
            })?;
            if !(0.0..=1.0).contains(&threshold) {
                return Err(DomainError::configuration(format!(
                    "APPROVAL_THRESHOLD must be in [0, 1], got {threshold}"
                )));
            }
            config.approval_threshold = threshold;
        }

        if let Ok(raw) = std::env::var("ORACLE_TIMEOUT_MS") {
            let millis: u64 = raw.parse().map_err(|_| {
                DomainError::configuration(format!("ORACLE_TIMEOUT_MS not a number: {raw}"))
            })?;
            config.oracle_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let c = EngineConfig::default();
        assert_eq!(c.approval_threshold, 0.7);
        assert_eq!(c.oracle_timeout, Duration::from_secs(5));
    }
}
