//! Trust-score value object.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Confidence that a return request is legitimate, in `[0, 1]`.
///
/// Produced by the external trust oracle; compared against the configured
/// approval threshold by the return arbitrator. Immutable once recorded in a
/// return attempt.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrustScore(f64);

impl TrustScore {
    /// Neutral score substituted when the trust oracle is unavailable.
    ///
    /// Deliberate availability-over-correctness trade-off: the return path
    /// must complete even when the fraud signal is down. Under the default
    /// 0.7 threshold a fallback-scored return is never auto-approved.
    pub const FALLBACK: TrustScore = TrustScore(0.5);

    /// Validate a raw oracle value into a score.
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(DomainError::validation(format!(
                "trust score must be in [0, 1], got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Threshold check used by the arbitration decision rule (inclusive).
    pub fn meets(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl core::fmt::Display for TrustScore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}
