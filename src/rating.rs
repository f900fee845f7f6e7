//! Three-level qualitative ratings.
//!
//! Every Web Vital is scored against a pair of thresholds: values at or
//! below `good` rate [`Rating::Good`], values at or below `poor` rate
//! [`Rating::NeedsImprovement`], and everything above rates [`Rating::Poor`].
//!
//! # Example
//!
//! ```rust
//! use vitals_attribution::rating::{rate, Rating};
//!
//! assert_eq!(rate(200.0), Rating::Good);
//! assert_eq!(rate(240.0), Rating::NeedsImprovement);
//! assert_eq!(rate(501.0), Rating::Poor);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VitalsError};

/// Qualitative bucket for a metric value.
///
/// Ordered from best to worst, so `Rating::Good < Rating::Poor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rating {
    /// At or below the good threshold.
    Good,
    /// Above good, at or below poor.
    NeedsImprovement,
    /// Above the poor threshold.
    Poor,
}

impl Rating {
    /// Returns the wire name (`"good"`, `"needs-improvement"`, `"poor"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::Good => "good",
            Rating::NeedsImprovement => "needs-improvement",
            Rating::Poor => "poor",
        }
    }

    /// Returns the display colour used by badge and overlay collaborators.
    pub fn color(&self) -> &'static str {
        match self {
            Rating::Good => "#0CCE6A",
            Rating::NeedsImprovement => "#FFA400",
            Rating::Poor => "#FF4E42",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bounds for the good and needs-improvement buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Largest value still rated good.
    pub good: f64,
    /// Largest value still rated needs-improvement.
    pub poor: f64,
}

impl Thresholds {
    /// Interaction latency thresholds in milliseconds (200 / 500).
    pub const INTERACTION: Thresholds = Thresholds {
        good: 200.0,
        poor: 500.0,
    };

    /// Creates a validated threshold pair.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::InvalidConfig`] unless both bounds are finite,
    /// non-negative and `good < poor`.
    pub fn new(good: f64, poor: f64) -> Result<Self> {
        let thresholds = Self { good, poor };
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Checks the invariants documented on [`Thresholds::new`].
    pub fn validate(&self) -> Result<()> {
        if !self.good.is_finite() || !self.poor.is_finite() || self.good < 0.0 {
            return Err(VitalsError::InvalidConfig(format!(
                "thresholds must be finite and non-negative (good={}, poor={})",
                self.good, self.poor
            )));
        }
        if self.good >= self.poor {
            return Err(VitalsError::InvalidConfig(format!(
                "good threshold {} must be below poor threshold {}",
                self.good, self.poor
            )));
        }
        Ok(())
    }

    /// Classifies `value` against these thresholds.
    pub fn rate(&self, value: f64) -> Rating {
        if value <= self.good {
            Rating::Good
        } else if value <= self.poor {
            Rating::NeedsImprovement
        } else {
            Rating::Poor
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::INTERACTION
    }
}

/// Rates an interaction duration in milliseconds.
///
/// Callers must not pass negative or NaN durations.
pub fn rate(duration_ms: f64) -> Rating {
    Thresholds::INTERACTION.rate(duration_ms)
}
