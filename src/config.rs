//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, VitalsError},
    rating::Thresholds,
};

/// Default number of long animation frames kept for correlation.
///
/// Interactions are reported as soon as their batch arrives, so only the
/// most recent frames can still intersect them.
pub const DEFAULT_LOAF_CAPACITY: usize = 5;

/// Default `durationThreshold` hosts should request from the event-timing observer.
pub const DEFAULT_DURATION_THRESHOLD_MS: f64 = 40.0;

/// Default prefix identifying keyboard events (`keydown`, `keyup`, `keypress`).
pub const DEFAULT_KEY_EVENT_PREFIX: &str = "key";

/// Configuration for a [`VitalsEngine`](crate::VitalsEngine).
///
/// # Example
///
/// ```rust
/// use vitals_attribution::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_loaf_capacity(8)
///     .with_clamp_negative_phases(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Number of long animation frames retained in the ring buffer.
    pub loaf_capacity: usize,
    /// Minimum event duration the host observer should report.
    pub duration_threshold_ms: f64,
    /// Thresholds used to rate each attributed interaction.
    pub interaction_thresholds: Thresholds,
    /// Case-sensitive event-name prefix that marks keyboard interactions.
    pub key_event_prefix: String,
    /// Clamp phase boundaries so no phase of the breakdown is negative.
    pub clamp_negative_phases: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            loaf_capacity: DEFAULT_LOAF_CAPACITY,
            duration_threshold_ms: DEFAULT_DURATION_THRESHOLD_MS,
            interaction_thresholds: Thresholds::INTERACTION,
            key_event_prefix: DEFAULT_KEY_EVENT_PREFIX.to_string(),
            clamp_negative_phases: true,
        }
    }
}

impl EngineConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the long animation frame ring buffer capacity.
    pub fn with_loaf_capacity(mut self, capacity: usize) -> Self {
        self.loaf_capacity = capacity;
        self
    }

    /// Sets the observer duration threshold.
    pub fn with_duration_threshold_ms(mut self, threshold: f64) -> Self {
        self.duration_threshold_ms = threshold;
        self
    }

    /// Sets the interaction rating thresholds.
    pub fn with_interaction_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.interaction_thresholds = thresholds;
        self
    }

    /// Sets the keyboard event-name prefix.
    pub fn with_key_event_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_event_prefix = prefix.into();
        self
    }

    /// Enables or disables clamping of negative phases.
    pub fn with_clamp_negative_phases(mut self, clamp: bool) -> Self {
        self.clamp_negative_phases = clamp;
        self
    }

    /// Checks the configuration for values the engine cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::InvalidConfig`] if the ring buffer capacity is
    /// zero, the duration threshold is negative or not finite, the key prefix
    /// is empty, or the thresholds are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.loaf_capacity == 0 {
            return Err(VitalsError::InvalidConfig(
                "loaf_capacity must be at least 1".to_string(),
            ));
        }
        if !self.duration_threshold_ms.is_finite() || self.duration_threshold_ms < 0.0 {
            return Err(VitalsError::InvalidConfig(format!(
                "duration_threshold_ms must be finite and non-negative, got {}",
                self.duration_threshold_ms
            )));
        }
        if self.key_event_prefix.is_empty() {
            return Err(VitalsError::InvalidConfig(
                "key_event_prefix must not be empty".to_string(),
            ));
        }
        self.interaction_thresholds.validate()
    }
}
