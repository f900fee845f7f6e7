//! Page-level statistics over attributed interactions.
//!
//! This module turns the stream of per-interaction results into page-level
//! numbers:
//!
//! - [`InpEstimator`]: Tracks the worst interactions and estimates the page's INP
//! - [`LatencyStats`]: Statistical summary of interaction latencies
//!
//! # Example: Estimating INP
//!
//! ```rust
//! use vitals_attribution::{
//!     entry::TimingEntry, timing::InpEstimator, VitalsEngine,
//! };
//!
//! let mut engine = VitalsEngine::default();
//! let mut estimator = InpEstimator::new();
//!
//! for (id, duration) in [(1, 80.0), (2, 320.0), (3, 120.0)] {
//!     let start = id as f64 * 1000.0;
//!     let batch = vec![TimingEntry::new("click", start, duration)
//!         .with_processing(start + 5.0, start + 20.0)
//!         .with_interaction_id(id)];
//!     for metric in engine.on_event_timing(batch) {
//!         estimator.record(&metric);
//!     }
//! }
//!
//! assert_eq!(estimator.estimate(), Some(320.0));
//! ```
//!
//! # Example: Latency Statistics
//!
//! ```rust
//! use vitals_attribution::timing::LatencyStats;
//!
//! let stats = LatencyStats::from_samples(vec![48.0, 96.0, 240.0, 64.0]).unwrap();
//! println!("p75: {:.2}ms", stats.p75);
//! assert_eq!(stats.max, 240.0);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::attribution::AttributedMetric;

/// Number of worst interactions retained for the INP estimate.
const MAX_CANDIDATES: usize = 10;

/// One interaction skipped from the top per this many interactions.
const INTERACTIONS_PER_SKIP: usize = 50;

/// The worst observed latency of one interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InpCandidate {
    /// Interaction identifier, `None` for fallback groups.
    pub interaction_id: Option<u64>,
    /// Latency in milliseconds.
    pub latency: f64,
    /// The attributed metric that produced this latency.
    pub metric: AttributedMetric,
}

/// Estimates Interaction to Next Paint from attributed interactions.
///
/// INP is approximately the 98th percentile of interaction latency: with
/// fewer than 50 interactions it is the worst one, and one more outlier is
/// ignored for every further 50 interactions. Only the longest
/// [`MAX_CANDIDATES`] interactions need to be kept for that.
#[derive(Debug, Clone, Default)]
pub struct InpEstimator {
    /// Worst interactions, longest first.
    candidates: Vec<InpCandidate>,
    /// Distinct interaction ids seen so far.
    seen: HashSet<u64>,
    /// Interactions without an id (fallback groups).
    anonymous: usize,
}

impl InpEstimator {
    /// Creates an empty estimator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all state, e.g. on a new navigation.
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.seen.clear();
        self.anonymous = 0;
    }

    /// Records one attributed interaction.
    ///
    /// A repeated interaction id only replaces its candidate if the new
    /// latency is longer.
    pub fn record(&mut self, metric: &AttributedMetric) {
        let interaction_id = metric.interaction_id();
        let latency = metric.value;

        match interaction_id {
            Some(id) => {
                self.seen.insert(id);
            }
            None => self.anonymous += 1,
        }

        let existing = interaction_id.and_then(|id| {
            self.candidates
                .iter()
                .position(|candidate| candidate.interaction_id == Some(id))
        });

        match existing {
            Some(index) => {
                let candidate = &mut self.candidates[index];
                if latency > candidate.latency {
                    candidate.latency = latency;
                    candidate.metric = metric.clone();
                }
            }
            None => {
                let shortest = self.candidates.last().map(|c| c.latency);
                if self.candidates.len() < MAX_CANDIDATES || shortest.is_some_and(|s| latency > s) {
                    self.candidates.push(InpCandidate {
                        interaction_id,
                        latency,
                        metric: metric.clone(),
                    });
                }
            }
        }

        self.candidates.sort_by(|a, b| b.latency.total_cmp(&a.latency));
        self.candidates.truncate(MAX_CANDIDATES);
    }

    /// Number of distinct interactions recorded.
    pub fn interaction_count(&self) -> usize {
        self.seen.len() + self.anonymous
    }

    /// Worst retained interactions, longest first.
    pub fn candidates(&self) -> &[InpCandidate] {
        &self.candidates
    }

    /// The candidate currently chosen as the page's INP.
    pub fn estimate_candidate(&self) -> Option<&InpCandidate> {
        if self.candidates.is_empty() {
            return None;
        }
        let index = (self.interaction_count() / INTERACTIONS_PER_SKIP).min(self.candidates.len() - 1);
        self.candidates.get(index)
    }

    /// Estimated INP in milliseconds.
    pub fn estimate(&self) -> Option<f64> {
        self.estimate_candidate().map(|candidate| candidate.latency)
    }
}

/// Statistical summary of interaction latencies in milliseconds.
///
/// # Example
///
/// ```rust
/// use vitals_attribution::timing::LatencyStats;
///
/// let stats = LatencyStats::from_samples(vec![10.0, 15.0, 12.0, 20.0, 11.0]).unwrap();
/// assert_eq!(stats.count, 5);
/// assert_eq!(stats.median, 12.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Number of samples
    pub count: usize,
    /// Minimum latency
    pub min: f64,
    /// Maximum latency
    pub max: f64,
    /// Mean (average) latency
    pub mean: f64,
    /// Median (50th percentile) latency
    pub median: f64,
    /// 75th percentile latency, the Web Vitals reporting percentile
    pub p75: f64,
    /// 98th percentile latency
    pub p98: f64,
}

impl LatencyStats {
    /// Creates latency statistics from a collection of samples.
    ///
    /// Non-finite samples are ignored. Returns `None` if no sample remains.
    pub fn from_samples(samples: Vec<f64>) -> Option<Self> {
        let mut samples: Vec<f64> = samples.into_iter().filter(|s| s.is_finite()).collect();
        if samples.is_empty() {
            return None;
        }

        samples.sort_by(f64::total_cmp);
        let count = samples.len();

        let min = samples[0];
        let max = samples[count - 1];
        let mean = samples.iter().sum::<f64>() / count as f64;

        let median = percentile(&samples, 50.0);
        let p75 = percentile(&samples, 75.0);
        let p98 = percentile(&samples, 98.0);

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            p75,
            p98,
        })
    }

    /// Statistics over the values of attributed interactions.
    pub fn from_metrics<'a, I>(metrics: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a AttributedMetric>,
    {
        Self::from_samples(metrics.into_iter().map(|metric| metric.value).collect())
    }

    /// Returns a formatted summary string.
    ///
    /// # Example Output
    ///
    /// ```text
    /// Interaction Latency (12 samples):
    ///   Min: 48.00ms
    ///   Max: 312.00ms
    ///   Mean: 121.33ms
    ///   Median: 96.00ms
    ///   p75: 152.00ms
    ///   p98: 301.44ms
    /// ```
    pub fn summary(&self) -> String {
        format!(
            "Interaction Latency ({} samples):\n\
             Min: {:.2}ms\n\
             Max: {:.2}ms\n\
             Mean: {:.2}ms\n\
             Median: {:.2}ms\n\
             p75: {:.2}ms\n\
             p98: {:.2}ms",
            self.count, self.min, self.max, self.mean, self.median, self.p75, self.p98
        )
    }
}

/// Calculates a percentile from sorted data with linear interpolation.
///
/// `sorted_data` must be non-empty; callers in this module guarantee it.
fn percentile(sorted_data: &[f64], percentile: f64) -> f64 {
    let index = (percentile / 100.0) * (sorted_data.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted_data[lower]
    } else {
        let weight = index - lower as f64;
        sorted_data[lower] * (1.0 - weight) + sorted_data[upper] * weight
    }
}
