//! Page-level scoring for toolbar badge and overlay collaborators.
//!
//! The badge tracks the latest LCP, CLS, FID and INP values of the current
//! navigation. LCP, CLS and FID decide the overall score; INP failing only
//! marks its own slot, so a single slow interaction never turns the page
//! icon red.
//!
//! # Example
//!
//! ```rust
//! use vitals_attribution::{
//!     badge::{BadgeMetrics, OverallScore},
//!     metric::Metric,
//! };
//!
//! let mut badge = BadgeMetrics::new(1_700_000_000_000.0);
//! assert_eq!(badge.update(&Metric::Lcp { value: 1800.0, attribution: None }), OverallScore::Good);
//! assert_eq!(badge.update(&Metric::Cls { value: 0.4, shifts: vec![] }), OverallScore::Poor);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    metric::{Metric, MetricKind},
    rating::Rating,
};

/// Share of the overlay bar given to each rating bucket.
const BUCKET_DISTRIBUTION: [f64; 3] = [0.33, 0.33, 0.33];

/// Overall page verdict shown by the toolbar icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallScore {
    /// Every scored metric is within its good threshold.
    Good,
    /// At least one scored metric exceeded its good threshold.
    Poor,
}

/// Latest value of one badge metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BadgeSlot {
    /// Latest value, `None` until first reported.
    pub value: Option<f64>,
    /// Cleared once the value has exceeded the good threshold.
    pub pass: bool,
}

impl Default for BadgeSlot {
    fn default() -> Self {
        Self { value: None, pass: true }
    }
}

/// Badge metrics for one navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeMetrics {
    /// Largest Contentful Paint.
    pub lcp: BadgeSlot,
    /// Cumulative Layout Shift.
    pub cls: BadgeSlot,
    /// First Input Delay.
    pub fid: BadgeSlot,
    /// Interaction to Next Paint.
    pub inp: BadgeSlot,
    /// Navigation these values belong to.
    pub navigation_start: f64,
}

impl BadgeMetrics {
    /// Creates empty slots for the navigation starting at `navigation_start`.
    pub fn new(navigation_start: f64) -> Self {
        Self {
            lcp: BadgeSlot::default(),
            cls: BadgeSlot::default(),
            fid: BadgeSlot::default(),
            inp: BadgeSlot::default(),
            navigation_start,
        }
    }

    /// Restores persisted state if it belongs to `navigation_start`, else starts fresh.
    pub fn restore(saved: Option<BadgeMetrics>, navigation_start: f64) -> Self {
        match saved {
            Some(saved) if saved.navigation_start == navigation_start => saved,
            _ => Self::new(navigation_start),
        }
    }

    /// Slot for `kind`, if it is a badge metric.
    pub fn slot(&self, kind: MetricKind) -> Option<&BadgeSlot> {
        match kind {
            MetricKind::Lcp => Some(&self.lcp),
            MetricKind::Cls => Some(&self.cls),
            MetricKind::Fid => Some(&self.fid),
            MetricKind::Inp => Some(&self.inp),
            _ => None,
        }
    }

    fn slot_mut(&mut self, kind: MetricKind) -> Option<&mut BadgeSlot> {
        match kind {
            MetricKind::Lcp => Some(&mut self.lcp),
            MetricKind::Cls => Some(&mut self.cls),
            MetricKind::Fid => Some(&mut self.fid),
            MetricKind::Inp => Some(&mut self.inp),
            _ => None,
        }
    }

    /// Stores a reported metric and rescores the page.
    ///
    /// Kinds without a badge slot (FCP, TTFB, single interactions) are
    /// ignored.
    pub fn update(&mut self, metric: &Metric) -> OverallScore {
        match self.slot_mut(metric.kind()) {
            Some(slot) => slot.value = Some(metric.value()),
            None => debug!(kind = %metric.kind(), "metric has no badge slot"),
        }
        self.score()
    }

    /// Scores the page, clearing `pass` on any slot over its good threshold.
    pub fn score(&mut self) -> OverallScore {
        let mut overall = OverallScore::Good;

        for kind in [MetricKind::Lcp, MetricKind::Cls, MetricKind::Fid, MetricKind::Inp] {
            let good = kind.thresholds().good;
            let Some(slot) = self.slot_mut(kind) else {
                continue;
            };
            if slot.value.is_some_and(|value| value > good) {
                slot.pass = false;
                if kind != MetricKind::Inp {
                    overall = OverallScore::Poor;
                }
            }
        }

        overall
    }

    /// Captures the current state for display collaborators.
    pub fn snapshot(&mut self, url: Option<String>) -> BadgeSnapshot {
        BadgeSnapshot {
            score: self.score(),
            metrics: self.clone(),
            url,
            timestamp: Utc::now(),
        }
    }
}

/// Point-in-time badge state handed to background and popup collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeSnapshot {
    /// Overall verdict.
    pub score: OverallScore,
    /// Slot values.
    pub metrics: BadgeMetrics,
    /// Page the values were measured on.
    pub url: Option<String>,
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
}

/// Text shown on the badge for a metric that is not good.
///
/// Returns `None` when nothing should be shown: good LCP or CLS, good or
/// unrated INP, and kinds that never badge.
pub fn badge_text(kind: MetricKind, value: f64, rating: Option<Rating>) -> Option<String> {
    match (kind, rating) {
        (MetricKind::Lcp | MetricKind::Cls, Some(Rating::Good)) => None,
        (MetricKind::Inp, None | Some(Rating::Good)) => None,
        (MetricKind::Lcp, _) => Some(format!("{:.2}", value / 1000.0)),
        (MetricKind::Cls, _) => Some(format!("{:.2}", value)),
        (MetricKind::Inp, _) => Some(format!("{:.0}", value)),
        _ => None,
    }
}

/// Horizontal position of a local value on the overlay bar, in percent.
///
/// The bar is split into equal good / needs-improvement / poor buckets.
/// The poor bucket is open ended, so values beyond it are placed
/// proportionally up to 95% of its width, reached at `poor * 2.5` past the
/// poor threshold.
pub fn relative_position(kind: MetricKind, value: f64) -> f64 {
    let thresholds = kind.thresholds();
    let (good, poor) = (thresholds.good, thresholds.poor);
    let [good_share, middle_share, poor_share] = BUCKET_DISTRIBUTION;

    let fraction = if value < good {
        value * good_share / good
    } else if value >= poor {
        ((value - poor) / (poor * 2.5)).min(0.95) * poor_share + good_share + middle_share
    } else {
        (value - good) * middle_share / (poor - good) + good_share
    };

    fraction * 100.0
}
