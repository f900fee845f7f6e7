//! Tagged model of every Web Vital the monitor reports.
//!
//! Each metric kind carries only the attribution meaningful to it, rather
//! than one loosely typed record with optional fields for every kind.
//!
//! # Example
//!
//! ```rust
//! use vitals_attribution::{
//!     metric::{Metric, MetricKind},
//!     rating::Rating,
//! };
//!
//! let lcp = Metric::Lcp { value: 3100.0, attribution: None };
//! assert_eq!(lcp.kind(), MetricKind::Lcp);
//! assert_eq!(lcp.rating(), Rating::NeedsImprovement);
//!
//! let kind: MetricKind = "cls".parse().unwrap();
//! assert_eq!(kind.thresholds().poor, 0.25);
//! ```

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    attribution::AttributedMetric,
    entry::TimingEntry,
    error::VitalsError,
    rating::{Rating, Thresholds},
};

/// Which Web Vital a value measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    /// Largest Contentful Paint (ms).
    #[serde(rename = "LCP")]
    Lcp,
    /// Cumulative Layout Shift (unitless).
    #[serde(rename = "CLS")]
    Cls,
    /// First Input Delay (ms).
    #[serde(rename = "FID")]
    Fid,
    /// Interaction to Next Paint (ms).
    #[serde(rename = "INP")]
    Inp,
    /// First Contentful Paint (ms).
    #[serde(rename = "FCP")]
    Fcp,
    /// Time to First Byte (ms).
    #[serde(rename = "TTFB")]
    Ttfb,
    /// A single attributed interaction (ms).
    #[serde(rename = "Interaction")]
    Interaction,
}

impl MetricKind {
    /// Every kind, in badge display order.
    pub const ALL: [MetricKind; 7] = [
        MetricKind::Lcp,
        MetricKind::Cls,
        MetricKind::Fid,
        MetricKind::Inp,
        MetricKind::Fcp,
        MetricKind::Ttfb,
        MetricKind::Interaction,
    ];

    /// Short display name (`"LCP"`, `"CLS"`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::Lcp => "LCP",
            MetricKind::Cls => "CLS",
            MetricKind::Fid => "FID",
            MetricKind::Inp => "INP",
            MetricKind::Fcp => "FCP",
            MetricKind::Ttfb => "TTFB",
            MetricKind::Interaction => "Interaction",
        }
    }

    /// Human readable title.
    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::Lcp => "Largest Contentful Paint",
            MetricKind::Cls => "Cumulative Layout Shift",
            MetricKind::Fid => "First Input Delay",
            MetricKind::Inp => "Interaction to Next Paint",
            MetricKind::Fcp => "First Contentful Paint",
            MetricKind::Ttfb => "Time to First Byte",
            MetricKind::Interaction => "Interaction",
        }
    }

    /// Fixed good / poor thresholds for this kind.
    pub fn thresholds(&self) -> Thresholds {
        let (good, poor) = match self {
            MetricKind::Lcp => (2500.0, 4000.0),
            MetricKind::Cls => (0.1, 0.25),
            MetricKind::Fid => (100.0, 300.0),
            MetricKind::Inp | MetricKind::Interaction => (200.0, 500.0),
            MetricKind::Fcp => (1800.0, 3000.0),
            MetricKind::Ttfb => (800.0, 1800.0),
        };
        Thresholds { good, poor }
    }

    /// Rates a value of this kind.
    pub fn rate(&self, value: f64) -> Rating {
        self.thresholds().rate(value)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = VitalsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| VitalsError::UnknownMetric(s.to_string()))
    }
}

/// LCP sub-parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LcpAttribution {
    /// Selector of the LCP element.
    pub element: Option<String>,
    /// Navigation start to first response byte.
    pub time_to_first_byte: f64,
    /// First byte to the LCP resource starting to load.
    pub resource_load_delay: f64,
    /// Time spent loading the LCP resource.
    pub resource_load_time: f64,
    /// Resource loaded to element rendered.
    pub element_render_delay: f64,
}

/// One layout shift contributing to CLS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutShift {
    /// Shift score.
    pub value: f64,
    /// Selectors of the shifted nodes.
    pub sources: Vec<String>,
}

/// A reported metric value with its kind-specific attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "metric")]
pub enum Metric {
    /// Largest Contentful Paint.
    #[serde(rename = "LCP")]
    Lcp {
        /// Milliseconds.
        value: f64,
        /// Sub-part breakdown, when available.
        attribution: Option<LcpAttribution>,
    },
    /// Cumulative Layout Shift.
    #[serde(rename = "CLS")]
    Cls {
        /// Unitless score.
        value: f64,
        /// Shifts in the largest session window.
        shifts: Vec<LayoutShift>,
    },
    /// First Input Delay.
    #[serde(rename = "FID")]
    Fid {
        /// Milliseconds.
        value: f64,
        /// The first input event.
        event: Option<TimingEntry>,
    },
    /// Interaction to Next Paint.
    #[serde(rename = "INP")]
    Inp {
        /// Milliseconds.
        value: f64,
        /// The entry chosen as the page's INP.
        event: Option<TimingEntry>,
    },
    /// First Contentful Paint.
    #[serde(rename = "FCP")]
    Fcp {
        /// Milliseconds.
        value: f64,
    },
    /// Time to First Byte.
    #[serde(rename = "TTFB")]
    Ttfb {
        /// Milliseconds.
        value: f64,
    },
    /// One attributed interaction.
    #[serde(rename = "Interaction")]
    Interaction(Box<AttributedMetric>),
}

impl Metric {
    /// The metric's kind.
    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Lcp { .. } => MetricKind::Lcp,
            Metric::Cls { .. } => MetricKind::Cls,
            Metric::Fid { .. } => MetricKind::Fid,
            Metric::Inp { .. } => MetricKind::Inp,
            Metric::Fcp { .. } => MetricKind::Fcp,
            Metric::Ttfb { .. } => MetricKind::Ttfb,
            Metric::Interaction(_) => MetricKind::Interaction,
        }
    }

    /// The measured value.
    pub fn value(&self) -> f64 {
        match self {
            Metric::Lcp { value, .. }
            | Metric::Cls { value, .. }
            | Metric::Fid { value, .. }
            | Metric::Inp { value, .. }
            | Metric::Fcp { value }
            | Metric::Ttfb { value } => *value,
            Metric::Interaction(metric) => metric.value,
        }
    }

    /// Rating of the value; interactions keep the rating they were attributed with.
    pub fn rating(&self) -> Rating {
        match self {
            Metric::Interaction(metric) => metric.rating,
            other => other.kind().rate(other.value()),
        }
    }
}

impl From<AttributedMetric> for Metric {
    fn from(metric: AttributedMetric) -> Self {
        Metric::Interaction(Box::new(metric))
    }
}
