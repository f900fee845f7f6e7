//! # vitals_attribution
//!
//! An Interaction to Next Paint (INP) attribution engine.
//!
//! ## Overview
//!
//! `vitals_attribution` consumes the two performance streams a browser
//! exposes for responsiveness, event-timing entries and long animation
//! frames (LoAFs), and turns them into one attributed metric per user
//! interaction:
//!
//! - **Grouping**: events handled in the same animation frame form one interaction
//! - **Phase breakdown**: input delay, processing, rendering delay, rendering and presentation delay
//! - **Rating**: good / needs-improvement / poor against configurable thresholds
//! - **Page-level estimate**: a running INP estimate over all interactions
//! - **Badge scoring**: the overall page verdict used by toolbar and overlay displays
//!
//! ## Quick Start
//!
//! ```rust
//! use vitals_attribution::{
//!     entry::{LongAnimationFrame, TimingEntry},
//!     Rating, Result, VitalsEngine,
//! };
//!
//! fn main() -> Result<()> {
//!     let mut engine = VitalsEngine::default();
//!     engine.install(|metric| println!("{}", metric.summary()))?;
//!
//!     // Frames arrive on their own stream and are buffered.
//!     engine.on_long_animation_frames(vec![
//!         LongAnimationFrame::new(100.0, 100.0).with_render_start(170.0),
//!     ]);
//!
//!     // A tap: pointerdown and click handled inside that frame.
//!     let metrics = engine.on_event_timing(vec![
//!         TimingEntry::new("pointerdown", 90.0, 120.0).with_processing(100.0, 130.0).with_interaction_id(1),
//!         TimingEntry::new("click", 92.0, 112.0).with_processing(125.0, 160.0).with_interaction_id(1),
//!     ]);
//!
//!     assert_eq!(metrics.len(), 1);
//!     assert_eq!(metrics[0].value, 120.0);
//!     assert_eq!(metrics[0].rating, Rating::Good);
//!
//!     let phases = metrics[0].attribution.phases.as_ref().unwrap();
//!     assert_eq!(phases.input_delay, 10.0);
//!     assert_eq!(phases.presentation_delay, 10.0);
//!     Ok(())
//! }
//! ```
//!
//! ## JSON Feeds
//!
//! Entries use the browser's camelCase field names, so batches serialized
//! straight from a `PerformanceObserver` can be ingested as-is:
//!
//! ```rust
//! use vitals_attribution::VitalsEngine;
//!
//! let mut engine = VitalsEngine::default();
//! let metrics = engine
//!     .ingest_event_json(
//!         r#"[{"name": "keydown", "startTime": 10, "processingStart": 14,
//!              "processingEnd": 40, "duration": 56, "interactionId": 3}]"#,
//!     )
//!     .unwrap();
//! assert_eq!(metrics[0].attribution.interaction_type.as_str(), "keyboard");
//! ```
//!
//! ## Feature Flags
//!
//! - `async-tokio`: Enable [`feed::AsyncFeed`], driving the engine from Tokio channels
//! - `full`: Enable all features
//!
//! ## Architecture
//!
//! The pipeline is organized into several stages:
//!
//! 1. **Long-Task Tracker** (`long_tasks`): Bounded history of recent LoAFs
//! 2. **Event Collector** (`collector`): Validates, filters and orders event batches
//! 3. **Interaction Grouper** (`grouping`): Splits a batch by frame boundary
//! 4. **Attribution Calculator** (`attribution`): Phase breakdown per group
//! 5. **Rating Classifier** (`rating`): Threshold classification
//!
//! [`VitalsEngine`] owns all per-page state and wires the stages together.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod attribution;
pub mod badge;
pub mod collector;
pub mod config;
mod engine;
pub mod entry;
mod error;
pub mod grouping;
pub mod long_tasks;
pub mod metric;
pub mod rating;
pub mod timing;

#[cfg(feature = "async-tokio")]
pub mod feed;

// Public API exports
pub use attribution::{AttributedMetric, InteractionAttribution, InteractionType, PhaseBreakdown};
pub use badge::{BadgeMetrics, BadgeSnapshot, OverallScore};
pub use config::EngineConfig;
pub use engine::{Subscription, VitalsEngine};
pub use entry::{LongAnimationFrame, TimingEntry};
pub use error::{Result, VitalsError};
pub use metric::{Metric, MetricKind};
pub use rating::{Rating, Thresholds};
pub use timing::{InpEstimator, LatencyStats};
