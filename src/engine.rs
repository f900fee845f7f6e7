//! The attribution engine facade.
//!
//! [`VitalsEngine`] owns everything one page context needs: the long
//! animation frame history, the installed flag, the subscribers and the
//! running INP estimate. Construct one per navigation, feed it the two
//! browser streams, and receive one [`AttributedMetric`] per interaction.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//!
//! use vitals_attribution::{
//!     entry::{LongAnimationFrame, TimingEntry},
//!     EngineConfig, VitalsEngine,
//! };
//!
//! # fn main() -> vitals_attribution::Result<()> {
//! let mut engine = VitalsEngine::new(EngineConfig::default())?;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! engine.install(move |metric| sink.lock().unwrap().push(metric.value))?;
//!
//! engine.on_long_animation_frames(vec![LongAnimationFrame::new(100.0, 100.0).with_render_start(170.0)]);
//! engine.on_event_timing(vec![TimingEntry::new("click", 90.0, 120.0)
//!     .with_processing(100.0, 130.0)
//!     .with_interaction_id(1)]);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![120.0]);
//! # Ok(())
//! # }
//! ```

use std::fmt;

use tracing::{debug, trace, warn};

use crate::{
    attribution::{attribute, AttributedMetric},
    collector::{CollectorStats, EventCollector},
    config::EngineConfig,
    entry::{LongAnimationFrame, TimingEntry},
    error::{Result, VitalsError},
    grouping::split_by_frame,
    long_tasks::LongTaskTracker,
    timing::InpEstimator,
};

type Callback = Box<dyn FnMut(&AttributedMetric) + Send>;

/// Handle returned by [`VitalsEngine::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

impl Subscription {
    /// Numeric id of this subscription.
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Groups event-timing batches into interactions and attributes them.
pub struct VitalsEngine {
    config: EngineConfig,
    tracker: LongTaskTracker,
    collector: EventCollector,
    subscribers: Vec<(Subscription, Callback)>,
    next_subscription: u64,
    inp: InpEstimator,
}

impl fmt::Debug for VitalsEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VitalsEngine")
            .field("config", &self.config)
            .field("tracker", &self.tracker)
            .field("collector", &self.collector)
            .field("subscribers", &self.subscribers.len())
            .field("inp", &self.inp.estimate())
            .finish()
    }
}

impl Default for VitalsEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            tracker: LongTaskTracker::new(config.loaf_capacity),
            config,
            collector: EventCollector::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
            inp: InpEstimator::new(),
        }
    }
}

impl VitalsEngine {
    /// Creates an engine with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::InvalidConfig`] if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            loaf_capacity = config.loaf_capacity,
            clamp = config.clamp_negative_phases,
            "creating vitals engine"
        );
        Ok(Self {
            tracker: LongTaskTracker::new(config.loaf_capacity),
            config,
            ..Self::default()
        })
    }

    /// Registers the primary interaction callback, once per engine.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::AlreadyInstalled`] on any later call; the
    /// existing subscription keeps working and the new callback is dropped.
    pub fn install<F>(&mut self, callback: F) -> Result<Subscription>
    where
        F: FnMut(&AttributedMetric) + Send + 'static,
    {
        if !self.collector.install() {
            warn!("vitals engine already installed");
            return Err(VitalsError::AlreadyInstalled);
        }
        Ok(self.subscribe(callback))
    }

    /// Whether [`VitalsEngine::install`] has succeeded.
    pub fn is_installed(&self) -> bool {
        self.collector.is_installed()
    }

    /// Adds a callback invoked once per attributed interaction.
    pub fn subscribe<F>(&mut self, callback: F) -> Subscription
    where
        F: FnMut(&AttributedMetric) + Send + 'static,
    {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((subscription, Box::new(callback)));
        subscription
    }

    /// Removes a callback. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription);
        self.subscribers.len() != before
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Buffers a batch of long animation frames.
    ///
    /// Frames with invalid timing are logged and skipped.
    pub fn on_long_animation_frames(&mut self, frames: Vec<LongAnimationFrame>) {
        let valid = frames.into_iter().filter(|frame| match frame.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "dropping invalid long animation frame");
                false
            }
        });
        self.tracker.record(valid);
        trace!(buffered = self.tracker.len(), "long animation frames recorded");
    }

    /// Processes one event-timing batch.
    ///
    /// Every resulting metric is passed to each subscriber in subscription
    /// order, then returned. A batch without interactions yields nothing.
    pub fn on_event_timing(&mut self, batch: Vec<TimingEntry>) -> Vec<AttributedMetric> {
        let Some(entries) = self.collector.prepare_batch(batch) else {
            return Vec::new();
        };

        let groups = split_by_frame(entries, &self.tracker);
        debug!(groups = groups.len(), "attributing interaction groups");

        let metrics: Vec<AttributedMetric> = groups
            .into_iter()
            .map(|group| attribute(group, &self.tracker, &self.config))
            .collect();

        for metric in &metrics {
            self.inp.record(metric);
            for (_, callback) in self.subscribers.iter_mut() {
                callback(metric);
            }
        }

        metrics
    }

    /// Decodes a JSON array of event-timing entries and processes it.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Json`] if the batch cannot be decoded; nothing
    /// is processed in that case.
    pub fn ingest_event_json(&mut self, json: &str) -> Result<Vec<AttributedMetric>> {
        let batch: Vec<TimingEntry> = serde_json::from_str(json)?;
        Ok(self.on_event_timing(batch))
    }

    /// Decodes a JSON array of long animation frames and buffers it.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::Json`] if the batch cannot be decoded.
    pub fn ingest_loaf_json(&mut self, json: &str) -> Result<()> {
        let frames: Vec<LongAnimationFrame> = serde_json::from_str(json)?;
        self.on_long_animation_frames(frames);
        Ok(())
    }

    /// Current INP estimate for the page, in milliseconds.
    pub fn inp_estimate(&self) -> Option<f64> {
        self.inp.estimate()
    }

    /// The INP estimator fed by this engine.
    pub fn inp(&self) -> &InpEstimator {
        &self.inp
    }

    /// The buffered long animation frames.
    pub fn tracker(&self) -> &LongTaskTracker {
        &self.tracker
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Event intake counters.
    pub fn collector_stats(&self) -> CollectorStats {
        self.collector.stats()
    }

    /// Forgets buffered frames and the INP estimate for a new navigation.
    ///
    /// Subscribers and the installed flag are kept.
    pub fn reset(&mut self) {
        debug!("resetting vitals engine for new navigation");
        self.tracker.clear();
        self.inp.reset();
    }
}
