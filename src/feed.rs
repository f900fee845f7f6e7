//! Channel-driven engine for async hosts.
//!
//! [`AsyncFeed`] drives a [`VitalsEngine`] from two tokio channels, one per
//! browser stream, and forwards every attributed interaction to an output
//! channel. When both inputs are ready, pending long animation frames are
//! buffered before the event batch is processed, so frames that arrived
//! first are visible to the grouping step.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "async-tokio")]
//! # async fn run() -> vitals_attribution::Result<()> {
//! use tokio::sync::mpsc;
//! use vitals_attribution::{entry::TimingEntry, feed::AsyncFeed, VitalsEngine};
//!
//! let (event_tx, event_rx) = mpsc::channel(16);
//! let (_loaf_tx, loaf_rx) = mpsc::channel(16);
//! let (metric_tx, mut metric_rx) = mpsc::channel(16);
//!
//! let feed = AsyncFeed::new(VitalsEngine::default(), event_rx, loaf_rx, metric_tx);
//! let task = tokio::spawn(feed.run());
//!
//! event_tx
//!     .send(vec![TimingEntry::new("click", 90.0, 64.0).with_interaction_id(1)])
//!     .await
//!     .unwrap();
//! drop(event_tx);
//!
//! let metric = metric_rx.recv().await.unwrap();
//! assert_eq!(metric.value, 64.0);
//! let _engine = task.await.unwrap();
//! # Ok(())
//! # }
//! ```

use tokio::sync::mpsc::{Receiver, Sender};
use tracing::debug;

use crate::{
    attribution::AttributedMetric,
    engine::VitalsEngine,
    entry::{LongAnimationFrame, TimingEntry},
};

/// Couples a [`VitalsEngine`] to tokio channels.
#[derive(Debug)]
pub struct AsyncFeed {
    engine: VitalsEngine,
    events: Receiver<Vec<TimingEntry>>,
    frames: Receiver<Vec<LongAnimationFrame>>,
    output: Sender<AttributedMetric>,
}

impl AsyncFeed {
    /// Creates a feed around `engine`.
    pub fn new(
        engine: VitalsEngine,
        events: Receiver<Vec<TimingEntry>>,
        frames: Receiver<Vec<LongAnimationFrame>>,
        output: Sender<AttributedMetric>,
    ) -> Self {
        Self {
            engine,
            events,
            frames,
            output,
        }
    }

    /// Processes batches until the event channel closes or the output
    /// receiver is dropped, then returns the engine.
    ///
    /// A closed frame channel is not fatal; events keep being attributed
    /// against the frames already buffered.
    pub async fn run(mut self) -> VitalsEngine {
        let mut frames_open = true;

        loop {
            tokio::select! {
                biased;

                frames = self.frames.recv(), if frames_open => match frames {
                    Some(frames) => self.engine.on_long_animation_frames(frames),
                    None => {
                        debug!("long animation frame feed closed");
                        frames_open = false;
                    }
                },

                batch = self.events.recv() => {
                    let Some(batch) = batch else {
                        debug!("event timing feed closed");
                        break;
                    };
                    for metric in self.engine.on_event_timing(batch) {
                        if self.output.send(metric).await.is_err() {
                            debug!("metric receiver dropped, stopping feed");
                            return self.engine;
                        }
                    }
                }
            }
        }

        self.engine
    }
}
