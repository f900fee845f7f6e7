//! Raw performance-timeline records consumed by the engine.
//!
//! Both record types deserialize directly from the JSON a browser produces
//! for `PerformanceEventTiming` and `PerformanceLongAnimationFrameTiming`
//! entries (camelCase fields, unknown fields ignored), so host glue can
//! forward `JSON.stringify(list.getEntries())` unchanged.
//!
//! # Example
//!
//! ```rust
//! use vitals_attribution::entry::TimingEntry;
//!
//! let tap = TimingEntry::new("pointerdown", 100.0, 48.0)
//!     .with_processing(110.0, 130.0)
//!     .with_interaction_id(7)
//!     .with_target("button#buy");
//!
//! assert!(tap.has_interaction());
//! assert_eq!(tap.presentation_time(), 148.0);
//! ```

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, VitalsError};

/// One event-timing observation.
///
/// `duration` is rounded by the browser (8ms granularity), so
/// `start_time + duration` is only an estimate of when the next frame was
/// presented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingEntry {
    /// Event type, e.g. `pointerdown` or `keydown`.
    pub name: String,
    /// Hardware timestamp of the input.
    pub start_time: f64,
    /// When the first event handler started running.
    pub processing_start: f64,
    /// When the last event handler finished.
    pub processing_end: f64,
    /// Rounded time from `start_time` to the next paint.
    pub duration: f64,
    /// Identifier shared by all events of one user interaction.
    ///
    /// Browsers report `0` for events that are not part of an interaction;
    /// that is normalised to `None`.
    #[serde(
        default,
        deserialize_with = "deserialize_interaction_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub interaction_id: Option<u64>,
    /// Selector describing the event target, when the browser kept one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

fn deserialize_interaction_id<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<u64>::deserialize(deserializer)?;
    Ok(id.filter(|id| *id != 0))
}

impl TimingEntry {
    /// Creates an entry whose processing window is empty at `start_time`.
    pub fn new(name: impl Into<String>, start_time: f64, duration: f64) -> Self {
        Self {
            name: name.into(),
            start_time,
            processing_start: start_time,
            processing_end: start_time,
            duration,
            interaction_id: None,
            target: None,
        }
    }

    /// Sets the handler processing window.
    pub fn with_processing(mut self, start: f64, end: f64) -> Self {
        self.processing_start = start;
        self.processing_end = end;
        self
    }

    /// Sets the interaction identifier. `0` clears it, matching the browser.
    pub fn with_interaction_id(mut self, id: u64) -> Self {
        self.interaction_id = Some(id).filter(|id| *id != 0);
        self
    }

    /// Sets the target selector.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Whether this entry belongs to a user interaction.
    pub fn has_interaction(&self) -> bool {
        self.interaction_id.is_some()
    }

    /// Estimated time the next frame was presented.
    pub fn presentation_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether this is a keyboard event under the given name prefix.
    pub fn is_keyboard(&self, key_event_prefix: &str) -> bool {
        self.name.starts_with(key_event_prefix)
    }

    /// Rejects entries with negative or non-finite timing fields.
    ///
    /// # Errors
    ///
    /// Returns [`VitalsError::InvalidEntry`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        check_time("startTime", self.start_time)?;
        check_time("processingStart", self.processing_start)?;
        check_time("processingEnd", self.processing_end)?;
        check_time("duration", self.duration)
    }
}

/// One script attributed to a long animation frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoafScript {
    /// Time the script ran for.
    pub duration: f64,
    /// How the script was invoked (`event-listener`, `user-callback`, ...).
    #[serde(default)]
    pub invoker_type: String,
    /// Name of the entry-point function, when known.
    #[serde(default)]
    pub source_function_name: String,
    /// URL of the script source.
    #[serde(default, rename = "sourceURL")]
    pub source_url: String,
    /// Character offset of the entry point, `-1` when unknown.
    #[serde(default = "unknown_char_position")]
    pub source_char_position: i64,
}

fn unknown_char_position() -> i64 {
    -1
}

/// A span during which the main thread was continuously busy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FrameRecord")]
pub struct LongAnimationFrame {
    /// When the frame's work started.
    pub start_time: f64,
    /// Total frame duration, up to and including presentation work.
    pub duration: f64,
    /// When rendering (rAF, style, layout, paint) began within the frame.
    ///
    /// Defaults to the end of the frame when not reported.
    pub render_start: f64,
    /// Scripts that ran during the frame, in execution order.
    pub scripts: Vec<LoafScript>,
}

/// Wire form of [`LongAnimationFrame`] with the optional fields still open.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FrameRecord {
    start_time: f64,
    duration: f64,
    #[serde(default)]
    render_start: Option<f64>,
    #[serde(default)]
    scripts: Vec<LoafScript>,
}

impl From<FrameRecord> for LongAnimationFrame {
    fn from(record: FrameRecord) -> Self {
        let frame = LongAnimationFrame::new(record.start_time, record.duration);
        LongAnimationFrame {
            render_start: record.render_start.unwrap_or(frame.render_start),
            scripts: record.scripts,
            ..frame
        }
    }
}

impl LongAnimationFrame {
    /// Creates a frame with no render phase and no scripts.
    pub fn new(start_time: f64, duration: f64) -> Self {
        Self {
            start_time,
            duration,
            render_start: start_time + duration,
            scripts: Vec::new(),
        }
    }

    /// Sets the render start timestamp.
    pub fn with_render_start(mut self, render_start: f64) -> Self {
        self.render_start = render_start;
        self
    }

    /// Appends a script record.
    pub fn with_script(mut self, script: LoafScript) -> Self {
        self.scripts.push(script);
        self
    }

    /// End of the frame's render window.
    pub fn render_end(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether `[start_time, render_end]` overlaps `[start, end]`.
    pub fn overlaps(&self, start: f64, end: f64) -> bool {
        self.start_time <= end && self.render_end() >= start
    }

    /// Rejects frames with negative or non-finite timing fields.
    pub fn validate(&self) -> Result<()> {
        check_time("startTime", self.start_time)?;
        check_time("duration", self.duration)?;
        check_time("renderStart", self.render_start)
    }
}

fn check_time(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(VitalsError::InvalidEntry { field, value })
    }
}
