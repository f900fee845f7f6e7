//! Phase breakdown of an interaction group.
//!
//! For every group the calculator reports the duration of its longest
//! entry, rates it, and, when the group was rendered in an observed long
//! animation frame, splits the end-to-end latency into five consecutive
//! phases:
//!
//! ```text
//! startTime   processingStart   processingEnd   renderStart   renderEnd   interactionEnd
//!    |--input delay--|--processing--|--render delay--|--rendering--|--presentation--|
//! ```
//!
//! The phases telescope, so their sum is always
//! `interaction_end_time - entries[0].start_time`.
//!
//! # Example
//!
//! ```rust
//! use vitals_attribution::{
//!     attribution::{attribute, InteractionType},
//!     entry::TimingEntry,
//!     grouping::split_by_frame,
//!     long_tasks::LongTaskTracker,
//!     rating::Rating,
//!     EngineConfig,
//! };
//!
//! let tracker = LongTaskTracker::default();
//! let entries = vec![
//!     TimingEntry::new("pointerdown", 95.0, 40.0).with_processing(100.0, 140.0).with_interaction_id(1),
//!     TimingEntry::new("pointerup", 105.0, 240.0).with_processing(110.0, 350.0).with_interaction_id(1),
//! ];
//!
//! let group = split_by_frame(entries, &tracker).remove(0);
//! let metric = attribute(group, &tracker, &EngineConfig::default());
//!
//! assert_eq!(metric.value, 240.0);
//! assert_eq!(metric.rating, Rating::NeedsImprovement);
//! assert_eq!(metric.attribution.interaction_type, InteractionType::Pointer);
//! assert!(metric.attribution.phases.is_none());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    config::EngineConfig,
    entry::{LongAnimationFrame, TimingEntry},
    grouping::{longest_entry, InteractionGroup},
    long_tasks::LongTaskTracker,
    rating::Rating,
};

/// Name reported for every attributed interaction.
pub const INTERACTION_METRIC_NAME: &str = "Interaction";

/// Minimum visible width given to a presentation-delay timeline mark.
///
/// Rounded durations can put the estimated paint at or before
/// `processing_end`; a zero or negative span cannot be drawn.
pub const PRESENTATION_MARK_FLOOR_MS: f64 = 4.0;

/// Input modality of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    /// Triggered by a key event.
    Keyboard,
    /// Triggered by a pointer, mouse or touch event.
    Pointer,
}

impl InteractionType {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Keyboard => "keyboard",
            InteractionType::Pointer => "pointer",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latency phases of an interaction rendered in a known frame.
///
/// All values are unrounded milliseconds. The boundary fields are the
/// timestamps the phases were computed from: when negative phases are
/// clamped they hold the clamped values, so `render_end` may lie past the
/// frame's own end. The raw frame is kept in
/// [`InteractionAttribution::long_animation_frame_entries`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseBreakdown {
    /// From input to the first handler starting.
    pub input_delay: f64,
    /// From the first handler starting to the last handler finishing.
    pub processing_duration: f64,
    /// Share of the processing window actually spent in handlers, in percent.
    ///
    /// `None` when the processing window is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_percentage: Option<f64>,
    /// From the last handler finishing to rendering starting.
    pub rendering_delay: f64,
    /// Rendering work inside the frame.
    pub rendering_duration: f64,
    /// From the end of the frame to the next paint.
    pub presentation_delay: f64,
    /// Handler time summed entry by entry from the previous entry's end.
    pub total_processing_time: f64,
    /// Phase boundary: first handler start.
    pub processing_start: f64,
    /// Phase boundary: last handler end.
    pub processing_end: f64,
    /// Phase boundary: rendering start.
    pub render_start: f64,
    /// Phase boundary: end of the frame, never before `render_start`
    /// when clamping.
    pub render_end: f64,
    /// Phase boundary: estimated next paint.
    pub interaction_end_time: f64,
}

impl PhaseBreakdown {
    /// Sum of the five consecutive phases.
    pub fn total(&self) -> f64 {
        self.input_delay
            + self.processing_duration
            + self.rendering_delay
            + self.rendering_duration
            + self.presentation_delay
    }
}

/// Diagnostic attribution for one interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionAttribution {
    /// Selector of the first entry that kept a target.
    pub interaction_target: Option<String>,
    /// Input timestamp of the first interaction entry.
    pub interaction_time: f64,
    /// Keyboard or pointer.
    pub interaction_type: InteractionType,
    /// Phase breakdown, present only when the group has a frame.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub phases: Option<PhaseBreakdown>,
    /// Buffered long animation frames overlapping the interaction.
    pub long_animation_frame_entries: Vec<LongAnimationFrame>,
}

/// One reported interaction.
///
/// Created fresh for each group and handed to subscribers; the engine
/// keeps no reference to it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributedMetric {
    /// Always [`INTERACTION_METRIC_NAME`].
    pub name: String,
    /// Duration of the longest entry in the group.
    pub value: f64,
    /// Rating of `value`.
    pub rating: Rating,
    /// The group's entries in processing order.
    pub entries: Vec<TimingEntry>,
    /// Diagnostic breakdown.
    pub attribution: InteractionAttribution,
}

/// A named span for a performance-panel style timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseMark {
    /// Label such as `Interaction.inputDelay (keydown)`.
    pub label: String,
    /// Span start.
    pub start: f64,
    /// Span end, never before `start`.
    pub end: f64,
}

impl AttributedMetric {
    /// The entry whose duration is reported as `value`.
    pub fn representative(&self) -> Option<&TimingEntry> {
        longest_entry(&self.entries)
    }

    /// Interaction id of the representative entry, or of the first entry that has one.
    pub fn interaction_id(&self) -> Option<u64> {
        self.representative()
            .and_then(|entry| entry.interaction_id)
            .or_else(|| self.entries.iter().find_map(|entry| entry.interaction_id))
    }

    /// Timeline spans for the representative entry.
    ///
    /// The presentation span ends at `startTime + duration`, but never less
    /// than [`PRESENTATION_MARK_FLOOR_MS`] after `processingEnd`.
    pub fn phase_marks(&self) -> Vec<PhaseMark> {
        let Some(entry) = self.representative() else {
            return Vec::new();
        };

        let presentation_time = entry.presentation_time();
        let adjusted_presentation =
            presentation_time.max(entry.processing_end + PRESENTATION_MARK_FLOOR_MS);
        let mark = |phase: &str, start: f64, end: f64| PhaseMark {
            label: format!("{}.{} ({})", self.name, phase, entry.name),
            start,
            end: end.max(start),
        };

        vec![
            mark("duration", entry.start_time, presentation_time),
            mark("inputDelay", entry.start_time, entry.processing_start),
            mark("processingTime", entry.processing_start, entry.processing_end),
            mark("presentationDelay", entry.processing_end, adjusted_presentation),
        ]
    }

    /// Returns a formatted summary string.
    ///
    /// # Example Output
    ///
    /// ```text
    /// Interaction (pointerup): 240.00ms [needs-improvement]
    ///   Type: pointer
    ///   Target: button#buy
    ///   Input delay: 10.00ms
    ///   Processing: 60.00ms (100.0% busy)
    ///   Rendering delay: 10.00ms
    ///   Rendering: 30.00ms
    ///   Presentation delay: 10.00ms
    ///   Long animation frames: 1
    /// ```
    pub fn summary(&self) -> String {
        let event = self
            .representative()
            .map(|entry| entry.name.as_str())
            .unwrap_or("unknown");
        let attribution = &self.attribution;

        let mut lines = vec![
            format!("{} ({}): {:.2}ms [{}]", self.name, event, self.value, self.rating),
            format!("  Type: {}", attribution.interaction_type),
            format!(
                "  Target: {}",
                attribution.interaction_target.as_deref().unwrap_or("(none)")
            ),
        ];

        match &attribution.phases {
            Some(phases) => {
                let busy = phases
                    .processing_percentage
                    .map(|pct| format!(" ({:.1}% busy)", pct))
                    .unwrap_or_default();
                lines.push(format!("  Input delay: {:.2}ms", phases.input_delay));
                lines.push(format!("  Processing: {:.2}ms{}", phases.processing_duration, busy));
                lines.push(format!("  Rendering delay: {:.2}ms", phases.rendering_delay));
                lines.push(format!("  Rendering: {:.2}ms", phases.rendering_duration));
                lines.push(format!("  Presentation delay: {:.2}ms", phases.presentation_delay));
            }
            None => lines.push("  Phases: N/A (no long animation frame)".to_string()),
        }

        lines.push(format!(
            "  Long animation frames: {}",
            attribution.long_animation_frame_entries.len()
        ));
        lines.join("\n")
    }
}

/// Handler time across entries in processing order.
///
/// Each entry adds the part of its window after the previous entry's
/// `processing_end`. A window nested inside the previous one adds a
/// negative amount, so nested handlers lower the total.
fn total_processing_time(entries: &[TimingEntry]) -> f64 {
    let mut total = 0.0;
    let mut prev_end = 0.0;

    for entry in entries {
        total += entry.processing_end - entry.processing_start.max(prev_end);
        prev_end = entry.processing_end;
    }

    total
}

fn phase_breakdown(entries: &[TimingEntry], frame: &LongAnimationFrame, clamp: bool) -> PhaseBreakdown {
    let first = &entries[0];
    let last = &entries[entries.len() - 1];

    let interaction_start = first.start_time;
    let raw_processing_start = first.processing_start;
    let raw_processing_end = last.processing_end;

    let total_processing_time = total_processing_time(entries);
    let window = raw_processing_end - raw_processing_start;
    let processing_percentage = (window > 0.0).then(|| total_processing_time / window * 100.0);

    let max_presentation_time = entries
        .iter()
        .map(|entry| entry.processing_end.max(entry.presentation_time()))
        .fold(f64::NEG_INFINITY, f64::max);

    let (processing_start, processing_end, render_start, render_end) = if clamp {
        // Each boundary is held at or after the previous one, so phases stay
        // non-negative and still sum to the full span.
        let processing_start = raw_processing_start.max(interaction_start);
        let processing_end = raw_processing_end.max(processing_start);
        let render_start = frame.render_start.max(processing_end);
        let render_end = frame.render_end().max(render_start);

        if processing_start != raw_processing_start
            || processing_end != raw_processing_end
            || render_end != frame.render_end()
        {
            warn!(
                frame_start = frame.start_time,
                processing_end = raw_processing_end,
                render_end = frame.render_end(),
                "clamped negative interaction phase"
            );
        }
        (processing_start, processing_end, render_start, render_end)
    } else {
        (
            raw_processing_start,
            raw_processing_end,
            frame.render_start.max(raw_processing_end),
            frame.render_end(),
        )
    };
    let interaction_end_time = max_presentation_time.max(render_end);

    PhaseBreakdown {
        input_delay: processing_start - interaction_start,
        processing_duration: processing_end - processing_start,
        processing_percentage,
        rendering_delay: render_start - processing_end,
        rendering_duration: render_end - render_start,
        presentation_delay: interaction_end_time - render_end,
        total_processing_time,
        processing_start,
        processing_end,
        render_start,
        render_end,
        interaction_end_time,
    }
}

/// Builds the attributed metric for one interaction group.
///
/// `tracker` supplies the long animation frames overlapping the
/// interaction; `config` supplies the rating thresholds, keyboard prefix
/// and clamping policy.
pub fn attribute(
    group: InteractionGroup,
    tracker: &LongTaskTracker,
    config: &EngineConfig,
) -> AttributedMetric {
    let value = group.representative().duration;
    let trigger = group.first_interaction_entry();
    let interaction_time = trigger.start_time;
    let interaction_type = if trigger.is_keyboard(&config.key_event_prefix) {
        InteractionType::Keyboard
    } else {
        InteractionType::Pointer
    };
    let interaction_target = group
        .entries()
        .iter()
        .find_map(|entry| entry.target.clone());

    let (entries, frame) = group.into_parts();

    let window_start = entries
        .iter()
        .map(|entry| entry.start_time)
        .fold(f64::INFINITY, f64::min);
    let window_end = entries
        .iter()
        .map(|entry| entry.processing_end)
        .fold(f64::NEG_INFINITY, f64::max);
    let mut long_animation_frame_entries: Vec<LongAnimationFrame> = tracker
        .find_intersecting(window_start, window_end)
        .into_iter()
        .cloned()
        .collect();

    let phases = frame.map(|frame| {
        let phases = phase_breakdown(&entries, &frame, config.clamp_negative_phases);
        if !long_animation_frame_entries.contains(&frame) {
            long_animation_frame_entries.push(frame);
        }
        phases
    });

    AttributedMetric {
        name: INTERACTION_METRIC_NAME.to_string(),
        value,
        rating: config.interaction_thresholds.rate(value),
        entries,
        attribution: InteractionAttribution {
            interaction_target,
            interaction_time,
            interaction_type,
            phases,
            long_animation_frame_entries,
        },
    }
}
