//! Invariants of grouping, rating, frame lookup and phase breakdown over
//! generated batches.

use proptest::prelude::*;
use vitals_attribution::{
    attribution::attribute,
    collector::EventCollector,
    entry::{LongAnimationFrame, TimingEntry},
    grouping::{split_by_frame, InteractionGroup},
    long_tasks::LongTaskTracker,
    rating::rate,
    EngineConfig, Rating, VitalsEngine,
};

const EVENT_NAMES: [&str; 6] = ["pointerdown", "pointerup", "click", "keydown", "keyup", "pointerover"];

prop_compose! {
    /// Frames in arrival order: ascending, possibly overlapping, start times.
    fn arb_frames()(
        first in 0.0..100.0f64,
        shapes in prop::collection::vec((20.0..300.0f64, 50.0..200.0f64, 0.0..1.0f64), 0..6),
    ) -> Vec<LongAnimationFrame> {
        let mut start = first;
        shapes
            .into_iter()
            .map(|(gap, duration, render_share)| {
                let frame = LongAnimationFrame::new(start, duration)
                    .with_render_start(start + render_share * duration);
                start += gap;
                frame
            })
            .collect()
    }
}

prop_compose! {
    fn arb_entry()(
        name in prop::sample::select(EVENT_NAMES.to_vec()),
        start in 0.0..1200.0f64,
        input_delay in 0.0..40.0f64,
        processing in 0.0..120.0f64,
        slack in 0.0..80.0f64,
        interaction_id in prop::option::weighted(0.6, 1u64..5),
    ) -> TimingEntry {
        let processing_start = start + input_delay;
        let processing_end = processing_start + processing;
        // Browsers round durations to 8ms.
        let duration = ((processing_end - start + slack) / 8.0).round() * 8.0;
        let mut entry = TimingEntry::new(name, start, duration)
            .with_processing(processing_start, processing_end);
        entry.interaction_id = interaction_id;
        entry
    }
}

prop_compose! {
    /// A batch with uniquely named entries and at least one interaction.
    fn arb_batch()(entries in prop::collection::vec(arb_entry(), 1..8)) -> Vec<TimingEntry> {
        let mut entries: Vec<TimingEntry> = entries
            .into_iter()
            .enumerate()
            .map(|(i, mut entry)| {
                entry.name = format!("{}-{}", entry.name, i);
                entry
            })
            .collect();
        if !entries.iter().any(TimingEntry::has_interaction) {
            let last = entries.len() - 1;
            entries[last].interaction_id = Some(99);
        }
        entries
    }
}

fn tracker_with(frames: Vec<LongAnimationFrame>) -> LongTaskTracker {
    let mut tracker = LongTaskTracker::new(8);
    tracker.record(frames);
    tracker
}

fn prepare(batch: Vec<TimingEntry>) -> Vec<TimingEntry> {
    EventCollector::new()
        .prepare_batch(batch)
        .expect("batch carries an interaction")
}

proptest! {
    #[test]
    fn test_grouping_never_duplicates_or_loses_interactions(
        frames in arb_frames(),
        batch in arb_batch(),
    ) {
        let tracker = tracker_with(frames);
        let entries = prepare(batch);
        let groups = split_by_frame(entries.clone(), &tracker);

        prop_assert!(!groups.is_empty());

        let grouped: Vec<&TimingEntry> = groups.iter().flat_map(InteractionGroup::entries).collect();
        for entry in &entries {
            let copies = grouped.iter().filter(|g| g.name == entry.name).count();
            prop_assert!(copies <= 1, "{} grouped {} times", entry.name, copies);
            if entry.has_interaction() {
                prop_assert_eq!(copies, 1, "interaction entry {} lost", entry.name);
            }
        }
    }

    #[test]
    fn test_representative_is_longest_and_earliest_on_ties(
        frames in arb_frames(),
        batch in arb_batch(),
    ) {
        let tracker = tracker_with(frames);
        for group in split_by_frame(prepare(batch), &tracker) {
            let representative = group.representative().clone();
            let first_max = group
                .entries()
                .iter()
                .find(|entry| entry.duration == representative.duration)
                .cloned();

            prop_assert!(group.entries().iter().all(|e| e.duration <= representative.duration));
            prop_assert_eq!(first_max.as_ref(), Some(&representative));

            let metric = attribute(group, &tracker, &EngineConfig::default());
            prop_assert_eq!(metric.value, representative.duration);
        }
    }

    #[test]
    fn test_rating_never_improves_with_latency(
        shorter in 0.0..1000.0f64,
        extra in 0.0..1000.0f64,
    ) {
        prop_assert!(rate(shorter) <= rate(shorter + extra));
    }

    #[test]
    fn test_find_intersecting_matches_overlap_predicate(
        frames in arb_frames(),
        start in 0.0..1200.0f64,
        length in 0.0..200.0f64,
    ) {
        let tracker = tracker_with(frames.clone());
        let end = start + length;

        let found: Vec<&LongAnimationFrame> = tracker.find_intersecting(start, end);
        let expected: Vec<&LongAnimationFrame> = frames
            .iter()
            .filter(|f| f.start_time <= end && f.start_time + f.duration >= start)
            .collect();

        prop_assert_eq!(&found, &expected);
        prop_assert!(found.iter().all(|f| f.overlaps(start, end)));
    }

    #[test]
    fn test_phases_sum_to_interaction_span(
        frames in arb_frames(),
        batch in arb_batch(),
        clamp in any::<bool>(),
    ) {
        let config = EngineConfig::new().with_clamp_negative_phases(clamp);
        let mut engine = VitalsEngine::new(config).unwrap();
        engine.on_long_animation_frames(frames);

        for metric in engine.on_event_timing(batch) {
            let Some(phases) = &metric.attribution.phases else {
                continue;
            };
            let span = phases.interaction_end_time - metric.entries[0].start_time;
            prop_assert!(
                (phases.total() - span).abs() < 1e-6,
                "phases {} != span {}",
                phases.total(),
                span
            );

            if clamp {
                for value in [
                    phases.input_delay,
                    phases.processing_duration,
                    phases.rendering_delay,
                    phases.rendering_duration,
                    phases.presentation_delay,
                ] {
                    prop_assert!(value >= 0.0, "negative phase {}", value);
                }
            }
        }
    }
}

#[test]
fn test_rating_boundaries() {
    assert_eq!(rate(200.0), Rating::Good);
    assert_eq!(rate(200.5), Rating::NeedsImprovement);
    assert_eq!(rate(500.0), Rating::NeedsImprovement);
    assert_eq!(rate(500.5), Rating::Poor);
}
