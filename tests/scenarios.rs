//! End-to-end interaction scenarios driven through the public engine API.

use std::sync::{Arc, Mutex};

use vitals_attribution::{
    entry::{LongAnimationFrame, TimingEntry},
    long_tasks::LongTaskTracker,
    AttributedMetric, InteractionType, Rating, Result, VitalsEngine,
};

fn recording_engine() -> Result<(VitalsEngine, Arc<Mutex<Vec<AttributedMetric>>>)> {
    let mut engine = VitalsEngine::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.install(move |metric| sink.lock().unwrap().push(metric.clone()))?;
    Ok((engine, seen))
}

fn tap(first: &str, second: &str) -> Vec<TimingEntry> {
    vec![
        TimingEntry::new(first, 95.0, 40.0)
            .with_processing(100.0, 140.0)
            .with_interaction_id(1),
        TimingEntry::new(second, 105.0, 240.0)
            .with_processing(110.0, 350.0)
            .with_interaction_id(1),
    ]
}

#[test]
fn test_pointer_interaction_without_frames() -> Result<()> {
    let (mut engine, seen) = recording_engine()?;

    engine.on_event_timing(tap("pointerdown", "pointerup"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let metric = &seen[0];
    assert_eq!(metric.value, 240.0);
    assert_eq!(metric.representative().map(|e| e.name.as_str()), Some("pointerup"));
    assert_eq!(metric.rating, Rating::NeedsImprovement);
    assert_eq!(metric.attribution.interaction_type, InteractionType::Pointer);
    assert!(metric.attribution.phases.is_none());
    assert!(metric.attribution.long_animation_frame_entries.is_empty());

    Ok(())
}

#[test]
fn test_keyboard_interaction_without_frames() -> Result<()> {
    let (mut engine, seen) = recording_engine()?;

    engine.on_event_timing(tap("keydown", "keyup"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].attribution.interaction_type, InteractionType::Keyboard);
    assert_eq!(seen[0].rating, Rating::NeedsImprovement);

    Ok(())
}

#[test]
fn test_entry_inside_long_frame() -> Result<()> {
    let frame = LongAnimationFrame::new(100.0, 50.0);
    assert_eq!(frame.render_end(), 150.0);

    let mut tracker = LongTaskTracker::default();
    tracker.record(vec![frame.clone()]);
    assert_eq!(tracker.find_intersecting(120.0, 140.0), vec![&frame]);

    let (mut engine, seen) = recording_engine()?;
    engine.on_long_animation_frames(vec![frame.clone()]);
    engine.on_event_timing(vec![TimingEntry::new("click", 110.0, 48.0)
        .with_processing(120.0, 140.0)
        .with_interaction_id(3)]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let phases = seen[0].attribution.phases.as_ref().expect("framed interaction has phases");
    assert_eq!(phases.render_end, 150.0);
    assert_eq!(seen[0].attribution.long_animation_frame_entries, vec![frame]);

    Ok(())
}

#[test]
fn test_empty_batch_fires_nothing() -> Result<()> {
    let (mut engine, seen) = recording_engine()?;

    assert!(engine.on_event_timing(Vec::new()).is_empty());
    assert!(seen.lock().unwrap().is_empty());

    Ok(())
}

#[test]
fn test_batch_without_interaction_fires_nothing() -> Result<()> {
    let (mut engine, seen) = recording_engine()?;

    let metrics = engine.on_event_timing(vec![TimingEntry::new("pointermove", 50.0, 64.0)
        .with_processing(52.0, 90.0)]);

    assert!(metrics.is_empty());
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(engine.collector_stats().batches_discarded, 1);

    Ok(())
}

#[test]
fn test_one_batch_spanning_two_frames() -> Result<()> {
    let (mut engine, seen) = recording_engine()?;

    engine.on_long_animation_frames(vec![
        LongAnimationFrame::new(100.0, 80.0).with_render_start(150.0),
        LongAnimationFrame::new(400.0, 120.0).with_render_start(480.0),
    ]);
    engine.on_event_timing(vec![
        TimingEntry::new("keyup", 395.0, 128.0)
            .with_processing(405.0, 470.0)
            .with_interaction_id(6),
        TimingEntry::new("keydown", 90.0, 96.0)
            .with_processing(102.0, 140.0)
            .with_interaction_id(5),
    ]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].interaction_id(), Some(5));
    assert_eq!(seen[1].interaction_id(), Some(6));

    for metric in seen.iter() {
        let phases = metric.attribution.phases.as_ref().unwrap();
        let span = phases.interaction_end_time - metric.entries[0].start_time;
        assert!((phases.total() - span).abs() < 1e-9);
    }

    Ok(())
}

#[test]
fn test_frames_arriving_late_are_not_retroactive() -> Result<()> {
    let (mut engine, seen) = recording_engine()?;

    engine.on_event_timing(vec![TimingEntry::new("click", 90.0, 120.0)
        .with_processing(100.0, 130.0)
        .with_interaction_id(1)]);
    engine.on_long_animation_frames(vec![LongAnimationFrame::new(100.0, 100.0)]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].attribution.phases.is_none());

    Ok(())
}

#[test]
fn test_buffer_evicts_oldest_frames() {
    let mut engine = VitalsEngine::default();
    let frames = (0..8).map(|i| LongAnimationFrame::new(i as f64 * 100.0, 60.0));
    engine.on_long_animation_frames(frames.collect());

    let tracker = engine.tracker();
    assert_eq!(tracker.len(), 5);
    assert_eq!(tracker.iter().next().map(|f| f.start_time), Some(300.0));
}
