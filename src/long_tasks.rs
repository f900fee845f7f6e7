//! Bounded history of recent long animation frames.
//!
//! Interactions are attributed as soon as their batch arrives, so only the
//! last few frames can still overlap them. The tracker keeps those frames in
//! arrival order and answers interval-overlap queries with a linear scan.

use std::collections::VecDeque;

use crate::{config::DEFAULT_LOAF_CAPACITY, entry::LongAnimationFrame};

/// Ring buffer of the most recent long animation frames.
///
/// # Example
///
/// ```rust
/// use vitals_attribution::{entry::LongAnimationFrame, long_tasks::LongTaskTracker};
///
/// let mut tracker = LongTaskTracker::new(5);
/// tracker.record(vec![
///     LongAnimationFrame::new(100.0, 50.0),
///     LongAnimationFrame::new(300.0, 80.0),
/// ]);
///
/// let hits = tracker.find_intersecting(120.0, 140.0);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].start_time, 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct LongTaskTracker {
    frames: VecDeque<LongAnimationFrame>,
    capacity: usize,
}

impl LongTaskTracker {
    /// Creates an empty tracker retaining at most `capacity` frames.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends newly observed frames, then evicts the oldest beyond capacity.
    pub fn record<I>(&mut self, frames: I)
    where
        I: IntoIterator<Item = LongAnimationFrame>,
    {
        for frame in frames {
            self.frames.push_back(frame);
        }
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    /// Returns every buffered frame overlapping `[start, end]`, in buffer order.
    ///
    /// A frame ending before `start` is skipped rather than ending the scan,
    /// because buffered delivery can hand frames over slightly out of order.
    /// The scan stops at the first frame starting after `end`.
    pub fn find_intersecting(&self, start: f64, end: f64) -> Vec<&LongAnimationFrame> {
        let mut intersecting = Vec::new();

        for frame in &self.frames {
            if frame.render_end() < start {
                continue;
            }
            if frame.start_time > end {
                break;
            }
            intersecting.push(frame);
        }

        intersecting
    }

    /// Iterates buffered frames from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &LongAnimationFrame> {
        self.frames.iter()
    }

    /// Number of buffered frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frames are buffered.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Maximum number of frames retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops all buffered frames.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for LongTaskTracker {
    fn default() -> Self {
        Self::new(DEFAULT_LOAF_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starts(tracker: &LongTaskTracker) -> Vec<f64> {
        tracker.iter().map(|f| f.start_time).collect()
    }

    #[test]
    fn test_record_keeps_last_five() {
        let mut tracker = LongTaskTracker::default();
        tracker.record((0..8).map(|i| LongAnimationFrame::new(i as f64 * 100.0, 60.0)));

        assert_eq!(tracker.len(), 5);
        assert_eq!(starts(&tracker), vec![300.0, 400.0, 500.0, 600.0, 700.0]);
    }

    #[test]
    fn test_record_across_batches() {
        let mut tracker = LongTaskTracker::new(2);
        tracker.record(vec![LongAnimationFrame::new(0.0, 60.0)]);
        tracker.record(vec![LongAnimationFrame::new(100.0, 60.0)]);
        tracker.record(vec![LongAnimationFrame::new(200.0, 60.0)]);

        assert_eq!(starts(&tracker), vec![100.0, 200.0]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let tracker = LongTaskTracker::new(0);
        assert_eq!(tracker.capacity(), 1);
    }

    #[test]
    fn test_find_intersecting_bounds() {
        let mut tracker = LongTaskTracker::default();
        tracker.record(vec![
            LongAnimationFrame::new(0.0, 50.0),
            LongAnimationFrame::new(100.0, 50.0),
            LongAnimationFrame::new(200.0, 50.0),
        ]);

        let hits: Vec<f64> = tracker
            .find_intersecting(150.0, 200.0)
            .iter()
            .map(|f| f.start_time)
            .collect();
        assert_eq!(hits, vec![100.0, 200.0]);

        assert!(tracker.find_intersecting(60.0, 90.0).is_empty());
    }

    #[test]
    fn test_find_intersecting_skips_out_of_order_early_frame() {
        let mut tracker = LongTaskTracker::default();
        // A late-delivered frame that ended long before the query window
        // sits between two frames that do overlap.
        tracker.record(vec![
            LongAnimationFrame::new(100.0, 80.0),
            LongAnimationFrame::new(10.0, 20.0),
            LongAnimationFrame::new(150.0, 60.0),
        ]);

        let hits: Vec<f64> = tracker
            .find_intersecting(120.0, 160.0)
            .iter()
            .map(|f| f.start_time)
            .collect();
        assert_eq!(hits, vec![100.0, 150.0]);
    }

    #[test]
    fn test_find_intersecting_stops_after_end() {
        let mut tracker = LongTaskTracker::default();
        tracker.record(vec![
            LongAnimationFrame::new(500.0, 50.0),
            // Out of order: would overlap, but the scan already broke.
            LongAnimationFrame::new(100.0, 50.0),
        ]);

        assert!(tracker.find_intersecting(100.0, 140.0).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut tracker = LongTaskTracker::default();
        tracker.record(vec![LongAnimationFrame::new(0.0, 50.0)]);
        tracker.clear();
        assert!(tracker.is_empty());
    }
}
