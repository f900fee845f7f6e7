//! Event-timing batch intake.
//!
//! The collector is the first stage of the pipeline. It drops entries the
//! engine cannot reason about, discards batches without any user
//! interaction, and puts the survivors into causal order by
//! `processing_start` before they are grouped.

use tracing::{debug, warn};

use crate::entry::TimingEntry;

/// Counters describing what the collector has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorStats {
    /// Batches handed to [`EventCollector::prepare_batch`].
    pub batches_received: u64,
    /// Batches discarded because no entry carried an interaction id.
    pub batches_discarded: u64,
    /// Individual entries rejected by validation.
    pub entries_rejected: u64,
}

/// Filters and orders incoming event-timing batches.
#[derive(Debug, Clone, Default)]
pub struct EventCollector {
    installed: bool,
    stats: CollectorStats,
}

impl EventCollector {
    /// Creates a collector that has not been installed yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the collector as installed.
    ///
    /// Returns `false` if it already was, in which case the caller must not
    /// register another listener.
    pub fn install(&mut self) -> bool {
        if self.installed {
            return false;
        }
        self.installed = true;
        true
    }

    /// Whether [`EventCollector::install`] has succeeded before.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Intake counters.
    pub fn stats(&self) -> CollectorStats {
        self.stats
    }

    /// Validates, filters and sorts one delivered batch.
    ///
    /// Returns `None` when nothing in the batch is a user interaction;
    /// otherwise the valid entries sorted by `processing_start` (stable, so
    /// equal starts keep delivery order).
    pub fn prepare_batch(&mut self, batch: Vec<TimingEntry>) -> Option<Vec<TimingEntry>> {
        self.stats.batches_received += 1;
        let delivered = batch.len();

        let mut entries: Vec<TimingEntry> = batch
            .into_iter()
            .filter(|entry| match entry.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(event = %entry.name, error = %e, "dropping invalid timing entry");
                    false
                }
            })
            .collect();
        self.stats.entries_rejected += (delivered - entries.len()) as u64;

        if !entries.iter().any(TimingEntry::has_interaction) {
            self.stats.batches_discarded += 1;
            debug!(entries = delivered, "discarding batch without interactions");
            return None;
        }

        entries.sort_by(|a, b| a.processing_start.total_cmp(&b.processing_start));
        Some(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, processing_start: f64, id: Option<u64>) -> TimingEntry {
        let entry = TimingEntry::new(name, processing_start - 5.0, 40.0)
            .with_processing(processing_start, processing_start + 10.0);
        match id {
            Some(id) => entry.with_interaction_id(id),
            None => entry,
        }
    }

    #[test]
    fn test_install_is_idempotent() {
        let mut collector = EventCollector::new();
        assert!(!collector.is_installed());
        assert!(collector.install());
        assert!(!collector.install());
        assert!(collector.is_installed());
    }

    #[test]
    fn test_empty_batch_discarded() {
        let mut collector = EventCollector::new();
        assert!(collector.prepare_batch(Vec::new()).is_none());
        assert_eq!(collector.stats().batches_discarded, 1);
    }

    #[test]
    fn test_batch_without_interaction_discarded() {
        let mut collector = EventCollector::new();
        let batch = vec![entry("pointerover", 10.0, None), entry("mousemove", 20.0, None)];
        assert!(collector.prepare_batch(batch).is_none());
    }

    #[test]
    fn test_batch_sorted_by_processing_start() {
        let mut collector = EventCollector::new();
        let batch = vec![
            entry("click", 130.0, Some(2)),
            entry("pointerdown", 100.0, Some(2)),
            entry("pointerover", 90.0, None),
        ];

        let prepared = collector.prepare_batch(batch).unwrap();
        let names: Vec<&str> = prepared.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["pointerover", "pointerdown", "click"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut collector = EventCollector::new();
        let batch = vec![
            entry("pointerup", 100.0, Some(3)),
            entry("mouseup", 100.0, Some(3)),
        ];

        let prepared = collector.prepare_batch(batch).unwrap();
        assert_eq!(prepared[0].name, "pointerup");
        assert_eq!(prepared[1].name, "mouseup");
    }

    #[test]
    fn test_invalid_entries_dropped() {
        let mut collector = EventCollector::new();
        let mut bad = entry("click", 100.0, Some(1));
        bad.duration = f64::INFINITY;
        let batch = vec![bad, entry("pointerdown", 90.0, Some(1))];

        let prepared = collector.prepare_batch(batch).unwrap();
        assert_eq!(prepared.len(), 1);
        assert_eq!(collector.stats().entries_rejected, 1);
    }

    #[test]
    fn test_batch_whose_only_interaction_is_invalid_is_discarded() {
        let mut collector = EventCollector::new();
        let mut bad = entry("click", 100.0, Some(1));
        bad.start_time = -1.0;
        let batch = vec![bad, entry("pointermove", 90.0, None)];

        assert!(collector.prepare_batch(batch).is_none());
    }
}
