//! Frame-boundary correlation of event-timing entries.
//!
//! A single tap produces several events (`pointerdown`, `pointerup`,
//! `click`) that are often handled in the same animation frame. Entries are
//! grouped by the first long animation frame whose render window overlaps
//! their processing window; entries outside every buffered frame share one
//! implicit group so they are still reported.

use tracing::trace;

use crate::{
    entry::{LongAnimationFrame, TimingEntry},
    long_tasks::LongTaskTracker,
};

/// Timing entries judged to belong to one user interaction.
///
/// Entries keep the order they were grouped in (ascending
/// `processing_start`). A group is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionGroup {
    entries: Vec<TimingEntry>,
    frame: Option<LongAnimationFrame>,
}

impl InteractionGroup {
    /// Creates a group, returning `None` for an empty entry list.
    pub fn new(entries: Vec<TimingEntry>, frame: Option<LongAnimationFrame>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        Some(Self { entries, frame })
    }

    /// Entries in processing order.
    pub fn entries(&self) -> &[TimingEntry] {
        &self.entries
    }

    /// The long animation frame the entries were rendered in, if observed.
    pub fn frame(&self) -> Option<&LongAnimationFrame> {
        self.frame.as_ref()
    }

    /// Whether any entry carries an interaction id.
    pub fn has_interaction(&self) -> bool {
        self.entries.iter().any(TimingEntry::has_interaction)
    }

    /// First entry carrying an interaction id, else the first entry.
    pub fn first_interaction_entry(&self) -> &TimingEntry {
        self.entries
            .iter()
            .find(|entry| entry.has_interaction())
            .unwrap_or(&self.entries[0])
    }

    /// The entry with the largest duration; ties go to the earliest.
    pub fn representative(&self) -> &TimingEntry {
        longest_entry(&self.entries).unwrap_or(&self.entries[0])
    }

    /// Splits the group into its entries and frame.
    pub fn into_parts(self) -> (Vec<TimingEntry>, Option<LongAnimationFrame>) {
        (self.entries, self.frame)
    }
}

/// Entry with the largest duration, first occurrence on ties.
pub(crate) fn longest_entry(entries: &[TimingEntry]) -> Option<&TimingEntry> {
    let mut iter = entries.iter();
    let mut longest = iter.next()?;
    for entry in iter {
        if entry.duration > longest.duration {
            longest = entry;
        }
    }
    Some(longest)
}

/// First buffered frame whose render window overlaps the entry's
/// processing window.
fn matching_frame<'a>(entry: &TimingEntry, tracker: &'a LongTaskTracker) -> Option<&'a LongAnimationFrame> {
    for frame in tracker.iter() {
        if frame.start_time > entry.processing_end {
            break;
        }
        if entry.processing_start <= frame.render_end() && entry.processing_end >= frame.start_time {
            return Some(frame);
        }
    }
    None
}

/// Partitions sorted entries into interaction groups.
///
/// Groups tied to a frame come first, in frame start order, followed by
/// the group of entries that matched no frame. Groups without any
/// interaction entry are dropped. If nothing survives, one fallback group
/// holding every entry is returned, so a non-empty input always yields at
/// least one group.
pub fn split_by_frame(entries: Vec<TimingEntry>, tracker: &LongTaskTracker) -> Vec<InteractionGroup> {
    // (frame start bits, frame, entries)
    let mut framed: Vec<(u64, LongAnimationFrame, Vec<TimingEntry>)> = Vec::new();
    let mut unframed: Vec<TimingEntry> = Vec::new();
    let mut all = Vec::with_capacity(entries.len());

    for entry in entries {
        all.push(entry.clone());

        let Some(frame) = matching_frame(&entry, tracker) else {
            unframed.push(entry);
            continue;
        };

        let key = frame.start_time.to_bits();
        match framed.iter_mut().find(|(k, _, _)| *k == key) {
            Some((_, _, members)) => members.push(entry),
            None => framed.push((key, frame.clone(), vec![entry])),
        }
    }

    framed.sort_by(|a, b| a.1.start_time.total_cmp(&b.1.start_time));

    let mut groups: Vec<InteractionGroup> = framed
        .into_iter()
        .filter_map(|(_, frame, members)| InteractionGroup::new(members, Some(frame)))
        .chain(InteractionGroup::new(unframed, None))
        .filter(|group| {
            let keep = group.has_interaction();
            if !keep {
                trace!(
                    entries = group.entries.len(),
                    "dropping group without interaction entries"
                );
            }
            keep
        })
        .collect();

    if groups.is_empty() {
        groups.extend(InteractionGroup::new(all, None));
    }

    groups
}
