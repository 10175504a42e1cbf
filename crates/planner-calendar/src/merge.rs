//! Merging of the same all-day event seen on several calendars.

use std::collections::HashMap;

use crate::date::CivilDate;
use crate::types::AllDayEvent;

type MergeKey = (CivilDate, CivilDate, String);

fn merge_key(event: &AllDayEvent) -> MergeKey {
    (
        event.start_date.normalized(),
        event.end_date_exclusive.normalized(),
        event.title.trim().to_string(),
    )
}

/// Fold events that share a date range and title into one event.
///
/// Input order is fetch order. The first occurrence keeps its id, primary
/// calendar and color, and later copies from other calendars append their
/// source. Copies from a calendar already listed stay separate events.
pub fn merge_across_calendars(events: Vec<AllDayEvent>) -> Vec<AllDayEvent> {
    let mut merged: Vec<AllDayEvent> = Vec::with_capacity(events.len());
    let mut index: HashMap<MergeKey, Vec<usize>> = HashMap::new();
    let mut folded = 0usize;

    for event in events {
        let key = merge_key(&event);
        let slots = index.entry(key).or_default();

        let target = slots.iter().copied().find(|&i| {
            let existing = &merged[i];
            !event
                .sources
                .iter()
                .any(|s| existing.sources.iter().any(|e| e.calendar_id == s.calendar_id))
        });

        match target {
            Some(i) => {
                let existing = &mut merged[i];
                existing.sources.extend(event.sources);
                if existing.description.is_none() {
                    existing.description = event.description;
                }
                if existing.location.is_none() {
                    existing.location = event.location;
                }
                if existing.html_link.is_none() {
                    existing.html_link = event.html_link;
                }
                folded += 1;
            }
            None => {
                slots.push(merged.len());
                merged.push(event);
            }
        }
    }

    tracing::debug!(
        events = merged.len(),
        folded,
        "Merged all-day events across calendars"
    );
    merged
}
