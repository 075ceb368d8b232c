//! Schedule feasibility predicate.

use std::collections::BTreeMap;

use crate::models::{ScheduleEntry, TimeWindow, Weekday};

/// Whether one staff member's entries respect the weekly limit and the
/// minimum rest between consecutive same-day entries.
///
/// An overlap is a negative gap, so it fails for any non-negative rest.
///
/// # Arguments
/// * `entries` - The staff member's proposed entries, in any order.
/// * `limit_minutes` - Maximum total scheduled minutes per week.
/// * `min_rest_minutes` - Minimum gap between consecutive entries on a day.
pub fn feasible<'a, I>(entries: I, limit_minutes: u32, min_rest_minutes: i32) -> bool
where
    I: IntoIterator<Item = &'a ScheduleEntry>,
{
    let mut total: u32 = 0;
    let mut by_day: BTreeMap<Weekday, Vec<TimeWindow>> = BTreeMap::new();
    for entry in entries {
        total = total.saturating_add(entry.duration_minutes());
        by_day.entry(entry.day).or_default().push(entry.window);
    }
    if total > limit_minutes {
        return false;
    }

    by_day.values_mut().all(|windows| {
        windows.sort_by_key(|w| (w.start, w.end));
        windows
            .windows(2)
            .all(|pair| pair[0].gap_minutes_until(&pair[1]) >= min_rest_minutes)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClockTime;

    fn entry(day: Weekday, start: (u16, u16), end: (u16, u16)) -> ScheduleEntry {
        let window = TimeWindow::new(
            ClockTime::new(start.0, start.1).unwrap(),
            ClockTime::new(end.0, end.1).unwrap(),
        )
        .unwrap();
        ScheduleEntry::new("T1", day, window, "X")
    }

    #[test]
    fn test_empty_is_feasible() {
        assert!(feasible(std::iter::empty(), 0, 480));
    }

    #[test]
    fn test_overlap_rejected() {
        let entries = [
            entry(Weekday::Monday, (9, 0), (10, 0)),
            entry(Weekday::Monday, (9, 30), (10, 30)),
        ];
        assert!(!feasible(&entries, 2400, 0));
    }

    #[test]
    fn test_rest_gap() {
        let entries = [
            entry(Weekday::Monday, (13, 0), (14, 0)),
            entry(Weekday::Monday, (8, 0), (9, 0)),
        ];
        assert!(feasible(&entries, 2400, 240));
        assert!(!feasible(&entries, 2400, 241));
        // Touching windows pass with no rest requirement.
        let touching = [
            entry(Weekday::Monday, (8, 0), (9, 0)),
            entry(Weekday::Monday, (9, 0), (10, 0)),
        ];
        assert!(feasible(&touching, 2400, 0));
    }

    #[test]
    fn test_rest_applies_within_a_day_only() {
        let entries = [
            entry(Weekday::Monday, (16, 0), (17, 0)),
            entry(Weekday::Tuesday, (7, 0), (8, 0)),
        ];
        assert!(feasible(&entries, 2400, 480));
    }

    #[test]
    fn test_weekly_limit() {
        let entries = [
            entry(Weekday::Monday, (8, 0), (10, 0)),
            entry(Weekday::Tuesday, (8, 0), (9, 30)),
        ];
        assert!(feasible(&entries, 210, 0));
        assert!(!feasible(&entries, 209, 0));
    }
}
