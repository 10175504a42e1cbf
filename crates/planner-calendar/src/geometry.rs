//! Clipping of all-day event ranges to month and week viewports.
//!
//! Both viewports are half-open day ranges. An event intersects a viewport
//! when `start < viewport_end && end > viewport_start`; the clamp functions
//! return `None` exactly when that test fails.

use serde::Serialize;

use crate::date::{days_in_month, CivilDate};
use crate::types::AllDayEvent;

/// Event range clipped to a month, in day-of-month numbering.
///
/// `end_day_exclusive == days_in_month + 1` means the event runs past the
/// end of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthSpan {
    pub start_day: u32,
    pub end_day_exclusive: u32,
}

/// Event range clipped to a week, as 0-based day offsets from the week start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekSpan {
    pub start_idx: u32,
    pub end_idx_exclusive: u32,
}

fn event_range(event: &AllDayEvent) -> (CivilDate, CivilDate) {
    (
        event.start_date.normalized(),
        event.end_date_exclusive.normalized(),
    )
}

/// First day of the month and the "day after the last day" comparison key,
/// e.g. `2024-02-01` and `2024-02-30`.
fn month_bounds(year: i32, month: u32) -> (CivilDate, CivilDate, u32) {
    let dim = days_in_month(year, month);
    (
        CivilDate::from_parts(year, month, 1),
        CivilDate::from_parts(year, month, dim + 1),
        dim,
    )
}

pub fn intersects_month(event: &AllDayEvent, year: i32, month: u32) -> bool {
    if !(1..=12).contains(&month) {
        return false;
    }
    let (start, end) = event_range(event);
    let (month_start, month_end_exclusive, _) = month_bounds(year, month);
    start < month_end_exclusive && end > month_start
}

pub fn intersects_week(event: &AllDayEvent, week_start: CivilDate) -> bool {
    let week_start = week_start.normalized();
    let week_end_exclusive = week_start.add_days(7);
    let (start, end) = event_range(event);
    start < week_end_exclusive && end > week_start
}

/// Clip the event to `month` of `year`.
///
/// Returns `None` when nothing of the event falls inside the month.
pub fn clamp_to_month(event: &AllDayEvent, year: i32, month: u32) -> Option<MonthSpan> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (start, end) = event_range(event);
    let (month_start, month_end_exclusive, dim) = month_bounds(year, month);

    let start = start.max(month_start);
    let end = end.min(month_end_exclusive);

    let in_month = |date: CivilDate| date.year() == year && date.month() == month;
    if !in_month(start) || !in_month(end) {
        return None;
    }

    let start_day = start.day();
    let end_day_exclusive = if end == month_end_exclusive { dim + 1 } else { end.day() };
    if end_day_exclusive <= start_day {
        return None;
    }

    Some(MonthSpan {
        start_day,
        end_day_exclusive,
    })
}

/// Clip the event to the seven days starting at `week_start`.
pub fn clamp_to_week(event: &AllDayEvent, week_start: CivilDate) -> Option<WeekSpan> {
    let week_start = week_start.normalized();
    let week_end_exclusive = week_start.add_days(7);
    let (start, end) = event_range(event);

    let start = start.max(week_start);
    let end = end.min(week_end_exclusive);
    if end <= start {
        return None;
    }

    // Both offsets are within 0..=7 here.
    Some(WeekSpan {
        start_idx: week_start.days_until(start) as u32,
        end_idx_exclusive: week_start.days_until(end) as u32,
    })
}
