//! Month and week bar layouts.
//!
//! A month is laid out as one row with a column per day of month, so a bar
//! covering days `[start_day, end_day_exclusive)` spans grid column lines
//! `start_day..end_day_exclusive`. A week has seven columns; day offset `i`
//! is column line `i + 1`.

use serde::Serialize;

use crate::color::{bar_background, ColorSpec};
use crate::date::{days_in_month, CivilDate};
use crate::geometry::{clamp_to_month, clamp_to_week, intersects_month, intersects_week};
use crate::lanes::lane_pack;
use crate::types::{AllDayEvent, DayEvent};

/// A bar ready for rendering: one event projected onto one viewport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBar<'a> {
    pub id: String,
    pub title: String,
    pub background: ColorSpec,
    pub foreground: String,
    /// Grid column line (1-based).
    pub col_start: u32,
    /// Grid column line (exclusive).
    pub col_end: u32,
    /// 0-based stacking slot.
    pub lane: u32,
    #[serde(skip)]
    pub event: &'a AllDayEvent,
}

/// A [`MonthBar`] before lane assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBar<'a> {
    pub col_start: u32,
    pub col_end: u32,
    pub event: &'a AllDayEvent,
}

impl<'a> PendingBar<'a> {
    pub fn new(event: &'a AllDayEvent, col_start: u32, col_end: u32) -> Self {
        Self {
            col_start,
            col_end,
            event,
        }
    }

    pub fn into_bar(self, lane: u32) -> MonthBar<'a> {
        MonthBar {
            id: self.event.id.clone(),
            title: self.event.title.clone(),
            background: bar_background(self.event),
            foreground: self.event.color.fg.clone(),
            col_start: self.col_start,
            col_end: self.col_end,
            lane,
            event: self.event,
        }
    }
}

fn pack_sorted(mut pending: Vec<PendingBar<'_>>) -> Vec<MonthBar<'_>> {
    // stable: ties keep event order
    pending.sort_by_key(|b| b.col_start);
    lane_pack(pending)
}

/// Lane-packed bars for every event touching `month` of `year`.
pub fn month_bars(events: &[AllDayEvent], year: i32, month: u32) -> Vec<MonthBar<'_>> {
    let pending = events
        .iter()
        .filter(|ev| intersects_month(ev, year, month))
        .filter_map(|ev| {
            clamp_to_month(ev, year, month)
                .map(|span| PendingBar::new(ev, span.start_day, span.end_day_exclusive))
        })
        .collect();
    pack_sorted(pending)
}

/// Lane-packed bars for every event touching the week starting at `week_start`.
pub fn week_bars(events: &[AllDayEvent], week_start: CivilDate) -> Vec<MonthBar<'_>> {
    let pending = events
        .iter()
        .filter(|ev| intersects_week(ev, week_start))
        .filter_map(|ev| {
            clamp_to_week(ev, week_start)
                .map(|span| PendingBar::new(ev, span.start_idx + 1, span.end_idx_exclusive + 1))
        })
        .collect();
    pack_sorted(pending)
}

/// Events covering `date`, in event order.
pub fn day_events(events: &[AllDayEvent], date: CivilDate) -> Vec<DayEvent> {
    events
        .iter()
        .filter(|ev| ev.covers(date))
        .map(DayEvent::from)
        .collect()
}

pub fn is_weekend(day_of_week: u32) -> bool {
    day_of_week == 0 || day_of_week == 6
}

/// Start of the week containing `date`.
///
/// `first_day_of_week` uses the same numbering as [`CivilDate::day_of_week`]
/// (0 = Sunday, 1 = Monday).
pub fn week_start_for(date: CivilDate, first_day_of_week: u32) -> CivilDate {
    let dow = date.day_of_week();
    let back = (dow + 7 - first_day_of_week % 7) % 7;
    date.add_days(-i64::from(back))
}

/// Start dates of every week that overlaps `month` of `year`.
pub fn weeks_in_month(year: i32, month: u32, first_day_of_week: u32) -> Vec<CivilDate> {
    let Some(first) = CivilDate::new(year, month, 1) else {
        return Vec::new();
    };
    let month_end_exclusive = first.add_days(i64::from(days_in_month(year, month)));

    let mut weeks = Vec::new();
    let mut week = week_start_for(first, first_day_of_week);
    while week < month_end_exclusive {
        weeks.push(week);
        week = week.add_days(7);
    }
    weeks
}
