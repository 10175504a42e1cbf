//! Google Calendar year planner.
//!
//! Date arithmetic, month/week clipping, lane packing and multi-calendar
//! colors for all-day events, plus the Calendar API client that feeds them.

pub mod client;
pub mod color;
pub mod date;
pub mod error;
pub mod geometry;
pub mod lanes;
pub mod layout;
pub mod merge;
pub mod planner;
pub mod types;

pub use client::CalendarClient;
pub use color::{bar_background, ColorSpec, GradientStop};
pub use date::{
    add_days_iso, day_of_week_iso, days_in_month, format_iso_date, parse_iso_date, CivilDate,
};
pub use error::{CalendarError, DateError};
pub use geometry::{
    clamp_to_month, clamp_to_week, intersects_month, intersects_week, MonthSpan, WeekSpan,
};
pub use lanes::{assign_lanes, lane_count, lane_pack};
pub use layout::{
    day_events, is_weekend, month_bars, week_bars, week_start_for, weeks_in_month, MonthBar,
    PendingBar,
};
pub use merge::merge_across_calendars;
pub use planner::Planner;
pub use types::{
    AccessRole, AllDayEvent, CalendarId, DayEvent, EventColor, EventSource, PlannerCalendar,
};
