//! One fetch-and-merge cycle, ready for viewport layouts.

use std::ops::RangeInclusive;

use crate::client::CalendarClient;
use crate::date::CivilDate;
use crate::error::CalendarError;
use crate::layout::{day_events, month_bars, week_bars, MonthBar};
use crate::merge::merge_across_calendars;
use crate::types::{AllDayEvent, DayEvent, PlannerCalendar};

/// Calendars and merged all-day events for the year a view was loaded for.
///
/// Immutable once built; every layout call recomputes from scratch.
#[derive(Debug, Clone)]
pub struct Planner {
    year: i32,
    calendars: Vec<PlannerCalendar>,
    events: Vec<AllDayEvent>,
}

impl Planner {
    /// Build from already-fetched events. Duplicates across calendars are merged.
    pub fn new(year: i32, calendars: Vec<PlannerCalendar>, events: Vec<AllDayEvent>) -> Self {
        Self {
            year,
            calendars,
            events: merge_across_calendars(events),
        }
    }

    /// Fetch `calendars` for `year` through `client`, in the given order.
    pub async fn load(
        client: &CalendarClient,
        calendars: Vec<PlannerCalendar>,
        year: i32,
    ) -> Result<Self, CalendarError> {
        Self::load_years(client, calendars, year..=year).await
    }

    /// Fetch every year the week starting at `week_start` touches.
    ///
    /// A week crossing New Year needs both years' events.
    pub async fn load_week(
        client: &CalendarClient,
        calendars: Vec<PlannerCalendar>,
        week_start: CivilDate,
    ) -> Result<Self, CalendarError> {
        let first = week_start.normalized().year();
        let last = week_start.add_days(6).year();
        Self::load_years(client, calendars, first..=last).await
    }

    async fn load_years(
        client: &CalendarClient,
        calendars: Vec<PlannerCalendar>,
        years: RangeInclusive<i32>,
    ) -> Result<Self, CalendarError> {
        let events = client.fetch_years(&calendars, years.clone()).await?;
        let year = *years.start();
        tracing::info!(
            year,
            last_year = *years.end(),
            calendars = calendars.len(),
            events = events.len(),
            "Planner loaded"
        );
        Ok(Self {
            year,
            calendars,
            events,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn calendars(&self) -> &[PlannerCalendar] {
        &self.calendars
    }

    pub fn events(&self) -> &[AllDayEvent] {
        &self.events
    }

    pub fn calendar(&self, id: &str) -> Option<&PlannerCalendar> {
        self.calendars.iter().find(|c| c.id == id)
    }

    pub fn month_bars(&self, month: u32) -> Vec<MonthBar<'_>> {
        month_bars(&self.events, self.year, month)
    }

    pub fn week_bars(&self, week_start: CivilDate) -> Vec<MonthBar<'_>> {
        week_bars(&self.events, week_start)
    }

    pub fn day_events(&self, date: CivilDate) -> Vec<DayEvent> {
        day_events(&self.events, date)
    }
}
