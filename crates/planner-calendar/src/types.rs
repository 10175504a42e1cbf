//! Planner data model and Google Calendar API types.

use serde::{Deserialize, Serialize};

use crate::date::CivilDate;
use crate::error::CalendarError;

pub type CalendarId = String;

const DEFAULT_BACKGROUND: &str = "#9e9e9e";
const DEFAULT_FOREGROUND: &str = "#000000";
const UNTITLED: &str = "(No title)";

/// Background/foreground color pair used when rendering a calendar's events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventColor {
    pub bg: String,
    pub fg: String,
}

impl EventColor {
    pub fn new(bg: impl Into<String>, fg: impl Into<String>) -> Self {
        Self {
            bg: bg.into(),
            fg: fg.into(),
        }
    }
}

/// One originating calendar of a (possibly merged) event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    pub calendar_id: CalendarId,
    pub color: EventColor,
}

/// Calendar metadata as used by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerCalendar {
    pub id: CalendarId,
    pub title: String,
    pub background_color: String,
    pub foreground_color: String,
    pub primary: bool,
    pub selected: bool,
    pub access_role: AccessRole,
}

impl PlannerCalendar {
    pub fn color(&self) -> EventColor {
        EventColor::new(&self.background_color, &self.foreground_color)
    }

    pub fn source(&self) -> EventSource {
        EventSource {
            calendar_id: self.id.clone(),
            color: self.color(),
        }
    }

    /// Whether events (not just free/busy blocks) can be read.
    pub fn can_read_events(&self) -> bool {
        matches!(
            self.access_role,
            AccessRole::Reader | AccessRole::Writer | AccessRole::Owner
        )
    }
}

/// Calendar access role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AccessRole {
    None,
    FreeBusyReader,
    #[default]
    Reader,
    Writer,
    Owner,
}

impl AccessRole {
    fn from_api(role: Option<&str>) -> Self {
        match role {
            Some("owner") => Self::Owner,
            Some("writer") => Self::Writer,
            Some("reader") => Self::Reader,
            Some("freeBusyReader") => Self::FreeBusyReader,
            Some("none") => Self::None,
            _ => Self::Reader,
        }
    }
}

/// A single-occurrence all-day event covering `[start_date, end_date_exclusive)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllDayEvent {
    pub id: String,
    pub title: String,
    pub start_date: CivilDate,
    pub end_date_exclusive: CivilDate,
    /// Primary calendar, used for text and single-source rendering.
    pub calendar_id: CalendarId,
    pub color: EventColor,
    /// Every calendar this event was seen on, in fetch order.
    pub sources: Vec<EventSource>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub html_link: Option<String>,
}

impl AllDayEvent {
    /// Create an event owned by `calendar`.
    ///
    /// Fails with `InvalidEventData` unless `start < end_exclusive`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: CivilDate,
        end_exclusive: CivilDate,
        calendar: &PlannerCalendar,
    ) -> Result<Self, CalendarError> {
        let start = start.normalized();
        let end_exclusive = end_exclusive.normalized();
        if start >= end_exclusive {
            return Err(CalendarError::InvalidEventData(format!(
                "end {} is not after start {}",
                end_exclusive, start
            )));
        }

        Ok(Self {
            id: id.into(),
            title: title.into(),
            start_date: start,
            end_date_exclusive: end_exclusive,
            calendar_id: calendar.id.clone(),
            color: calendar.color(),
            sources: vec![calendar.source()],
            description: None,
            location: None,
            html_link: None,
        })
    }

    /// Convert an API event into an all-day event.
    ///
    /// Returns `None` for timed events and for events whose dates are
    /// malformed or form an empty range.
    pub fn from_api(api: ApiEvent, calendar: &PlannerCalendar) -> Option<Self> {
        let start = api.start.as_ref().and_then(|t| t.date.as_deref())?;
        let end = api.end.as_ref().and_then(|t| t.date.as_deref())?;

        let parsed = CivilDate::parse(start)
            .and_then(|s| CivilDate::parse(end).map(|e| (s, e)))
            .map_err(CalendarError::from)
            .and_then(|(s, e)| {
                let title = api
                    .summary
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| UNTITLED.to_string());
                Self::new(api.id.clone(), title, s, e, calendar)
            });

        match parsed {
            Ok(mut event) => {
                event.description = api.description;
                event.location = api.location;
                event.html_link = api.html_link;
                Some(event)
            }
            Err(e) => {
                tracing::warn!(event_id = %api.id, calendar_id = %calendar.id, "Skipping event: {}", e);
                None
            }
        }
    }

    /// Last day covered by the event, for display.
    pub fn end_inclusive(&self) -> CivilDate {
        self.end_date_exclusive.add_days(-1)
    }

    /// Whether the event covers `date`.
    pub fn covers(&self, date: CivilDate) -> bool {
        let date = date.normalized();
        self.start_date.normalized() <= date && date < self.end_date_exclusive.normalized()
    }

    pub fn duration_days(&self) -> i64 {
        self.start_date.days_until(self.end_date_exclusive)
    }
}

/// An event as shown inside a single day cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEvent {
    pub id: String,
    pub calendar_id: CalendarId,
    pub title: String,
    pub color: EventColor,
}

impl From<&AllDayEvent> for DayEvent {
    fn from(event: &AllDayEvent) -> Self {
        Self {
            id: event.id.clone(),
            calendar_id: event.calendar_id.clone(),
            title: event.title.clone(),
            color: event.color.clone(),
        }
    }
}

// API Response Types

/// Google Calendar API event response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub html_link: Option<String>,
    pub color_id: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

impl ApiEvent {
    /// All-day events come back as `{ start: { date }, end: { date } }`.
    pub fn is_all_day(&self) -> bool {
        let has_date = |t: &Option<ApiEventTime>| t.as_ref().is_some_and(|t| t.date.is_some());
        has_date(&self.start) && has_date(&self.end)
    }
}

/// API response for event list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

/// API response for calendar list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListResponse {
    #[serde(default)]
    pub items: Vec<ApiCalendar>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCalendar {
    pub id: String,
    pub summary: Option<String>,
    pub summary_override: Option<String>,
    pub background_color: Option<String>,
    pub foreground_color: Option<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub selected: bool,
    pub access_role: Option<String>,
}

impl From<ApiCalendar> for PlannerCalendar {
    fn from(api: ApiCalendar) -> Self {
        let title = api
            .summary_override
            .or(api.summary)
            .unwrap_or_else(|| api.id.clone());

        Self {
            title,
            background_color: api
                .background_color
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            foreground_color: api
                .foreground_color
                .unwrap_or_else(|| DEFAULT_FOREGROUND.to_string()),
            primary: api.primary,
            selected: api.selected,
            access_role: AccessRole::from_api(api.access_role.as_deref()),
            id: api.id,
        }
    }
}
