//! Google Calendar API client.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use tracing::instrument;

use crate::error::CalendarError;
use crate::merge::merge_across_calendars;
use crate::types::*;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Google caps `events.list` at 2500 results per page.
const MAX_RESULTS: u32 = 2500;

pub struct CalendarClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl CalendarClient {
    pub fn new(access_token: &str) -> Self {
        Self::with_base_url(access_token, CALENDAR_API_BASE)
    }

    pub fn with_base_url(access_token: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// List all calendars.
    #[instrument(skip(self), level = "info")]
    pub async fn list_calendars(&self) -> Result<Vec<PlannerCalendar>, CalendarError> {
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}/users/me/calendarList", self.base_url);
            if let Some(pt) = &page_token {
                url.push_str(&format!("?pageToken={}", urlencoding::encode(pt)));
            }

            let response = self
                .client
                .get(&url)
                .header("Authorization", self.auth_header())
                .send()
                .await?;

            let resp: CalendarListResponse = self.handle_response(response, "calendarList").await?;
            calendars.extend(resp.items.into_iter().map(PlannerCalendar::from));

            match resp.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::info!("Fetched {} calendars", calendars.len());
        Ok(calendars)
    }

    /// Fetch one page of a calendar's events for `year` (UTC bounds).
    #[instrument(skip(self), level = "debug")]
    pub async fn list_events_page(
        &self,
        calendar_id: &str,
        year: i32,
        page_token: Option<&str>,
    ) -> Result<EventListResponse, CalendarError> {
        let time_min = format!("{:04}-01-01T00:00:00Z", year);
        let time_max = format!("{:04}-01-01T00:00:00Z", year + 1);

        let mut url = format!(
            "{}/calendars/{}/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime&maxResults={}",
            self.base_url,
            urlencoding::encode(calendar_id),
            urlencoding::encode(&time_min),
            urlencoding::encode(&time_max),
            MAX_RESULTS,
        );

        if let Some(pt) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(pt)));
        }

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        self.handle_response(response, calendar_id).await
    }

    /// All all-day events of `calendar` in `year`, following every page.
    #[instrument(skip(self, calendar), fields(calendar_id = %calendar.id), level = "info")]
    pub async fn list_all_day_events_for_year(
        &self,
        calendar: &PlannerCalendar,
        year: i32,
    ) -> Result<Vec<AllDayEvent>, CalendarError> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let page = self
                .list_events_page(&calendar.id, year, page_token.as_deref())
                .await?;
            pages += 1;

            events.extend(
                page.items
                    .into_iter()
                    .filter(ApiEvent::is_all_day)
                    .filter_map(|api| AllDayEvent::from_api(api, calendar)),
            );

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(pages, events = events.len(), "Fetched all-day events");
        Ok(events)
    }

    /// Fetch every calendar in order and merge duplicates across them.
    pub async fn fetch_year(
        &self,
        calendars: &[PlannerCalendar],
        year: i32,
    ) -> Result<Vec<AllDayEvent>, CalendarError> {
        self.fetch_years(calendars, year..=year).await
    }

    /// Like [`Self::fetch_year`] over several consecutive years.
    ///
    /// An event overlapping a year boundary is returned by both year queries;
    /// it is kept once per calendar before the cross-calendar merge.
    #[instrument(skip(self, calendars), level = "info")]
    pub async fn fetch_years(
        &self,
        calendars: &[PlannerCalendar],
        years: RangeInclusive<i32>,
    ) -> Result<Vec<AllDayEvent>, CalendarError> {
        let mut raw = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for calendar in calendars {
            for year in years.clone() {
                let events = self.list_all_day_events_for_year(calendar, year).await?;
                raw.extend(
                    events
                        .into_iter()
                        .filter(|ev| seen.insert((ev.calendar_id.clone(), ev.id.clone()))),
                );
            }
        }
        Ok(merge_across_calendars(raw))
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AuthRequired)
        } else if status.as_u16() == 404 {
            Err(CalendarError::CalendarNotFound(resource.to_string()))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_calendars() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .and(header("Authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"id": "primary", "summary": "My Calendar", "primary": true, "accessRole": "owner", "backgroundColor": "#9fe1e7"},
                    {"id": "cal2", "summary": "Work", "accessRole": "writer"}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("test_token", &mock_server.uri());
        let calendars = client.list_calendars().await.unwrap();

        assert_eq!(calendars.len(), 2);
        assert!(calendars[0].primary);
        assert_eq!(calendars[0].background_color, "#9fe1e7");
        assert_eq!(calendars[1].access_role, AccessRole::Writer);
    }

    #[tokio::test]
    async fn test_list_events_page_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("timeMin", "2024-01-01T00:00:00Z"))
            .and(query_param("timeMax", "2025-01-01T00:00:00Z"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("orderBy", "startTime"))
            .and(query_param("maxResults", "2500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {"id": "event1", "summary": "Holiday", "start": {"date": "2024-02-01"}, "end": {"date": "2024-02-02"}}
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("test_token", &mock_server.uri());
        let page = client.list_events_page("primary", 2024, None).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_token_expired() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("expired_token", &mock_server.uri());
        let result = client.list_calendars().await;

        assert!(matches!(result, Err(CalendarError::TokenExpired)));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "30"))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("token", &mock_server.uri());
        let result = client.list_calendars().await;

        assert!(matches!(result, Err(CalendarError::RateLimited(30))));
    }

    #[tokio::test]
    async fn test_missing_calendar() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/gone/events"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("token", &mock_server.uri());
        let result = client.list_events_page("gone", 2024, None).await;

        assert!(matches!(result, Err(CalendarError::CalendarNotFound(id)) if id == "gone"));
    }

    #[tokio::test]
    async fn test_server_error_carries_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/me/calendarList"))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("token", &mock_server.uri());
        match client.list_calendars().await {
            Err(CalendarError::ApiError(msg)) => assert!(msg.contains("backend down")),
            other => panic!("unexpected result: {:?}", other.map(|c| c.len())),
        }
    }
}
