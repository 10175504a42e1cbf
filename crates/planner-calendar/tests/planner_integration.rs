//! Integration tests for fetching, merging and laying out a year.
//!
//! The Calendar API is served by a wiremock server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use planner_calendar::{week_start_for, CalendarClient, CivilDate, ColorSpec, Planner};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn all_day(id: &str, summary: &str, start: &str, end: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "summary": summary,
        "start": {"date": start},
        "end": {"date": end}
    })
}

fn timed(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "summary": "Standup",
        "start": {"dateTime": "2024-03-04T09:00:00Z"},
        "end": {"dateTime": "2024-03-04T09:15:00Z"}
    })
}

async fn mount_calendars(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/users/me/calendarList"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                {"id": "home", "summary": "Home", "primary": true, "accessRole": "owner",
                 "backgroundColor": "#fff", "foregroundColor": "#000"},
                {"id": "work", "summary": "Work", "accessRole": "reader",
                 "backgroundColor": "#000", "foregroundColor": "#fff"}
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_follows_pages_and_keeps_only_all_day_events() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/home/events"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [all_day("h2", "Spring break", "2024-03-25", "2024-04-02")]
        })))
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/home/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                all_day("h1", "Conference", "2024-03-04", "2024-03-07"),
                timed("t1")
            ],
            "nextPageToken": "page-2"
        })))
        .mount(&mock_server)
        .await;

    mount_calendars(&mock_server).await;

    let client = CalendarClient::with_base_url("token", &mock_server.uri());
    let calendars = client.list_calendars().await.unwrap();
    let home = calendars.iter().find(|c| c.id == "home").unwrap();

    let events = client.list_all_day_events_for_year(home, 2024).await.unwrap();
    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["h1", "h2"]);
}

#[tokio::test]
async fn test_year_layout_merges_shared_events() {
    let mock_server = MockServer::start().await;
    mount_calendars(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/calendars/home/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [
                all_day("h1", "Company holiday", "2024-03-29", "2024-04-02"),
                all_day("h2", "Dentist", "2024-03-30", "2024-03-31")
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/work/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [all_day("w1", "Company holiday", "2024-03-29", "2024-04-02")]
        })))
        .mount(&mock_server)
        .await;

    let client = CalendarClient::with_base_url("token", &mock_server.uri());
    let calendars = client.list_calendars().await.unwrap();
    let planner = Planner::load(&client, calendars, 2024).await.unwrap();

    assert_eq!(planner.events().len(), 2);

    let march = planner.month_bars(3);
    assert_eq!(march.len(), 2);
    assert_eq!(march[0].id, "h1");
    assert_eq!((march[0].col_start, march[0].col_end, march[0].lane), (29, 32, 0));
    assert_eq!(march[0].background.to_css(), "linear-gradient(90deg, #fff 0% 50%, #000 50% 100%)");
    assert_eq!((march[1].col_start, march[1].col_end, march[1].lane), (30, 31, 1));
    assert!(matches!(march[1].background, ColorSpec::Solid { .. }));

    let april = planner.month_bars(4);
    assert_eq!(april.len(), 1);
    assert_eq!((april[0].col_start, april[0].col_end), (1, 2));
    assert_eq!(april[0].event.end_inclusive(), CivilDate::parse("2024-04-01").unwrap());

    let week = planner.week_bars(CivilDate::parse("2024-03-31").unwrap());
    assert_eq!(week.len(), 1);
    assert_eq!((week[0].col_start, week[0].col_end), (1, 3));
}

#[tokio::test]
async fn test_week_across_new_year_fetches_both_years() {
    let mock_server = MockServer::start().await;
    mount_calendars(&mock_server).await;

    let new_years_eve = all_day("h-nye", "Family visit", "2024-12-31", "2025-01-02");

    Mock::given(method("GET"))
        .and(path("/calendars/home/events"))
        .and(query_param("timeMin", "2024-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [new_years_eve.clone()]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/home/events"))
        .and(query_param("timeMin", "2025-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [new_years_eve, all_day("h-ski", "Ski trip", "2025-01-02", "2025-01-04")]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/work/events"))
        .and(query_param("timeMin", "2025-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [all_day("w-nye", "Family visit", "2024-12-31", "2025-01-02")]
        })))
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/calendars/work/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })))
        .mount(&mock_server)
        .await;

    let client = CalendarClient::with_base_url("token", &mock_server.uri());
    let calendars = client.list_calendars().await.unwrap();

    // 2025-01-02 is a Thursday; a Sunday-first week starts in 2024
    let week_start = week_start_for(CivilDate::parse("2025-01-02").unwrap(), 0);
    assert_eq!(week_start, CivilDate::parse("2024-12-29").unwrap());

    let planner = Planner::load_week(&client, calendars, week_start).await.unwrap();

    // the boundary event came back from both year queries but is kept once
    assert_eq!(planner.events().len(), 2);

    let week = planner.week_bars(week_start);
    let summary: Vec<(&str, u32, u32, u32)> = week
        .iter()
        .map(|b| (b.id.as_str(), b.col_start, b.col_end, b.lane))
        .collect();
    assert_eq!(summary, vec![("h-nye", 3, 5, 0), ("h-ski", 5, 7, 0)]);
    assert_eq!(
        week[0].background.to_css(),
        "linear-gradient(90deg, #fff 0% 50%, #000 50% 100%)"
    );
}

#[tokio::test]
async fn test_week_inside_one_year_fetches_once() {
    let mock_server = MockServer::start().await;
    mount_calendars(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/calendars/home/events"))
        .and(query_param("timeMin", "2024-01-01T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [all_day("h1", "Offsite", "2024-06-04", "2024-06-06")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = CalendarClient::with_base_url("token", &mock_server.uri());
    let calendars = client.list_calendars().await.unwrap();
    let home: Vec<_> = calendars.into_iter().filter(|c| c.id == "home").collect();

    let week_start = CivilDate::parse("2024-06-02").unwrap();
    let planner = Planner::load_week(&client, home, week_start).await.unwrap();

    let week = planner.week_bars(week_start);
    assert_eq!(week.len(), 1);
    assert_eq!((week[0].col_start, week[0].col_end), (3, 5));
}
