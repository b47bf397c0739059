use axum::Json;
use chrono::{Duration, Local};

use crate::api::{ApiError, CalendarEventDto, CalendarResponse};

/// Sample events for the office display. Stand-in for a future external
/// calendar integration; times are always relative to the request time.
pub async fn get_calendar_events() -> Result<Json<CalendarResponse>, ApiError> {
    let now = Local::now();
    let at = |hours: i64| (now + Duration::hours(hours)).to_rfc3339();

    let events = vec![
        CalendarEventDto {
            id: "1".to_string(),
            title: "Team Meeting".to_string(),
            start: at(1),
            end: at(2),
            location: "Conference Room A".to_string(),
            description: "Weekly team sync-up meeting".to_string(),
        },
        CalendarEventDto {
            id: "2".to_string(),
            title: "Project Review".to_string(),
            start: at(3),
            end: at(4),
            location: "Conference Room B".to_string(),
            description: "Q1 project review and planning".to_string(),
        },
        CalendarEventDto {
            id: "3".to_string(),
            title: "Client Presentation".to_string(),
            start: at(5),
            end: at(6),
            location: "Main Office".to_string(),
            description: "Presentation to key stakeholders".to_string(),
        },
    ];

    tracing::info!("Retrieved {} calendar events", events.len());

    Ok(Json(CalendarResponse {
        events,
        status: "success",
        message: "Using sample data - integrate an external calendar provider for production"
            .to_string(),
    }))
}
