use crate::infrastructure::http::middleware::{ApiError, ApiResult, AppState};
use axum::{extract::State, Json};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct BookingCheckRequest {
    pub worker_id: String,
    /// `YYYY-MM-DDTHH:MM[:SS]`, business-local
    pub start: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Serialize)]
pub struct BookingCheckResponse {
    pub available: bool,
}

fn parse_start(value: &str) -> ApiResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map_err(|_| ApiError::BadRequest(format!("Invalid start: {}", value)))
}

/// POST /api/bookings/check - Re-check a worker's calendar right before booking
pub async fn check_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingCheckRequest>,
) -> ApiResult<Json<BookingCheckResponse>> {
    let start = parse_start(&request.start)?;

    state
        .scheduling_service
        .ensure_no_conflict(&request.worker_id, start, request.duration_minutes)
        .await?;

    Ok(Json(BookingCheckResponse { available: true }))
}
