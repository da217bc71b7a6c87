use crate::{
    application::services::SlotQuery,
    domain::entities::Slot,
    infrastructure::http::middleware::{ApiError, ApiResult, AppState},
};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SlotsParams {
    pub date: Option<String>,
    pub duration: Option<String>,
    pub worker_id: Option<String>,
    pub service_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub slots: Vec<Slot>,
}

impl SlotsParams {
    fn into_query(self) -> ApiResult<SlotQuery> {
        let date = self
            .date
            .ok_or_else(|| ApiError::BadRequest("Missing required parameter: date".to_string()))?;
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|_| ApiError::BadRequest(format!("Invalid date: {}", date)))?;

        let duration = self.duration.ok_or_else(|| {
            ApiError::BadRequest("Missing required parameter: duration".to_string())
        })?;
        let duration_minutes = duration
            .trim()
            .parse::<u32>()
            .map_err(|_| ApiError::BadRequest(format!("Invalid duration: {}", duration)))?;

        Ok(SlotQuery {
            date,
            duration_minutes,
            worker_id: self.worker_id.filter(|id| !id.is_empty()),
            service_id: self.service_id.filter(|id| !id.is_empty()),
        })
    }
}

/// GET /api/slots - Bookable slots for a day
pub async fn list_slots(
    State(state): State<AppState>,
    Query(params): Query<SlotsParams>,
) -> ApiResult<Json<SlotsResponse>> {
    let query = params.into_query()?;

    let slots = state.scheduling_service.available_slots(&query).await?;

    Ok(Json(SlotsResponse {
        date: query.date,
        duration_minutes: query.duration_minutes,
        slots,
    }))
}
