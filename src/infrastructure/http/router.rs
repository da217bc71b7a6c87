use crate::infrastructure::http::controllers::{bookings, health, slots};
use crate::infrastructure::http::middleware::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/slots", get(slots::list_slots))
        .route("/api/bookings/check", post(bookings::check_booking));

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
