// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        booking::booking_handler, contract::contract_handler, dispute::dispute_handler,
        notification::notification_handler, payment::payment_handler,
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let booking_routes = booking_handler()
        .nest("/smart-contracts", contract_handler())
        .layer(middleware::from_fn(auth));

    let api_route = Router::new()
        .route("/healthcheck", get(health_check))
        .nest("/bookings", booking_routes)
        .nest("/payment", payment_handler().layer(middleware::from_fn(auth)))
        .nest("/disputes", dispute_handler().layer(middleware::from_fn(auth)))
        .nest(
            "/notifications",
            notification_handler().layer(middleware::from_fn(auth)),
        )
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new().nest("/api", api_route)
}
