// handler/notification.rs
use std::sync::Arc;

use axum::{
    extract::Query,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::notificationdtos::*,
    dtos::ApiResponse,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn notification_handler() -> Router {
    Router::new().route("/", get(list_notifications))
}

pub async fn list_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<NotificationListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let notifications = app_state
        .notification_service
        .list_for_user(
            auth.user.id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await
        .map_err(HttpError::from)?;

    let response: Vec<NotificationResponseDto> =
        notifications.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(
        "Notifications retrieved",
        response,
    )))
}
