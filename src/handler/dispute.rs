// handler/dispute.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::disputedtos::*,
    dtos::ApiResponse,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn dispute_handler() -> Router {
    Router::new()
        .route("/", post(raise_dispute))
        .route("/:dispute_id", get(get_dispute))
        .route("/:dispute_id/status", patch(resolve_dispute))
}

pub async fn raise_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<RaiseDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state
        .dispute_service
        .raise_dispute(
            body.booking_id,
            auth.user.id,
            body.reason,
            body.evidence_urls.unwrap_or_default(),
        )
        .await
        .map_err(HttpError::from)?;

    let response: DisputeResponseDto = dispute.into();
    Ok(Json(ApiResponse::success("Dispute raised", response)))
}

pub async fn get_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(dispute_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let dispute = app_state
        .dispute_service
        .get_dispute(dispute_id, auth.user.id)
        .await
        .map_err(HttpError::from)?;

    let response: DisputeResponseDto = dispute.into();
    Ok(Json(ApiResponse::success("Dispute retrieved", response)))
}

pub async fn resolve_dispute(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(_auth): Extension<JWTAuthMiddeware>,
    Path(dispute_id): Path<Uuid>,
    Json(body): Json<ResolveDisputeDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let dispute = app_state
        .dispute_service
        .resolve_dispute(dispute_id, body.outcome, body.resolution_note)
        .await
        .map_err(HttpError::from)?;

    let response: DisputeResponseDto = dispute.into();
    Ok(Json(ApiResponse::success("Dispute resolved", response)))
}
