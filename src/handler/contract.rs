// handler/contract.rs
use std::sync::Arc;

use axum::{
    extract::Path,
    http::HeaderMap,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::contractdtos::*,
    dtos::ApiResponse,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn contract_handler() -> Router {
    Router::new()
        .route("/", post(create_contract))
        .route("/:contract_id", get(get_contract))
        .route("/:contract_id/sign", post(sign_contract))
        .route("/:contract_id/complete", post(complete_contract))
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
}

pub async fn create_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateSmartContractDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let contract = app_state
        .contract_service
        .create_contract_for_booking(body.booking_id, auth.user.id)
        .await
        .map_err(HttpError::from)?;

    let response: SmartContractResponseDto = contract.into();
    Ok(Json(ApiResponse::success("Smart contract ready", response)))
}

pub async fn get_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let contract = app_state
        .contract_service
        .get_contract(contract_id, auth.user.id)
        .await
        .map_err(HttpError::from)?;

    let response: SmartContractResponseDto = contract.into();
    Ok(Json(ApiResponse::success("Smart contract retrieved", response)))
}

pub async fn sign_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
    headers: HeaderMap,
    Json(body): Json<SignContractDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let contract = app_state
        .contract_service
        .sign_contract(contract_id, auth.user.id, body.signature, client_ip(&headers))
        .await
        .map_err(HttpError::from)?;

    let response: SmartContractResponseDto = contract.into();
    Ok(Json(ApiResponse::success("Contract signed", response)))
}

pub async fn complete_contract(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(contract_id): Path<Uuid>,
    Json(body): Json<CompleteContractDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let contract = app_state
        .contract_service
        .complete_contract(contract_id, auth.user.id, body.completion_proof)
        .await
        .map_err(HttpError::from)?;

    let response: SmartContractResponseDto = contract.into();
    Ok(Json(ApiResponse::success("Contract completed", response)))
}
