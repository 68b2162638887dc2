// handler/booking.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::bookingdtos::*,
    dtos::ApiResponse,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::bookingmodel::BookingStatus,
    AppState,
};

pub fn booking_handler() -> Router {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/from-bid", post(create_booking_from_bid))
        .route("/:booking_id", get(get_booking))
        .route("/:booking_id/start", post(start_booking))
        .route("/:booking_id/complete", post(complete_booking))
        .route("/:booking_id/cancel", post(cancel_booking))
        .route(
            "/:booking_id/reports",
            post(create_progress_report).get(list_progress_reports),
        )
}

pub async fn create_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateBookingDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .booking_service
        .create_booking(
            auth.user.id,
            body.service_id,
            body.scheduled_date,
            body.scheduled_end_date,
        )
        .await
        .map_err(HttpError::from)?;

    let response: BookingResponseDto = booking.into();
    Ok(Json(ApiResponse::success("Booking created", response)))
}

pub async fn create_booking_from_bid(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateBookingFromBidDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .booking_service
        .create_booking_from_bid(auth.user.id, body.bid_id)
        .await
        .map_err(HttpError::from)?;

    let response: BookingResponseDto = booking.into();
    Ok(Json(ApiResponse::success("Booking created from bid", response)))
}

pub async fn list_bookings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<BookingListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let bookings = app_state
        .booking_service
        .list_bookings(
            auth.user.id,
            query.status,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await
        .map_err(HttpError::from)?;

    let response: Vec<BookingResponseDto> = bookings.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success("Bookings retrieved", response)))
}

pub async fn get_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .booking_service
        .get_booking(booking_id, auth.user.id)
        .await
        .map_err(HttpError::from)?;

    let response: BookingResponseDto = booking.into();
    Ok(Json(ApiResponse::success("Booking retrieved", response)))
}

async fn transition(
    app_state: Arc<AppState>,
    auth: JWTAuthMiddeware,
    booking_id: Uuid,
    target: BookingStatus,
    message: &str,
) -> Result<Json<ApiResponse<BookingResponseDto>>, HttpError> {
    let booking = app_state
        .booking_service
        .transition_booking(booking_id, auth.user.id, target)
        .await
        .map_err(HttpError::from)?;

    Ok(Json(ApiResponse::success(message, booking.into())))
}

pub async fn start_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    transition(app_state, auth, booking_id, BookingStatus::InProgress, "Booking started").await
}

pub async fn complete_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    transition(app_state, auth, booking_id, BookingStatus::Completed, "Booking completed").await
}

pub async fn cancel_booking(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    transition(app_state, auth, booking_id, BookingStatus::Cancelled, "Booking cancelled").await
}

pub async fn create_progress_report(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<CreateProgressReportDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let report = app_state
        .booking_service
        .create_progress_report(
            booking_id,
            auth.user.id,
            body.note,
            body.message,
            body.content,
            body.media_url,
        )
        .await
        .map_err(HttpError::from)?;

    let response: ProgressReportResponseDto = report.into();
    Ok(Json(ApiResponse::success("Progress report created", response)))
}

pub async fn list_progress_reports(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let reports = app_state
        .booking_service
        .list_progress_reports(booking_id, auth.user.id)
        .await
        .map_err(HttpError::from)?;

    let response: Vec<ProgressReportResponseDto> = reports.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success("Progress reports retrieved", response)))
}
