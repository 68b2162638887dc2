// handler/payment.rs
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
    dtos::walletdtos::*,
    dtos::bookingdtos::{EscrowListQueryDto, EscrowResponseDto},
    dtos::ApiResponse,
    error::HttpError,
    middleware::JWTAuthMiddeware,
    utils::currency::to_minor,
    AppState,
};

pub fn payment_handler() -> Router {
    Router::new()
        .route("/process", post(process_payment))
        .route("/wallet", get(get_wallet))
        .route("/wallet/topup", post(topup_wallet))
        .route("/wallet/withdraw", post(withdraw_from_wallet))
        .route("/wallet/transactions", get(get_wallet_transactions))
        .route("/credits", get(get_reward_credit))
        .route("/credits/transactions", get(get_reward_transactions))
        .route("/escrows", get(list_escrows))
        .route("/escrows/:escrow_id/release", post(release_escrow))
}

pub async fn process_payment(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<PaymentProcessDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let booking = app_state
        .payment_service
        .pay_for_booking(auth.user.id, body.booking_id, to_minor(body.amount))
        .await
        .map_err(HttpError::from)?;

    let result = PaymentResultDto {
        booking_id: booking.id,
        booking_status: booking.status,
        amount: body.amount,
        escrowed: booking.is_auction_derived(),
    };

    Ok(Json(ApiResponse::success("Payment processed", result)))
}

pub async fn get_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let wallet = app_state
        .payment_service
        .get_wallet(auth.user.id)
        .await
        .map_err(HttpError::from)?;

    let response: WalletResponseDto = wallet.into();
    Ok(Json(ApiResponse::success("Wallet retrieved", response)))
}

pub async fn topup_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<TopUpRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let txn = app_state
        .payment_service
        .topup_wallet(auth.user.id, to_minor(body.amount))
        .await
        .map_err(HttpError::from)?;

    let response: TransactionResponseDto = txn.into();
    Ok(Json(ApiResponse::success("Wallet topped up", response)))
}

pub async fn withdraw_from_wallet(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<WithdrawRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let txn = app_state
        .payment_service
        .withdraw_from_wallet(auth.user.id, to_minor(body.amount))
        .await
        .map_err(HttpError::from)?;

    let response: TransactionResponseDto = txn.into();
    Ok(Json(ApiResponse::success("Withdrawal recorded", response)))
}

pub async fn get_wallet_transactions(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<TransactionHistoryQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let txns = app_state
        .payment_service
        .get_wallet_transactions(
            auth.user.id,
            query.transaction_type,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await
        .map_err(HttpError::from)?;

    let response: Vec<TransactionResponseDto> = txns.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success("Transactions retrieved", response)))
}

pub async fn get_reward_credit(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let credit = app_state
        .payment_service
        .get_reward_credit(auth.user.id)
        .await
        .map_err(HttpError::from)?;

    let response: RewardCreditResponseDto = credit.into();
    Ok(Json(ApiResponse::success("Reward credits retrieved", response)))
}

pub async fn get_reward_transactions(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<TransactionHistoryQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let txns = app_state
        .payment_service
        .get_reward_transactions(
            auth.user.id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await
        .map_err(HttpError::from)?;

    let response: Vec<RewardTransactionResponseDto> = txns.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success("Reward transactions retrieved", response)))
}

pub async fn list_escrows(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Query(query): Query<EscrowListQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let escrows = app_state
        .payment_service
        .list_escrows(
            auth.user.id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await
        .map_err(HttpError::from)?;

    let response: Vec<EscrowResponseDto> = escrows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success("Escrows retrieved", response)))
}

pub async fn release_escrow(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Path(escrow_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let escrow = app_state
        .payment_service
        .release_escrow(escrow_id, auth.user.id)
        .await
        .map_err(HttpError::from)?;

    let response: EscrowResponseDto = escrow.into();
    Ok(Json(ApiResponse::success("Escrow released", response)))
}
