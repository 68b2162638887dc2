// service/error.rs
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::db::error::DbError;
use crate::error::HttpError;
use crate::models::bookingmodel::BookingStatus;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Booking {0} not found")]
    BookingNotFound(Uuid),

    #[error("Booking {0} is in status {1:?}, which does not allow this action")]
    InvalidBookingStatus(Uuid, BookingStatus),

    #[error("User {0} is not a party to booking {1}")]
    UnauthorizedBookingAccess(Uuid, Uuid),

    #[error("Service listing {0} not found or inactive")]
    ServiceUnavailable(Uuid),

    #[error("Auction bid {0} has not been accepted")]
    BidNotAccepted(Uuid),

    #[error("Contract {0} not found")]
    ContractNotFound(Uuid),

    #[error("Contract party has already signed: {0}")]
    AlreadySigned(String),

    #[error("Escrow {0} not found")]
    EscrowNotFound(Uuid),

    #[error("Escrow is no longer held and cannot be settled again")]
    EscrowNotHeld,

    #[error("Dispute {0} not found")]
    DisputeNotFound(Uuid),

    #[error("Booking {0} already has an open dispute")]
    DisputeExists(Uuid),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Insufficient reward credits: required {required}, available {available}")]
    InsufficientCredits { required: i64, available: i64 },

    #[error("Wallet is not active")]
    WalletInactive,

    #[error("Daily withdrawal limit exceeded")]
    WithdrawalLimitExceeded,

    #[error("{0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<DbError> for ServiceError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::InsufficientFunds {
                required,
                available,
            } => ServiceError::InsufficientFunds {
                required: crate::utils::currency::to_major(required),
                available: crate::utils::currency::to_major(available),
            },
            DbError::InsufficientCredits {
                required,
                available,
            } => ServiceError::InsufficientCredits {
                required,
                available,
            },
            DbError::InvalidAmount => {
                ServiceError::Validation("Amount must be a positive value".to_string())
            }
            DbError::WalletInactive(_) => ServiceError::WalletInactive,
            DbError::EscrowNotHeld => ServiceError::EscrowNotHeld,
            DbError::EscrowExists(booking_id) => ServiceError::InvalidState(format!(
                "Booking {} already has an escrow hold",
                booking_id
            )),
            DbError::AlreadySigned(role) => ServiceError::AlreadySigned(role.to_string()),
            DbError::NotParty => {
                ServiceError::Validation("User is not a party to this record".to_string())
            }
            DbError::DisputeExists(booking_id) => ServiceError::DisputeExists(booking_id),
            DbError::InvalidBookingStatus => {
                ServiceError::InvalidState("Record is not in a status that allows this action".to_string())
            }
            DbError::NotFound => ServiceError::Other("Record not found".to_string()),
            DbError::Sqlx(err) => ServiceError::Database(err),
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        match status {
            StatusCode::NOT_FOUND => HttpError::not_found(error.to_string()),
            StatusCode::BAD_REQUEST => HttpError::bad_request(error.to_string()),
            StatusCode::FORBIDDEN => HttpError::forbidden(error.to_string()),
            StatusCode::CONFLICT => HttpError::conflict(error.to_string()),
            StatusCode::PAYMENT_REQUIRED => HttpError::payment_required(error.to_string()),
            _ => HttpError::server_error(error.to_string()),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BookingNotFound(_)
            | ServiceError::ContractNotFound(_)
            | ServiceError::EscrowNotFound(_)
            | ServiceError::DisputeNotFound(_)
            | ServiceError::ServiceUnavailable(_) => StatusCode::NOT_FOUND,

            ServiceError::BidNotAccepted(_)
            | ServiceError::WalletInactive
            | ServiceError::WithdrawalLimitExceeded
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::UnauthorizedBookingAccess(_, _) => StatusCode::FORBIDDEN,

            ServiceError::InvalidBookingStatus(_, _)
            | ServiceError::InvalidState(_)
            | ServiceError::AlreadySigned(_)
            | ServiceError::EscrowNotHeld
            | ServiceError::DisputeExists(_) => StatusCode::CONFLICT,

            ServiceError::InsufficientFunds { .. } | ServiceError::InsufficientCredits { .. } => {
                StatusCode::PAYMENT_REQUIRED
            }

            ServiceError::Database(_) | ServiceError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_errors_map_to_conflict() {
        let booking_id = Uuid::new_v4();

        let err = ServiceError::InvalidBookingStatus(booking_id, BookingStatus::Completed);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = ServiceError::DisputeExists(booking_id);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: ServiceError = DbError::InvalidBookingStatus.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err: ServiceError = DbError::EscrowExists(booking_id).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_errors_stay_bad_request() {
        let err: ServiceError = DbError::InvalidAmount.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
