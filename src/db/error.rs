// db/error.rs
use thiserror::Error;
use uuid::Uuid;

use crate::models::walletmodels::WalletStatus;

/// Errors raised by the guarded data-access operations. Every precondition
/// that involves a balance or a state column is re-checked inside the row
/// lock, so these can surface from the db layer even after a service-level
/// pre-check passed.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Wallet is {0:?} and cannot transact")]
    WalletInactive(WalletStatus),

    #[error("Insufficient reward credits: required {required}, available {available}")]
    InsufficientCredits { required: i64, available: i64 },

    #[error("Escrow is not in held state")]
    EscrowNotHeld,

    #[error("An escrow already exists for booking {0}")]
    EscrowExists(Uuid),

    #[error("The {0} has already signed this contract")]
    AlreadySigned(&'static str),

    #[error("User is not a party to this record")]
    NotParty,

    #[error("An active dispute already exists for booking {0}")]
    DisputeExists(Uuid),

    #[error("Record is not in a status that allows this operation")]
    InvalidBookingStatus,

    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// True when the sqlx error is a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
