// dtos/walletdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::walletmodels::*;
use crate::utils::currency::to_major;

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletResponseDto {
    pub id: Uuid,
    pub balance: f64,
    pub escrow_balance: f64,
    pub available_balance: f64,
    pub status: WalletStatus,
    pub daily_limit: Option<f64>,
    pub monthly_limit: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TopUpRequestDto {
    #[validate(range(min = 1.0, max = 10000000.0, message = "Amount must be between 1 and 10,000,000"))]
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct WithdrawRequestDto {
    #[validate(range(min = 1.0, max = 5000000.0, message = "Amount must be between 1 and 5,000,000"))]
    pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponseDto {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub balance_before: f64,
    pub balance_after: f64,
    pub reference: String,
    pub description: Option<String>,
    pub booking_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TransactionHistoryQueryDto {
    pub transaction_type: Option<TransactionType>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must be non-negative"))]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PaymentProcessDto {
    pub booking_id: Uuid,

    #[validate(range(min = 0.01, message = "Amount must be positive"))]
    pub amount: f64,
}

// Echoes the booking status so clients can update without a refetch.
#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResultDto {
    pub booking_id: Uuid,
    pub booking_status: crate::models::bookingmodel::BookingStatus,
    pub amount: f64,
    pub escrowed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RewardCreditResponseDto {
    pub id: Uuid,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RewardTransactionResponseDto {
    pub id: Uuid,
    pub transaction_type: RewardTransactionType,
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub reference: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponseDto {
    fn from(wallet: Wallet) -> Self {
        Self {
            id: wallet.id,
            balance: to_major(wallet.balance),
            escrow_balance: to_major(wallet.escrow_balance),
            available_balance: to_major(wallet.available_balance()),
            status: wallet.status,
            daily_limit: wallet.daily_limit.map(to_major),
            monthly_limit: wallet.monthly_limit.map(to_major),
            created_at: wallet.created_at,
            last_activity_at: wallet.last_activity_at,
        }
    }
}

impl From<WalletTransaction> for TransactionResponseDto {
    fn from(tx: WalletTransaction) -> Self {
        Self {
            id: tx.id,
            transaction_type: tx.transaction_type,
            amount: to_major(tx.amount),
            balance_before: to_major(tx.balance_before),
            balance_after: to_major(tx.balance_after),
            reference: tx.reference,
            description: tx.description,
            booking_id: tx.booking_id,
            created_at: tx.created_at,
        }
    }
}

impl From<RewardCredit> for RewardCreditResponseDto {
    fn from(credit: RewardCredit) -> Self {
        Self {
            id: credit.id,
            balance: credit.balance,
            created_at: credit.created_at,
        }
    }
}

impl From<RewardCreditTransaction> for RewardTransactionResponseDto {
    fn from(tx: RewardCreditTransaction) -> Self {
        Self {
            id: tx.id,
            transaction_type: tx.transaction_type,
            amount: tx.amount,
            balance_before: tx.balance_before,
            balance_after: tx.balance_after,
            reference: tx.reference,
            description: tx.description,
            created_at: tx.created_at,
        }
    }
}
