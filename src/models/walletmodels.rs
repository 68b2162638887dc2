// models/walletmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "wallet_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    Active,
    Suspended,
    Closed,
}

/// Closed set of ledger entry kinds. Every balance mutation is recorded
/// under exactly one of these; consumers match exhaustively.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Deposit,
    Withdrawal,
    Payment,
    Refund,
    Earning,
    Fee,
    EscrowHold,
    EscrowRelease,
}

impl TransactionType {
    /// Sign of the balance change implied by this entry kind.
    ///
    /// Escrow holds and refunds move availability, not money: the balance
    /// is untouched, so they contribute 0 when replaying the ledger.
    /// An escrow release is the point where money actually leaves the
    /// consumer wallet (the provider side is recorded as an earning).
    pub fn balance_sign(&self) -> i64 {
        match self {
            TransactionType::Deposit => 1,
            TransactionType::Earning => 1,
            TransactionType::Withdrawal => -1,
            TransactionType::Payment => -1,
            TransactionType::Fee => -1,
            TransactionType::EscrowRelease => -1,
            TransactionType::EscrowHold => 0,
            TransactionType::Refund => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub escrow_balance: i64,
    pub status: WalletStatus,
    pub daily_limit: Option<i64>,
    pub monthly_limit: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_activity_at: Option<DateTime<Utc>>,
}

impl Wallet {
    /// Funds not currently earmarked for an escrow. Always derived,
    /// never stored.
    pub fn available_balance(&self) -> i64 {
        self.balance - self.escrow_balance
    }

    pub fn is_active(&self) -> bool {
        self.status == WalletStatus::Active
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i64, // minor units
    pub balance_before: i64,
    pub balance_after: i64,
    pub reference: String, // Unique transaction reference
    pub description: Option<String>,
    pub booking_id: Option<Uuid>,
    pub counterparty_wallet_id: Option<Uuid>, // For transfers
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RewardCredit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "reward_transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RewardTransactionType {
    Earn,
    BidFee,
    Adjustment,
}

impl RewardTransactionType {
    pub fn balance_sign(&self) -> i64 {
        match self {
            RewardTransactionType::Earn => 1,
            RewardTransactionType::BidFee => -1,
            RewardTransactionType::Adjustment => 1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct RewardCreditTransaction {
    pub id: Uuid,
    pub reward_credit_id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: RewardTransactionType,
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub reference: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn wallet(balance: i64, escrow: i64) -> Wallet {
        Wallet {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            balance,
            escrow_balance: escrow,
            status: WalletStatus::Active,
            daily_limit: None,
            monthly_limit: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_activity_at: None,
        }
    }

    #[test]
    fn test_available_balance_is_derived() {
        assert_eq!(wallet(107000, 107000).available_balance(), 0);
        assert_eq!(wallet(100000, 25000).available_balance(), 75000);
        assert_eq!(wallet(0, 0).available_balance(), 0);
    }

    #[test]
    fn test_balance_signs() {
        assert_eq!(TransactionType::Deposit.balance_sign(), 1);
        assert_eq!(TransactionType::Earning.balance_sign(), 1);
        assert_eq!(TransactionType::Withdrawal.balance_sign(), -1);
        assert_eq!(TransactionType::Payment.balance_sign(), -1);
        assert_eq!(TransactionType::EscrowRelease.balance_sign(), -1);
        // availability moves, money does not
        assert_eq!(TransactionType::EscrowHold.balance_sign(), 0);
        assert_eq!(TransactionType::Refund.balance_sign(), 0);
    }
}
