// db/rewarddb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use super::error::DbError;
use crate::models::walletmodels::{RewardCredit, RewardCreditTransaction, RewardTransactionType};
use crate::utils::reference::generate_transaction_reference;

#[async_trait]
pub trait RewardCreditExt {
    async fn get_or_create_reward_credit(&self, user_id: Uuid) -> Result<RewardCredit, DbError>;

    async fn credit_rewards(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: RewardTransactionType,
        description: Option<String>,
    ) -> Result<RewardCreditTransaction, DbError>;

    async fn debit_rewards(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: RewardTransactionType,
        description: Option<String>,
    ) -> Result<RewardCreditTransaction, DbError>;

    async fn get_reward_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RewardCreditTransaction>, DbError>;
}

const CREDIT_COLUMNS: &str = "id, user_id, balance, created_at, updated_at";

const CREDIT_TXN_COLUMNS: &str = r#"
    id,
    reward_credit_id,
    user_id,
    transaction_type,
    amount,
    balance_before,
    balance_after,
    reference,
    description,
    created_at
"#;

async fn lock_reward_credit(
    conn: &mut sqlx::PgConnection,
    user_id: Uuid,
) -> Result<RewardCredit, DbError> {
    sqlx::query("INSERT INTO reward_credits (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    let credit = sqlx::query_as::<_, RewardCredit>(&format!(
        "SELECT {} FROM reward_credits WHERE user_id = $1 FOR UPDATE",
        CREDIT_COLUMNS
    ))
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(credit)
}

async fn apply_reward_txn(
    conn: &mut sqlx::PgConnection,
    credit: &RewardCredit,
    amount: i64,
    transaction_type: RewardTransactionType,
    description: Option<String>,
) -> Result<RewardCreditTransaction, DbError> {
    let delta = amount * transaction_type.balance_sign();
    let balance_after = credit.balance + delta;

    sqlx::query("UPDATE reward_credits SET balance = $2, updated_at = NOW() WHERE id = $1")
        .bind(credit.id)
        .bind(balance_after)
        .execute(&mut *conn)
        .await?;

    let txn = sqlx::query_as::<_, RewardCreditTransaction>(&format!(
        r#"
        INSERT INTO reward_credit_transactions
            (reward_credit_id, user_id, transaction_type, amount,
             balance_before, balance_after, reference, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {}
        "#,
        CREDIT_TXN_COLUMNS
    ))
    .bind(credit.id)
    .bind(credit.user_id)
    .bind(transaction_type)
    .bind(amount)
    .bind(credit.balance)
    .bind(balance_after)
    .bind(generate_transaction_reference())
    .bind(description)
    .fetch_one(&mut *conn)
    .await?;

    Ok(txn)
}

#[async_trait]
impl RewardCreditExt for DBClient {
    async fn get_or_create_reward_credit(&self, user_id: Uuid) -> Result<RewardCredit, DbError> {
        sqlx::query(
            "INSERT INTO reward_credits (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let credit = sqlx::query_as::<_, RewardCredit>(&format!(
            "SELECT {} FROM reward_credits WHERE user_id = $1",
            CREDIT_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(credit)
    }

    async fn credit_rewards(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: RewardTransactionType,
        description: Option<String>,
    ) -> Result<RewardCreditTransaction, DbError> {
        if amount <= 0 {
            return Err(DbError::InvalidAmount);
        }
        if transaction_type.balance_sign() <= 0 {
            return Err(DbError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;
        let credit = lock_reward_credit(&mut tx, user_id).await?;
        let txn = apply_reward_txn(&mut tx, &credit, amount, transaction_type, description).await?;
        tx.commit().await?;
        Ok(txn)
    }

    async fn debit_rewards(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: RewardTransactionType,
        description: Option<String>,
    ) -> Result<RewardCreditTransaction, DbError> {
        if amount <= 0 {
            return Err(DbError::InvalidAmount);
        }
        if transaction_type.balance_sign() >= 0 {
            return Err(DbError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;
        let credit = lock_reward_credit(&mut tx, user_id).await?;

        if credit.balance < amount {
            return Err(DbError::InsufficientCredits {
                required: amount,
                available: credit.balance,
            });
        }

        let txn = apply_reward_txn(&mut tx, &credit, amount, transaction_type, description).await?;
        tx.commit().await?;
        Ok(txn)
    }

    async fn get_reward_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RewardCreditTransaction>, DbError> {
        let txns = sqlx::query_as::<_, RewardCreditTransaction>(&format!(
            r#"
            SELECT {} FROM reward_credit_transactions
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            CREDIT_TXN_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(txns)
    }
}
