// db/escrowdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::db::DBClient;
use super::error::{is_unique_violation, DbError};
use super::walletdb::{
    check_active, check_available, ensure_wallet, insert_wallet_txn, lock_wallet,
    update_wallet_balances, NewWalletTxn,
};
use crate::models::escrowmodel::{Escrow, EscrowStatus};
use crate::models::walletmodels::TransactionType;

/// A resolution to stamp onto the dispute row in the same transaction as
/// the escrow settlement, so "dispute resolved" and "money moved" cannot
/// be observed apart.
pub struct DisputeSettlement {
    pub dispute_id: Uuid,
    pub outcome: crate::models::disputemodel::DisputeOutcome,
    pub resolution_note: Option<String>,
}

#[async_trait]
pub trait EscrowExt {
    /// Earmarks `amount` on the consumer wallet and creates the escrow in
    /// `held` state, all in one transaction. The money stays on the
    /// consumer balance; only its availability moves.
    async fn create_escrow_hold(
        &self,
        booking_id: Uuid,
        consumer_id: Uuid,
        provider_id: Uuid,
        amount: i64,
    ) -> Result<Escrow, DbError>;

    /// held -> released: moves the escrowed amount out of the consumer
    /// wallet and into the provider wallet. Terminal.
    async fn release_escrow(
        &self,
        escrow_id: Uuid,
        settlement: Option<DisputeSettlement>,
    ) -> Result<Escrow, DbError>;

    /// held -> refunded: restores availability on the consumer wallet.
    /// The balance is untouched because the funds never left it. Terminal.
    async fn refund_escrow(
        &self,
        escrow_id: Uuid,
        settlement: Option<DisputeSettlement>,
    ) -> Result<Escrow, DbError>;

    async fn get_escrow(&self, escrow_id: Uuid) -> Result<Option<Escrow>, DbError>;

    async fn get_escrow_by_booking(&self, booking_id: Uuid) -> Result<Option<Escrow>, DbError>;

    async fn list_escrows_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Escrow>, DbError>;
}

const ESCROW_COLUMNS: &str = r#"
    id,
    booking_id,
    consumer_id,
    provider_id,
    escrow_amount,
    status,
    released_amount,
    released_at,
    dispute_id,
    created_at,
    updated_at
"#;

async fn lock_escrow(
    conn: &mut sqlx::PgConnection,
    escrow_id: Uuid,
) -> Result<Option<Escrow>, sqlx::Error> {
    sqlx::query_as::<_, Escrow>(&format!(
        "SELECT {} FROM escrows WHERE id = $1 FOR UPDATE",
        ESCROW_COLUMNS
    ))
    .bind(escrow_id)
    .fetch_optional(conn)
    .await
}

async fn settle_dispute_row(
    conn: &mut sqlx::PgConnection,
    settlement: &DisputeSettlement,
    resolved_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE disputes
        SET status = 'resolved',
            outcome = $2,
            resolution_note = $3,
            resolved_at = $4
        WHERE id = $1
        "#,
    )
    .bind(settlement.dispute_id)
    .bind(settlement.outcome)
    .bind(&settlement.resolution_note)
    .bind(resolved_at)
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl EscrowExt for DBClient {
    async fn create_escrow_hold(
        &self,
        booking_id: Uuid,
        consumer_id: Uuid,
        provider_id: Uuid,
        amount: i64,
    ) -> Result<Escrow, DbError> {
        if amount <= 0 {
            return Err(DbError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;

        ensure_wallet(&mut tx, consumer_id).await?;
        let wallet = lock_wallet(&mut tx, consumer_id).await?;
        check_active(&wallet)?;
        check_available(&wallet, amount)?;

        // Balance unchanged; earmark only.
        update_wallet_balances(&mut tx, wallet.id, wallet.balance, wallet.escrow_balance + amount)
            .await?;

        insert_wallet_txn(
            &mut tx,
            NewWalletTxn {
                wallet_id: wallet.id,
                user_id: consumer_id,
                transaction_type: TransactionType::EscrowHold,
                amount,
                balance_before: wallet.balance,
                balance_after: wallet.balance,
                description: "Funds held in escrow".to_string(),
                booking_id: Some(booking_id),
                counterparty_wallet_id: None,
            },
        )
        .await?;

        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            INSERT INTO escrows (booking_id, consumer_id, provider_id, escrow_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ESCROW_COLUMNS
        ))
        .bind(booking_id)
        .bind(consumer_id)
        .bind(provider_id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::EscrowExists(booking_id)
            } else {
                DbError::Sqlx(e)
            }
        })?;

        tx.commit().await?;
        Ok(escrow)
    }

    async fn release_escrow(
        &self,
        escrow_id: Uuid,
        settlement: Option<DisputeSettlement>,
    ) -> Result<Escrow, DbError> {
        let mut tx = self.pool.begin().await?;

        let escrow = lock_escrow(&mut tx, escrow_id)
            .await?
            .ok_or(DbError::NotFound)?;
        if escrow.status != EscrowStatus::Held {
            return Err(DbError::EscrowNotHeld);
        }

        let amount = escrow.escrow_amount;

        ensure_wallet(&mut tx, escrow.provider_id).await?;
        let (consumer, provider) = if escrow.consumer_id <= escrow.provider_id {
            let c = lock_wallet(&mut tx, escrow.consumer_id).await?;
            let p = lock_wallet(&mut tx, escrow.provider_id).await?;
            (c, p)
        } else {
            let p = lock_wallet(&mut tx, escrow.provider_id).await?;
            let c = lock_wallet(&mut tx, escrow.consumer_id).await?;
            (c, p)
        };

        // The hold guarantees this; guard against drift anyway.
        if consumer.escrow_balance < amount || consumer.balance < amount {
            return Err(DbError::EscrowNotHeld);
        }

        update_wallet_balances(
            &mut tx,
            consumer.id,
            consumer.balance - amount,
            consumer.escrow_balance - amount,
        )
        .await?;
        update_wallet_balances(&mut tx, provider.id, provider.balance + amount, provider.escrow_balance)
            .await?;

        insert_wallet_txn(
            &mut tx,
            NewWalletTxn {
                wallet_id: consumer.id,
                user_id: escrow.consumer_id,
                transaction_type: TransactionType::EscrowRelease,
                amount,
                balance_before: consumer.balance,
                balance_after: consumer.balance - amount,
                description: "Escrow released to provider".to_string(),
                booking_id: Some(escrow.booking_id),
                counterparty_wallet_id: Some(provider.id),
            },
        )
        .await?;

        insert_wallet_txn(
            &mut tx,
            NewWalletTxn {
                wallet_id: provider.id,
                user_id: escrow.provider_id,
                transaction_type: TransactionType::Earning,
                amount,
                balance_before: provider.balance,
                balance_after: provider.balance + amount,
                description: "Escrow payout received".to_string(),
                booking_id: Some(escrow.booking_id),
                counterparty_wallet_id: Some(consumer.id),
            },
        )
        .await?;

        let now = Utc::now();
        let dispute_id = settlement.as_ref().map(|s| s.dispute_id);
        if let Some(settlement) = &settlement {
            settle_dispute_row(&mut tx, settlement, now).await?;
        }

        let updated = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            UPDATE escrows
            SET status = 'released',
                released_amount = escrow_amount,
                released_at = $2,
                dispute_id = COALESCE($3, dispute_id),
                updated_at = $2
            WHERE id = $1 AND status = 'held'
            RETURNING {}
            "#,
            ESCROW_COLUMNS
        ))
        .bind(escrow_id)
        .bind(now)
        .bind(dispute_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::EscrowNotHeld)?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn refund_escrow(
        &self,
        escrow_id: Uuid,
        settlement: Option<DisputeSettlement>,
    ) -> Result<Escrow, DbError> {
        let mut tx = self.pool.begin().await?;

        let escrow = lock_escrow(&mut tx, escrow_id)
            .await?
            .ok_or(DbError::NotFound)?;
        if escrow.status != EscrowStatus::Held {
            return Err(DbError::EscrowNotHeld);
        }

        let amount = escrow.escrow_amount;
        let consumer = lock_wallet(&mut tx, escrow.consumer_id).await?;

        if consumer.escrow_balance < amount {
            return Err(DbError::EscrowNotHeld);
        }

        // Availability restored; the money never left the consumer wallet.
        update_wallet_balances(
            &mut tx,
            consumer.id,
            consumer.balance,
            consumer.escrow_balance - amount,
        )
        .await?;

        insert_wallet_txn(
            &mut tx,
            NewWalletTxn {
                wallet_id: consumer.id,
                user_id: escrow.consumer_id,
                transaction_type: TransactionType::Refund,
                amount,
                balance_before: consumer.balance,
                balance_after: consumer.balance,
                description: "Escrow refunded".to_string(),
                booking_id: Some(escrow.booking_id),
                counterparty_wallet_id: None,
            },
        )
        .await?;

        let now = Utc::now();
        let dispute_id = settlement.as_ref().map(|s| s.dispute_id);
        if let Some(settlement) = &settlement {
            settle_dispute_row(&mut tx, settlement, now).await?;
        }

        let updated = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            UPDATE escrows
            SET status = 'refunded',
                released_amount = escrow_amount,
                released_at = $2,
                dispute_id = COALESCE($3, dispute_id),
                updated_at = $2
            WHERE id = $1 AND status = 'held'
            RETURNING {}
            "#,
            ESCROW_COLUMNS
        ))
        .bind(escrow_id)
        .bind(now)
        .bind(dispute_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::EscrowNotHeld)?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn get_escrow(&self, escrow_id: Uuid) -> Result<Option<Escrow>, DbError> {
        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            "SELECT {} FROM escrows WHERE id = $1",
            ESCROW_COLUMNS
        ))
        .bind(escrow_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(escrow)
    }

    async fn get_escrow_by_booking(&self, booking_id: Uuid) -> Result<Option<Escrow>, DbError> {
        let escrow = sqlx::query_as::<_, Escrow>(&format!(
            "SELECT {} FROM escrows WHERE booking_id = $1",
            ESCROW_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(escrow)
    }

    async fn list_escrows_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Escrow>, DbError> {
        let escrows = sqlx::query_as::<_, Escrow>(&format!(
            r#"
            SELECT {}
            FROM escrows
            WHERE consumer_id = $1 OR provider_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            ESCROW_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(escrows)
    }
}
