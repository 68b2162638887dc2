// db/walletdb.rs
use async_trait::async_trait;
use sqlx::PgConnection;
use uuid::Uuid;

use super::db::DBClient;
use super::error::DbError;
use crate::models::walletmodels::*;
use crate::utils::reference::generate_transaction_reference;

/// The wallet ledger. Every operation that both checks a balance and
/// writes one runs in a single transaction holding a `FOR UPDATE` lock on
/// the wallet row(s), and appends an immutable wallet_transactions row
/// capturing the before/after balances.
#[async_trait]
pub trait WalletExt {
    /// Wallets are created lazily on first access; this never fails with
    /// "not found".
    async fn get_or_create_wallet(&self, user_id: Uuid) -> Result<Wallet, DbError>;

    async fn credit_wallet(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        booking_id: Option<Uuid>,
    ) -> Result<WalletTransaction, DbError>;

    async fn debit_wallet(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        booking_id: Option<Uuid>,
    ) -> Result<WalletTransaction, DbError>;

    /// Two ledger entries sharing one correlation; if the credit leg cannot
    /// complete, the debit leg is rolled back with it.
    async fn transfer_funds(
        &self,
        from_user_id: Uuid,
        to_user_id: Uuid,
        amount: i64,
        description: String,
        booking_id: Option<Uuid>,
    ) -> Result<(WalletTransaction, WalletTransaction), DbError>;

    async fn get_wallet_transactions(
        &self,
        user_id: Uuid,
        transaction_type: Option<TransactionType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, DbError>;

    /// Sum of today's completed withdrawals, for the daily-limit check.
    async fn get_withdrawals_today(&self, user_id: Uuid) -> Result<i64, DbError>;
}

const WALLET_COLUMNS: &str = r#"
    id,
    user_id,
    balance,
    escrow_balance,
    status,
    daily_limit,
    monthly_limit,
    created_at,
    updated_at,
    last_activity_at
"#;

const TXN_COLUMNS: &str = r#"
    id,
    wallet_id,
    user_id,
    transaction_type,
    amount,
    balance_before,
    balance_after,
    reference,
    description,
    booking_id,
    counterparty_wallet_id,
    created_at
"#;

pub(crate) async fn ensure_wallet(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO wallets (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub(crate) async fn lock_wallet(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Wallet, sqlx::Error> {
    sqlx::query_as::<_, Wallet>(&format!(
        "SELECT {} FROM wallets WHERE user_id = $1 FOR UPDATE",
        WALLET_COLUMNS
    ))
    .bind(user_id)
    .fetch_one(conn)
    .await
}

pub(crate) async fn update_wallet_balances(
    conn: &mut PgConnection,
    wallet_id: Uuid,
    balance: i64,
    escrow_balance: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE wallets
        SET balance = $2,
            escrow_balance = $3,
            updated_at = NOW(),
            last_activity_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(wallet_id)
    .bind(balance)
    .bind(escrow_balance)
    .execute(conn)
    .await?;
    Ok(())
}

pub(crate) struct NewWalletTxn {
    pub wallet_id: Uuid,
    pub user_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub description: String,
    pub booking_id: Option<Uuid>,
    pub counterparty_wallet_id: Option<Uuid>,
}

pub(crate) async fn insert_wallet_txn(
    conn: &mut PgConnection,
    txn: NewWalletTxn,
) -> Result<WalletTransaction, sqlx::Error> {
    sqlx::query_as::<_, WalletTransaction>(&format!(
        r#"
        INSERT INTO wallet_transactions
            (wallet_id, user_id, transaction_type, amount, balance_before,
             balance_after, reference, description, booking_id, counterparty_wallet_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {}
        "#,
        TXN_COLUMNS
    ))
    .bind(txn.wallet_id)
    .bind(txn.user_id)
    .bind(txn.transaction_type)
    .bind(txn.amount)
    .bind(txn.balance_before)
    .bind(txn.balance_after)
    .bind(generate_transaction_reference())
    .bind(txn.description)
    .bind(txn.booking_id)
    .bind(txn.counterparty_wallet_id)
    .fetch_one(conn)
    .await
}

pub(crate) fn check_active(wallet: &Wallet) -> Result<(), DbError> {
    if !wallet.is_active() {
        return Err(DbError::WalletInactive(wallet.status));
    }
    Ok(())
}

pub(crate) fn check_available(wallet: &Wallet, amount: i64) -> Result<(), DbError> {
    let available = wallet.available_balance();
    if available < amount {
        return Err(DbError::InsufficientFunds {
            required: amount,
            available,
        });
    }
    Ok(())
}

#[async_trait]
impl WalletExt for DBClient {
    async fn get_or_create_wallet(&self, user_id: Uuid) -> Result<Wallet, DbError> {
        sqlx::query("INSERT INTO wallets (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let wallet = sqlx::query_as::<_, Wallet>(&format!(
            "SELECT {} FROM wallets WHERE user_id = $1",
            WALLET_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(wallet)
    }

    async fn credit_wallet(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        booking_id: Option<Uuid>,
    ) -> Result<WalletTransaction, DbError> {
        if amount <= 0 {
            return Err(DbError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;

        ensure_wallet(&mut tx, user_id).await?;
        let wallet = lock_wallet(&mut tx, user_id).await?;
        check_active(&wallet)?;

        let balance_after = wallet.balance + amount;
        update_wallet_balances(&mut tx, wallet.id, balance_after, wallet.escrow_balance).await?;

        let transaction = insert_wallet_txn(
            &mut tx,
            NewWalletTxn {
                wallet_id: wallet.id,
                user_id,
                transaction_type,
                amount,
                balance_before: wallet.balance,
                balance_after,
                description,
                booking_id,
                counterparty_wallet_id: None,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    async fn debit_wallet(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        booking_id: Option<Uuid>,
    ) -> Result<WalletTransaction, DbError> {
        if amount <= 0 {
            return Err(DbError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;

        ensure_wallet(&mut tx, user_id).await?;
        let wallet = lock_wallet(&mut tx, user_id).await?;
        check_active(&wallet)?;
        check_available(&wallet, amount)?;

        let balance_after = wallet.balance - amount;
        update_wallet_balances(&mut tx, wallet.id, balance_after, wallet.escrow_balance).await?;

        let transaction = insert_wallet_txn(
            &mut tx,
            NewWalletTxn {
                wallet_id: wallet.id,
                user_id,
                transaction_type,
                amount,
                balance_before: wallet.balance,
                balance_after,
                description,
                booking_id,
                counterparty_wallet_id: None,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    async fn transfer_funds(
        &self,
        from_user_id: Uuid,
        to_user_id: Uuid,
        amount: i64,
        description: String,
        booking_id: Option<Uuid>,
    ) -> Result<(WalletTransaction, WalletTransaction), DbError> {
        if amount <= 0 {
            return Err(DbError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;

        ensure_wallet(&mut tx, from_user_id).await?;
        ensure_wallet(&mut tx, to_user_id).await?;

        // Lock in a consistent order so two opposite transfers cannot
        // deadlock each other.
        let (payer, payee) = if from_user_id <= to_user_id {
            let payer = lock_wallet(&mut tx, from_user_id).await?;
            let payee = lock_wallet(&mut tx, to_user_id).await?;
            (payer, payee)
        } else {
            let payee = lock_wallet(&mut tx, to_user_id).await?;
            let payer = lock_wallet(&mut tx, from_user_id).await?;
            (payer, payee)
        };

        check_active(&payer)?;
        check_active(&payee)?;
        check_available(&payer, amount)?;

        let payer_after = payer.balance - amount;
        let payee_after = payee.balance + amount;

        update_wallet_balances(&mut tx, payer.id, payer_after, payer.escrow_balance).await?;
        update_wallet_balances(&mut tx, payee.id, payee_after, payee.escrow_balance).await?;

        let debit = insert_wallet_txn(
            &mut tx,
            NewWalletTxn {
                wallet_id: payer.id,
                user_id: from_user_id,
                transaction_type: TransactionType::Payment,
                amount,
                balance_before: payer.balance,
                balance_after: payer_after,
                description: description.clone(),
                booking_id,
                counterparty_wallet_id: Some(payee.id),
            },
        )
        .await?;

        let credit = insert_wallet_txn(
            &mut tx,
            NewWalletTxn {
                wallet_id: payee.id,
                user_id: to_user_id,
                transaction_type: TransactionType::Earning,
                amount,
                balance_before: payee.balance,
                balance_after: payee_after,
                description,
                booking_id,
                counterparty_wallet_id: Some(payer.id),
            },
        )
        .await?;

        tx.commit().await?;
        Ok((debit, credit))
    }

    async fn get_wallet_transactions(
        &self,
        user_id: Uuid,
        transaction_type: Option<TransactionType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, DbError> {
        let transactions = match transaction_type {
            Some(tt) => {
                sqlx::query_as::<_, WalletTransaction>(&format!(
                    r#"
                    SELECT {}
                    FROM wallet_transactions
                    WHERE user_id = $1 AND transaction_type = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                    TXN_COLUMNS
                ))
                .bind(user_id)
                .bind(tt)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, WalletTransaction>(&format!(
                    r#"
                    SELECT {}
                    FROM wallet_transactions
                    WHERE user_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                    TXN_COLUMNS
                ))
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(transactions)
    }

    async fn get_withdrawals_today(&self, user_id: Uuid) -> Result<i64, DbError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM wallet_transactions
            WHERE user_id = $1
              AND transaction_type = 'withdrawal'
              AND created_at >= date_trunc('day', NOW())
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }
}
