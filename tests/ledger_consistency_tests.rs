//! Ledger invariants: reconstructability, availability, escrow terminality.

#[cfg(test)]
mod tests {
    use sqlx::PgPool;
    use uuid::Uuid;

    use craftlink::db::db::DBClient;
    use craftlink::db::error::DbError;
    use craftlink::db::escrowdb::EscrowExt;
    use craftlink::db::rewarddb::RewardCreditExt;
    use craftlink::db::walletdb::WalletExt;
    use craftlink::models::walletmodels::{RewardTransactionType, TransactionType};
    use craftlink::utils::currency::platform_fee;

    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/craftlink_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    async fn seed_user(pool: &PgPool) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, first_name, last_name, email) VALUES ($1, 'Test', 'User', $2)")
            .bind(id)
            .bind(format!("{}@example.com", id))
            .execute(pool)
            .await
            .expect("Failed to seed user");
        id
    }

    async fn seed_booking(pool: &PgPool, consumer: Uuid, provider: Uuid, total: i64) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO bookings
                (id, booking_number, consumer_id, provider_id, status,
                 scheduled_date, service_rate, platform_fee, total_amount)
            VALUES ($1, $2, $3, $4, 'pending_payment', NOW(), $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(format!("BKG-TEST-{}", &id.to_string()[..8]))
        .bind(consumer)
        .bind(provider)
        .bind(total - platform_fee(total))
        .bind(platform_fee(total))
        .bind(total)
        .execute(pool)
        .await
        .expect("Failed to seed booking");
        id
    }

    #[test]
    fn test_platform_fee_example() {
        // 1000.00 at 7% gives a 70.00 fee and a 1070.00 total
        let price = 100_000i64;
        let fee = platform_fee(price);
        assert_eq!(fee, 7_000);
        assert_eq!(price + fee, 107_000);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_credit_and_debit_append_ledger_rows() {
        let db = DBClient::new(setup_test_db().await);
        let user = seed_user(&db.pool).await;

        let credit = db
            .credit_wallet(user, 50_000, TransactionType::Deposit, "topup".to_string(), None)
            .await
            .expect("credit should succeed");
        assert_eq!(credit.balance_before, 0);
        assert_eq!(credit.balance_after, 50_000);

        let debit = db
            .debit_wallet(user, 20_000, TransactionType::Withdrawal, "cashout".to_string(), None)
            .await
            .expect("debit should succeed");
        assert_eq!(debit.balance_before, 50_000);
        assert_eq!(debit.balance_after, 30_000);

        let wallet = db.get_or_create_wallet(user).await.expect("wallet");
        assert_eq!(wallet.balance, 30_000);
        assert_eq!(wallet.escrow_balance, 0);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_debit_rejects_insufficient_available_balance() {
        let db = DBClient::new(setup_test_db().await);
        let user = seed_user(&db.pool).await;

        db.credit_wallet(user, 10_000, TransactionType::Deposit, "topup".to_string(), None)
            .await
            .expect("credit");

        let err = db
            .debit_wallet(user, 10_001, TransactionType::Withdrawal, "cashout".to_string(), None)
            .await
            .expect_err("overdraw must fail");
        assert!(matches!(err, DbError::InsufficientFunds { .. }));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_transfer_conserves_total_funds() {
        let db = DBClient::new(setup_test_db().await);
        let alice = seed_user(&db.pool).await;
        let bob = seed_user(&db.pool).await;

        db.credit_wallet(alice, 107_000, TransactionType::Deposit, "topup".to_string(), None)
            .await
            .expect("credit");

        let (debit, credit) = db
            .transfer_funds(alice, bob, 107_000, "payment".to_string(), None)
            .await
            .expect("transfer");

        assert_eq!(debit.transaction_type, TransactionType::Payment);
        assert_eq!(credit.transaction_type, TransactionType::Earning);
        assert_eq!(debit.balance_after, 0);
        assert_eq!(credit.balance_after, 107_000);

        let a = db.get_or_create_wallet(alice).await.expect("wallet");
        let b = db.get_or_create_wallet(bob).await.expect("wallet");
        assert_eq!(a.balance + b.balance, 107_000);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_escrow_hold_locks_availability_without_moving_money() {
        let db = DBClient::new(setup_test_db().await);
        let consumer = seed_user(&db.pool).await;
        let provider = seed_user(&db.pool).await;
        let booking = seed_booking(&db.pool, consumer, provider, 107_000).await;

        db.credit_wallet(consumer, 107_000, TransactionType::Deposit, "topup".to_string(), None)
            .await
            .expect("credit");

        db.create_escrow_hold(booking, consumer, provider, 107_000)
            .await
            .expect("hold");

        let wallet = db.get_or_create_wallet(consumer).await.expect("wallet");
        assert_eq!(wallet.balance, 107_000);
        assert_eq!(wallet.escrow_balance, 107_000);
        assert_eq!(wallet.available_balance(), 0);

        // Held funds are not withdrawable
        let err = db
            .debit_wallet(consumer, 1, TransactionType::Withdrawal, "cashout".to_string(), None)
            .await
            .expect_err("held funds must not be withdrawable");
        assert!(matches!(err, DbError::InsufficientFunds { .. }));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_escrow_release_is_terminal() {
        let db = DBClient::new(setup_test_db().await);
        let consumer = seed_user(&db.pool).await;
        let provider = seed_user(&db.pool).await;
        let booking = seed_booking(&db.pool, consumer, provider, 107_000).await;

        db.credit_wallet(consumer, 107_000, TransactionType::Deposit, "topup".to_string(), None)
            .await
            .expect("credit");
        let escrow = db
            .create_escrow_hold(booking, consumer, provider, 107_000)
            .await
            .expect("hold");

        let released = db.release_escrow(escrow.id, None).await.expect("release");
        assert_eq!(released.released_amount, Some(107_000));

        let consumer_wallet = db.get_or_create_wallet(consumer).await.expect("wallet");
        let provider_wallet = db.get_or_create_wallet(provider).await.expect("wallet");
        assert_eq!(consumer_wallet.balance, 0);
        assert_eq!(consumer_wallet.escrow_balance, 0);
        assert_eq!(provider_wallet.balance, 107_000);

        // Second settlement attempt mutates nothing
        let err = db
            .release_escrow(escrow.id, None)
            .await
            .expect_err("second release must fail");
        assert!(matches!(err, DbError::EscrowNotHeld));
        let err = db
            .refund_escrow(escrow.id, None)
            .await
            .expect_err("refund after release must fail");
        assert!(matches!(err, DbError::EscrowNotHeld));

        let provider_wallet = db.get_or_create_wallet(provider).await.expect("wallet");
        assert_eq!(provider_wallet.balance, 107_000);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_escrow_refund_restores_availability() {
        let db = DBClient::new(setup_test_db().await);
        let consumer = seed_user(&db.pool).await;
        let provider = seed_user(&db.pool).await;
        let booking = seed_booking(&db.pool, consumer, provider, 50_000).await;

        db.credit_wallet(consumer, 50_000, TransactionType::Deposit, "topup".to_string(), None)
            .await
            .expect("credit");
        let escrow = db
            .create_escrow_hold(booking, consumer, provider, 50_000)
            .await
            .expect("hold");

        db.refund_escrow(escrow.id, None).await.expect("refund");

        let wallet = db.get_or_create_wallet(consumer).await.expect("wallet");
        assert_eq!(wallet.balance, 50_000);
        assert_eq!(wallet.escrow_balance, 0);
        assert_eq!(wallet.available_balance(), 50_000);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_reward_credit_ledger_mirrors_wallet_semantics() {
        let db = DBClient::new(setup_test_db().await);
        let user = seed_user(&db.pool).await;

        let earned = db
            .credit_rewards(user, 500, RewardTransactionType::Earn, Some("signup bonus".to_string()))
            .await
            .expect("earn should succeed");
        assert_eq!(earned.balance_before, 0);
        assert_eq!(earned.balance_after, 500);

        let spent = db
            .debit_rewards(user, 200, RewardTransactionType::BidFee, Some("auction bid fee".to_string()))
            .await
            .expect("bid fee should succeed");
        assert_eq!(spent.balance_before, 500);
        assert_eq!(spent.balance_after, 300);

        // Overspend leaves the balance untouched
        let err = db
            .debit_rewards(user, 301, RewardTransactionType::BidFee, None)
            .await
            .expect_err("overspend must fail");
        assert!(matches!(err, DbError::InsufficientCredits { .. }));

        let credit = db.get_or_create_reward_credit(user).await.expect("credit");
        assert_eq!(credit.balance, 300);

        let txns = db
            .get_reward_transactions(user, 100, 0)
            .await
            .expect("history");
        let replayed: i64 = txns
            .iter()
            .map(|t| t.amount * t.transaction_type.balance_sign())
            .sum();
        assert_eq!(replayed, credit.balance);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_reward_ledger_rejects_sign_mismatched_entries() {
        let db = DBClient::new(setup_test_db().await);
        let user = seed_user(&db.pool).await;

        let err = db
            .credit_rewards(user, 100, RewardTransactionType::BidFee, None)
            .await
            .expect_err("bid_fee is not a credit kind");
        assert!(matches!(err, DbError::InvalidAmount));

        let err = db
            .debit_rewards(user, 100, RewardTransactionType::Earn, None)
            .await
            .expect_err("earn is not a debit kind");
        assert!(matches!(err, DbError::InvalidAmount));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_ledger_replay_reconstructs_balance() {
        let db = DBClient::new(setup_test_db().await);
        let consumer = seed_user(&db.pool).await;
        let provider = seed_user(&db.pool).await;
        let booking = seed_booking(&db.pool, consumer, provider, 30_000).await;

        db.credit_wallet(consumer, 100_000, TransactionType::Deposit, "topup".to_string(), None)
            .await
            .expect("credit");
        let escrow = db
            .create_escrow_hold(booking, consumer, provider, 30_000)
            .await
            .expect("hold");
        db.release_escrow(escrow.id, None).await.expect("release");
        db.debit_wallet(consumer, 10_000, TransactionType::Withdrawal, "cashout".to_string(), None)
            .await
            .expect("debit");

        let wallet = db.get_or_create_wallet(consumer).await.expect("wallet");
        let txns = db
            .get_wallet_transactions(consumer, None, 100, 0)
            .await
            .expect("history");

        let replayed: i64 = txns
            .iter()
            .map(|t| t.amount * t.transaction_type.balance_sign())
            .sum();
        assert_eq!(replayed, wallet.balance);
        assert_eq!(wallet.balance, 60_000);
    }
}
