//! Booking, contract and dispute workflow tests.

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::Utc;
    use sqlx::PgPool;
    use uuid::Uuid;

    use craftlink::config::Config;
    use craftlink::db::db::DBClient;
    use craftlink::models::bookingmodel::BookingStatus;
    use craftlink::models::contractmodel::{compute_contract_hash, ContractStatus, ContractTerms};
    use craftlink::models::disputemodel::{DisputeOutcome, DisputeStatus};
    use craftlink::models::escrowmodel::EscrowStatus;
    use craftlink::service::error::ServiceError;
    use craftlink::AppState;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            app_url: "http://localhost:8000".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_maxage: 60,
            port: 8000,
            notification_webhook_url: None,
            notification_timeout_secs: 2,
        }
    }

    async fn setup_test_db() -> PgPool {
        let database_url = std::env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/craftlink_test".to_string());

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database")
    }

    async fn setup_state() -> AppState {
        AppState::new(DBClient::new(setup_test_db().await), test_config())
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

    async fn seed_accepted_bid(pool: &PgPool, consumer: Uuid, provider: Uuid, price: i64) -> Uuid {
        let auction_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO auctions (id, consumer_id, title, description, scheduled_date, estimated_duration_days)
            VALUES ($1, $2, 'Kitchen renovation', 'Full renovation', NOW(), 14)
            "#,
        )
        .bind(auction_id)
        .bind(consumer)
        .execute(pool)
        .await
        .expect("Failed to seed auction");

        let bid_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO auction_bids
                (id, auction_id, provider_id, proposed_price, scope, deliverables, status)
            VALUES ($1, $2, $3, $4, 'Renovate the kitchen', ARRAY['demolition', 'fitting'], 'accepted')
            "#,
        )
        .bind(bid_id)
        .bind(auction_id)
        .bind(provider)
        .bind(price)
        .execute(pool)
        .await
        .expect("Failed to seed bid");

        bid_id
    }

    async fn seed_service(pool: &PgPool, provider: Uuid, rate: i64) -> Uuid {
        let service_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO services (id, provider_id, title, rate) VALUES ($1, $2, 'Pipe repair', $3)",
        )
        .bind(service_id)
        .bind(provider)
        .bind(rate)
        .execute(pool)
        .await
        .expect("Failed to seed service");
        service_id
    }

    fn terms() -> ContractTerms {
        ContractTerms {
            scope: "Renovate the kitchen".to_string(),
            deliverables: vec!["demolition".to_string(), "fitting".to_string()],
            start_date: Utc::now(),
            end_date: None,
            service_rate: 100_000,
            platform_fee: 7_000,
            total_amount: 107_000,
        }
    }

    #[test]
    fn test_contract_hash_commits_to_signatures() {
        let booking_id = Uuid::new_v4();
        let terms = terms();

        let unsigned = compute_contract_hash("CTR-1", booking_id, &terms, None, None);
        let one_signed = compute_contract_hash("CTR-1", booking_id, &terms, Some("alice"), None);
        let both_signed =
            compute_contract_hash("CTR-1", booking_id, &terms, Some("alice"), Some("bob"));

        assert_ne!(unsigned, one_signed);
        assert_ne!(one_signed, both_signed);
        // Deterministic over identical inputs
        assert_eq!(
            both_signed,
            compute_contract_hash("CTR-1", booking_id, &terms, Some("alice"), Some("bob"))
        );
    }

    #[test]
    fn test_booking_transitions_are_forward_only() {
        assert!(BookingStatus::PendingPayment.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::InProgress));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Completed));

        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::InProgress));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Disputed.can_transition_to(BookingStatus::InProgress));
        assert!(!BookingStatus::PendingPayment.can_transition_to(BookingStatus::Completed));
    }

    #[tokio::test]
    async fn test_split_outcome_is_rejected_before_touching_storage() {
        // A lazy pool never connects, so the rejection must happen first.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unreachable")
            .expect("lazy pool");
        let state = AppState::new(DBClient::new(pool), test_config());

        let err = state
            .dispute_service
            .resolve_dispute(Uuid::new_v4(), DisputeOutcome::Split, None)
            .await
            .expect_err("split must be rejected");
        assert!(err.to_string().contains("not supported"));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_auction_booking_payment_and_contract_flow() {
        let state = setup_state().await;
        let pool = &state.db_client.pool;
        let consumer = seed_user(pool).await;
        let provider = seed_user(pool).await;
        let bid_id = seed_accepted_bid(pool, consumer, provider, 100_000).await;

        let booking = state
            .booking_service
            .create_booking_from_bid(consumer, bid_id)
            .await
            .expect("booking from bid");
        assert_eq!(booking.status, BookingStatus::PendingPayment);
        assert_eq!(booking.platform_fee, 7_000);
        assert_eq!(booking.total_amount, 107_000);

        state
            .payment_service
            .topup_wallet(consumer, 107_000)
            .await
            .expect("topup");

        let paid = state
            .payment_service
            .pay_for_booking(consumer, booking.id, 107_000)
            .await
            .expect("payment");
        assert_eq!(paid.status, BookingStatus::Confirmed);

        // Auction payments escrow the money and create the contract
        let wallet = state
            .payment_service
            .get_wallet(consumer)
            .await
            .expect("wallet");
        assert_eq!(wallet.balance, 107_000);
        assert_eq!(wallet.escrow_balance, 107_000);
        assert_eq!(wallet.available_balance(), 0);

        let contract = state
            .contract_service
            .create_contract_for_booking(booking.id, consumer)
            .await
            .expect("contract");
        assert_eq!(contract.status, ContractStatus::PendingSignatures);

        // Idempotent: a repeat converges on the same contract
        let again = state
            .contract_service
            .create_contract_for_booking(booking.id, provider)
            .await
            .expect("contract again");
        assert_eq!(again.id, contract.id);

        // Active only once both parties have signed, in any order
        let signed = state
            .contract_service
            .sign_contract(contract.id, provider, "provider-sig".to_string(), None)
            .await
            .expect("provider sign");
        assert_eq!(signed.status, ContractStatus::PendingSignatures);

        let signed = state
            .contract_service
            .sign_contract(contract.id, consumer, "consumer-sig".to_string(), None)
            .await
            .expect("consumer sign");
        assert_eq!(signed.status, ContractStatus::Active);
        assert!(signed.both_signed());

        // A party cannot sign twice
        state
            .contract_service
            .sign_contract(contract.id, consumer, "again".to_string(), None)
            .await
            .expect_err("double sign must fail");

        // Work happens, then the consumer releases the escrow
        state
            .booking_service
            .transition_booking(booking.id, provider, BookingStatus::InProgress)
            .await
            .expect("start");
        state
            .booking_service
            .transition_booking(booking.id, provider, BookingStatus::Completed)
            .await
            .expect("complete");

        let released = state
            .payment_service
            .release_escrow_for_booking(consumer, booking.id)
            .await
            .expect("release");
        assert_eq!(released.status, EscrowStatus::Released);

        let consumer_wallet = state.payment_service.get_wallet(consumer).await.expect("wallet");
        let provider_wallet = state.payment_service.get_wallet(provider).await.expect("wallet");
        assert_eq!(consumer_wallet.balance, 0);
        assert_eq!(provider_wallet.balance, 107_000);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_dispute_refund_flow() {
        let state = setup_state().await;
        let pool = &state.db_client.pool;
        let consumer = seed_user(pool).await;
        let provider = seed_user(pool).await;
        let bid_id = seed_accepted_bid(pool, consumer, provider, 50_000).await;

        let booking = state
            .booking_service
            .create_booking_from_bid(consumer, bid_id)
            .await
            .expect("booking");
        state
            .payment_service
            .topup_wallet(consumer, 60_000)
            .await
            .expect("topup");
        state
            .payment_service
            .pay_for_booking(consumer, booking.id, booking.total_amount)
            .await
            .expect("payment");

        let dispute = state
            .dispute_service
            .raise_dispute(booking.id, consumer, "Work never started on site".to_string(), vec![])
            .await
            .expect("dispute");
        assert_eq!(dispute.status, DisputeStatus::Open);

        // One open dispute per booking, and the duplicate is a conflict
        let err = state
            .dispute_service
            .raise_dispute(booking.id, consumer, "Still nothing happening".to_string(), vec![])
            .await
            .expect_err("second dispute must fail");
        assert!(matches!(err, ServiceError::DisputeExists(id) if id == booking.id));
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let resolved = state
            .dispute_service
            .resolve_dispute(dispute.id, DisputeOutcome::FavorConsumer, Some("Refund".to_string()))
            .await
            .expect("resolve");
        assert_eq!(resolved.status, DisputeStatus::Resolved);
        assert_eq!(resolved.outcome, Some(DisputeOutcome::FavorConsumer));

        // Funds are back and available
        let wallet = state.payment_service.get_wallet(consumer).await.expect("wallet");
        assert_eq!(wallet.escrow_balance, 0);
        assert_eq!(wallet.available_balance(), 60_000);

        // Settlement is exclusive: resolving again fails
        state
            .dispute_service
            .resolve_dispute(dispute.id, DisputeOutcome::FavorProvider, None)
            .await
            .expect_err("second resolution must fail");
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_disputed_contract_rejects_late_signature() {
        let state = setup_state().await;
        let pool = &state.db_client.pool;
        let consumer = seed_user(pool).await;
        let provider = seed_user(pool).await;
        let bid_id = seed_accepted_bid(pool, consumer, provider, 100_000).await;

        let booking = state
            .booking_service
            .create_booking_from_bid(consumer, bid_id)
            .await
            .expect("booking");
        state
            .payment_service
            .topup_wallet(consumer, booking.total_amount)
            .await
            .expect("topup");
        state
            .payment_service
            .pay_for_booking(consumer, booking.id, booking.total_amount)
            .await
            .expect("payment");

        let contract = state
            .contract_service
            .create_contract_for_booking(booking.id, consumer)
            .await
            .expect("contract");
        state
            .contract_service
            .sign_contract(contract.id, consumer, "consumer-sig".to_string(), None)
            .await
            .expect("consumer sign");

        state
            .dispute_service
            .raise_dispute(booking.id, consumer, "Work abandoned".to_string(), vec![])
            .await
            .expect("dispute");

        // The dispute suspended the contract; the missing signature cannot
        // reactivate it
        let err = state
            .contract_service
            .sign_contract(contract.id, provider, "provider-sig".to_string(), None)
            .await
            .expect_err("signing a disputed contract must fail");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let contract = state
            .contract_service
            .get_contract(contract.id, provider)
            .await
            .expect("contract");
        assert_eq!(contract.status, ContractStatus::Disputed);
        assert!(contract.provider_signature.is_none());
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_cancelling_confirmed_auction_booking_refunds_escrow() {
        let state = setup_state().await;
        let pool = &state.db_client.pool;
        let consumer = seed_user(pool).await;
        let provider = seed_user(pool).await;
        let bid_id = seed_accepted_bid(pool, consumer, provider, 100_000).await;

        let booking = state
            .booking_service
            .create_booking_from_bid(consumer, bid_id)
            .await
            .expect("booking");
        state
            .payment_service
            .topup_wallet(consumer, booking.total_amount)
            .await
            .expect("topup");
        state
            .payment_service
            .pay_for_booking(consumer, booking.id, booking.total_amount)
            .await
            .expect("payment");

        let cancelled = state
            .booking_service
            .transition_booking(booking.id, consumer, BookingStatus::Cancelled)
            .await
            .expect("cancel");
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        // The hold is lifted and the money is spendable again
        let wallet = state.payment_service.get_wallet(consumer).await.expect("wallet");
        assert_eq!(wallet.balance, booking.total_amount);
        assert_eq!(wallet.escrow_balance, 0);
        assert_eq!(wallet.available_balance(), booking.total_amount);

        // The refunded escrow is terminal
        let err = state
            .payment_service
            .release_escrow_for_booking(consumer, booking.id)
            .await
            .expect_err("releasing a refunded escrow must fail");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_cancelling_confirmed_direct_booking_reverses_payment() {
        let state = setup_state().await;
        let pool = &state.db_client.pool;
        let consumer = seed_user(pool).await;
        let provider = seed_user(pool).await;
        let service_id = seed_service(pool, provider, 40_000).await;

        let booking = state
            .booking_service
            .create_booking(consumer, service_id, Utc::now(), None)
            .await
            .expect("booking");
        assert_eq!(booking.total_amount, 42_800);

        state
            .payment_service
            .topup_wallet(consumer, booking.total_amount)
            .await
            .expect("topup");
        state
            .payment_service
            .pay_for_booking(consumer, booking.id, booking.total_amount)
            .await
            .expect("payment");

        // Direct payments settle immediately
        let provider_wallet = state.payment_service.get_wallet(provider).await.expect("wallet");
        assert_eq!(provider_wallet.balance, booking.total_amount);

        let cancelled = state
            .booking_service
            .transition_booking(booking.id, consumer, BookingStatus::Cancelled)
            .await
            .expect("cancel");
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        // The settled payment came back
        let consumer_wallet = state.payment_service.get_wallet(consumer).await.expect("wallet");
        let provider_wallet = state.payment_service.get_wallet(provider).await.expect("wallet");
        assert_eq!(consumer_wallet.balance, booking.total_amount);
        assert_eq!(consumer_wallet.available_balance(), booking.total_amount);
        assert_eq!(provider_wallet.balance, 0);
    }
}
