// service/payment_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::db::bookingdb::BookingExt;
use crate::db::db::DBClient;
use crate::db::escrowdb::EscrowExt;
use crate::db::rewarddb::RewardCreditExt;
use crate::db::walletdb::WalletExt;
use crate::models::bookingmodel::{Booking, BookingStatus};
use crate::models::escrowmodel::{Escrow, EscrowStatus};
use crate::models::walletmodels::{
    RewardCredit, RewardCreditTransaction, TransactionType, Wallet, WalletTransaction,
};
use crate::service::contract_service::ContractService;
use crate::service::error::ServiceError;
use crate::service::notification_service::NotificationService;
use crate::utils::currency::to_major;

/// Ties the wallet ledger, escrow manager, booking lifecycle and contract
/// workflow together for the pay-for-booking and release-escrow use cases,
/// and owns the plain wallet surface (top-up, withdrawal, history).
pub struct PaymentService {
    db_client: Arc<DBClient>,
    contract_service: Arc<ContractService>,
    notification_service: Arc<NotificationService>,
}

impl PaymentService {
    pub fn new(
        db_client: Arc<DBClient>,
        contract_service: Arc<ContractService>,
        notification_service: Arc<NotificationService>,
    ) -> Self {
        Self {
            db_client,
            contract_service,
            notification_service,
        }
    }

    pub async fn get_wallet(&self, user_id: Uuid) -> Result<Wallet, ServiceError> {
        let wallet = self.db_client.get_or_create_wallet(user_id).await?;
        Ok(wallet)
    }

    pub async fn topup_wallet(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<WalletTransaction, ServiceError> {
        let txn = self
            .db_client
            .credit_wallet(
                user_id,
                amount,
                TransactionType::Deposit,
                "Wallet top-up".to_string(),
                None,
            )
            .await?;

        tracing::info!(%user_id, amount, "wallet topped up");
        Ok(txn)
    }

    pub async fn withdraw_from_wallet(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<WalletTransaction, ServiceError> {
        let wallet = self.db_client.get_or_create_wallet(user_id).await?;

        if let Some(daily_limit) = wallet.daily_limit {
            let withdrawn_today = self.db_client.get_withdrawals_today(user_id).await?;
            if withdrawn_today + amount > daily_limit {
                return Err(ServiceError::WithdrawalLimitExceeded);
            }
        }

        let txn = self
            .db_client
            .debit_wallet(
                user_id,
                amount,
                TransactionType::Withdrawal,
                "Wallet withdrawal".to_string(),
                None,
            )
            .await?;

        tracing::info!(%user_id, amount, "withdrawal recorded");
        Ok(txn)
    }

    pub async fn get_wallet_transactions(
        &self,
        user_id: Uuid,
        transaction_type: Option<TransactionType>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, ServiceError> {
        let txns = self
            .db_client
            .get_wallet_transactions(user_id, transaction_type, limit, offset)
            .await?;
        Ok(txns)
    }

    pub async fn get_reward_credit(&self, user_id: Uuid) -> Result<RewardCredit, ServiceError> {
        let credit = self.db_client.get_or_create_reward_credit(user_id).await?;
        Ok(credit)
    }

    pub async fn get_reward_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RewardCreditTransaction>, ServiceError> {
        let txns = self
            .db_client
            .get_reward_transactions(user_id, limit, offset)
            .await?;
        Ok(txns)
    }

    /// Pays for a pending booking. Direct bookings settle immediately with a
    /// wallet-to-wallet transfer; auction-derived bookings hold the amount in
    /// escrow instead. The booking is only promoted to confirmed after the
    /// money has moved, and a payment failure leaves it untouched.
    pub async fn pay_for_booking(
        &self,
        consumer_id: Uuid,
        booking_id: Uuid,
        amount: i64,
    ) -> Result<Booking, ServiceError> {
        let booking = self
            .db_client
            .get_booking_by_id(booking_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        if booking.consumer_id != consumer_id {
            return Err(ServiceError::UnauthorizedBookingAccess(consumer_id, booking_id));
        }
        if booking.status != BookingStatus::PendingPayment {
            return Err(ServiceError::InvalidBookingStatus(booking_id, booking.status));
        }
        if amount != booking.total_amount {
            return Err(ServiceError::Validation(format!(
                "Payment amount {:.2} does not match the booking total {:.2}",
                to_major(amount),
                to_major(booking.total_amount)
            )));
        }

        let escrowed = booking.is_auction_derived();
        if escrowed {
            self.db_client
                .create_escrow_hold(
                    booking.id,
                    booking.consumer_id,
                    booking.provider_id,
                    booking.total_amount,
                )
                .await?;
        } else {
            self.db_client
                .transfer_funds(
                    booking.consumer_id,
                    booking.provider_id,
                    booking.total_amount,
                    format!("Payment for booking {}", booking.booking_number),
                    Some(booking.id),
                )
                .await?;
        }

        let confirmed = self
            .db_client
            .update_booking_status(booking.id, BookingStatus::PendingPayment, BookingStatus::Confirmed)
            .await?;

        let confirmed = match confirmed {
            Some(b) => b,
            None => {
                // The booking moved under us after the funds did. Put the
                // money back and surface the conflict.
                tracing::error!(%booking_id, "booking raced during payment, compensating");
                if escrowed {
                    if let Some(escrow) =
                        self.db_client.get_escrow_by_booking(booking.id).await?
                    {
                        self.db_client.refund_escrow(escrow.id, None).await?;
                    }
                } else {
                    self.db_client
                        .transfer_funds(
                            booking.provider_id,
                            booking.consumer_id,
                            booking.total_amount,
                            format!(
                                "Reversal of payment for booking {}",
                                booking.booking_number
                            ),
                            Some(booking.id),
                        )
                        .await?;
                }
                return Err(ServiceError::InvalidBookingStatus(
                    booking_id,
                    booking.status,
                ));
            }
        };

        tracing::info!(
            booking_id = %booking_id,
            amount,
            escrowed,
            "booking paid and confirmed"
        );

        if escrowed {
            // Contract creation is idempotent; a repeat pays attempt or a
            // manual create endpoint call converges on the same row.
            self.contract_service
                .create_contract_for_booking(confirmed.id, consumer_id)
                .await?;
        }

        self.notification_service
            .payment_received(
                confirmed.provider_id,
                confirmed.id,
                to_major(confirmed.total_amount),
            )
            .await;

        Ok(confirmed)
    }

    pub async fn release_escrow_for_booking(
        &self,
        actor_id: Uuid,
        booking_id: Uuid,
    ) -> Result<Escrow, ServiceError> {
        let escrow = self
            .db_client
            .get_escrow_by_booking(booking_id)
            .await?
            .ok_or(ServiceError::EscrowNotFound(booking_id))?;

        self.release_escrow(escrow.id, actor_id).await
    }

    pub async fn release_escrow(
        &self,
        escrow_id: Uuid,
        actor_id: Uuid,
    ) -> Result<Escrow, ServiceError> {
        let escrow = self
            .db_client
            .get_escrow(escrow_id)
            .await?
            .ok_or(ServiceError::EscrowNotFound(escrow_id))?;

        if !escrow.is_party(actor_id) {
            return Err(ServiceError::UnauthorizedBookingAccess(
                actor_id,
                escrow.booking_id,
            ));
        }
        if escrow.status != EscrowStatus::Held {
            return Err(ServiceError::EscrowNotHeld);
        }

        let booking = self
            .db_client
            .get_booking_by_id(escrow.booking_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(escrow.booking_id))?;

        // Release outside a dispute only once the work has been accepted.
        if booking.status != BookingStatus::Completed {
            return Err(ServiceError::InvalidBookingStatus(booking.id, booking.status));
        }

        let released = self.db_client.release_escrow(escrow.id, None).await?;

        tracing::info!(
            escrow_id = %released.id,
            booking_id = %released.booking_id,
            "escrow released"
        );

        self.notification_service
            .escrow_event(
                released.provider_id,
                released.booking_id,
                &format!(
                    "Escrow of {:.2} has been released to your wallet",
                    to_major(released.escrow_amount)
                ),
            )
            .await;

        Ok(released)
    }

    pub async fn list_escrows(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Escrow>, ServiceError> {
        let escrows = self
            .db_client
            .list_escrows_for_user(user_id, limit, offset)
            .await?;
        Ok(escrows)
    }
}
