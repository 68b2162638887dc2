// service/contract_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::db::bookingdb::BookingExt;
use crate::db::contractdb::{ContractExt, NewContract};
use crate::db::db::DBClient;
use crate::db::marketdb::MarketExt;
use crate::models::bookingmodel::{Booking, BookingStatus};
use crate::models::contractmodel::{ContractTerms, SmartContract};
use crate::service::error::ServiceError;
use crate::service::notification_service::NotificationService;

pub struct ContractService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl ContractService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    /// Creates the contract for a booking, or returns the existing one when
    /// it was already created. Safe to call from both the payment flow and
    /// the explicit endpoint.
    pub async fn create_contract_for_booking(
        &self,
        booking_id: Uuid,
        actor_id: Uuid,
    ) -> Result<SmartContract, ServiceError> {
        let booking = self
            .db_client
            .get_booking_by_id(booking_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        if !booking.is_party(actor_id) {
            return Err(ServiceError::UnauthorizedBookingAccess(actor_id, booking_id));
        }
        if booking.status == BookingStatus::PendingPayment
            || booking.status == BookingStatus::Cancelled
        {
            return Err(ServiceError::InvalidBookingStatus(booking_id, booking.status));
        }

        let terms = self.assemble_terms(&booking).await?;
        let contract = self
            .db_client
            .create_contract(NewContract {
                booking_id: booking.id,
                consumer_id: booking.consumer_id,
                provider_id: booking.provider_id,
                terms,
            })
            .await?;

        tracing::info!(
            contract_id = %contract.id,
            booking_id = %booking_id,
            "smart contract ready"
        );

        self.notification_service
            .contract_event(
                booking.provider_id,
                booking.id,
                &format!("Contract {} is awaiting signatures", contract.contract_number),
            )
            .await;

        Ok(contract)
    }

    async fn assemble_terms(&self, booking: &Booking) -> Result<ContractTerms, ServiceError> {
        let (scope, deliverables) = match booking.auction_bid_id {
            Some(bid_id) => {
                let bid = self
                    .db_client
                    .get_auction_bid(bid_id)
                    .await?
                    .ok_or(ServiceError::Validation(format!("Bid {} not found", bid_id)))?;
                (
                    bid.scope.unwrap_or_else(|| "As agreed in the accepted bid".to_string()),
                    bid.deliverables,
                )
            }
            None => {
                let scope = match booking.service_id {
                    Some(service_id) => self
                        .db_client
                        .get_service(service_id)
                        .await?
                        .map(|s| s.title)
                        .unwrap_or_else(|| "Service delivery as booked".to_string()),
                    None => "Service delivery as booked".to_string(),
                };
                (scope, Vec::new())
            }
        };

        Ok(ContractTerms {
            scope,
            deliverables,
            start_date: booking.scheduled_date,
            end_date: booking.scheduled_end_date,
            service_rate: booking.service_rate,
            platform_fee: booking.platform_fee,
            total_amount: booking.total_amount,
        })
    }

    pub async fn get_contract(
        &self,
        contract_id: Uuid,
        user_id: Uuid,
    ) -> Result<SmartContract, ServiceError> {
        let contract = self
            .db_client
            .get_contract(contract_id)
            .await?
            .ok_or(ServiceError::ContractNotFound(contract_id))?;

        if !contract.is_party(user_id) {
            return Err(ServiceError::UnauthorizedBookingAccess(
                user_id,
                contract.booking_id,
            ));
        }
        Ok(contract)
    }

    pub async fn sign_contract(
        &self,
        contract_id: Uuid,
        actor_id: Uuid,
        signature: String,
        sign_ip: Option<String>,
    ) -> Result<SmartContract, ServiceError> {
        if signature.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Signature cannot be empty".to_string(),
            ));
        }

        let contract = self
            .db_client
            .sign_contract(contract_id, actor_id, signature, sign_ip)
            .await
            .map_err(|err| match err {
                crate::db::error::DbError::NotFound => ServiceError::ContractNotFound(contract_id),
                other => other.into(),
            })?;

        tracing::info!(
            contract_id = %contract.id,
            status = ?contract.status,
            "contract signed"
        );

        if contract.both_signed() {
            for party in [contract.consumer_id, contract.provider_id] {
                self.notification_service
                    .contract_event(
                        party,
                        contract.booking_id,
                        &format!("Contract {} is now active", contract.contract_number),
                    )
                    .await;
            }
        }

        Ok(contract)
    }

    pub async fn complete_contract(
        &self,
        contract_id: Uuid,
        actor_id: Uuid,
        completion_proof: String,
    ) -> Result<SmartContract, ServiceError> {
        if completion_proof.trim().is_empty() {
            return Err(ServiceError::Validation(
                "Completion proof cannot be empty".to_string(),
            ));
        }

        let contract = self
            .db_client
            .complete_contract(contract_id, actor_id, completion_proof)
            .await
            .map_err(|err| match err {
                crate::db::error::DbError::NotFound => ServiceError::ContractNotFound(contract_id),
                other => other.into(),
            })?;

        tracing::info!(contract_id = %contract.id, "contract completed");
        Ok(contract)
    }
}
