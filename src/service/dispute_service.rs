// service/dispute_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::db::bookingdb::BookingExt;
use crate::db::db::DBClient;
use crate::db::disputedb::{DisputeExt, NewDispute};
use crate::db::escrowdb::{DisputeSettlement, EscrowExt};
use crate::models::disputemodel::{Dispute, DisputeOutcome, DisputeStatus};
use crate::models::escrowmodel::EscrowStatus;
use crate::service::error::ServiceError;
use crate::service::notification_service::NotificationService;

pub struct DisputeService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl DisputeService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    pub async fn raise_dispute(
        &self,
        booking_id: Uuid,
        raised_by: Uuid,
        reason: String,
        evidence_urls: Vec<String>,
    ) -> Result<Dispute, ServiceError> {
        let booking = self
            .db_client
            .get_booking_by_id(booking_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        if !booking.is_party(raised_by) {
            return Err(ServiceError::UnauthorizedBookingAccess(raised_by, booking_id));
        }

        let against = if raised_by == booking.consumer_id {
            booking.provider_id
        } else {
            booking.consumer_id
        };

        let dispute = self
            .db_client
            .create_dispute(NewDispute {
                booking_id,
                raised_by,
                against,
                reason,
                evidence_urls,
            })
            .await
            .map_err(|err| match err {
                crate::db::error::DbError::InvalidBookingStatus => {
                    ServiceError::InvalidBookingStatus(booking_id, booking.status)
                }
                other => other.into(),
            })?;

        tracing::info!(
            dispute_id = %dispute.id,
            booking_id = %booking_id,
            "dispute raised"
        );

        self.notification_service
            .dispute_event(
                against,
                booking_id,
                &format!("A dispute has been raised on booking {}", booking.booking_number),
            )
            .await;

        Ok(dispute)
    }

    /// Settles an open dispute. When the booking holds an escrow the outcome
    /// drives the escrow manager in a single transaction: favor_provider
    /// releases, favor_consumer refunds. Without an escrow only the dispute
    /// row is stamped.
    pub async fn resolve_dispute(
        &self,
        dispute_id: Uuid,
        outcome: DisputeOutcome,
        resolution_note: Option<String>,
    ) -> Result<Dispute, ServiceError> {
        if outcome == DisputeOutcome::Split {
            return Err(ServiceError::Validation(
                "Split outcomes are not supported; choose favor_provider or favor_consumer"
                    .to_string(),
            ));
        }

        let dispute = self
            .db_client
            .get_dispute(dispute_id)
            .await?
            .ok_or(ServiceError::DisputeNotFound(dispute_id))?;

        if dispute.status != DisputeStatus::Open {
            return Err(ServiceError::Validation(
                "Dispute has already been resolved".to_string(),
            ));
        }

        let escrow = self
            .db_client
            .get_escrow_by_booking(dispute.booking_id)
            .await?;

        let resolved = match escrow {
            Some(escrow) if escrow.status == EscrowStatus::Held => {
                let settlement = DisputeSettlement {
                    dispute_id,
                    outcome,
                    resolution_note: resolution_note.clone(),
                };
                match outcome {
                    DisputeOutcome::FavorProvider => {
                        self.db_client
                            .release_escrow(escrow.id, Some(settlement))
                            .await?;
                    }
                    DisputeOutcome::FavorConsumer => {
                        self.db_client
                            .refund_escrow(escrow.id, Some(settlement))
                            .await?;
                    }
                    DisputeOutcome::Split => unreachable!("rejected above"),
                }
                self.db_client
                    .get_dispute(dispute_id)
                    .await?
                    .ok_or(ServiceError::DisputeNotFound(dispute_id))?
            }
            _ => {
                self.db_client
                    .resolve_dispute_without_escrow(dispute_id, outcome, resolution_note)
                    .await?
            }
        };

        tracing::info!(
            dispute_id = %dispute_id,
            outcome = ?outcome,
            "dispute resolved"
        );

        for party in [resolved.raised_by, resolved.against] {
            self.notification_service
                .dispute_event(
                    party,
                    resolved.booking_id,
                    &format!("Dispute resolved: {:?}", outcome),
                )
                .await;
        }

        Ok(resolved)
    }

    pub async fn get_dispute(&self, dispute_id: Uuid, user_id: Uuid) -> Result<Dispute, ServiceError> {
        let dispute = self
            .db_client
            .get_dispute(dispute_id)
            .await?
            .ok_or(ServiceError::DisputeNotFound(dispute_id))?;

        if dispute.raised_by != user_id && dispute.against != user_id {
            return Err(ServiceError::UnauthorizedBookingAccess(
                user_id,
                dispute.booking_id,
            ));
        }
        Ok(dispute)
    }
}
