// service/booking_service.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::db::bookingdb::{BookingExt, NewBooking};
use crate::db::db::DBClient;
use crate::db::escrowdb::EscrowExt;
use crate::db::marketdb::MarketExt;
use crate::db::walletdb::WalletExt;
use crate::models::bookingmodel::{Booking, BookingStatus, WorkProgressReport};
use crate::models::escrowmodel::EscrowStatus;
use crate::models::marketmodels::BidStatus;
use crate::service::error::ServiceError;
use crate::service::notification_service::NotificationService;
use crate::utils::currency::platform_fee;

pub struct BookingService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
    app_url: String,
}

impl BookingService {
    pub fn new(
        db_client: Arc<DBClient>,
        notification_service: Arc<NotificationService>,
        config: &Config,
    ) -> Self {
        Self {
            db_client,
            notification_service,
            app_url: config.app_url.clone(),
        }
    }

    /// Direct booking against an active service listing. The booking starts
    /// in pending_payment; money only moves through the payment orchestrator.
    pub async fn create_booking(
        &self,
        consumer_id: Uuid,
        service_id: Uuid,
        scheduled_date: DateTime<Utc>,
        scheduled_end_date: Option<DateTime<Utc>>,
    ) -> Result<Booking, ServiceError> {
        let service = self
            .db_client
            .get_service(service_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or(ServiceError::ServiceUnavailable(service_id))?;

        if service.provider_id == consumer_id {
            return Err(ServiceError::Validation(
                "You cannot book your own service".to_string(),
            ));
        }

        let fee = platform_fee(service.rate);
        let booking = self
            .db_client
            .create_booking(NewBooking {
                consumer_id,
                provider_id: service.provider_id,
                service_id: Some(service_id),
                auction_id: None,
                auction_bid_id: None,
                status: BookingStatus::PendingPayment,
                scheduled_date,
                scheduled_end_date,
                service_rate: service.rate,
                platform_fee: fee,
                total_amount: service.rate + fee,
            })
            .await?;

        tracing::info!(booking_id = %booking.id, %consumer_id, "booking created");
        Ok(booking)
    }

    /// Turns an accepted auction bid into a booking. The price comes from the
    /// bid, the schedule from the bid's proposed completion date or, failing
    /// that, the auction's estimated duration.
    pub async fn create_booking_from_bid(
        &self,
        consumer_id: Uuid,
        bid_id: Uuid,
    ) -> Result<Booking, ServiceError> {
        let bid = self
            .db_client
            .get_auction_bid(bid_id)
            .await?
            .ok_or(ServiceError::Validation(format!("Bid {} not found", bid_id)))?;

        if bid.status != BidStatus::Accepted {
            return Err(ServiceError::BidNotAccepted(bid_id));
        }

        let auction = self
            .db_client
            .get_auction(bid.auction_id)
            .await?
            .ok_or(ServiceError::Validation(format!(
                "Auction {} not found",
                bid.auction_id
            )))?;

        if auction.consumer_id != consumer_id {
            return Err(ServiceError::Validation(
                "Only the auction owner can accept a bid into a booking".to_string(),
            ));
        }
        if bid.provider_id == consumer_id {
            return Err(ServiceError::Validation(
                "You cannot book your own bid".to_string(),
            ));
        }

        let scheduled_end_date = bid.proposed_completion_date.or_else(|| {
            Some(auction.scheduled_date + Duration::days(auction.estimated_duration_days as i64))
        });

        let fee = platform_fee(bid.proposed_price);
        let booking = self
            .db_client
            .create_booking(NewBooking {
                consumer_id,
                provider_id: bid.provider_id,
                service_id: None,
                auction_id: Some(bid.auction_id),
                auction_bid_id: Some(bid.id),
                status: BookingStatus::PendingPayment,
                scheduled_date: auction.scheduled_date,
                scheduled_end_date,
                service_rate: bid.proposed_price,
                platform_fee: fee,
                total_amount: bid.proposed_price + fee,
            })
            .await?;

        tracing::info!(booking_id = %booking.id, %bid_id, "booking created from accepted bid");

        self.notification_service
            .booking_status_changed(
                bid.provider_id,
                booking.id,
                &booking.booking_number,
                "awaiting payment",
            )
            .await;

        Ok(booking)
    }

    pub async fn get_booking(&self, booking_id: Uuid, user_id: Uuid) -> Result<Booking, ServiceError> {
        let booking = self
            .db_client
            .get_booking_by_id(booking_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        if !booking.is_party(user_id) {
            return Err(ServiceError::UnauthorizedBookingAccess(user_id, booking_id));
        }
        Ok(booking)
    }

    pub async fn list_bookings(
        &self,
        user_id: Uuid,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, ServiceError> {
        let bookings = self
            .db_client
            .list_bookings_for_user(user_id, status, limit, offset)
            .await?;
        Ok(bookings)
    }

    pub async fn transition_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
        target: BookingStatus,
    ) -> Result<Booking, ServiceError> {
        let booking = self.get_booking(booking_id, user_id).await?;

        // Payment confirms pending bookings and disputes go through the
        // dispute service; neither is reachable from this entry point.
        if matches!(target, BookingStatus::Disputed | BookingStatus::Confirmed) {
            return Err(ServiceError::InvalidBookingStatus(booking_id, booking.status));
        }

        match target {
            BookingStatus::InProgress if user_id != booking.provider_id => {
                return Err(ServiceError::UnauthorizedBookingAccess(user_id, booking_id));
            }
            BookingStatus::Completed if user_id != booking.provider_id => {
                return Err(ServiceError::UnauthorizedBookingAccess(user_id, booking_id));
            }
            _ => {}
        }

        if !booking.status.can_transition_to(target) {
            return Err(ServiceError::InvalidBookingStatus(booking_id, booking.status));
        }

        // Cancelling a confirmed booking returns the money that payment
        // already moved; every other transition is a plain status change.
        let updated = if target == BookingStatus::Cancelled
            && booking.status == BookingStatus::Confirmed
        {
            self.cancel_confirmed_booking(&booking).await?
        } else {
            self.db_client
                .update_booking_status(booking_id, booking.status, target)
                .await?
                .ok_or(ServiceError::InvalidBookingStatus(booking_id, booking.status))?
        };

        tracing::info!(
            booking_id = %booking_id,
            from = ?booking.status,
            to = ?target,
            "booking status changed"
        );

        let other_party = if user_id == updated.consumer_id {
            updated.provider_id
        } else {
            updated.consumer_id
        };
        self.notification_service
            .booking_status_changed(
                other_party,
                updated.id,
                &updated.booking_number,
                &format!("{:?}", target).to_lowercase(),
            )
            .await;

        Ok(updated)
    }

    /// A confirmed booking has been paid for, so cancellation settles the
    /// funds as part of the same operation. Escrowed money is still earmarked
    /// in the consumer's wallet and only needs the hold lifted; a direct
    /// payment already landed in the provider's wallet and is transferred
    /// back.
    async fn cancel_confirmed_booking(&self, booking: &Booking) -> Result<Booking, ServiceError> {
        if booking.is_auction_derived() {
            // Cancel first. A cancelled booking cannot be disputed or
            // completed, so nothing else can settle the escrow between the
            // status change and the refund.
            let cancelled = self
                .db_client
                .update_booking_status(
                    booking.id,
                    BookingStatus::Confirmed,
                    BookingStatus::Cancelled,
                )
                .await?
                .ok_or(ServiceError::InvalidBookingStatus(booking.id, booking.status))?;

            if let Some(escrow) = self.db_client.get_escrow_by_booking(booking.id).await? {
                if escrow.status == EscrowStatus::Held {
                    self.db_client.refund_escrow(escrow.id, None).await?;
                }
            }

            Ok(cancelled)
        } else {
            // Claw the settled payment back before cancelling; the transfer
            // fails if the provider no longer has the funds, leaving the
            // booking confirmed.
            self.db_client
                .transfer_funds(
                    booking.provider_id,
                    booking.consumer_id,
                    booking.total_amount,
                    format!("Refund for cancelled booking {}", booking.booking_number),
                    Some(booking.id),
                )
                .await?;

            let cancelled = self
                .db_client
                .update_booking_status(
                    booking.id,
                    BookingStatus::Confirmed,
                    BookingStatus::Cancelled,
                )
                .await?;

            match cancelled {
                Some(cancelled) => Ok(cancelled),
                None => {
                    tracing::error!(
                        booking_id = %booking.id,
                        "booking raced during cancellation, compensating"
                    );
                    self.db_client
                        .transfer_funds(
                            booking.consumer_id,
                            booking.provider_id,
                            booking.total_amount,
                            format!(
                                "Reversal of refund for booking {}",
                                booking.booking_number
                            ),
                            Some(booking.id),
                        )
                        .await?;
                    Err(ServiceError::InvalidBookingStatus(booking.id, booking.status))
                }
            }
        }
    }

    pub async fn create_progress_report(
        &self,
        booking_id: Uuid,
        provider_id: Uuid,
        note: Option<String>,
        message: Option<String>,
        content: Option<String>,
        media_url: Option<String>,
    ) -> Result<WorkProgressReport, ServiceError> {
        let booking = self
            .db_client
            .get_booking_by_id(booking_id)
            .await?
            .ok_or(ServiceError::BookingNotFound(booking_id))?;

        if booking.provider_id != provider_id {
            return Err(ServiceError::UnauthorizedBookingAccess(provider_id, booking_id));
        }
        if !matches!(
            booking.status,
            BookingStatus::Confirmed | BookingStatus::InProgress
        ) {
            return Err(ServiceError::InvalidBookingStatus(booking_id, booking.status));
        }
        if note.is_none() && message.is_none() && content.is_none() {
            return Err(ServiceError::Validation(
                "A report needs at least one of note, message or content".to_string(),
            ));
        }

        let media_url = media_url.map(|url| {
            if url.starts_with("http://") || url.starts_with("https://") {
                url
            } else {
                format!("{}/{}", self.app_url.trim_end_matches('/'), url.trim_start_matches('/'))
            }
        });

        let report = self
            .db_client
            .create_progress_report(booking_id, provider_id, note, message, content, media_url)
            .await?;

        self.notification_service
            .booking_status_changed(
                booking.consumer_id,
                booking.id,
                &booking.booking_number,
                "updated with a progress report",
            )
            .await;

        Ok(report)
    }

    pub async fn list_progress_reports(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<WorkProgressReport>, ServiceError> {
        let booking = self.get_booking(booking_id, user_id).await?;
        let reports = self.db_client.list_progress_reports(booking.id).await?;
        Ok(reports)
    }
}
