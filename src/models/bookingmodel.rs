// models/bookingmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    PendingPayment,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Disputed,
}

impl BookingStatus {
    /// Forward-only state machine. Completed, cancelled and disputed
    /// bookings never transition again through the normal mutator;
    /// dispute resolution has its own exit path on the escrow side.
    pub fn can_transition_to(&self, to: BookingStatus) -> bool {
        matches!(
            (self, to),
            (BookingStatus::PendingPayment, BookingStatus::Confirmed)
                | (BookingStatus::PendingPayment, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::InProgress)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Disputed)
                | (BookingStatus::InProgress, BookingStatus::Completed)
                | (BookingStatus::InProgress, BookingStatus::Disputed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Disputed
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub booking_number: String,
    pub consumer_id: Uuid,
    pub provider_id: Uuid,
    /// Set for direct service bookings; null for auction-derived ones.
    pub service_id: Option<Uuid>,
    /// Set together for auction-derived bookings, mutually exclusive
    /// with service_id.
    pub auction_id: Option<Uuid>,
    pub auction_bid_id: Option<Uuid>,
    pub status: BookingStatus,
    pub scheduled_date: DateTime<Utc>,
    pub scheduled_end_date: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub service_rate: i64,
    pub platform_fee: i64,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn is_auction_derived(&self) -> bool {
        self.auction_id.is_some()
    }

    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.consumer_id == user_id || self.provider_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkProgressReport {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub provider_id: Uuid,
    pub note: Option<String>,
    pub message: Option<String>,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(BookingStatus::PendingPayment.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::InProgress));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Completed));
        assert!(BookingStatus::PendingPayment.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Disputed));
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Disputed));
    }

    #[test]
    fn test_backward_and_terminal_transitions_rejected() {
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::InProgress));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::PendingPayment));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Disputed.can_transition_to(BookingStatus::InProgress));
        assert!(!BookingStatus::PendingPayment.can_transition_to(BookingStatus::InProgress));
        assert!(!BookingStatus::PendingPayment.can_transition_to(BookingStatus::Disputed));
    }

    #[test]
    fn test_terminal_states() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Disputed.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
    }
}
