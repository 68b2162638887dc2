// models/escrowmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// held -> released | held -> refunded. Both exits are terminal.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "escrow_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EscrowStatus {
    Held,
    Released,
    Refunded,
}

/// Funds earmarked against a booking. Modeled as an availability lock on
/// the consumer's own wallet: the money stays on the consumer balance
/// while held, and only leaves it at release.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Escrow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub consumer_id: Uuid,
    pub provider_id: Uuid,
    pub escrow_amount: i64,
    pub status: EscrowStatus,
    pub released_amount: Option<i64>,
    pub released_at: Option<DateTime<Utc>>,
    pub dispute_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Escrow {
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.consumer_id == user_id || self.provider_id == user_id
    }
}
