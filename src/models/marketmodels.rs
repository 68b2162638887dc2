// models/marketmodels.rs
//
// Read-only views of tables owned by the catalog/auction/user components.
// The booking and payment core only ever SELECTs from these.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ServiceListing {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub title: String,
    pub rate: i64, // minor units
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub title: String,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub estimated_duration_days: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "bid_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuctionBid {
    pub id: Uuid,
    pub auction_id: Uuid,
    pub provider_id: Uuid,
    pub proposed_price: i64, // minor units
    pub proposed_completion_date: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub deliverables: Vec<String>,
    pub status: BidStatus,
}

/// Minimal directory row used for notification text and auth checks.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DirectoryUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
