// db/marketdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use super::error::DbError;
use crate::models::marketmodels::{Auction, AuctionBid, DirectoryUser, ServiceListing};

// Read-only lookups into the catalog tables owned by the marketplace side
// of the platform. Bookings validate against these before money moves.
#[async_trait]
pub trait MarketExt {
    async fn get_service(&self, service_id: Uuid) -> Result<Option<ServiceListing>, DbError>;

    async fn get_auction(&self, auction_id: Uuid) -> Result<Option<Auction>, DbError>;

    async fn get_auction_bid(&self, bid_id: Uuid) -> Result<Option<AuctionBid>, DbError>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<DirectoryUser>, DbError>;
}

#[async_trait]
impl MarketExt for DBClient {
    async fn get_service(&self, service_id: Uuid) -> Result<Option<ServiceListing>, DbError> {
        let service = sqlx::query_as::<_, ServiceListing>(
            "SELECT id, provider_id, title, rate, is_active FROM services WHERE id = $1",
        )
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(service)
    }

    async fn get_auction(&self, auction_id: Uuid) -> Result<Option<Auction>, DbError> {
        let auction = sqlx::query_as::<_, Auction>(
            r#"
            SELECT id, consumer_id, title, description, scheduled_date, estimated_duration_days
            FROM auctions WHERE id = $1
            "#,
        )
        .bind(auction_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(auction)
    }

    async fn get_auction_bid(&self, bid_id: Uuid) -> Result<Option<AuctionBid>, DbError> {
        let bid = sqlx::query_as::<_, AuctionBid>(
            r#"
            SELECT id, auction_id, provider_id, proposed_price,
                   proposed_completion_date, scope, deliverables, status
            FROM auction_bids WHERE id = $1
            "#,
        )
        .bind(bid_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(bid)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<DirectoryUser>, DbError> {
        let user = sqlx::query_as::<_, DirectoryUser>(
            "SELECT id, first_name, last_name, email FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
