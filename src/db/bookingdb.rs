// db/bookingdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::db::DBClient;
use super::error::DbError;
use crate::models::bookingmodel::{Booking, BookingStatus, WorkProgressReport};
use crate::utils::reference::generate_booking_number;

pub struct NewBooking {
    pub consumer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Option<Uuid>,
    pub auction_id: Option<Uuid>,
    pub auction_bid_id: Option<Uuid>,
    pub status: BookingStatus,
    pub scheduled_date: DateTime<Utc>,
    pub scheduled_end_date: Option<DateTime<Utc>>,
    pub service_rate: i64,
    pub platform_fee: i64,
    pub total_amount: i64,
}

#[async_trait]
pub trait BookingExt {
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, DbError>;

    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, DbError>;

    /// Compare-and-swap status mutation: succeeds only if the booking is
    /// still in `from` when the update runs, so concurrent transitions
    /// cannot overwrite each other. Entering `completed` stamps
    /// `actual_end_time`.
    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, DbError>;

    async fn list_bookings_for_user(
        &self,
        user_id: Uuid,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, DbError>;

    async fn create_progress_report(
        &self,
        booking_id: Uuid,
        provider_id: Uuid,
        note: Option<String>,
        message: Option<String>,
        content: Option<String>,
        media_url: Option<String>,
    ) -> Result<WorkProgressReport, DbError>;

    async fn list_progress_reports(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<WorkProgressReport>, DbError>;
}

const BOOKING_COLUMNS: &str = r#"
    id,
    booking_number,
    consumer_id,
    provider_id,
    service_id,
    auction_id,
    auction_bid_id,
    status,
    scheduled_date,
    scheduled_end_date,
    actual_end_time,
    service_rate,
    platform_fee,
    total_amount,
    created_at,
    updated_at
"#;

const REPORT_COLUMNS: &str = r#"
    id,
    booking_id,
    provider_id,
    note,
    message,
    content,
    media_url,
    created_at
"#;

#[async_trait]
impl BookingExt for DBClient {
    async fn create_booking(&self, booking: NewBooking) -> Result<Booking, DbError> {
        let created = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings
                (booking_number, consumer_id, provider_id, service_id, auction_id,
                 auction_bid_id, status, scheduled_date, scheduled_end_date,
                 service_rate, platform_fee, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(generate_booking_number())
        .bind(booking.consumer_id)
        .bind(booking.provider_id)
        .bind(booking.service_id)
        .bind(booking.auction_id)
        .bind(booking.auction_bid_id)
        .bind(booking.status)
        .bind(booking.scheduled_date)
        .bind(booking.scheduled_end_date)
        .bind(booking.service_rate)
        .bind(booking.platform_fee)
        .bind(booking.total_amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, DbError> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, DbError> {
        let updated = sqlx::query_as::<_, Booking>(&format!(
            r#"
            UPDATE bookings
            SET status = $3,
                actual_end_time = CASE WHEN $3 = 'completed'::booking_status
                                       THEN NOW() ELSE actual_end_time END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn list_bookings_for_user(
        &self,
        user_id: Uuid,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Booking>, DbError> {
        let bookings = match status {
            Some(status) => {
                sqlx::query_as::<_, Booking>(&format!(
                    r#"
                    SELECT {}
                    FROM bookings
                    WHERE (consumer_id = $1 OR provider_id = $1) AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                    BOOKING_COLUMNS
                ))
                .bind(user_id)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Booking>(&format!(
                    r#"
                    SELECT {}
                    FROM bookings
                    WHERE consumer_id = $1 OR provider_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                    BOOKING_COLUMNS
                ))
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(bookings)
    }

    async fn create_progress_report(
        &self,
        booking_id: Uuid,
        provider_id: Uuid,
        note: Option<String>,
        message: Option<String>,
        content: Option<String>,
        media_url: Option<String>,
    ) -> Result<WorkProgressReport, DbError> {
        let report = sqlx::query_as::<_, WorkProgressReport>(&format!(
            r#"
            INSERT INTO work_progress_reports
                (booking_id, provider_id, note, message, content, media_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        ))
        .bind(booking_id)
        .bind(provider_id)
        .bind(note)
        .bind(message)
        .bind(content)
        .bind(media_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(report)
    }

    async fn list_progress_reports(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<WorkProgressReport>, DbError> {
        let reports = sqlx::query_as::<_, WorkProgressReport>(&format!(
            r#"
            SELECT {}
            FROM work_progress_reports
            WHERE booking_id = $1
            ORDER BY created_at DESC
            "#,
            REPORT_COLUMNS
        ))
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }
}
