// dtos/bookingdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::bookingmodel::*;
use crate::models::escrowmodel::{Escrow, EscrowStatus};
use crate::utils::currency::to_major;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateBookingDto {
    pub service_id: Uuid,
    pub scheduled_date: DateTime<Utc>,
    pub scheduled_end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateBookingFromBidDto {
    pub bid_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponseDto {
    pub id: Uuid,
    pub booking_number: String,
    pub consumer_id: Uuid,
    pub provider_id: Uuid,
    pub service_id: Option<Uuid>,
    pub auction_id: Option<Uuid>,
    pub status: BookingStatus,
    pub scheduled_date: DateTime<Utc>,
    pub scheduled_end_date: Option<DateTime<Utc>>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub service_rate: f64,
    pub platform_fee: f64,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct BookingListQueryDto {
    pub status: Option<BookingStatus>,

    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must be non-negative"))]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EscrowListQueryDto {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must be non-negative"))]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateProgressReportDto {
    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    pub note: Option<String>,

    #[validate(length(max = 2000, message = "Message must be at most 2000 characters"))]
    pub message: Option<String>,

    #[validate(length(max = 10000, message = "Content must be at most 10000 characters"))]
    pub content: Option<String>,

    pub media_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressReportResponseDto {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub provider_id: Uuid,
    pub note: Option<String>,
    pub message: Option<String>,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EscrowResponseDto {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub consumer_id: Uuid,
    pub provider_id: Uuid,
    pub escrow_amount: f64,
    pub status: EscrowStatus,
    pub released_amount: Option<f64>,
    pub released_at: Option<DateTime<Utc>>,
    pub dispute_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponseDto {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            booking_number: booking.booking_number,
            consumer_id: booking.consumer_id,
            provider_id: booking.provider_id,
            service_id: booking.service_id,
            auction_id: booking.auction_id,
            status: booking.status,
            scheduled_date: booking.scheduled_date,
            scheduled_end_date: booking.scheduled_end_date,
            actual_end_time: booking.actual_end_time,
            service_rate: to_major(booking.service_rate),
            platform_fee: to_major(booking.platform_fee),
            total_amount: to_major(booking.total_amount),
            created_at: booking.created_at,
        }
    }
}

impl From<WorkProgressReport> for ProgressReportResponseDto {
    fn from(report: WorkProgressReport) -> Self {
        Self {
            id: report.id,
            booking_id: report.booking_id,
            provider_id: report.provider_id,
            note: report.note,
            message: report.message,
            content: report.content,
            media_url: report.media_url,
            created_at: report.created_at,
        }
    }
}

impl From<Escrow> for EscrowResponseDto {
    fn from(escrow: Escrow) -> Self {
        Self {
            id: escrow.id,
            booking_id: escrow.booking_id,
            consumer_id: escrow.consumer_id,
            provider_id: escrow.provider_id,
            escrow_amount: to_major(escrow.escrow_amount),
            status: escrow.status,
            released_amount: escrow.released_amount.map(to_major),
            released_at: escrow.released_at,
            dispute_id: escrow.dispute_id,
            created_at: escrow.created_at,
        }
    }
}
