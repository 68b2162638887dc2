// dtos/disputedtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::disputemodel::*;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RaiseDisputeDto {
    pub booking_id: Uuid,

    #[validate(length(min = 10, max = 2000, message = "Reason must be between 10 and 2000 characters"))]
    pub reason: String,

    #[validate(length(max = 10, message = "At most 10 evidence URLs"))]
    pub evidence_urls: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ResolveDisputeDto {
    pub outcome: DisputeOutcome,

    #[validate(length(max = 2000, message = "Resolution note must be at most 2000 characters"))]
    pub resolution_note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DisputeResponseDto {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub raised_by: Uuid,
    pub against: Uuid,
    pub reason: String,
    pub evidence_urls: Vec<String>,
    pub status: DisputeStatus,
    pub outcome: Option<DisputeOutcome>,
    pub resolution_note: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Dispute> for DisputeResponseDto {
    fn from(dispute: Dispute) -> Self {
        Self {
            id: dispute.id,
            booking_id: dispute.booking_id,
            raised_by: dispute.raised_by,
            against: dispute.against,
            reason: dispute.reason,
            evidence_urls: dispute.evidence_urls,
            status: dispute.status,
            outcome: dispute.outcome,
            resolution_note: dispute.resolution_note,
            resolved_at: dispute.resolved_at,
            created_at: dispute.created_at,
        }
    }
}
