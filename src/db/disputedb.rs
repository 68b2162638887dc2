// db/disputedb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use super::error::{is_unique_violation, DbError};
use crate::models::disputemodel::{Dispute, DisputeOutcome, DisputeStatus};

pub struct NewDispute {
    pub booking_id: Uuid,
    pub raised_by: Uuid,
    pub against: Uuid,
    pub reason: String,
    pub evidence_urls: Vec<String>,
}

#[async_trait]
pub trait DisputeExt {
    /// One open dispute per booking. The insert, the booking transition to
    /// disputed and the escrow linkage share a single transaction.
    async fn create_dispute(&self, dispute: NewDispute) -> Result<Dispute, DbError>;

    async fn get_dispute(&self, dispute_id: Uuid) -> Result<Option<Dispute>, DbError>;

    /// Direct resolution for disputes with no escrow backing them. Escrowed
    /// disputes are settled inside the escrow release/refund transaction
    /// instead.
    async fn resolve_dispute_without_escrow(
        &self,
        dispute_id: Uuid,
        outcome: DisputeOutcome,
        resolution_note: Option<String>,
    ) -> Result<Dispute, DbError>;
}

const DISPUTE_COLUMNS: &str = r#"
    id,
    booking_id,
    raised_by,
    against,
    reason,
    evidence_urls,
    status,
    outcome,
    resolution_note,
    resolved_at,
    created_at
"#;

#[async_trait]
impl DisputeExt for DBClient {
    async fn create_dispute(&self, dispute: NewDispute) -> Result<Dispute, DbError> {
        let mut tx = self.pool.begin().await?;

        // CAS the booking into disputed first; only confirmed or in-progress
        // bookings can be disputed.
        let moved = sqlx::query(
            r#"
            UPDATE bookings
            SET status = 'disputed', updated_at = NOW()
            WHERE id = $1 AND status IN ('confirmed', 'in_progress')
            "#,
        )
        .bind(dispute.booking_id)
        .execute(&mut *tx)
        .await?;

        if moved.rows_affected() == 0 {
            // A booking that is already disputed is a duplicate raise, not a
            // bad transition.
            let status: Option<String> =
                sqlx::query_scalar("SELECT status::text FROM bookings WHERE id = $1")
                    .bind(dispute.booking_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return match status.as_deref() {
                Some("disputed") => Err(DbError::DisputeExists(dispute.booking_id)),
                _ => Err(DbError::InvalidBookingStatus),
            };
        }

        let created = sqlx::query_as::<_, Dispute>(&format!(
            r#"
            INSERT INTO disputes (booking_id, raised_by, against, reason, evidence_urls)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            DISPUTE_COLUMNS
        ))
        .bind(dispute.booking_id)
        .bind(dispute.raised_by)
        .bind(dispute.against)
        .bind(&dispute.reason)
        .bind(&dispute.evidence_urls)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                DbError::DisputeExists(dispute.booking_id)
            } else {
                DbError::Sqlx(err)
            }
        })?;

        // Tie any held escrow for this booking to the dispute so the
        // settlement path can find it.
        sqlx::query(
            r#"
            UPDATE escrows
            SET dispute_id = $2, updated_at = NOW()
            WHERE booking_id = $1 AND status = 'held'
            "#,
        )
        .bind(dispute.booking_id)
        .bind(created.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE smart_contracts
            SET status = 'disputed', updated_at = NOW()
            WHERE booking_id = $1 AND status IN ('pending_signatures', 'active')
            "#,
        )
        .bind(dispute.booking_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn get_dispute(&self, dispute_id: Uuid) -> Result<Option<Dispute>, DbError> {
        let dispute = sqlx::query_as::<_, Dispute>(&format!(
            "SELECT {} FROM disputes WHERE id = $1",
            DISPUTE_COLUMNS
        ))
        .bind(dispute_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(dispute)
    }

    async fn resolve_dispute_without_escrow(
        &self,
        dispute_id: Uuid,
        outcome: DisputeOutcome,
        resolution_note: Option<String>,
    ) -> Result<Dispute, DbError> {
        let updated = sqlx::query_as::<_, Dispute>(&format!(
            r#"
            UPDATE disputes
            SET status = 'resolved',
                outcome = $2,
                resolution_note = $3,
                resolved_at = NOW()
            WHERE id = $1 AND status = 'open'
            RETURNING {}
            "#,
            DISPUTE_COLUMNS
        ))
        .bind(dispute_id)
        .bind(outcome)
        .bind(resolution_note)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)?;

        debug_assert_eq!(updated.status, DisputeStatus::Resolved);
        Ok(updated)
    }
}
