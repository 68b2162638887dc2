// service/notification_service.rs
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use crate::config::Config;
use crate::db::db::DBClient;
use crate::db::notificationdb::{NewNotification, NotificationExt};
use crate::models::notificationmodel::Notification;
use crate::service::error::ServiceError;

/// Persists notifications and optionally forwards them to an external
/// webhook. Delivery is best-effort: a failure here must never fail the
/// financial operation that triggered it, so every method returns `()`
/// and logs instead of propagating.
pub struct NotificationService {
    db_client: Arc<DBClient>,
    webhook_url: Option<String>,
    http: reqwest::Client,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>, config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.notification_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            db_client,
            webhook_url: config.notification_webhook_url.clone(),
            http,
        }
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, ServiceError> {
        let notifications = self
            .db_client
            .list_notifications(user_id, limit, offset)
            .await?;
        Ok(notifications)
    }

    pub async fn notify(
        &self,
        user_id: Uuid,
        notification_type: &str,
        title: &str,
        body: &str,
        booking_id: Option<Uuid>,
        data: Option<serde_json::Value>,
    ) {
        let stored = self
            .db_client
            .create_notification(NewNotification {
                user_id,
                notification_type: notification_type.to_string(),
                title: title.to_string(),
                body: body.to_string(),
                booking_id,
                data: data.clone(),
            })
            .await;

        if let Err(err) = stored {
            tracing::warn!(%user_id, notification_type, "failed to store notification: {}", err);
        }

        if let Some(url) = &self.webhook_url {
            let payload = json!({
                "user_id": user_id,
                "type": notification_type,
                "title": title,
                "body": body,
                "booking_id": booking_id,
                "data": data,
            });

            if let Err(err) = self.http.post(url).json(&payload).send().await {
                tracing::warn!(%user_id, notification_type, "notification webhook failed: {}", err);
            }
        }
    }

    pub async fn booking_status_changed(
        &self,
        user_id: Uuid,
        booking_id: Uuid,
        booking_number: &str,
        status: &str,
    ) {
        self.notify(
            user_id,
            "booking_status",
            "Booking updated",
            &format!("Booking {} is now {}", booking_number, status),
            Some(booking_id),
            None,
        )
        .await;
    }

    pub async fn payment_received(&self, user_id: Uuid, booking_id: Uuid, amount_major: f64) {
        self.notify(
            user_id,
            "payment",
            "Payment received",
            &format!("A payment of {:.2} has been credited to your wallet", amount_major),
            Some(booking_id),
            None,
        )
        .await;
    }

    pub async fn escrow_event(&self, user_id: Uuid, booking_id: Uuid, event: &str) {
        self.notify(
            user_id,
            "escrow",
            "Escrow update",
            event,
            Some(booking_id),
            None,
        )
        .await;
    }

    pub async fn contract_event(&self, user_id: Uuid, booking_id: Uuid, event: &str) {
        self.notify(
            user_id,
            "contract",
            "Contract update",
            event,
            Some(booking_id),
            None,
        )
        .await;
    }

    pub async fn dispute_event(&self, user_id: Uuid, booking_id: Uuid, event: &str) {
        self.notify(
            user_id,
            "dispute",
            "Dispute update",
            event,
            Some(booking_id),
            None,
        )
        .await;
    }
}
