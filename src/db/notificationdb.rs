// db/notificationdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use super::error::DbError;
use crate::models::notificationmodel::Notification;

pub struct NewNotification {
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub booking_id: Option<Uuid>,
    pub data: Option<serde_json::Value>,
}

#[async_trait]
pub trait NotificationExt {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, DbError>;

    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, DbError>;
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, notification_type, title, body, booking_id, data, is_read, created_at";

#[async_trait]
impl NotificationExt for DBClient {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, DbError> {
        let created = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (user_id, notification_type, title, body, booking_id, data)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(notification.user_id)
        .bind(&notification.notification_type)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.booking_id)
        .bind(notification.data)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Notification>, DbError> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {} FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }
}
