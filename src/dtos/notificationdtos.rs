// dtos/notificationdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::notificationmodel::Notification;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NotificationListQueryDto {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must be non-negative"))]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponseDto {
    pub id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub booking_id: Option<Uuid>,
    pub data: Option<serde_json::Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponseDto {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            notification_type: notification.notification_type,
            title: notification.title,
            body: notification.body,
            booking_id: notification.booking_id,
            data: notification.data,
            is_read: notification.is_read,
            created_at: notification.created_at,
        }
    }
}
