// dtos/mod.rs
use serde::{Deserialize, Serialize};

pub mod bookingdtos;
pub mod contractdtos;
pub mod disputedtos;
pub mod notificationdtos;
pub mod walletdtos;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
            data: Some(data),
        }
    }
}
