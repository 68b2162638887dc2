// service/mod.rs
pub mod booking_service;
pub mod contract_service;
pub mod dispute_service;
pub mod error;
pub mod notification_service;
pub mod payment_service;
