// handler/mod.rs
pub mod booking;
pub mod contract;
pub mod dispute;
pub mod notification;
pub mod payment;
