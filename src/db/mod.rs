// db/mod.rs
pub mod bookingdb;
pub mod contractdb;
pub mod db;
pub mod disputedb;
pub mod error;
pub mod escrowdb;
pub mod marketdb;
pub mod notificationdb;
pub mod rewarddb;
pub mod walletdb;
