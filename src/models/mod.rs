pub mod bookingmodel;
pub mod contractmodel;
pub mod disputemodel;
pub mod escrowmodel;
pub mod marketmodels;
pub mod notificationmodel;
pub mod walletmodels;
