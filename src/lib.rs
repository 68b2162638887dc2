pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod utils;

use std::sync::Arc;

use config::Config;
use db::db::DBClient;
use service::{
    booking_service::BookingService, contract_service::ContractService,
    dispute_service::DisputeService, notification_service::NotificationService,
    payment_service::PaymentService,
};

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub booking_service: Arc<BookingService>,
    pub contract_service: Arc<ContractService>,
    pub dispute_service: Arc<DisputeService>,
    pub payment_service: Arc<PaymentService>,
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let notification_service =
            Arc::new(NotificationService::new(db_client_arc.clone(), &config));

        let booking_service = Arc::new(BookingService::new(
            db_client_arc.clone(),
            notification_service.clone(),
            &config,
        ));

        let contract_service = Arc::new(ContractService::new(
            db_client_arc.clone(),
            notification_service.clone(),
        ));

        let dispute_service = Arc::new(DisputeService::new(
            db_client_arc.clone(),
            notification_service.clone(),
        ));

        let payment_service = Arc::new(PaymentService::new(
            db_client_arc.clone(),
            contract_service.clone(),
            notification_service.clone(),
        ));

        Self {
            env: config,
            db_client: db_client_arc,
            booking_service,
            contract_service,
            dispute_service,
            payment_service,
            notification_service,
        }
    }
}
