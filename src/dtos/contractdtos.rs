// dtos/contractdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::contractmodel::*;
use crate::utils::currency::to_major;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateSmartContractDto {
    pub booking_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SignContractDto {
    #[validate(length(min = 1, max = 200, message = "Signature is required"))]
    pub signature: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CompleteContractDto {
    #[validate(length(min = 1, max = 2000, message = "Completion proof is required"))]
    pub completion_proof: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContractTermsDto {
    pub scope: String,
    pub deliverables: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub service_rate: f64,
    pub platform_fee: f64,
    pub total_amount: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SmartContractResponseDto {
    pub id: Uuid,
    pub contract_number: String,
    pub booking_id: Uuid,
    pub consumer_id: Uuid,
    pub provider_id: Uuid,
    pub terms: ContractTermsDto,
    pub consumer_signed: bool,
    pub provider_signed: bool,
    pub consumer_signed_at: Option<DateTime<Utc>>,
    pub provider_signed_at: Option<DateTime<Utc>>,
    pub contract_hash: String,
    pub status: ContractStatus,
    pub completion_proof: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ContractTerms> for ContractTermsDto {
    fn from(terms: ContractTerms) -> Self {
        Self {
            scope: terms.scope,
            deliverables: terms.deliverables,
            start_date: terms.start_date,
            end_date: terms.end_date,
            service_rate: to_major(terms.service_rate),
            platform_fee: to_major(terms.platform_fee),
            total_amount: to_major(terms.total_amount),
        }
    }
}

impl From<SmartContract> for SmartContractResponseDto {
    fn from(contract: SmartContract) -> Self {
        Self {
            id: contract.id,
            contract_number: contract.contract_number,
            booking_id: contract.booking_id,
            consumer_id: contract.consumer_id,
            provider_id: contract.provider_id,
            terms: contract.contract_terms.0.into(),
            consumer_signed: contract.consumer_signature.is_some(),
            provider_signed: contract.provider_signature.is_some(),
            consumer_signed_at: contract.consumer_signed_at,
            provider_signed_at: contract.provider_signed_at,
            contract_hash: contract.contract_hash,
            status: contract.status,
            completion_proof: contract.completion_proof,
            completed_at: contract.completed_at,
            created_at: contract.created_at,
        }
    }
}
