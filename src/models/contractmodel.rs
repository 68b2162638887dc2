// models/contractmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::types::Json;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    PendingSignatures,
    Active,
    Completed,
    Disputed,
}

/// Agreed scope/timeline/payment, assembled from the originating
/// request-for-work and the accepted bid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractTerms {
    pub scope: String,
    pub deliverables: Vec<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub service_rate: i64,
    pub platform_fee: i64,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SmartContract {
    pub id: Uuid,
    pub contract_number: String,
    pub booking_id: Uuid,
    pub consumer_id: Uuid,
    pub provider_id: Uuid,
    pub contract_terms: Json<ContractTerms>,
    pub consumer_signature: Option<String>,
    pub provider_signature: Option<String>,
    pub consumer_signed_at: Option<DateTime<Utc>>,
    pub provider_signed_at: Option<DateTime<Utc>>,
    pub consumer_sign_ip: Option<String>,
    pub provider_sign_ip: Option<String>,
    pub contract_hash: String,
    pub status: ContractStatus,
    pub completion_proof: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SmartContract {
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.consumer_id == user_id || self.provider_id == user_id
    }

    pub fn both_signed(&self) -> bool {
        self.consumer_signature.is_some() && self.provider_signature.is_some()
    }
}

/// Tamper-evident digest over the bilateral state of a contract. The
/// individual fields stay authoritative; the hash only commits to them.
/// Recomputed after every signature so the final value covers both
/// signatures.
pub fn compute_contract_hash(
    contract_number: &str,
    booking_id: Uuid,
    terms: &ContractTerms,
    consumer_signature: Option<&str>,
    provider_signature: Option<&str>,
) -> String {
    let terms_json =
        serde_json::to_string(terms).unwrap_or_else(|_| "{}".to_string());

    let mut hasher = Sha256::new();
    hasher.update(contract_number.as_bytes());
    hasher.update(b"|");
    hasher.update(booking_id.as_bytes());
    hasher.update(b"|");
    hasher.update(terms_json.as_bytes());
    hasher.update(b"|");
    hasher.update(consumer_signature.unwrap_or("").as_bytes());
    hasher.update(b"|");
    hasher.update(provider_signature.unwrap_or("").as_bytes());

    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> ContractTerms {
        ContractTerms {
            scope: "Rewire kitchen and utility room".to_string(),
            deliverables: vec!["New distribution board".to_string()],
            start_date: "2025-09-01T09:00:00Z".parse().unwrap(),
            end_date: None,
            service_rate: 100000,
            platform_fee: 7000,
            total_amount: 107000,
        }
    }

    #[test]
    fn test_hash_is_deterministic() {
        let booking_id = Uuid::new_v4();
        let a = compute_contract_hash("CTR-1", booking_id, &terms(), None, None);
        let b = compute_contract_hash("CTR-1", booking_id, &terms(), None, None);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64); // hex-encoded sha256
    }

    #[test]
    fn test_hash_commits_to_signatures() {
        let booking_id = Uuid::new_v4();
        let unsigned = compute_contract_hash("CTR-1", booking_id, &terms(), None, None);
        let consumer_only =
            compute_contract_hash("CTR-1", booking_id, &terms(), Some("sig-c"), None);
        let both =
            compute_contract_hash("CTR-1", booking_id, &terms(), Some("sig-c"), Some("sig-p"));

        assert_ne!(unsigned, consumer_only);
        assert_ne!(consumer_only, both);
    }

    #[test]
    fn test_hash_commits_to_terms() {
        let booking_id = Uuid::new_v4();
        let mut changed = terms();
        changed.total_amount += 1;

        let a = compute_contract_hash("CTR-1", booking_id, &terms(), None, None);
        let b = compute_contract_hash("CTR-1", booking_id, &changed, None, None);
        assert_ne!(a, b);
    }
}
