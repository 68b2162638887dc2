// db/contractdb.rs
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use super::db::DBClient;
use super::error::DbError;
use crate::models::contractmodel::{
    compute_contract_hash, ContractStatus, ContractTerms, SmartContract,
};
use crate::utils::reference::generate_contract_number;

pub struct NewContract {
    pub booking_id: Uuid,
    pub consumer_id: Uuid,
    pub provider_id: Uuid,
    pub terms: ContractTerms,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignerRole {
    Consumer,
    Provider,
}

#[async_trait]
pub trait ContractExt {
    /// Idempotent: at most one contract per booking. A concurrent or
    /// repeated create returns the already-persisted contract unchanged.
    async fn create_contract(&self, contract: NewContract) -> Result<SmartContract, DbError>;

    async fn get_contract(&self, contract_id: Uuid) -> Result<Option<SmartContract>, DbError>;

    async fn get_contract_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<SmartContract>, DbError>;

    /// Read-modify-write under a row lock: two concurrent sign calls from
    /// different parties serialize, both land, and the hash is recomputed
    /// over the latest state each time.
    async fn sign_contract(
        &self,
        contract_id: Uuid,
        actor_id: Uuid,
        signature: String,
        sign_ip: Option<String>,
    ) -> Result<SmartContract, DbError>;

    async fn complete_contract(
        &self,
        contract_id: Uuid,
        actor_id: Uuid,
        completion_proof: String,
    ) -> Result<SmartContract, DbError>;
}

const CONTRACT_COLUMNS: &str = r#"
    id,
    contract_number,
    booking_id,
    consumer_id,
    provider_id,
    contract_terms,
    consumer_signature,
    provider_signature,
    consumer_signed_at,
    provider_signed_at,
    consumer_sign_ip,
    provider_sign_ip,
    contract_hash,
    status,
    completion_proof,
    completed_at,
    created_at,
    updated_at
"#;

#[async_trait]
impl ContractExt for DBClient {
    async fn create_contract(&self, contract: NewContract) -> Result<SmartContract, DbError> {
        let contract_number = generate_contract_number();
        let initial_hash = compute_contract_hash(
            &contract_number,
            contract.booking_id,
            &contract.terms,
            None,
            None,
        );

        let inserted = sqlx::query_as::<_, SmartContract>(&format!(
            r#"
            INSERT INTO smart_contracts
                (contract_number, booking_id, consumer_id, provider_id,
                 contract_terms, contract_hash, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending_signatures')
            ON CONFLICT (booking_id) DO NOTHING
            RETURNING {}
            "#,
            CONTRACT_COLUMNS
        ))
        .bind(&contract_number)
        .bind(contract.booking_id)
        .bind(contract.consumer_id)
        .bind(contract.provider_id)
        .bind(Json(&contract.terms))
        .bind(&initial_hash)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(created) => Ok(created),
            // Lost the race (or repeat call): the existing row wins.
            None => self
                .get_contract_by_booking(contract.booking_id)
                .await?
                .ok_or(DbError::NotFound),
        }
    }

    async fn get_contract(&self, contract_id: Uuid) -> Result<Option<SmartContract>, DbError> {
        let contract = sqlx::query_as::<_, SmartContract>(&format!(
            "SELECT {} FROM smart_contracts WHERE id = $1",
            CONTRACT_COLUMNS
        ))
        .bind(contract_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contract)
    }

    async fn get_contract_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<SmartContract>, DbError> {
        let contract = sqlx::query_as::<_, SmartContract>(&format!(
            "SELECT {} FROM smart_contracts WHERE booking_id = $1",
            CONTRACT_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contract)
    }

    async fn sign_contract(
        &self,
        contract_id: Uuid,
        actor_id: Uuid,
        signature: String,
        sign_ip: Option<String>,
    ) -> Result<SmartContract, DbError> {
        let mut tx = self.pool.begin().await?;

        let contract = sqlx::query_as::<_, SmartContract>(&format!(
            "SELECT {} FROM smart_contracts WHERE id = $1 FOR UPDATE",
            CONTRACT_COLUMNS
        ))
        .bind(contract_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        let role = if actor_id == contract.consumer_id {
            SignerRole::Consumer
        } else if actor_id == contract.provider_id {
            SignerRole::Provider
        } else {
            return Err(DbError::NotParty);
        };

        // Signatures are only collected while the contract is pending. A
        // disputed or completed contract must never drift back to active
        // because the missing party signs late.
        if contract.status != ContractStatus::PendingSignatures {
            return Err(DbError::InvalidBookingStatus);
        }

        let (consumer_signature, provider_signature) = match role {
            SignerRole::Consumer => {
                if contract.consumer_signature.is_some() {
                    return Err(DbError::AlreadySigned("consumer"));
                }
                (Some(signature.clone()), contract.provider_signature.clone())
            }
            SignerRole::Provider => {
                if contract.provider_signature.is_some() {
                    return Err(DbError::AlreadySigned("provider"));
                }
                (contract.consumer_signature.clone(), Some(signature.clone()))
            }
        };

        let both_signed = consumer_signature.is_some() && provider_signature.is_some();
        let status = if both_signed {
            ContractStatus::Active
        } else {
            ContractStatus::PendingSignatures
        };

        // The hash commits to the full bilateral state after this signature.
        let contract_hash = compute_contract_hash(
            &contract.contract_number,
            contract.booking_id,
            &contract.contract_terms.0,
            consumer_signature.as_deref(),
            provider_signature.as_deref(),
        );

        let now = Utc::now();
        let updated = match role {
            SignerRole::Consumer => {
                sqlx::query_as::<_, SmartContract>(&format!(
                    r#"
                    UPDATE smart_contracts
                    SET consumer_signature = $2,
                        consumer_signed_at = $3,
                        consumer_sign_ip = $4,
                        contract_hash = $5,
                        status = $6,
                        updated_at = $3
                    WHERE id = $1
                    RETURNING {}
                    "#,
                    CONTRACT_COLUMNS
                ))
                .bind(contract_id)
                .bind(&signature)
                .bind(now)
                .bind(sign_ip)
                .bind(&contract_hash)
                .bind(status)
                .fetch_one(&mut *tx)
                .await?
            }
            SignerRole::Provider => {
                sqlx::query_as::<_, SmartContract>(&format!(
                    r#"
                    UPDATE smart_contracts
                    SET provider_signature = $2,
                        provider_signed_at = $3,
                        provider_sign_ip = $4,
                        contract_hash = $5,
                        status = $6,
                        updated_at = $3
                    WHERE id = $1
                    RETURNING {}
                    "#,
                    CONTRACT_COLUMNS
                ))
                .bind(contract_id)
                .bind(&signature)
                .bind(now)
                .bind(sign_ip)
                .bind(&contract_hash)
                .bind(status)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        Ok(updated)
    }

    async fn complete_contract(
        &self,
        contract_id: Uuid,
        actor_id: Uuid,
        completion_proof: String,
    ) -> Result<SmartContract, DbError> {
        let mut tx = self.pool.begin().await?;

        let contract = sqlx::query_as::<_, SmartContract>(&format!(
            "SELECT {} FROM smart_contracts WHERE id = $1 FOR UPDATE",
            CONTRACT_COLUMNS
        ))
        .bind(contract_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        if !contract.is_party(actor_id) {
            return Err(DbError::NotParty);
        }
        if contract.status != ContractStatus::Active {
            return Err(DbError::InvalidBookingStatus);
        }

        let updated = sqlx::query_as::<_, SmartContract>(&format!(
            r#"
            UPDATE smart_contracts
            SET status = 'completed',
                completion_proof = $2,
                completed_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CONTRACT_COLUMNS
        ))
        .bind(contract_id)
        .bind(&completion_proof)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }
}
