// src/models/contract.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::patch::Patch;
use crate::models::ownership::{Owned, Ownership, TenantRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contract_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Sale,   // Venda
    Rental, // Locação
    Lease,  // Arrendamento
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contract_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    #[default]
    Pending,
    Expired,
    Cancelled,
    Completed,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 5] = [
        ContractStatus::Active,
        ContractStatus::Pending,
        ContractStatus::Expired,
        ContractStatus::Cancelled,
        ContractStatus::Completed,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Contract {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "CV-2025-0001")]
    pub contract_number: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub description: Option<String>,
    pub client_id: i64,
    pub property_id: i64,
    pub signing_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
    #[schema(value_type = f64, example = 450000.0)]
    pub contract_value: Decimal,
    pub status: ContractStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Contract {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Property(self.property_id))
    }
}

// Anexo de contrato (PDF, imagem digitalizada...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ContractDocument {
    pub id: i64,
    #[schema(example = "contrato-assinado.pdf")]
    pub filename: String,
    pub description: Option<String>,
    #[schema(example = "application/pdf")]
    pub file_type: Option<String>,
    pub file_path: String,
    pub contract_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for ContractDocument {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Contract(self.contract_id))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContractPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "CV-2025-0001")]
    pub contract_number: String,
    #[serde(rename = "type")]
    pub contract_type: ContractType,
    pub description: Option<String>,
    pub client_id: i64,
    pub property_id: i64,
    pub signing_date: NaiveDate,
    pub expiration_date: Option<NaiveDate>,
    #[schema(value_type = f64)]
    pub contract_value: Decimal,
    #[serde(default)]
    pub status: ContractStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateContractPayload {
    #[validate(length(min = 1, message = "required"))]
    pub contract_number: Option<String>,
    #[serde(rename = "type")]
    pub contract_type: Option<ContractType>,
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    pub client_id: Option<i64>,
    pub property_id: Option<i64>,
    pub signing_date: Option<NaiveDate>,
    #[schema(value_type = Option<NaiveDate>)]
    pub expiration_date: Patch<NaiveDate>,
    #[schema(value_type = Option<f64>)]
    pub contract_value: Option<Decimal>,
    pub status: Option<ContractStatus>,
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
}

impl UpdateContractPayload {
    pub fn apply(self, contract: &mut Contract) {
        if let Some(number) = self.contract_number {
            contract.contract_number = number;
        }
        if let Some(contract_type) = self.contract_type {
            contract.contract_type = contract_type;
        }
        self.description.apply_to(&mut contract.description);
        if let Some(client_id) = self.client_id {
            contract.client_id = client_id;
        }
        if let Some(property_id) = self.property_id {
            contract.property_id = property_id;
        }
        if let Some(signing_date) = self.signing_date {
            contract.signing_date = signing_date;
        }
        self.expiration_date.apply_to(&mut contract.expiration_date);
        if let Some(value) = self.contract_value {
            contract.contract_value = value;
        }
        if let Some(status) = self.status {
            contract.status = status;
        }
        self.notes.apply_to(&mut contract.notes);
    }
}

// Só para o Swagger: formato do multipart de anexos
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct DocumentUploadForm {
    pub description: Option<String>,
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
