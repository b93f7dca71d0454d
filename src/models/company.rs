// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::patch::Patch;
use crate::models::ownership::{Owned, Ownership};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Company {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Construtora Horizonte")]
    pub name: String,
    #[schema(example = "12.345.678/0001-90")]
    pub document: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Company {
    fn ownership(&self) -> Ownership {
        Ownership::Company(Some(self.id))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCompanyPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Construtora Horizonte")]
    pub name: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "12.345.678/0001-90")]
    pub document: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateCompanyPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub document: Option<String>,
    #[schema(value_type = Option<String>)]
    pub address: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub logo_url: Patch<String>,
}

impl UpdateCompanyPayload {
    pub fn apply(self, company: &mut Company) {
        if let Some(name) = self.name {
            company.name = name;
        }
        if let Some(document) = self.document {
            company.document = document;
        }
        self.address.apply_to(&mut company.address);
        self.phone.apply_to(&mut company.phone);
        self.description.apply_to(&mut company.description);
        self.logo_url.apply_to(&mut company.logo_url);
    }
}
