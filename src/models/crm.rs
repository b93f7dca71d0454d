// src/models/crm.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::patch::Patch;
use crate::models::ownership::{Owned, Ownership, TenantRef};

// =============================================================================
//  CLIENTES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Individual, // Pessoa Física
    Company,    // Pessoa Jurídica
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Client {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "João da Silva")]
    pub name: String,
    pub client_type: ClientType,
    #[schema(example = "123.456.789-00")]
    pub document: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub company_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Client {
    fn ownership(&self) -> Ownership {
        Ownership::Company(Some(self.company_id))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "João da Silva")]
    pub name: String,
    pub client_type: ClientType,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "123.456.789-00")]
    pub document: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
    pub company_id: i64,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateClientPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    pub client_type: Option<ClientType>,
    #[validate(length(min = 1, message = "required"))]
    pub document: Option<String>,
    #[schema(value_type = Option<String>)]
    pub email: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub phone: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub address: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub city: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub state: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub zip_code: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
}

impl UpdateClientPayload {
    pub fn apply(self, client: &mut Client) {
        if let Some(name) = self.name {
            client.name = name;
        }
        if let Some(client_type) = self.client_type {
            client.client_type = client_type;
        }
        if let Some(document) = self.document {
            client.document = document;
        }
        self.email.apply_to(&mut client.email);
        self.phone.apply_to(&mut client.phone);
        self.address.apply_to(&mut client.address);
        self.city.apply_to(&mut client.city);
        self.state.apply_to(&mut client.state);
        self.zip_code.apply_to(&mut client.zip_code);
        self.notes.apply_to(&mut client.notes);
    }
}

// =============================================================================
//  LEADS (funil de vendas por imóvel)
// =============================================================================

/// Sem grafo de transições: qualquer status pode ir para qualquer outro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    InitialContact,
    PropertyVisit,
    Negotiation,
    Proposal,
    Contract,
    Closed,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 7] = [
        LeadStatus::InitialContact,
        LeadStatus::PropertyVisit,
        LeadStatus::Negotiation,
        LeadStatus::Proposal,
        LeadStatus::Contract,
        LeadStatus::Closed,
        LeadStatus::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::InitialContact => "initial_contact",
            LeadStatus::PropertyVisit => "property_visit",
            LeadStatus::Negotiation => "negotiation",
            LeadStatus::Proposal => "proposal",
            LeadStatus::Contract => "contract",
            LeadStatus::Closed => "closed",
            LeadStatus::Lost => "lost",
        }
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
                format!("Invalid status. Must be one of: {}", allowed.join(", "))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Lead {
    #[schema(example = 1)]
    pub id: i64,
    pub property_id: i64,
    pub client_id: i64,
    pub status: LeadStatus,
    pub first_contact_date: Option<NaiveDate>,
    pub last_contact_date: Option<NaiveDate>,
    pub next_contact_date: Option<NaiveDate>,
    pub visit_date: Option<NaiveDate>,
    #[schema(example = 4)]
    pub interest_level: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub budget: Option<Decimal>,
    pub notes: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Lead {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Client(self.client_id))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLeadPayload {
    pub property_id: i64,
    pub client_id: i64,
    pub status: Option<LeadStatus>,
    pub first_contact_date: Option<NaiveDate>,
    pub last_contact_date: Option<NaiveDate>,
    pub next_contact_date: Option<NaiveDate>,
    pub visit_date: Option<NaiveDate>,
    #[validate(range(min = 1, max = 5, message = "Interest level must be between 1 and 5"))]
    pub interest_level: Option<i32>,
    #[schema(value_type = Option<f64>)]
    pub budget: Option<Decimal>,
    pub notes: Option<String>,
    pub assigned_user_id: Option<i64>,
}

impl CreateLeadPayload {
    /// Preenche o que o corretor não informou: responsável é quem cadastra,
    /// datas de contato são hoje e o funil começa em `initial_contact`.
    pub fn fill_defaults(&mut self, requester_id: i64, today: NaiveDate) {
        self.assigned_user_id.get_or_insert(requester_id);
        self.first_contact_date.get_or_insert(today);
        self.last_contact_date.get_or_insert(today);
        self.status.get_or_insert(LeadStatus::InitialContact);
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateLeadPayload {
    pub status: Option<LeadStatus>,
    #[schema(value_type = Option<NaiveDate>)]
    pub first_contact_date: Patch<NaiveDate>,
    #[schema(value_type = Option<NaiveDate>)]
    pub last_contact_date: Patch<NaiveDate>,
    #[schema(value_type = Option<NaiveDate>)]
    pub next_contact_date: Patch<NaiveDate>,
    #[schema(value_type = Option<NaiveDate>)]
    pub visit_date: Patch<NaiveDate>,
    #[schema(value_type = Option<i32>)]
    pub interest_level: Patch<i32>,
    #[schema(value_type = Option<f64>)]
    pub budget: Patch<Decimal>,
    #[schema(value_type = Option<String>)]
    pub notes: Patch<String>,
    #[schema(value_type = Option<i64>)]
    pub assigned_user_id: Patch<i64>,
}

impl UpdateLeadPayload {
    /// Mescla no lead. Mudança de status marca o último contato como hoje.
    pub fn apply(self, lead: &mut Lead, today: NaiveDate) {
        self.first_contact_date.apply_to(&mut lead.first_contact_date);
        self.last_contact_date.apply_to(&mut lead.last_contact_date);
        self.next_contact_date.apply_to(&mut lead.next_contact_date);
        self.visit_date.apply_to(&mut lead.visit_date);
        self.interest_level.apply_to(&mut lead.interest_level);
        self.budget.apply_to(&mut lead.budget);
        self.notes.apply_to(&mut lead.notes);
        self.assigned_user_id.apply_to(&mut lead.assigned_user_id);

        if let Some(status) = self.status {
            if status != lead.status {
                lead.last_contact_date = Some(today);
            }
            lead.status = status;
        }
    }

    pub fn interest_level_is_valid(&self) -> bool {
        self.interest_level.value().is_none_or(|level| (1..=5).contains(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn lead() -> Lead {
        Lead {
            id: 1,
            property_id: 2,
            client_id: 3,
            status: LeadStatus::InitialContact,
            first_contact_date: Some(day(1)),
            last_contact_date: Some(day(1)),
            next_contact_date: None,
            visit_date: None,
            interest_level: Some(3),
            budget: None,
            notes: None,
            assigned_user_id: Some(10),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_defaults_to_requester_and_today() {
        let mut payload: CreateLeadPayload =
            serde_json::from_str(r#"{"property_id": 2, "client_id": 3}"#).unwrap();
        payload.fill_defaults(42, day(15));

        assert_eq!(payload.assigned_user_id, Some(42));
        assert_eq!(payload.first_contact_date, Some(day(15)));
        assert_eq!(payload.last_contact_date, Some(day(15)));
        assert_eq!(payload.status, Some(LeadStatus::InitialContact));
    }

    #[test]
    fn create_keeps_explicit_values() {
        let mut payload: CreateLeadPayload = serde_json::from_str(
            r#"{"property_id": 2, "client_id": 3, "assigned_user_id": 7,
                "first_contact_date": "2025-03-02", "status": "negotiation"}"#,
        )
        .unwrap();
        payload.fill_defaults(42, day(15));

        assert_eq!(payload.assigned_user_id, Some(7));
        assert_eq!(payload.first_contact_date, Some(day(2)));
        assert_eq!(payload.last_contact_date, Some(day(15)));
        assert_eq!(payload.status, Some(LeadStatus::Negotiation));
    }

    #[test]
    fn status_change_touches_last_contact_date() {
        let mut l = lead();
        let patch: UpdateLeadPayload = serde_json::from_str(r#"{"status": "lost"}"#).unwrap();
        patch.apply(&mut l, day(20));

        assert_eq!(l.status, LeadStatus::Lost);
        assert_eq!(l.last_contact_date, Some(day(20)));
    }

    #[test]
    fn any_status_can_follow_any_other() {
        let mut l = lead();
        l.status = LeadStatus::Closed;
        let patch: UpdateLeadPayload =
            serde_json::from_str(r#"{"status": "initial_contact"}"#).unwrap();
        patch.apply(&mut l, day(20));
        assert_eq!(l.status, LeadStatus::InitialContact);
    }

    #[test]
    fn same_status_or_no_status_keeps_last_contact_date() {
        let mut l = lead();
        let patch: UpdateLeadPayload =
            serde_json::from_str(r#"{"status": "initial_contact", "notes": "ligar amanhã"}"#).unwrap();
        patch.apply(&mut l, day(20));
        assert_eq!(l.last_contact_date, Some(day(1)));
        assert_eq!(l.notes.as_deref(), Some("ligar amanhã"));

        let patch: UpdateLeadPayload = serde_json::from_str(r#"{"budget": 300000}"#).unwrap();
        patch.apply(&mut l, day(21));
        assert_eq!(l.last_contact_date, Some(day(1)));
    }

    #[test]
    fn interest_level_bounds_on_update() {
        let ok: UpdateLeadPayload = serde_json::from_str(r#"{"interest_level": 5}"#).unwrap();
        let bad: UpdateLeadPayload = serde_json::from_str(r#"{"interest_level": 9}"#).unwrap();
        let cleared: UpdateLeadPayload = serde_json::from_str(r#"{"interest_level": null}"#).unwrap();
        assert!(ok.interest_level_is_valid());
        assert!(!bad.interest_level_is_valid());
        assert!(cleared.interest_level_is_valid());
    }
}
