// src/models/dashboard.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{
    contract::{Contract, ContractStatus},
    crm::{Lead, LeadStatus},
    finance::{Expense, ExpenseCategory},
    project::ProjectStatus,
    property::PropertyStatus,
};

// 1. Números gerais (cards do topo), sempre dentro do escopo do usuário
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub projects: i64,
    pub project_status: BTreeMap<String, i64>,
    pub properties: i64,
    pub property_status: BTreeMap<String, i64>,
    pub leads: i64,
    pub lead_status: BTreeMap<String, i64>,
    pub contracts: i64,
    pub contract_status: BTreeMap<String, i64>,
    #[schema(value_type = f64)]
    pub total_expenses: Decimal,
    #[schema(value_type = Object)]
    pub expense_by_category: BTreeMap<String, Decimal>,
}

impl DashboardSummary {
    /// Usuário sem empresa: tudo zerado, mas com todas as chaves presentes.
    pub fn empty() -> Self {
        Self {
            projects: 0,
            project_status: breakdown::<ProjectStatus>(&ProjectStatus::ALL, &[]),
            properties: 0,
            property_status: breakdown::<PropertyStatus>(&PropertyStatus::ALL, &[]),
            leads: 0,
            lead_status: breakdown::<LeadStatus>(&LeadStatus::ALL, &[]),
            contracts: 0,
            contract_status: breakdown::<ContractStatus>(&ContractStatus::ALL, &[]),
            total_expenses: Decimal::ZERO,
            expense_by_category: ExpenseCategory::ALL
                .iter()
                .map(|c| (wire_name(c), Decimal::ZERO))
                .collect(),
        }
    }
}

// 2. Atividade recente
#[derive(Debug, Serialize, ToSchema)]
pub struct RecentActivities {
    pub leads: Vec<Lead>,
    pub contracts: Vec<Contract>,
    pub expenses: Vec<Expense>,
    /// As três listas mescladas numa linha do tempo única.
    pub timeline: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Lead,
    Contract,
    Expense,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

impl RecentActivities {
    pub fn new(leads: Vec<Lead>, contracts: Vec<Contract>, expenses: Vec<Expense>, limit: usize) -> Self {
        let timeline = merge_timeline(&leads, &contracts, &expenses, limit);
        Self { leads, contracts, expenses, timeline }
    }
}

/// Mescla as três tabelas por `created_at` decrescente e corta em `limit`.
pub fn merge_timeline(
    leads: &[Lead],
    contracts: &[Contract],
    expenses: &[Expense],
    limit: usize,
) -> Vec<ActivityEntry> {
    let mut entries: Vec<ActivityEntry> = leads
        .iter()
        .map(|l| ActivityEntry { kind: ActivityKind::Lead, id: l.id, created_at: l.created_at })
        .chain(contracts.iter().map(|c| ActivityEntry {
            kind: ActivityKind::Contract,
            id: c.id,
            created_at: c.created_at,
        }))
        .chain(expenses.iter().map(|e| ActivityEntry {
            kind: ActivityKind::Expense,
            id: e.id,
            created_at: e.created_at,
        }))
        .collect();

    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries.truncate(limit);
    entries
}

/// Contagem por status com todas as opções do enum presentes (zero se faltar).
pub fn breakdown<S>(all: &[S], rows: &[(S, i64)]) -> BTreeMap<String, i64>
where
    S: Serialize + PartialEq,
{
    all.iter()
        .map(|status| {
            let count = rows.iter().filter(|(s, _)| s == status).map(|(_, n)| *n).sum();
            (wire_name(status), count)
        })
        .collect()
}

/// O nome do enum como aparece no JSON ("in_progress", "initial_contact"...).
pub fn wire_name<S: Serialize>(value: &S) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        contract::{ContractStatus, ContractType},
        crm::LeadStatus,
        finance::ExpenseCategory,
    };
    use chrono::{Duration, NaiveDate};

    fn at(minutes: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    fn lead(id: i64, minutes: i64) -> Lead {
        Lead {
            id,
            property_id: 1,
            client_id: 1,
            status: LeadStatus::InitialContact,
            first_contact_date: None,
            last_contact_date: None,
            next_contact_date: None,
            visit_date: None,
            interest_level: None,
            budget: None,
            notes: None,
            assigned_user_id: None,
            created_at: at(minutes),
            updated_at: at(minutes),
        }
    }

    fn contract(id: i64, minutes: i64) -> Contract {
        Contract {
            id,
            contract_number: format!("C-{}", id),
            contract_type: ContractType::Sale,
            description: None,
            client_id: 1,
            property_id: 1,
            signing_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            expiration_date: None,
            contract_value: Decimal::new(100, 0),
            status: ContractStatus::Pending,
            notes: None,
            created_at: at(minutes),
            updated_at: at(minutes),
        }
    }

    fn expense(id: i64, minutes: i64) -> Expense {
        Expense {
            id,
            description: "Brita".into(),
            category: ExpenseCategory::Materials,
            amount: Decimal::new(50, 0),
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            supplier_name: None,
            supplier_document: None,
            supplier_contact: None,
            receipt_path: None,
            receipt_description: None,
            notes: None,
            project_id: 1,
            property_id: None,
            created_by_id: None,
            created_at: at(minutes),
            updated_at: at(minutes),
        }
    }

    #[test]
    fn timeline_is_newest_first_across_tables() {
        let timeline = merge_timeline(
            &[lead(1, 10), lead(2, 40)],
            &[contract(7, 30)],
            &[expense(9, 20), expense(8, 50)],
            10,
        );
        let order: Vec<(ActivityKind, i64)> = timeline.iter().map(|e| (e.kind, e.id)).collect();
        assert_eq!(
            order,
            vec![
                (ActivityKind::Expense, 8),
                (ActivityKind::Lead, 2),
                (ActivityKind::Contract, 7),
                (ActivityKind::Expense, 9),
                (ActivityKind::Lead, 1),
            ]
        );
    }

    #[test]
    fn timeline_respects_limit() {
        let recent = RecentActivities::new(
            vec![lead(1, 1), lead(2, 2)],
            vec![contract(3, 3)],
            vec![expense(4, 4)],
            2,
        );
        assert_eq!(recent.timeline.len(), 2);
        assert_eq!(recent.timeline[0].id, 4);
        assert_eq!(recent.leads.len(), 2);
    }

    #[test]
    fn breakdown_fills_missing_statuses_with_zero() {
        let counts = breakdown(
            &LeadStatus::ALL,
            &[(LeadStatus::Negotiation, 3), (LeadStatus::Lost, 1)],
        );
        assert_eq!(counts.len(), LeadStatus::ALL.len());
        assert_eq!(counts["negotiation"], 3);
        assert_eq!(counts["lost"], 1);
        assert_eq!(counts["initial_contact"], 0);
    }

    #[test]
    fn empty_summary_keeps_every_key() {
        let summary = DashboardSummary::empty();
        assert_eq!(summary.project_status.len(), ProjectStatus::ALL.len());
        assert_eq!(summary.property_status["sold"], 0);
        assert_eq!(summary.contract_status["pending"], 0);
        assert_eq!(summary.expense_by_category["labor"], Decimal::ZERO);
        assert_eq!(summary.total_expenses, Decimal::ZERO);
    }
}
