// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{
        contract::{Contract, ContractStatus},
        crm::{Lead, LeadStatus},
        dashboard::{breakdown, wire_name, DashboardSummary},
        finance::{CategoryTotal, Expense, ExpenseCategory},
        project::{Project, ProjectStatus},
        property::PropertyStatus,
    },
};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // 1. Resumo Geral
    pub async fn get_summary<'e, A>(&self, conn: A, company_id: Option<i64>) -> Result<DashboardSummary, AppError>
    where
        A: Acquire<'e, Database = Postgres>,
    {
        // Uma transação só de leitura: todos os números saem do mesmo snapshot
        let mut tx = conn.begin().await?;

        // A. Obras por status
        let projects: Vec<(ProjectStatus, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*) FROM projects
            WHERE ($1::BIGINT IS NULL OR company_id = $1)
            GROUP BY status
            "#,
        )
        .bind(company_id)
        .fetch_all(&mut *tx)
        .await?;

        // B. Imóveis por status (empresa via obra)
        let properties: Vec<(PropertyStatus, i64)> = sqlx::query_as(
            r#"
            SELECT pr.status, COUNT(*) FROM properties pr
            JOIN projects p ON p.id = pr.project_id
            WHERE ($1::BIGINT IS NULL OR p.company_id = $1)
            GROUP BY pr.status
            "#,
        )
        .bind(company_id)
        .fetch_all(&mut *tx)
        .await?;

        // C. Leads por status (empresa via cliente)
        let leads: Vec<(LeadStatus, i64)> = sqlx::query_as(
            r#"
            SELECT l.status, COUNT(*) FROM leads l
            JOIN clients c ON c.id = l.client_id
            WHERE ($1::BIGINT IS NULL OR c.company_id = $1)
            GROUP BY l.status
            "#,
        )
        .bind(company_id)
        .fetch_all(&mut *tx)
        .await?;

        // D. Contratos por status (empresa via imóvel -> obra)
        let contracts: Vec<(ContractStatus, i64)> = sqlx::query_as(
            r#"
            SELECT ct.status, COUNT(*) FROM contracts ct
            JOIN properties pr ON pr.id = ct.property_id
            JOIN projects p ON p.id = pr.project_id
            WHERE ($1::BIGINT IS NULL OR p.company_id = $1)
            GROUP BY ct.status
            "#,
        )
        .bind(company_id)
        .fetch_all(&mut *tx)
        .await?;

        // E. Despesas por categoria
        let expenses = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT e.category, COALESCE(SUM(e.amount), 0) AS total
            FROM expenses e
            JOIN projects p ON p.id = e.project_id
            WHERE ($1::BIGINT IS NULL OR p.company_id = $1)
            GROUP BY e.category
            "#,
        )
        .bind(company_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let expense_by_category = ExpenseCategory::ALL
            .iter()
            .map(|category| {
                let total: Decimal = expenses
                    .iter()
                    .filter(|row| row.category == *category)
                    .map(|row| row.total)
                    .sum();
                (wire_name(category), total)
            })
            .collect::<std::collections::BTreeMap<_, _>>();

        Ok(DashboardSummary {
            projects: total(&projects),
            project_status: breakdown(&ProjectStatus::ALL, &projects),
            properties: total(&properties),
            property_status: breakdown(&PropertyStatus::ALL, &properties),
            leads: total(&leads),
            lead_status: breakdown(&LeadStatus::ALL, &leads),
            contracts: total(&contracts),
            contract_status: breakdown(&ContractStatus::ALL, &contracts),
            total_expenses: expense_by_category.values().copied().sum(),
            expense_by_category,
        })
    }

    // 2. Atividade recente
    pub async fn recent_leads<'e, E>(&self, executor: E, company_id: Option<i64>, limit: i64) -> Result<Vec<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT l.* FROM leads l
            JOIN clients c ON c.id = l.client_id
            WHERE ($1::BIGINT IS NULL OR c.company_id = $1)
            ORDER BY l.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(leads)
    }

    pub async fn recent_contracts<'e, E>(&self, executor: E, company_id: Option<i64>, limit: i64) -> Result<Vec<Contract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contracts = sqlx::query_as::<_, Contract>(
            r#"
            SELECT ct.* FROM contracts ct
            JOIN properties pr ON pr.id = ct.property_id
            JOIN projects p ON p.id = pr.project_id
            WHERE ($1::BIGINT IS NULL OR p.company_id = $1)
            ORDER BY ct.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(contracts)
    }

    pub async fn recent_expenses<'e, E>(&self, executor: E, company_id: Option<i64>, limit: i64) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT e.* FROM expenses e
            JOIN projects p ON p.id = e.project_id
            WHERE ($1::BIGINT IS NULL OR p.company_id = $1)
            ORDER BY e.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(expenses)
    }

    // 3. Obras em andamento
    pub async fn active_projects<'e, E>(&self, executor: E, company_id: Option<i64>, limit: i64) -> Result<Vec<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
            WHERE status = 'in_progress'
              AND ($1::BIGINT IS NULL OR company_id = $1)
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(company_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(projects)
    }
}

fn total<S>(rows: &[(S, i64)]) -> i64 {
    rows.iter().map(|(_, n)| n).sum()
}
