// src/db/crm_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        db_utils::{map_unique_violation, Pagination},
        error::AppError,
    },
    models::crm::{Client, CreateClientPayload, CreateLeadPayload, Lead, LeadStatus},
};

pub const DUPLICATE_CLIENT: &str = "The client with this document already exists in the system.";

/// Filtros aceitos na listagem de leads. Todos opcionais e combináveis.
#[derive(Debug, Default, Clone, Copy)]
pub struct LeadFilter {
    pub company_id: Option<i64>,
    pub property_id: Option<i64>,
    pub client_id: Option<i64>,
    pub assigned_user_id: Option<i64>,
    pub status: Option<LeadStatus>,
}

#[derive(Clone, Default)]
pub struct CrmRepository;

impl CrmRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn find_client<'e, E>(&self, executor: E, id: i64) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(client)
    }

    /// Documento (CPF/CNPJ) é único no sistema inteiro, não por empresa.
    pub async fn document_taken<'e, E>(&self, executor: E, document: &str, except_id: Option<i64>) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE document = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(document)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn list_clients<'e, E>(&self, executor: E, company_id: Option<i64>, page: Pagination) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE ($1::BIGINT IS NULL OR company_id = $1)
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(company_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(clients)
    }

    pub async fn create_client<'e, E>(&self, executor: E, c: &CreateClientPayload) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (
                name, client_type, document, email, phone, address, city, state, zip_code, notes, company_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&c.name)
        .bind(c.client_type)
        .bind(&c.document)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.address)
        .bind(&c.city)
        .bind(&c.state)
        .bind(&c.zip_code)
        .bind(&c.notes)
        .bind(c.company_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_CLIENT))?;
        Ok(client)
    }

    pub async fn update_client<'e, E>(&self, executor: E, c: &Client) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients SET
                name = $2, client_type = $3, document = $4, email = $5, phone = $6,
                address = $7, city = $8, state = $9, zip_code = $10, notes = $11,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(c.id)
        .bind(&c.name)
        .bind(c.client_type)
        .bind(&c.document)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.address)
        .bind(&c.city)
        .bind(&c.state)
        .bind(&c.zip_code)
        .bind(&c.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_CLIENT))?;
        Ok(client)
    }

    pub async fn delete_client<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn client_has_leads<'e, E>(&self, executor: E, client_id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM leads WHERE client_id = $1)")
            .bind(client_id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    pub async fn client_has_contracts<'e, E>(&self, executor: E, client_id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM contracts WHERE client_id = $1)")
            .bind(client_id)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }

    // =========================================================================
    //  LEADS
    // =========================================================================

    pub async fn find_lead<'e, E>(&self, executor: E, id: i64) -> Result<Option<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(lead)
    }

    /// A empresa do lead é a do cliente.
    pub async fn list_leads<'e, E>(&self, executor: E, filter: LeadFilter, page: Pagination) -> Result<Vec<Lead>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT l.* FROM leads l
            JOIN clients c ON c.id = l.client_id
            WHERE ($1::BIGINT IS NULL OR c.company_id = $1)
              AND ($2::BIGINT IS NULL OR l.property_id = $2)
              AND ($3::BIGINT IS NULL OR l.client_id = $3)
              AND ($4::BIGINT IS NULL OR l.assigned_user_id = $4)
              AND ($5::lead_status IS NULL OR l.status = $5)
            ORDER BY l.id
            OFFSET $6 LIMIT $7
            "#,
        )
        .bind(filter.company_id)
        .bind(filter.property_id)
        .bind(filter.client_id)
        .bind(filter.assigned_user_id)
        .bind(filter.status)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(leads)
    }

    /// Espera o payload já com `fill_defaults` aplicado.
    pub async fn create_lead<'e, E>(&self, executor: E, l: &CreateLeadPayload) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                property_id, client_id, status, first_contact_date, last_contact_date,
                next_contact_date, visit_date, interest_level, budget, notes, assigned_user_id
            )
            VALUES ($1, $2, COALESCE($3, 'initial_contact'::lead_status), $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(l.property_id)
        .bind(l.client_id)
        .bind(l.status)
        .bind(l.first_contact_date)
        .bind(l.last_contact_date)
        .bind(l.next_contact_date)
        .bind(l.visit_date)
        .bind(l.interest_level)
        .bind(l.budget)
        .bind(&l.notes)
        .bind(l.assigned_user_id)
        .fetch_one(executor)
        .await?;
        Ok(lead)
    }

    pub async fn update_lead<'e, E>(&self, executor: E, l: &Lead) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads SET
                status = $2, first_contact_date = $3, last_contact_date = $4,
                next_contact_date = $5, visit_date = $6, interest_level = $7,
                budget = $8, notes = $9, assigned_user_id = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(l.id)
        .bind(l.status)
        .bind(l.first_contact_date)
        .bind(l.last_contact_date)
        .bind(l.next_contact_date)
        .bind(l.visit_date)
        .bind(l.interest_level)
        .bind(l.budget)
        .bind(&l.notes)
        .bind(l.assigned_user_id)
        .fetch_one(executor)
        .await?;
        Ok(lead)
    }

    pub async fn delete_lead<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
