// src/db/contract_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        db_utils::{map_unique_violation, Pagination},
        error::AppError,
    },
    models::contract::{Contract, ContractDocument, CreateContractPayload},
};

pub const DUPLICATE_CONTRACT: &str = "A contract with this number already exists.";

#[derive(Debug, Default, Clone, Copy)]
pub struct ContractFilter {
    pub company_id: Option<i64>,
    pub property_id: Option<i64>,
    pub client_id: Option<i64>,
}

#[derive(Clone, Default)]
pub struct ContractRepository;

impl ContractRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Contract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(contract)
    }

    pub async fn number_taken<'e, E>(&self, executor: E, number: &str, except_id: Option<i64>) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM contracts
                WHERE contract_number = $1 AND ($2::BIGINT IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(number)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    /// Escopo: contracts -> properties -> projects.company_id.
    pub async fn list<'e, E>(&self, executor: E, filter: ContractFilter, page: Pagination) -> Result<Vec<Contract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contracts = sqlx::query_as::<_, Contract>(
            r#"
            SELECT ct.* FROM contracts ct
            JOIN properties pr ON pr.id = ct.property_id
            JOIN projects p ON p.id = pr.project_id
            WHERE ($1::BIGINT IS NULL OR p.company_id = $1)
              AND ($2::BIGINT IS NULL OR ct.property_id = $2)
              AND ($3::BIGINT IS NULL OR ct.client_id = $3)
            ORDER BY ct.id
            OFFSET $4 LIMIT $5
            "#,
        )
        .bind(filter.company_id)
        .bind(filter.property_id)
        .bind(filter.client_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(contracts)
    }

    pub async fn create<'e, E>(&self, executor: E, c: &CreateContractPayload) -> Result<Contract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            INSERT INTO contracts (
                contract_number, type, description, client_id, property_id, signing_date,
                expiration_date, contract_value, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&c.contract_number)
        .bind(c.contract_type)
        .bind(&c.description)
        .bind(c.client_id)
        .bind(c.property_id)
        .bind(c.signing_date)
        .bind(c.expiration_date)
        .bind(c.contract_value)
        .bind(c.status)
        .bind(&c.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_CONTRACT))?;
        Ok(contract)
    }

    pub async fn update<'e, E>(&self, executor: E, c: &Contract) -> Result<Contract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contract = sqlx::query_as::<_, Contract>(
            r#"
            UPDATE contracts SET
                contract_number = $2, type = $3, description = $4, client_id = $5,
                property_id = $6, signing_date = $7, expiration_date = $8,
                contract_value = $9, status = $10, notes = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(c.id)
        .bind(&c.contract_number)
        .bind(c.contract_type)
        .bind(&c.description)
        .bind(c.client_id)
        .bind(c.property_id)
        .bind(c.signing_date)
        .bind(c.expiration_date)
        .bind(c.contract_value)
        .bind(c.status)
        .bind(&c.notes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_CONTRACT))?;
        Ok(contract)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // --- Anexos ---

    pub async fn list_documents<'e, E>(&self, executor: E, contract_id: i64) -> Result<Vec<ContractDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let docs = sqlx::query_as::<_, ContractDocument>(
            "SELECT * FROM contract_documents WHERE contract_id = $1 ORDER BY id",
        )
        .bind(contract_id)
        .fetch_all(executor)
        .await?;
        Ok(docs)
    }

    pub async fn find_document<'e, E>(&self, executor: E, id: i64) -> Result<Option<ContractDocument>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let doc = sqlx::query_as::<_, ContractDocument>("SELECT * FROM contract_documents WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(doc)
    }

    pub async fn create_document<'e, E>(
        &self,
        executor: E,
        contract_id: i64,
        filename: &str,
        description: Option<&str>,
        file_type: Option<&str>,
        file_path: &str,
    ) -> Result<ContractDocument, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let doc = sqlx::query_as::<_, ContractDocument>(
            r#"
            INSERT INTO contract_documents (filename, description, file_type, file_path, contract_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(filename)
        .bind(description)
        .bind(file_type)
        .bind(file_path)
        .bind(contract_id)
        .fetch_one(executor)
        .await?;
        Ok(doc)
    }

    pub async fn delete_document<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM contract_documents WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
