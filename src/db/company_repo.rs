// src/db/company_repo.rs

use sqlx::{Executor, PgConnection, Postgres};

use crate::{
    common::{
        db_utils::{map_unique_violation, Pagination},
        error::AppError,
    },
    models::company::{Company, CreateCompanyPayload},
};

pub const DUPLICATE_COMPANY: &str = "The company with this document already exists in the system.";

#[derive(Clone, Default)]
pub struct CompanyRepository;

impl CompanyRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(company)
    }

    pub async fn document_taken<'e, E>(&self, executor: E, document: &str, except_id: Option<i64>) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM companies WHERE document = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(document)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    /// `only_id = Some(..)` restringe à empresa do usuário comum.
    pub async fn list<'e, E>(&self, executor: E, only_id: Option<i64>, page: Pagination) -> Result<Vec<Company>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT * FROM companies
            WHERE ($1::BIGINT IS NULL OR id = $1)
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(only_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(companies)
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateCompanyPayload) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, document, address, phone, description, logo_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.document)
        .bind(&payload.address)
        .bind(&payload.phone)
        .bind(&payload.description)
        .bind(&payload.logo_url)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_COMPANY))?;
        Ok(company)
    }

    pub async fn update<'e, E>(&self, executor: E, company: &Company) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Company>(
            r#"
            UPDATE companies SET
                name = $2, document = $3, address = $4, phone = $5,
                description = $6, logo_url = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(&company.document)
        .bind(&company.address)
        .bind(&company.phone)
        .bind(&company.description)
        .bind(&company.logo_url)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_COMPANY))?;
        Ok(updated)
    }

    /// Apaga a empresa inteira. Leads e contratos saem antes dos clientes
    /// (FK sem cascade) e obras/equipes antes dos usuários que as gerenciam.
    pub async fn delete(&self, conn: &mut PgConnection, id: i64) -> Result<(), AppError> {
        for sql in COMPANY_DELETE_STEPS {
            sqlx::query(sql).bind(id).execute(&mut *conn).await?;
        }
        Ok(())
    }
}

const COMPANY_DELETE_STEPS: [&str; 6] = [
    r#"
    DELETE FROM leads
    WHERE client_id IN (SELECT id FROM clients WHERE company_id = $1)
       OR property_id IN (
            SELECT pr.id FROM properties pr
            JOIN projects p ON p.id = pr.project_id
            WHERE p.company_id = $1
       )
    "#,
    r#"
    DELETE FROM contracts
    WHERE client_id IN (SELECT id FROM clients WHERE company_id = $1)
       OR property_id IN (
            SELECT pr.id FROM properties pr
            JOIN projects p ON p.id = pr.project_id
            WHERE p.company_id = $1
       )
    "#,
    "DELETE FROM projects WHERE company_id = $1",
    "DELETE FROM teams WHERE company_id = $1",
    "DELETE FROM clients WHERE company_id = $1",
    "DELETE FROM companies WHERE id = $1",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sales_rows_go_before_clients_and_company_last() {
        let position = |needle: &str| {
            COMPANY_DELETE_STEPS
                .iter()
                .position(|sql| sql.contains(needle))
                .unwrap()
        };
        assert!(position("DELETE FROM leads") < position("DELETE FROM clients"));
        assert!(position("DELETE FROM contracts") < position("DELETE FROM clients"));
        assert!(position("DELETE FROM teams") < position("DELETE FROM companies"));
        assert!(position("DELETE FROM projects") < position("DELETE FROM companies"));
        assert_eq!(position("DELETE FROM companies"), COMPANY_DELETE_STEPS.len() - 1);
    }
}
