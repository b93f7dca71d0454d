// src/db/finance_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{db_utils::Pagination, error::AppError},
    models::finance::{CategoryTotal, CreateExpensePayload, Expense},
};

#[derive(Debug, Default, Clone, Copy)]
pub struct ExpenseFilter {
    pub company_id: Option<i64>,
    pub project_id: Option<i64>,
    pub property_id: Option<i64>,
}

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(expense)
    }

    pub async fn list<'e, E>(&self, executor: E, filter: ExpenseFilter, page: Pagination) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT e.* FROM expenses e
            JOIN projects p ON p.id = e.project_id
            WHERE ($1::BIGINT IS NULL OR p.company_id = $1)
              AND ($2::BIGINT IS NULL OR e.project_id = $2)
              AND ($3::BIGINT IS NULL OR e.property_id = $3)
            ORDER BY e.date DESC, e.id DESC
            OFFSET $4 LIMIT $5
            "#,
        )
        .bind(filter.company_id)
        .bind(filter.project_id)
        .bind(filter.property_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(expenses)
    }

    pub async fn create<'e, E>(&self, executor: E, x: &CreateExpensePayload, created_by_id: i64) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (
                description, category, amount, date, supplier_name, supplier_document,
                supplier_contact, receipt_description, notes, project_id, property_id, created_by_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&x.description)
        .bind(x.category)
        .bind(x.amount)
        .bind(x.date)
        .bind(&x.supplier_name)
        .bind(&x.supplier_document)
        .bind(&x.supplier_contact)
        .bind(&x.receipt_description)
        .bind(&x.notes)
        .bind(x.project_id)
        .bind(x.property_id)
        .bind(created_by_id)
        .fetch_one(executor)
        .await?;
        Ok(expense)
    }

    pub async fn update<'e, E>(&self, executor: E, x: &Expense) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses SET
                description = $2, category = $3, amount = $4, date = $5,
                supplier_name = $6, supplier_document = $7, supplier_contact = $8,
                receipt_path = $9, receipt_description = $10, notes = $11,
                project_id = $12, property_id = $13, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(x.id)
        .bind(&x.description)
        .bind(x.category)
        .bind(x.amount)
        .bind(x.date)
        .bind(&x.supplier_name)
        .bind(&x.supplier_document)
        .bind(&x.supplier_contact)
        .bind(&x.receipt_path)
        .bind(&x.receipt_description)
        .bind(&x.notes)
        .bind(x.project_id)
        .bind(x.property_id)
        .fetch_one(executor)
        .await?;
        Ok(expense)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Soma por categoria. `project_id` restringe a uma obra; `company_id` ao tenant.
    pub async fn category_totals<'e, E>(
        &self,
        executor: E,
        company_id: Option<i64>,
        project_id: Option<i64>,
    ) -> Result<Vec<CategoryTotal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT e.category, COALESCE(SUM(e.amount), 0) AS total
            FROM expenses e
            JOIN projects p ON p.id = e.project_id
            WHERE ($1::BIGINT IS NULL OR p.company_id = $1)
              AND ($2::BIGINT IS NULL OR e.project_id = $2)
            GROUP BY e.category
            "#,
        )
        .bind(company_id)
        .bind(project_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
