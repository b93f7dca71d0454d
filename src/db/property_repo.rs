// src/db/property_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        db_utils::{map_unique_violation, Pagination},
        error::AppError,
    },
    models::property::{CreatePropertyPayload, Property, PropertyStatus, PropertyUpdate},
};

pub const DUPLICATE_PROPERTY: &str = "The property with this name already exists in the project.";

#[derive(Clone, Default)]
pub struct PropertyRepository;

impl PropertyRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Property>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(property)
    }

    pub async fn name_taken<'e, E>(
        &self,
        executor: E,
        project_id: i64,
        name: &str,
        except_id: Option<i64>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM properties
                WHERE project_id = $1 AND name = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(project_id)
        .bind(name)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    /// Escopo pela obra: properties -> projects.company_id.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        company_id: Option<i64>,
        status: Option<PropertyStatus>,
        page: Pagination,
    ) -> Result<Vec<Property>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let properties = sqlx::query_as::<_, Property>(
            r#"
            SELECT pr.* FROM properties pr
            JOIN projects p ON p.id = pr.project_id
            WHERE ($1::BIGINT IS NULL OR p.company_id = $1)
              AND ($2::property_status IS NULL OR pr.status = $2)
            ORDER BY pr.id
            OFFSET $3 LIMIT $4
            "#,
        )
        .bind(company_id)
        .bind(status)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(properties)
    }

    pub async fn list_by_project<'e, E>(&self, executor: E, project_id: i64, page: Pagination) -> Result<Vec<Property>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let properties = sqlx::query_as::<_, Property>(
            r#"
            SELECT * FROM properties
            WHERE project_id = $1
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(project_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(properties)
    }

    pub async fn create<'e, E>(&self, executor: E, p: &CreatePropertyPayload) -> Result<Property, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let property = sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (
                name, description, type, status, address, unit_number, floor, area,
                bedrooms, bathrooms, garage_spots, price, construction_cost, start_date,
                expected_completion_date, actual_completion_date, is_sold, sale_date,
                sale_price, project_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(&p.name)
        .bind(&p.description)
        .bind(p.property_type)
        .bind(p.status)
        .bind(&p.address)
        .bind(&p.unit_number)
        .bind(p.floor)
        .bind(p.area)
        .bind(p.bedrooms)
        .bind(p.bathrooms)
        .bind(p.garage_spots)
        .bind(p.price)
        .bind(p.construction_cost)
        .bind(p.start_date)
        .bind(p.expected_completion_date)
        .bind(p.actual_completion_date)
        .bind(p.is_sold)
        .bind(p.sale_date)
        .bind(p.sale_price)
        .bind(p.project_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_PROPERTY))?;
        Ok(property)
    }

    pub async fn update<'e, E>(&self, executor: E, p: &Property) -> Result<Property, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let property = sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties SET
                name = $2, description = $3, type = $4, status = $5, address = $6,
                unit_number = $7, floor = $8, area = $9, bedrooms = $10, bathrooms = $11,
                garage_spots = $12, price = $13, construction_cost = $14, start_date = $15,
                expected_completion_date = $16, actual_completion_date = $17, is_sold = $18,
                sale_date = $19, sale_price = $20, project_id = $21, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(p.id)
        .bind(&p.name)
        .bind(&p.description)
        .bind(p.property_type)
        .bind(p.status)
        .bind(&p.address)
        .bind(&p.unit_number)
        .bind(p.floor)
        .bind(p.area)
        .bind(p.bedrooms)
        .bind(p.bathrooms)
        .bind(p.garage_spots)
        .bind(p.price)
        .bind(p.construction_cost)
        .bind(p.start_date)
        .bind(p.expected_completion_date)
        .bind(p.actual_completion_date)
        .bind(p.is_sold)
        .bind(p.sale_date)
        .bind(p.sale_price)
        .bind(p.project_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_PROPERTY))?;
        Ok(property)
    }

    /// Leads, contratos, despesas e notas do imóvel caem em cascata.
    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Mantém `expense.property` dentro de `expense.project` depois de mover o imóvel.
    pub async fn move_expenses<'e, E>(&self, executor: E, property_id: i64, project_id: i64) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE expenses SET project_id = $2, updated_at = NOW() WHERE property_id = $1")
            .bind(property_id)
            .bind(project_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // --- Notas de andamento ---

    pub async fn list_updates<'e, E>(&self, executor: E, property_id: i64, page: Pagination) -> Result<Vec<PropertyUpdate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updates = sqlx::query_as::<_, PropertyUpdate>(
            r#"
            SELECT * FROM property_updates
            WHERE property_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(property_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(updates)
    }

    pub async fn create_update<'e, E>(
        &self,
        executor: E,
        property_id: i64,
        user_id: i64,
        title: &str,
        content: &str,
        status: Option<PropertyStatus>,
    ) -> Result<PropertyUpdate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let update = sqlx::query_as::<_, PropertyUpdate>(
            r#"
            INSERT INTO property_updates (title, content, status, property_id, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(status)
        .bind(property_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(update)
    }
}
