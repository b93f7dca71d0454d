// src/db/project_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        db_utils::{map_unique_violation, Pagination},
        error::AppError,
    },
    models::project::{CreateProjectPayload, CreateTaskPayload, Project, ProjectTask, ProjectUpdate},
};

pub const DUPLICATE_PROJECT: &str = "The project with this name already exists in the company.";

#[derive(Clone, Default)]
pub struct ProjectRepository;

impl ProjectRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  OBRAS
    // =========================================================================

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(project)
    }

    pub async fn name_taken<'e, E>(
        &self,
        executor: E,
        company_id: i64,
        name: &str,
        except_id: Option<i64>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM projects
                WHERE company_id = $1 AND name = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn list<'e, E>(&self, executor: E, company_id: Option<i64>, page: Pagination) -> Result<Vec<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT * FROM projects
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
        Ok(projects)
    }

    pub async fn create<'e, E>(&self, executor: E, p: &CreateProjectPayload) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (
                name, description, address, city, state, zip_code, total_area, budget,
                start_date, expected_end_date, actual_end_date, status, company_id, manager_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.address)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.zip_code)
        .bind(p.total_area)
        .bind(p.budget)
        .bind(p.start_date)
        .bind(p.expected_end_date)
        .bind(p.actual_end_date)
        .bind(p.status)
        .bind(p.company_id)
        .bind(p.manager_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_PROJECT))?;
        Ok(project)
    }

    pub async fn update<'e, E>(&self, executor: E, p: &Project) -> Result<Project, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                name = $2, description = $3, address = $4, city = $5, state = $6,
                zip_code = $7, total_area = $8, budget = $9, start_date = $10,
                expected_end_date = $11, actual_end_date = $12, status = $13,
                company_id = $14, manager_id = $15, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(p.id)
        .bind(&p.name)
        .bind(&p.description)
        .bind(&p.address)
        .bind(&p.city)
        .bind(&p.state)
        .bind(&p.zip_code)
        .bind(p.total_area)
        .bind(p.budget)
        .bind(p.start_date)
        .bind(p.expected_end_date)
        .bind(p.actual_end_date)
        .bind(p.status)
        .bind(p.company_id)
        .bind(p.manager_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_PROJECT))?;
        Ok(project)
    }

    /// Imóveis, tarefas, notas, despesas e vínculos com equipes caem em cascata.
    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  TAREFAS
    // =========================================================================

    pub async fn list_tasks<'e, E>(&self, executor: E, project_id: i64, page: Pagination) -> Result<Vec<ProjectTask>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tasks = sqlx::query_as::<_, ProjectTask>(
            r#"
            SELECT * FROM project_tasks
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
        Ok(tasks)
    }

    pub async fn find_task<'e, E>(&self, executor: E, id: i64) -> Result<Option<ProjectTask>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, ProjectTask>("SELECT * FROM project_tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(task)
    }

    pub async fn create_task<'e, E>(&self, executor: E, project_id: i64, t: &CreateTaskPayload) -> Result<ProjectTask, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, ProjectTask>(
            r#"
            INSERT INTO project_tasks (title, description, start_date, end_date, status, project_id, assignee_id)
            VALUES ($1, $2, $3, $4, COALESCE($5, 'pending'), $6, $7)
            RETURNING *
            "#,
        )
        .bind(&t.title)
        .bind(&t.description)
        .bind(t.start_date)
        .bind(t.end_date)
        .bind(&t.status)
        .bind(project_id)
        .bind(t.assignee_id)
        .fetch_one(executor)
        .await?;
        Ok(task)
    }

    pub async fn update_task<'e, E>(&self, executor: E, t: &ProjectTask) -> Result<ProjectTask, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let task = sqlx::query_as::<_, ProjectTask>(
            r#"
            UPDATE project_tasks SET
                title = $2, description = $3, start_date = $4, end_date = $5,
                status = $6, assignee_id = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(t.id)
        .bind(&t.title)
        .bind(&t.description)
        .bind(t.start_date)
        .bind(t.end_date)
        .bind(&t.status)
        .bind(t.assignee_id)
        .fetch_one(executor)
        .await?;
        Ok(task)
    }

    pub async fn delete_task<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM project_tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  NOTAS DE ANDAMENTO
    // =========================================================================

    pub async fn list_updates<'e, E>(&self, executor: E, project_id: i64, page: Pagination) -> Result<Vec<ProjectUpdate>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updates = sqlx::query_as::<_, ProjectUpdate>(
            r#"
            SELECT * FROM project_updates
            WHERE project_id = $1
            ORDER BY created_at DESC
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(project_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(updates)
    }

    pub async fn create_update<'e, E>(
        &self,
        executor: E,
        project_id: i64,
        user_id: i64,
        title: &str,
        content: &str,
    ) -> Result<ProjectUpdate, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let update = sqlx::query_as::<_, ProjectUpdate>(
            r#"
            INSERT INTO project_updates (title, content, project_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(project_id)
        .bind(user_id)
        .fetch_one(executor)
        .await?;
        Ok(update)
    }
}
