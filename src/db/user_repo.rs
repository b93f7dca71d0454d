// src/db/user_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{db_utils::Pagination, error::AppError},
    models::auth::User,
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    /// O login aceita e-mail ou username; pode casar mais de uma linha
    /// (e-mail de um igual ao username de outro), quem chama decide.
    pub async fn find_by_login<'e, E>(&self, executor: E, identifier: &str) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 OR username = $1 LIMIT 2",
        )
        .bind(identifier)
        .fetch_all(executor)
        .await?;
        Ok(users)
    }

    pub async fn email_taken<'e, E>(&self, executor: E, email: &str, except_id: Option<i64>) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn username_taken<'e, E>(&self, executor: E, username: &str, except_id: Option<i64>) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(username)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    /// `company_id = None` lista todos (superusuário).
    pub async fn list<'e, E>(&self, executor: E, company_id: Option<i64>, page: Pagination) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
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
        Ok(users)
    }

    pub async fn list_by_company<'e, E>(&self, executor: E, company_id: i64, page: Pagination) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.list(executor, Some(company_id), page).await
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        email: &str,
        username: &str,
        hashed_password: &str,
        full_name: Option<&str>,
        is_active: bool,
        is_superuser: bool,
        company_id: Option<i64>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, hashed_password, full_name, is_active, is_superuser, company_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(hashed_password)
        .bind(full_name)
        .bind(is_active)
        .bind(is_superuser)
        .bind(company_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return match db_err.constraint() {
                        Some("users_username_key") => AppError::validation(
                            "The user with this username already exists in the system.",
                        ),
                        _ => AppError::validation("The user with this email already exists in the system."),
                    };
                }
            }
            e.into()
        })?;

        Ok(user)
    }

    pub async fn update<'e, E>(&self, executor: E, user: &User) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                email = $2, username = $3, hashed_password = $4, full_name = $5,
                is_active = $6, is_superuser = $7, company_id = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.hashed_password)
        .bind(&user.full_name)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(user.company_id)
        .fetch_one(executor)
        .await?;
        Ok(updated)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Gerentes de equipe ou de obra não podem ser excluídos.
    pub async fn manages_anything<'e, E>(&self, executor: E, id: i64) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let manages: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM teams WHERE manager_id = $1)
                OR EXISTS(SELECT 1 FROM projects WHERE manager_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(manages)
    }
}
