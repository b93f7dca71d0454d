// src/services/fixtures.rs
//
// Dados de teste para os serviços. Cada teste roda num banco novo criado
// pelo `#[sqlx::test]`, então os ids começam do zero.

use sqlx::PgPool;

use crate::{
    middleware::tenancy::TenantScope,
    services::{access::AccessService, storage::StorageService},
};

pub fn superuser(user_id: i64) -> TenantScope {
    TenantScope { user_id, company_id: None, is_superuser: true }
}

pub fn member(user_id: i64, company_id: i64) -> TenantScope {
    TenantScope { user_id, company_id: Some(company_id), is_superuser: false }
}

pub fn access() -> AccessService {
    AccessService::default()
}

pub fn storage() -> StorageService {
    StorageService::new(std::env::temp_dir().join("construtora-testes"))
}

pub async fn company(pool: &PgPool, document: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO companies (name, document) VALUES ($1, $1) RETURNING id")
        .bind(document)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn user(pool: &PgPool, username: &str, company_id: Option<i64>, is_superuser: bool) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO users (email, username, hashed_password, company_id, is_superuser)
        VALUES ($1 || '@example.com', $1, 'x', $2, $3)
        RETURNING id
        "#,
    )
    .bind(username)
    .bind(company_id)
    .bind(is_superuser)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn team(pool: &PgPool, company_id: i64, manager_id: i64, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO teams (name, company_id, manager_id) VALUES ($1, $2, $3) RETURNING id")
        .bind(name)
        .bind(company_id)
        .bind(manager_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn member_of(pool: &PgPool, team_id: i64, user_id: i64) {
    sqlx::query("INSERT INTO user_teams (team_id, user_id, role) VALUES ($1, $2, 'engineer')")
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn project(pool: &PgPool, company_id: i64, manager_id: i64, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO projects (name, company_id, manager_id) VALUES ($1, $2, $3) RETURNING id")
        .bind(name)
        .bind(company_id)
        .bind(manager_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn assign(pool: &PgPool, team_id: i64, project_id: i64) {
    sqlx::query("INSERT INTO team_projects (team_id, project_id) VALUES ($1, $2)")
        .bind(team_id)
        .bind(project_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn property(pool: &PgPool, project_id: i64, name: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO properties (name, type, project_id) VALUES ($1, 'apartment', $2) RETURNING id")
        .bind(name)
        .bind(project_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn client(pool: &PgPool, company_id: i64, document: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO clients (name, client_type, document, company_id) VALUES ($1, 'individual', $1, $2) RETURNING id",
    )
    .bind(document)
    .bind(company_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn lead(pool: &PgPool, property_id: i64, client_id: i64) -> i64 {
    sqlx::query_scalar("INSERT INTO leads (property_id, client_id) VALUES ($1, $2) RETURNING id")
        .bind(property_id)
        .bind(client_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn contract(pool: &PgPool, number: &str, client_id: i64, property_id: i64) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO contracts (contract_number, type, client_id, property_id, signing_date, contract_value)
        VALUES ($1, 'sale', $2, $3, DATE '2025-05-01', 350000)
        RETURNING id
        "#,
    )
    .bind(number)
    .bind(client_id)
    .bind(property_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn expense(pool: &PgPool, project_id: i64, property_id: Option<i64>) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO expenses (description, category, amount, date, project_id, property_id)
        VALUES ('Cimento', 'materials', 1200, DATE '2025-05-01', $1, $2)
        RETURNING id
        "#,
    )
    .bind(project_id)
    .bind(property_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Duas construtoras, cada uma com gerente, obra e imóvel.
pub struct TwoCompanies {
    pub root: i64,
    pub company_a: i64,
    pub company_b: i64,
    pub manager_a: i64,
    pub manager_b: i64,
    pub project_a: i64,
    pub project_b: i64,
    pub property_a: i64,
    pub property_b: i64,
}

impl TwoCompanies {
    pub async fn seed(pool: &PgPool) -> Self {
        let root = user(pool, "root", None, true).await;
        let company_a = company(pool, "11.111.111/0001-11").await;
        let company_b = company(pool, "22.222.222/0001-22").await;
        let manager_a = user(pool, "gerente_a", Some(company_a), false).await;
        let manager_b = user(pool, "gerente_b", Some(company_b), false).await;
        let project_a = project(pool, company_a, manager_a, "Residencial Aurora").await;
        let project_b = project(pool, company_b, manager_b, "Edifício Horizonte").await;
        let property_a = property(pool, project_a, "Apto 101").await;
        let property_b = property(pool, project_b, "Sala 3").await;
        Self {
            root,
            company_a,
            company_b,
            manager_a,
            manager_b,
            project_a,
            project_b,
            property_a,
            property_b,
        }
    }
}
