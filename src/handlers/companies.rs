// src/handlers/companies.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    config::AppState,
    middleware::tenancy::TenantScope,
    models::{
        auth::User,
        company::{Company, CreateCompanyPayload, UpdateCompanyPayload},
    },
};

// GET /companies
#[utoipa::path(
    get,
    path = "/api/v1/companies",
    tag = "Companies",
    params(Pagination),
    responses((status = 200, description = "Empresas visíveis", body = Vec<Company>)),
    security(("api_jwt" = []))
)]
pub async fn list_companies(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let companies = app_state.company_service.list(&scope, page).await?;
    Ok(Json(companies))
}

// POST /companies
#[utoipa::path(
    post,
    path = "/api/v1/companies",
    tag = "Companies",
    request_body = CreateCompanyPayload,
    responses(
        (status = 201, description = "Empresa criada", body = Company),
        (status = 400, description = "Documento duplicado ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_company(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let company = app_state.company_service.create(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

// GET /companies/{id}
#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}",
    tag = "Companies",
    params(("id" = i64, Path, description = "ID da empresa")),
    responses(
        (status = 200, description = "Empresa", body = Company),
        (status = 404, description = "Empresa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_company(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.get(&scope, id).await?;
    Ok(Json(company))
}

// PUT /companies/{id}
#[utoipa::path(
    put,
    path = "/api/v1/companies/{id}",
    tag = "Companies",
    params(("id" = i64, Path, description = "ID da empresa")),
    request_body = UpdateCompanyPayload,
    responses((status = 200, description = "Empresa atualizada", body = Company)),
    security(("api_jwt" = []))
)]
pub async fn update_company(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCompanyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let company = app_state.company_service.update(&scope, id, payload).await?;
    Ok(Json(company))
}

// DELETE /companies/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/companies/{id}",
    tag = "Companies",
    params(("id" = i64, Path, description = "ID da empresa")),
    responses((status = 200, description = "Empresa removida com tudo abaixo dela", body = Company)),
    security(("api_jwt" = []))
)]
pub async fn delete_company(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let company = app_state.company_service.delete(&scope, id).await?;
    Ok(Json(company))
}

// GET /companies/{id}/users
#[utoipa::path(
    get,
    path = "/api/v1/companies/{id}/users",
    tag = "Companies",
    params(("id" = i64, Path, description = "ID da empresa"), Pagination),
    responses((status = 200, description = "Usuários da empresa", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_company_users(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.company_service.list_users(&scope, id, page).await?;
    Ok(Json(users))
}
