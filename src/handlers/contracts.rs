// src/handlers/contracts.rs

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
    models::contract::{Contract, CreateContractPayload, UpdateContractPayload},
};

// GET /contracts
#[utoipa::path(
    get,
    path = "/api/v1/contracts",
    tag = "Contracts",
    params(Pagination),
    responses((status = 200, description = "Contratos visíveis", body = Vec<Contract>)),
    security(("api_jwt" = []))
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let contracts = app_state.contract_service.list(&scope, page).await?;
    Ok(Json(contracts))
}

// GET /contracts/property/{property_id}
#[utoipa::path(
    get,
    path = "/api/v1/contracts/property/{property_id}",
    tag = "Contracts",
    params(("property_id" = i64, Path, description = "ID do imóvel"), Pagination),
    responses((status = 200, description = "Contratos do imóvel", body = Vec<Contract>)),
    security(("api_jwt" = []))
)]
pub async fn list_by_property(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(property_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let contracts = app_state.contract_service.list_by_property(&scope, property_id, page).await?;
    Ok(Json(contracts))
}

// POST /contracts
#[utoipa::path(
    post,
    path = "/api/v1/contracts",
    tag = "Contracts",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato criado", body = Contract),
        (status = 400, description = "Número duplicado ou cliente de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let contract = app_state.contract_service.create(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

// GET /contracts/{id}
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}",
    tag = "Contracts",
    params(("id" = i64, Path, description = "ID do contrato")),
    responses((status = 200, description = "Contrato", body = Contract)),
    security(("api_jwt" = []))
)]
pub async fn get_contract(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state.contract_service.get(&scope, id).await?;
    Ok(Json(contract))
}

// PUT /contracts/{id}
#[utoipa::path(
    put,
    path = "/api/v1/contracts/{id}",
    tag = "Contracts",
    params(("id" = i64, Path, description = "ID do contrato")),
    request_body = UpdateContractPayload,
    responses((status = 200, description = "Contrato atualizado", body = Contract)),
    security(("api_jwt" = []))
)]
pub async fn update_contract(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let contract = app_state.contract_service.update(&scope, id, payload).await?;
    Ok(Json(contract))
}

// DELETE /contracts/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/contracts/{id}",
    tag = "Contracts",
    params(("id" = i64, Path, description = "ID do contrato")),
    responses((status = 200, description = "Contrato removido com seus anexos", body = Contract)),
    security(("api_jwt" = []))
)]
pub async fn delete_contract(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state.contract_service.delete(&scope, id).await?;
    Ok(Json(contract))
}
