// src/handlers/crm.rs

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
        contract::Contract,
        crm::{Client, CreateClientPayload, CreateLeadPayload, Lead, UpdateClientPayload, UpdateLeadPayload},
    },
};

// =============================================================================
//  ÁREA 1: CLIENTES
// =============================================================================

// GET /clients
#[utoipa::path(
    get,
    path = "/api/v1/clients",
    tag = "Clients",
    params(Pagination),
    responses((status = 200, description = "Clientes visíveis", body = Vec<Client>)),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let clients = app_state.crm_service.list_clients(&scope, page).await?;
    Ok(Json(clients))
}

// POST /clients
#[utoipa::path(
    post,
    path = "/api/v1/clients",
    tag = "Clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Documento já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.crm_service.create_client(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

// GET /clients/{id}
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses((status = 200, description = "Cliente", body = Client)),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.crm_service.get_client(&scope, id).await?;
    Ok(Json(client))
}

// PUT /clients/{id}
#[utoipa::path(
    put,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    params(("id" = i64, Path, description = "ID do cliente")),
    request_body = UpdateClientPayload,
    responses((status = 200, description = "Cliente atualizado", body = Client)),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.crm_service.update_client(&scope, id, payload).await?;
    Ok(Json(client))
}

// DELETE /clients/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/clients/{id}",
    tag = "Clients",
    params(("id" = i64, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente removido", body = Client),
        (status = 409, description = "Cliente ainda tem leads ou contratos")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state.crm_service.delete_client(&scope, id).await?;
    Ok(Json(client))
}

// GET /clients/{id}/leads
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}/leads",
    tag = "Clients",
    params(("id" = i64, Path, description = "ID do cliente"), Pagination),
    responses((status = 200, description = "Leads do cliente", body = Vec<Lead>)),
    security(("api_jwt" = []))
)]
pub async fn list_client_leads(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.crm_service.client_leads(&scope, id, page).await?;
    Ok(Json(leads))
}

// GET /clients/{id}/contracts
#[utoipa::path(
    get,
    path = "/api/v1/clients/{id}/contracts",
    tag = "Clients",
    params(("id" = i64, Path, description = "ID do cliente"), Pagination),
    responses((status = 200, description = "Contratos do cliente", body = Vec<Contract>)),
    security(("api_jwt" = []))
)]
pub async fn list_client_contracts(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let contracts = app_state.crm_service.client_contracts(&scope, id, page).await?;
    Ok(Json(contracts))
}

// =============================================================================
//  ÁREA 2: LEADS
// =============================================================================

// GET /leads
#[utoipa::path(
    get,
    path = "/api/v1/leads",
    tag = "Leads",
    params(Pagination),
    responses((status = 200, description = "Leads visíveis", body = Vec<Lead>)),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.crm_service.list_leads(&scope, page).await?;
    Ok(Json(leads))
}

// GET /leads/property/{property_id}
#[utoipa::path(
    get,
    path = "/api/v1/leads/property/{property_id}",
    tag = "Leads",
    params(("property_id" = i64, Path, description = "ID do imóvel"), Pagination),
    responses((status = 200, description = "Leads do imóvel", body = Vec<Lead>)),
    security(("api_jwt" = []))
)]
pub async fn list_by_property(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(property_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.crm_service.leads_by_property(&scope, property_id, page).await?;
    Ok(Json(leads))
}

// GET /leads/assigned/{user_id}
#[utoipa::path(
    get,
    path = "/api/v1/leads/assigned/{user_id}",
    tag = "Leads",
    params(("user_id" = i64, Path, description = "ID do corretor responsável"), Pagination),
    responses((status = 200, description = "Leads do responsável", body = Vec<Lead>)),
    security(("api_jwt" = []))
)]
pub async fn list_by_assigned(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(user_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.crm_service.leads_by_assigned(&scope, user_id, page).await?;
    Ok(Json(leads))
}

// GET /leads/status/{status}
#[utoipa::path(
    get,
    path = "/api/v1/leads/status/{status}",
    tag = "Leads",
    params(("status" = String, Path, description = "initial_contact, property_visit, negotiation, proposal, contract, closed ou lost"), Pagination),
    responses(
        (status = 200, description = "Leads no status", body = Vec<Lead>),
        (status = 400, description = "Status inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_by_status(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(status): Path<String>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state.crm_service.leads_by_status(&scope, &status, page).await?;
    Ok(Json(leads))
}

// POST /leads
#[utoipa::path(
    post,
    path = "/api/v1/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado (responsável e datas assumem padrões)", body = Lead),
        (status = 400, description = "Cliente e imóvel de empresas diferentes")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state.crm_service.create_lead(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /leads/{id}
#[utoipa::path(
    get,
    path = "/api/v1/leads/{id}",
    tag = "Leads",
    params(("id" = i64, Path, description = "ID do lead")),
    responses((status = 200, description = "Lead", body = Lead)),
    security(("api_jwt" = []))
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.crm_service.get_lead(&scope, id).await?;
    Ok(Json(lead))
}

// PUT /leads/{id}
#[utoipa::path(
    put,
    path = "/api/v1/leads/{id}",
    tag = "Leads",
    params(("id" = i64, Path, description = "ID do lead")),
    request_body = UpdateLeadPayload,
    responses((status = 200, description = "Lead atualizado", body = Lead)),
    security(("api_jwt" = []))
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state.crm_service.update_lead(&scope, id, payload).await?;
    Ok(Json(lead))
}

// DELETE /leads/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/leads/{id}",
    tag = "Leads",
    params(("id" = i64, Path, description = "ID do lead")),
    responses((status = 200, description = "Lead removido", body = Lead)),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state.crm_service.delete_lead(&scope, id).await?;
    Ok(Json(lead))
}
