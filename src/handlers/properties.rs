// src/handlers/properties.rs

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
    models::property::{
        CreatePropertyPayload, CreatePropertyUpdatePayload, Property, PropertyUpdate, UpdatePropertyPayload,
    },
};

// GET /properties
#[utoipa::path(
    get,
    path = "/api/v1/properties",
    tag = "Properties",
    params(Pagination),
    responses((status = 200, description = "Imóveis visíveis", body = Vec<Property>)),
    security(("api_jwt" = []))
)]
pub async fn list_properties(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let properties = app_state.property_service.list(&scope, page).await?;
    Ok(Json(properties))
}

// GET /properties/project/{project_id}
#[utoipa::path(
    get,
    path = "/api/v1/properties/project/{project_id}",
    tag = "Properties",
    params(("project_id" = i64, Path, description = "ID da obra"), Pagination),
    responses((status = 200, description = "Imóveis da obra", body = Vec<Property>)),
    security(("api_jwt" = []))
)]
pub async fn list_by_project(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(project_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let properties = app_state.property_service.list_by_project(&scope, project_id, page).await?;
    Ok(Json(properties))
}

// GET /properties/status/{status}
#[utoipa::path(
    get,
    path = "/api/v1/properties/status/{status}",
    tag = "Properties",
    params(("status" = String, Path, description = "planning, foundation, structure, finishing, completed ou sold"), Pagination),
    responses(
        (status = 200, description = "Imóveis no status", body = Vec<Property>),
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
    let properties = app_state.property_service.list_by_status(&scope, &status, page).await?;
    Ok(Json(properties))
}

// POST /properties
#[utoipa::path(
    post,
    path = "/api/v1/properties",
    tag = "Properties",
    request_body = CreatePropertyPayload,
    responses(
        (status = 201, description = "Imóvel criado", body = Property),
        (status = 400, description = "Nome duplicado na obra")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_property(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreatePropertyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let property = app_state.property_service.create(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(property)))
}

// GET /properties/{id}
#[utoipa::path(
    get,
    path = "/api/v1/properties/{id}",
    tag = "Properties",
    params(("id" = i64, Path, description = "ID do imóvel")),
    responses((status = 200, description = "Imóvel", body = Property)),
    security(("api_jwt" = []))
)]
pub async fn get_property(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let property = app_state.property_service.get(&scope, id).await?;
    Ok(Json(property))
}

// PUT /properties/{id}
#[utoipa::path(
    put,
    path = "/api/v1/properties/{id}",
    tag = "Properties",
    params(("id" = i64, Path, description = "ID do imóvel")),
    request_body = UpdatePropertyPayload,
    responses((status = 200, description = "Imóvel atualizado", body = Property)),
    security(("api_jwt" = []))
)]
pub async fn update_property(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePropertyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let property = app_state.property_service.update(&scope, id, payload).await?;
    Ok(Json(property))
}

// DELETE /properties/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/properties/{id}",
    tag = "Properties",
    params(("id" = i64, Path, description = "ID do imóvel")),
    responses((status = 200, description = "Imóvel removido", body = Property)),
    security(("api_jwt" = []))
)]
pub async fn delete_property(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let property = app_state.property_service.delete(&scope, id).await?;
    Ok(Json(property))
}

// GET /properties/{id}/updates
#[utoipa::path(
    get,
    path = "/api/v1/properties/{id}/updates",
    tag = "Properties",
    params(("id" = i64, Path, description = "ID do imóvel"), Pagination),
    responses((status = 200, description = "Notas de andamento", body = Vec<PropertyUpdate>)),
    security(("api_jwt" = []))
)]
pub async fn list_updates(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let updates = app_state.property_service.list_updates(&scope, id, page).await?;
    Ok(Json(updates))
}

// POST /properties/{id}/updates
#[utoipa::path(
    post,
    path = "/api/v1/properties/{id}/updates",
    tag = "Properties",
    params(("id" = i64, Path, description = "ID do imóvel")),
    request_body = CreatePropertyUpdatePayload,
    responses((status = 201, description = "Nota registrada", body = PropertyUpdate)),
    security(("api_jwt" = []))
)]
pub async fn create_update(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<CreatePropertyUpdatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let update = app_state.property_service.create_update(&scope, id, payload).await?;
    Ok((StatusCode::CREATED, Json(update)))
}
