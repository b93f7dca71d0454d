// src/handlers/expenses.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    config::AppState,
    handlers::documents::read_upload,
    middleware::tenancy::TenantScope,
    models::finance::{CreateExpensePayload, Expense, ExpenseSummary, ReceiptUploadForm, UpdateExpensePayload},
};

// GET /expenses
#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    tag = "Expenses",
    params(Pagination),
    responses((status = 200, description = "Despesas visíveis (mais recentes primeiro)", body = Vec<Expense>)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state.finance_service.list(&scope, page).await?;
    Ok(Json(expenses))
}

// GET /expenses/project/{project_id}
#[utoipa::path(
    get,
    path = "/api/v1/expenses/project/{project_id}",
    tag = "Expenses",
    params(("project_id" = i64, Path, description = "ID da obra"), Pagination),
    responses((status = 200, description = "Despesas da obra", body = Vec<Expense>)),
    security(("api_jwt" = []))
)]
pub async fn list_by_project(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(project_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state.finance_service.list_by_project(&scope, project_id, page).await?;
    Ok(Json(expenses))
}

// GET /expenses/project/{project_id}/summary
#[utoipa::path(
    get,
    path = "/api/v1/expenses/project/{project_id}/summary",
    tag = "Expenses",
    params(("project_id" = i64, Path, description = "ID da obra")),
    responses((status = 200, description = "Total e soma por categoria", body = ExpenseSummary)),
    security(("api_jwt" = []))
)]
pub async fn project_summary(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(project_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.finance_service.project_summary(&scope, project_id).await?;
    Ok(Json(summary))
}

// GET /expenses/property/{property_id}
#[utoipa::path(
    get,
    path = "/api/v1/expenses/property/{property_id}",
    tag = "Expenses",
    params(("property_id" = i64, Path, description = "ID do imóvel"), Pagination),
    responses((status = 200, description = "Despesas do imóvel", body = Vec<Expense>)),
    security(("api_jwt" = []))
)]
pub async fn list_by_property(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(property_id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let expenses = app_state.finance_service.list_by_property(&scope, property_id, page).await?;
    Ok(Json(expenses))
}

// POST /expenses
#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    tag = "Expenses",
    request_body = CreateExpensePayload,
    responses(
        (status = 201, description = "Despesa lançada", body = Expense),
        (status = 400, description = "Imóvel fora da obra informada")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let expense = app_state.finance_service.create(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

// GET /expenses/{id}
#[utoipa::path(
    get,
    path = "/api/v1/expenses/{id}",
    tag = "Expenses",
    params(("id" = i64, Path, description = "ID da despesa")),
    responses((status = 200, description = "Despesa", body = Expense)),
    security(("api_jwt" = []))
)]
pub async fn get_expense(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.finance_service.get(&scope, id).await?;
    Ok(Json(expense))
}

// PUT /expenses/{id}
#[utoipa::path(
    put,
    path = "/api/v1/expenses/{id}",
    tag = "Expenses",
    params(("id" = i64, Path, description = "ID da despesa")),
    request_body = UpdateExpensePayload,
    responses((status = 200, description = "Despesa atualizada", body = Expense)),
    security(("api_jwt" = []))
)]
pub async fn update_expense(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let expense = app_state.finance_service.update(&scope, id, payload).await?;
    Ok(Json(expense))
}

// DELETE /expenses/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/expenses/{id}",
    tag = "Expenses",
    params(("id" = i64, Path, description = "ID da despesa")),
    responses((status = 200, description = "Despesa removida", body = Expense)),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let expense = app_state.finance_service.delete(&scope, id).await?;
    Ok(Json(expense))
}

// PUT /expenses/{id}/receipt
#[utoipa::path(
    put,
    path = "/api/v1/expenses/{id}/receipt",
    tag = "Expenses",
    params(("id" = i64, Path, description = "ID da despesa")),
    request_body(content = ReceiptUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Recibo substituído", body = Expense),
        (status = 400, description = "Upload sem arquivo")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_receipt(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (description, file) = read_upload(multipart).await?;

    let expense = app_state.finance_service.upload_receipt(&scope, id, description, file).await?;
    Ok(Json(expense))
}
