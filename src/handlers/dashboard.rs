// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantScope,
    models::{
        dashboard::{DashboardSummary, RecentActivities},
        project::Project,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct LimitQuery {
    /// Quantidade máxima de itens por lista
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contagens por status e despesas por categoria", body = DashboardSummary),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.dashboard_service.get_summary(&scope).await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/recent_activities",
    tag = "Dashboard",
    params(LimitQuery),
    responses((status = 200, description = "Leads, contratos e despesas mais recentes", body = RecentActivities)),
    security(("api_jwt" = []))
)]
pub async fn get_recent_activities(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let activities = app_state.dashboard_service.recent_activities(&scope, query.limit).await?;
    Ok(Json(activities))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/active_projects",
    tag = "Dashboard",
    params(LimitQuery),
    responses((status = 200, description = "Obras em andamento, mais recentes primeiro", body = Vec<Project>)),
    security(("api_jwt" = []))
)]
pub async fn get_active_projects(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state.dashboard_service.active_projects(&scope, query.limit).await?;
    Ok(Json(projects))
}
