// src/handlers/teams.rs

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
        project::Project,
        team::{AddMemberPayload, CreateTeamPayload, Team, TeamMember, UpdateMemberPayload, UpdateTeamPayload},
    },
};

// =============================================================================
//  EQUIPES
// =============================================================================

// GET /teams
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    tag = "Teams",
    params(Pagination),
    responses((status = 200, description = "Equipes visíveis", body = Vec<Team>)),
    security(("api_jwt" = []))
)]
pub async fn list_teams(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let teams = app_state.team_service.list(&scope, page).await?;
    Ok(Json(teams))
}

// POST /teams
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    tag = "Teams",
    request_body = CreateTeamPayload,
    responses(
        (status = 201, description = "Equipe criada", body = Team),
        (status = 400, description = "Nome duplicado ou gerente de outra empresa"),
        (status = 404, description = "Gerente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_team(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateTeamPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let team = app_state.team_service.create(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

// GET /teams/{id}
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}",
    tag = "Teams",
    params(("id" = i64, Path, description = "ID da equipe")),
    responses((status = 200, description = "Equipe", body = Team)),
    security(("api_jwt" = []))
)]
pub async fn get_team(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let team = app_state.team_service.get(&scope, id).await?;
    Ok(Json(team))
}

// PUT /teams/{id}
#[utoipa::path(
    put,
    path = "/api/v1/teams/{id}",
    tag = "Teams",
    params(("id" = i64, Path, description = "ID da equipe")),
    request_body = UpdateTeamPayload,
    responses((status = 200, description = "Equipe atualizada", body = Team)),
    security(("api_jwt" = []))
)]
pub async fn update_team(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTeamPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let team = app_state.team_service.update(&scope, id, payload).await?;
    Ok(Json(team))
}

// DELETE /teams/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{id}",
    tag = "Teams",
    params(("id" = i64, Path, description = "ID da equipe")),
    responses((status = 200, description = "Equipe removida (membros e alocações em cascata)", body = Team)),
    security(("api_jwt" = []))
)]
pub async fn delete_team(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let team = app_state.team_service.delete(&scope, id).await?;
    Ok(Json(team))
}

// =============================================================================
//  MEMBROS
// =============================================================================

// GET /teams/{id}/members
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/members",
    tag = "Teams",
    params(("id" = i64, Path, description = "ID da equipe")),
    responses((status = 200, description = "Membros da equipe", body = Vec<TeamMember>)),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let members = app_state.team_service.list_members(&scope, id).await?;
    Ok(Json(members))
}

// POST /teams/{id}/members
#[utoipa::path(
    post,
    path = "/api/v1/teams/{id}/members",
    tag = "Teams",
    params(("id" = i64, Path, description = "ID da equipe")),
    request_body = AddMemberPayload,
    responses(
        (status = 201, description = "Membro adicionado", body = TeamMember),
        (status = 400, description = "Já é membro ou é de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_member(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let member = app_state.team_service.add_member(&scope, id, payload).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

// PUT /teams/{id}/members/{user_id}
#[utoipa::path(
    put,
    path = "/api/v1/teams/{id}/members/{user_id}",
    tag = "Teams",
    params(
        ("id" = i64, Path, description = "ID da equipe"),
        ("user_id" = i64, Path, description = "ID do usuário membro")
    ),
    request_body = UpdateMemberPayload,
    responses((status = 200, description = "Função atualizada", body = TeamMember)),
    security(("api_jwt" = []))
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path((id, user_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let member = app_state.team_service.update_member(&scope, id, user_id, payload).await?;
    Ok(Json(member))
}

// DELETE /teams/{id}/members/{user_id}
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{id}/members/{user_id}",
    tag = "Teams",
    params(
        ("id" = i64, Path, description = "ID da equipe"),
        ("user_id" = i64, Path, description = "ID do usuário membro")
    ),
    responses(
        (status = 200, description = "Membro removido", body = TeamMember),
        (status = 400, description = "O gerente não pode sair da equipe")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path((id, user_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state.team_service.remove_member(&scope, id, user_id).await?;
    Ok(Json(member))
}

// GET /teams/{id}/projects
#[utoipa::path(
    get,
    path = "/api/v1/teams/{id}/projects",
    tag = "Teams",
    params(("id" = i64, Path, description = "ID da equipe")),
    responses((status = 200, description = "Obras em que a equipe está alocada", body = Vec<Project>)),
    security(("api_jwt" = []))
)]
pub async fn list_team_projects(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state.team_service.list_projects(&scope, id).await?;
    Ok(Json(projects))
}
