// src/handlers/projects.rs

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
        project::{
            CreateProjectPayload, CreateProjectUpdatePayload, CreateTaskPayload, Project, ProjectTask,
            ProjectUpdate, UpdateProjectPayload, UpdateTaskPayload,
        },
        team::{AssignTeamPayload, Team, TeamProject},
    },
};

// =============================================================================
//  ÁREA 1: OBRAS
// =============================================================================

// GET /projects
#[utoipa::path(
    get,
    path = "/api/v1/projects",
    tag = "Projects",
    params(Pagination),
    responses((status = 200, description = "Obras visíveis", body = Vec<Project>)),
    security(("api_jwt" = []))
)]
pub async fn list_projects(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let projects = app_state.project_service.list(&scope, page).await?;
    Ok(Json(projects))
}

// POST /projects
#[utoipa::path(
    post,
    path = "/api/v1/projects",
    tag = "Projects",
    request_body = CreateProjectPayload,
    responses(
        (status = 201, description = "Obra criada", body = Project),
        (status = 400, description = "Nome duplicado ou gerente de outra empresa"),
        (status = 404, description = "Gerente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_project(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let project = app_state.project_service.create(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

// GET /projects/{id}
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = i64, Path, description = "ID da obra")),
    responses(
        (status = 200, description = "Obra", body = Project),
        (status = 400, description = "Obra de outra empresa"),
        (status = 404, description = "Obra não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state.project_service.get(&scope, id).await?;
    Ok(Json(project))
}

// PUT /projects/{id}
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = i64, Path, description = "ID da obra")),
    request_body = UpdateProjectPayload,
    responses((status = 200, description = "Obra atualizada", body = Project)),
    security(("api_jwt" = []))
)]
pub async fn update_project(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProjectPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let project = app_state.project_service.update(&scope, id, payload).await?;
    Ok(Json(project))
}

// DELETE /projects/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    tag = "Projects",
    params(("id" = i64, Path, description = "ID da obra")),
    responses((status = 200, description = "Obra removida em cascata", body = Project)),
    security(("api_jwt" = []))
)]
pub async fn delete_project(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let project = app_state.project_service.delete(&scope, id).await?;
    Ok(Json(project))
}

// =============================================================================
//  ÁREA 2: EQUIPES DA OBRA
// =============================================================================

// GET /projects/{id}/teams
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/teams",
    tag = "Projects",
    params(("id" = i64, Path, description = "ID da obra")),
    responses((status = 200, description = "Equipes alocadas", body = Vec<Team>)),
    security(("api_jwt" = []))
)]
pub async fn list_project_teams(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let teams = app_state.project_service.list_teams(&scope, id).await?;
    Ok(Json(teams))
}

// POST /projects/{id}/teams
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/teams",
    tag = "Projects",
    params(("id" = i64, Path, description = "ID da obra")),
    request_body = AssignTeamPayload,
    responses(
        (status = 201, description = "Equipe alocada", body = TeamProject),
        (status = 400, description = "Equipe já alocada ou de outra empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_team(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<AssignTeamPayload>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state.project_service.assign_team(&scope, id, payload).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

// DELETE /projects/{id}/teams/{team_id}
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/teams/{team_id}",
    tag = "Projects",
    params(
        ("id" = i64, Path, description = "ID da obra"),
        ("team_id" = i64, Path, description = "ID da equipe")
    ),
    responses(
        (status = 200, description = "Alocação removida", body = TeamProject),
        (status = 404, description = "Equipe não alocada nesta obra")
    ),
    security(("api_jwt" = []))
)]
pub async fn unassign_team(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path((id, team_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let assignment = app_state.project_service.unassign_team(&scope, id, team_id).await?;
    Ok(Json(assignment))
}

// =============================================================================
//  ÁREA 3: TAREFAS
// =============================================================================

// GET /projects/{id}/tasks
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/tasks",
    tag = "Projects",
    params(("id" = i64, Path, description = "ID da obra"), Pagination),
    responses((status = 200, description = "Tarefas da obra", body = Vec<ProjectTask>)),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let tasks = app_state.project_service.list_tasks(&scope, id, page).await?;
    Ok(Json(tasks))
}

// POST /projects/{id}/tasks
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/tasks",
    tag = "Projects",
    params(("id" = i64, Path, description = "ID da obra")),
    request_body = CreateTaskPayload,
    responses((status = 201, description = "Tarefa criada", body = ProjectTask)),
    security(("api_jwt" = []))
)]
pub async fn create_task(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<CreateTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let task = app_state.project_service.create_task(&scope, id, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

// PUT /projects/{id}/tasks/{task_id}
#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}/tasks/{task_id}",
    tag = "Projects",
    params(
        ("id" = i64, Path, description = "ID da obra"),
        ("task_id" = i64, Path, description = "ID da tarefa")
    ),
    request_body = UpdateTaskPayload,
    responses((status = 200, description = "Tarefa atualizada", body = ProjectTask)),
    security(("api_jwt" = []))
)]
pub async fn update_task(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path((id, task_id)): Path<(i64, i64)>,
    Json(payload): Json<UpdateTaskPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let task = app_state.project_service.update_task(&scope, id, task_id, payload).await?;
    Ok(Json(task))
}

// DELETE /projects/{id}/tasks/{task_id}
#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/tasks/{task_id}",
    tag = "Projects",
    params(
        ("id" = i64, Path, description = "ID da obra"),
        ("task_id" = i64, Path, description = "ID da tarefa")
    ),
    responses((status = 200, description = "Tarefa removida", body = ProjectTask)),
    security(("api_jwt" = []))
)]
pub async fn delete_task(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path((id, task_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let task = app_state.project_service.delete_task(&scope, id, task_id).await?;
    Ok(Json(task))
}

// =============================================================================
//  ÁREA 4: NOTAS DE ANDAMENTO
// =============================================================================

// GET /projects/{id}/updates
#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/updates",
    tag = "Projects",
    params(("id" = i64, Path, description = "ID da obra"), Pagination),
    responses((status = 200, description = "Notas de andamento", body = Vec<ProjectUpdate>)),
    security(("api_jwt" = []))
)]
pub async fn list_updates(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let updates = app_state.project_service.list_updates(&scope, id, page).await?;
    Ok(Json(updates))
}

// POST /projects/{id}/updates
#[utoipa::path(
    post,
    path = "/api/v1/projects/{id}/updates",
    tag = "Projects",
    params(("id" = i64, Path, description = "ID da obra")),
    request_body = CreateProjectUpdatePayload,
    responses((status = 201, description = "Nota registrada", body = ProjectUpdate)),
    security(("api_jwt" = []))
)]
pub async fn create_update(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<CreateProjectUpdatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let update = app_state.project_service.create_update(&scope, id, payload).await?;
    Ok((StatusCode::CREATED, Json(update)))
}
