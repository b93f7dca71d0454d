// src/handlers/users.rs

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
    middleware::{auth::AuthenticatedUser, tenancy::TenantScope},
    models::auth::{CreateUserPayload, UpdateMePayload, UpdateUserPayload, User},
};

// GET /users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(Pagination),
    responses((status = 200, description = "Usuários visíveis para o requisitante", body = Vec<User>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.user_service.list(&scope, page).await?;
    Ok(Json(users))
}

// POST /users
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "E-mail/username duplicado ou sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.user_service.create(&scope, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// GET /users/me
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    responses((status = 200, description = "Perfil do usuário logado", body = User)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// PUT /users/me
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    tag = "Users",
    request_body = UpdateMePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = User),
        (status = 400, description = "E-mail/username já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_me(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpdateMePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let updated = app_state
        .user_service
        .update_me(user, UpdateUserPayload::from(payload))
        .await?;
    Ok(Json(updated))
}

// GET /users/{id}
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.get(&scope, id).await?;
    Ok(Json(user))
}

// PUT /users/{id}
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses((status = 200, description = "Usuário atualizado", body = User)),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.user_service.update(&scope, id, payload).await?;
    Ok(Json(user))
}

// DELETE /users/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário removido", body = User),
        (status = 409, description = "Usuário ainda gerencia equipe ou obra")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.delete(&scope, id).await?;
    Ok(Json(user))
}
