// src/handlers/auth.rs

use axum::{extract::State, Form, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{LoginForm, Token, User},
};

// POST /login/access-token
#[utoipa::path(
    post,
    path = "/api/v1/login/access-token",
    tag = "Auth",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token de acesso", body = Token),
        (status = 400, description = "Credenciais incorretas ou usuário inativo")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<Token>, AppError> {
    form.validate()?;

    let token = app_state.auth_service.login(&form.username, &form.password).await?;
    Ok(Json(token))
}

// POST /login/test-token
#[utoipa::path(
    post,
    path = "/api/v1/login/test-token",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário dono do token", body = User),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn test_token(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}
