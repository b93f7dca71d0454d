// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::patch::Patch;
use crate::models::ownership::{Owned, Ownership};

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "engenheiro@construtora.com")]
    pub email: String,
    #[schema(example = "engenheiro")]
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub hashed_password: String,

    #[schema(example = "Maria Souza")]
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    #[schema(example = 1)]
    pub company_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for User {
    fn ownership(&self) -> Ownership {
        Ownership::Company(self.company_id)
    }
}

// Formulário OAuth2 do login (username aceita e-mail ou username)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "admin@construtora.com")]
    pub username: String,
    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Token {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: String) -> Self {
        Self { access_token, token_type: "bearer".to_string() }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // ID do usuário como texto
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "engenheiro@construtora.com")]
    pub email: String,
    #[validate(length(min = 3, message = "Username must have at least 3 characters"))]
    #[schema(example = "engenheiro")]
    pub username: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters"))]
    pub password: String,
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub company_id: Option<i64>,
}

fn default_true() -> bool {
    true
}

// Atualização feita por um superusuário
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateUserPayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 3, message = "Username must have at least 3 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 6, message = "Password must have at least 6 characters"))]
    pub password: Option<String>,
    #[schema(value_type = Option<String>)]
    pub full_name: Patch<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    #[schema(value_type = Option<i64>)]
    pub company_id: Patch<i64>,
}

// Atualização do próprio perfil (/users/me)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateMePayload {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 3, message = "Username must have at least 3 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 6, message = "Password must have at least 6 characters"))]
    pub password: Option<String>,
    #[schema(value_type = Option<String>)]
    pub full_name: Patch<String>,
}

impl From<UpdateMePayload> for UpdateUserPayload {
    fn from(me: UpdateMePayload) -> Self {
        UpdateUserPayload {
            email: me.email,
            username: me.username,
            password: me.password,
            full_name: me.full_name,
            ..Default::default()
        }
    }
}
