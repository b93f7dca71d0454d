use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const NOT_ENOUGH_PERMISSIONS: &str = "Not enough permissions";

// Taxonomia de erros da API. Cada variante sabe o seu status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("One or more fields are invalid.")]
    ValidationError(#[from] validator::ValidationErrors),

    // Chave duplicada, empresas diferentes, regra de negócio violada.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    // Exclusão barrada por dependentes.
    #[error("{0}")]
    Conflict(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Inactive user")]
    InactiveUser,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    BadUpload(String),

    #[error("Erro ao ler o upload: {0}")]
    MultipartError(#[from] MultipartError),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de I/O: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// `AppError::not_found("Project")` -> 404 "Project not found".
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(format!("{} not found", entity))
    }

    pub fn forbidden() -> Self {
        AppError::PermissionDenied(NOT_ENOUGH_PERMISSIONS.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::Validation(_)
            | AppError::PermissionDenied(_)
            | AppError::InvalidCredentials
            | AppError::InactiveUser
            | AppError::BadUpload(_)
            | AppError::MultipartError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_)
            | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            // Devolve os detalhes de cada campo inválido.
            AppError::ValidationError(ref errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({ "error": self.to_string(), "details": details })
            }
            AppError::PermissionDenied(_) | AppError::InvalidToken => {
                tracing::warn!("🔒 Acesso negado: {}", self);
                json!({ "error": self.to_string() })
            }
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                // O detalhe vai pro log, o cliente recebe a mensagem genérica.
                tracing::error!("Erro Interno do Servidor: {}", e);
                json!({ "error": "An unexpected error occurred." })
            }
            ref e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_http_status() {
        assert_eq!(AppError::not_found("Project").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::validation("dup").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::forbidden().status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InactiveUser.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(AppError::not_found("Contract").to_string(), "Contract not found");
        assert_eq!(AppError::forbidden().to_string(), "Not enough permissions");
    }

    #[test]
    fn internal_errors_hide_details_from_the_client() {
        let response = AppError::InternalServerError(anyhow::anyhow!("senha do banco")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
