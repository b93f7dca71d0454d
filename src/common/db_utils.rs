use serde::Deserialize;
use utoipa::IntoParams;

use crate::common::error::AppError;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

// ---
// Paginação padrão das listagens (?skip=0&limit=100)
// ---
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct Pagination {
    /// Quantos registros pular
    #[serde(default)]
    pub skip: i64,
    /// Máximo de registros retornados (até 1000)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_LIMIT }
    }
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        self.skip.max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.clamp(0, MAX_LIMIT)
    }
}

/// Converte violação de UNIQUE em erro de validação com a mensagem dada.
/// Serve de rede de segurança para as checagens feitas antes do INSERT.
pub fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::Validation(message.to_string());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!((p.offset(), p.limit()), (0, 100));

        let p = Pagination { skip: -5, limit: 50_000 };
        assert_eq!((p.offset(), p.limit()), (0, 1000));
    }

    #[test]
    fn non_unique_errors_pass_through() {
        let err = map_unique_violation(sqlx::Error::RowNotFound, "dup");
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
