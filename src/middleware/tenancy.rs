// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::auth::User};

/// Escopo de tenant da requisição, derivado do usuário autenticado.
///
/// É o contexto explícito que toda checagem de autorização recebe:
/// superusuário enxerga tudo, usuário comum só a própria empresa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    pub user_id: i64,
    pub company_id: Option<i64>,
    pub is_superuser: bool,
}

/// Filtro de empresa aplicado nas listagens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyFilter {
    /// Superusuário: sem filtro.
    All,
    Company(i64),
    /// Usuário comum sem empresa: não enxerga nada.
    Nothing,
}

impl CompanyFilter {
    /// Valor para `($1::BIGINT IS NULL OR company_id = $1)`.
    pub fn bind_value(&self) -> Option<i64> {
        match self {
            CompanyFilter::Company(id) => Some(*id),
            CompanyFilter::All | CompanyFilter::Nothing => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, CompanyFilter::Nothing)
    }
}

impl TenantScope {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            company_id: user.company_id,
            is_superuser: user.is_superuser,
        }
    }

    pub fn can_access(&self, company_id: Option<i64>) -> bool {
        if self.is_superuser {
            return true;
        }
        matches!((self.company_id, company_id), (Some(mine), Some(theirs)) if mine == theirs)
    }

    /// ALLOW/DENY para um registro já resolvido até a empresa.
    pub fn check(&self, company_id: Option<i64>) -> Result<(), AppError> {
        if self.can_access(company_id) {
            Ok(())
        } else {
            tracing::warn!(
                "🚫 Usuário {} (empresa {:?}) tentou acessar dados da empresa {:?}",
                self.user_id,
                self.company_id,
                company_id
            );
            Err(AppError::forbidden())
        }
    }

    pub fn require_superuser(&self) -> Result<(), AppError> {
        if self.is_superuser {
            Ok(())
        } else {
            tracing::warn!("🚫 Usuário {} tentou uma operação de superusuário", self.user_id);
            Err(AppError::forbidden())
        }
    }

    pub fn company_filter(&self) -> CompanyFilter {
        match (self.is_superuser, self.company_id) {
            (true, _) => CompanyFilter::All,
            (false, Some(id)) => CompanyFilter::Company(id),
            (false, None) => CompanyFilter::Nothing,
        }
    }
}

// Extrator: lê o usuário que o auth_guard colocou nas extensions.
impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .map(TenantScope::from_user)
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular(company_id: Option<i64>) -> TenantScope {
        TenantScope { user_id: 10, company_id, is_superuser: false }
    }

    fn superuser() -> TenantScope {
        TenantScope { user_id: 1, company_id: None, is_superuser: true }
    }

    #[test]
    fn superuser_is_always_allowed() {
        let s = superuser();
        assert!(s.check(Some(1)).is_ok());
        assert!(s.check(Some(2)).is_ok());
        assert!(s.check(None).is_ok());
        assert!(s.require_superuser().is_ok());
    }

    #[test]
    fn regular_user_is_confined_to_own_company() {
        let s = regular(Some(1));
        assert!(s.check(Some(1)).is_ok());

        let err = s.check(Some(2)).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(ref m) if m == "Not enough permissions"));
        assert!(s.check(None).is_err());
        assert!(s.require_superuser().is_err());
    }

    #[test]
    fn companyless_regular_user_sees_nothing() {
        let s = regular(None);
        assert!(s.check(None).is_err());
        assert!(s.check(Some(1)).is_err());
        assert_eq!(s.company_filter(), CompanyFilter::Nothing);
        assert!(s.company_filter().is_nothing());
    }

    #[test]
    fn listing_filters_follow_the_scope() {
        assert_eq!(superuser().company_filter(), CompanyFilter::All);
        assert_eq!(superuser().company_filter().bind_value(), None);
        assert_eq!(regular(Some(7)).company_filter(), CompanyFilter::Company(7));
        assert_eq!(regular(Some(7)).company_filter().bind_value(), Some(7));
    }
}
