// src/services/user_service.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    common::{db_utils::Pagination, error::AppError, patch::Patch},
    db::{CompanyRepository, UserRepository},
    middleware::tenancy::{CompanyFilter, TenantScope},
    models::{
        auth::{CreateUserPayload, UpdateUserPayload, User},
        ownership::TenantRef,
    },
    services::{access::AccessService, auth::hash_password},
};

const DUPLICATE_EMAIL: &str = "The user with this email already exists in the system.";
const DUPLICATE_USERNAME: &str = "The user with this username already exists in the system.";

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    company_repo: CompanyRepository,
    access: AccessService,
    pool: PgPool,
}

impl UserService {
    pub fn new(access: AccessService, pool: PgPool) -> Self {
        Self {
            repo: UserRepository::new(),
            company_repo: CompanyRepository::new(),
            access,
            pool,
        }
    }

    pub async fn list(&self, scope: &TenantScope, page: Pagination) -> Result<Vec<User>, AppError> {
        match scope.company_filter() {
            CompanyFilter::All => self.repo.list(&self.pool, None, page).await,
            CompanyFilter::Company(id) => self.repo.list(&self.pool, Some(id), page).await,
            CompanyFilter::Nothing => Ok(Vec::new()),
        }
    }

    /// O próprio usuário, um superusuário ou alguém da mesma empresa.
    pub async fn get(&self, scope: &TenantScope, id: i64) -> Result<User, AppError> {
        if id != scope.user_id {
            self.access.authorize(&self.pool, scope, TenantRef::User(id)).await?;
        }
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn create(&self, scope: &TenantScope, payload: CreateUserPayload) -> Result<User, AppError> {
        scope.require_superuser()?;

        // Hash fora da transação, não toca no banco
        let hashed = hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        if self.repo.email_taken(&mut *tx, &payload.email, None).await? {
            return Err(AppError::validation(DUPLICATE_EMAIL));
        }
        if self.repo.username_taken(&mut *tx, &payload.username, None).await? {
            return Err(AppError::validation(DUPLICATE_USERNAME));
        }
        if let Some(company_id) = payload.company_id {
            self.company_repo
                .find_by_id(&mut *tx, company_id)
                .await?
                .ok_or_else(|| AppError::not_found("Company"))?;
        }

        let user = self
            .repo
            .create(
                &mut *tx,
                &payload.email,
                &payload.username,
                &hashed,
                payload.full_name.as_deref(),
                payload.is_active,
                payload.is_superuser,
                payload.company_id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("👤 Usuário {} criado ({})", user.id, user.username);
        Ok(user)
    }

    /// PUT /users/me: só os campos de perfil chegam aqui (ver `UpdateMePayload`).
    pub async fn update_me(&self, current: User, payload: UpdateUserPayload) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;
        let updated = self.apply_update(&mut tx, current, payload).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn update(&self, scope: &TenantScope, id: i64, payload: UpdateUserPayload) -> Result<User, AppError> {
        scope.require_superuser()?;

        let mut tx = self.pool.begin().await?;
        let user = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let updated = self.apply_update(&mut tx, user, payload).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn apply_update(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        mut user: User,
        payload: UpdateUserPayload,
    ) -> Result<User, AppError> {
        if let Some(email) = payload.email {
            if email != user.email && self.repo.email_taken(&mut **tx, &email, Some(user.id)).await? {
                return Err(AppError::validation(DUPLICATE_EMAIL));
            }
            user.email = email;
        }
        if let Some(username) = payload.username {
            if username != user.username && self.repo.username_taken(&mut **tx, &username, Some(user.id)).await? {
                return Err(AppError::validation(DUPLICATE_USERNAME));
            }
            user.username = username;
        }
        if let Patch::Value(company_id) = payload.company_id {
            self.company_repo
                .find_by_id(&mut **tx, company_id)
                .await?
                .ok_or_else(|| AppError::not_found("Company"))?;
        }
        let target_company = match payload.company_id {
            Patch::Missing => user.company_id,
            Patch::Null => None,
            Patch::Value(company_id) => Some(company_id),
        };
        if target_company != user.company_id {
            self.access
                .ensure_no_foreign_dependents(&mut **tx, TenantRef::User(user.id), target_company)
                .await?;
        }
        if let Some(password) = payload.password {
            user.hashed_password = hash_password(&password).await?;
        }

        payload.full_name.apply_to(&mut user.full_name);
        payload.company_id.apply_to(&mut user.company_id);
        if let Some(is_active) = payload.is_active {
            user.is_active = is_active;
        }
        if let Some(is_superuser) = payload.is_superuser {
            user.is_superuser = is_superuser;
        }

        self.repo.update(&mut **tx, &user).await
    }

    pub async fn delete(&self, scope: &TenantScope, id: i64) -> Result<User, AppError> {
        scope.require_superuser()?;
        if id == scope.user_id {
            return Err(AppError::validation("Users cannot delete themselves"));
        }

        let mut tx = self.pool.begin().await?;

        let user = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if self.repo.manages_anything(&mut *tx, id).await? {
            return Err(AppError::Conflict(
                "User manages a team or project; assign another manager before deleting".to_string(),
            ));
        }

        self.repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Usuário {} excluído", id);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{self, TwoCompanies};
    use serde_json::json;

    fn move_to(company_id: Option<i64>) -> UpdateUserPayload {
        serde_json::from_value(json!({ "company_id": company_id })).unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn manager_cannot_leave_for_another_company(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let svc = UserService::new(fixtures::access(), pool.clone());

        let err = svc
            .update(&fixtures::superuser(w.root), w.manager_a, move_to(Some(w.company_b)))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "User cannot change company while it has managed projects linked to another company"
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn team_member_cannot_drop_company(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let engineer = fixtures::user(&pool, "engenheira", Some(w.company_a), false).await;
        let team = fixtures::team(&pool, w.company_a, w.manager_a, "Estrutura").await;
        fixtures::member_of(&pool, team, engineer).await;
        let svc = UserService::new(fixtures::access(), pool.clone());

        let err = svc.update(&fixtures::superuser(w.root), engineer, move_to(None)).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("team memberships"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn user_without_ties_changes_company(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let intern = fixtures::user(&pool, "estagiario", Some(w.company_a), false).await;
        let svc = UserService::new(fixtures::access(), pool.clone());

        let moved = svc
            .update(&fixtures::superuser(w.root), intern, move_to(Some(w.company_b)))
            .await
            .unwrap();

        assert_eq!(moved.company_id, Some(w.company_b));
    }
}
