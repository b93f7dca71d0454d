// src/services/company_service.rs

use sqlx::PgPool;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{company_repo::DUPLICATE_COMPANY, AttachmentRepository, CompanyRepository, UserRepository},
    middleware::tenancy::{CompanyFilter, TenantScope},
    models::{
        auth::User,
        company::{Company, CreateCompanyPayload, UpdateCompanyPayload},
        ownership::TenantRef,
    },
    services::{access::AccessService, storage::StorageService},
};

#[derive(Clone)]
pub struct CompanyService {
    repo: CompanyRepository,
    user_repo: UserRepository,
    attachments: AttachmentRepository,
    access: AccessService,
    storage: StorageService,
    pool: PgPool,
}

impl CompanyService {
    pub fn new(access: AccessService, storage: StorageService, pool: PgPool) -> Self {
        Self {
            repo: CompanyRepository::new(),
            user_repo: UserRepository::new(),
            attachments: AttachmentRepository::new(),
            access,
            storage,
            pool,
        }
    }

    pub async fn list(&self, scope: &TenantScope, page: Pagination) -> Result<Vec<Company>, AppError> {
        match scope.company_filter() {
            CompanyFilter::All => self.repo.list(&self.pool, None, page).await,
            CompanyFilter::Company(id) => self.repo.list(&self.pool, Some(id), page).await,
            CompanyFilter::Nothing => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, scope: &TenantScope, id: i64) -> Result<Company, AppError> {
        self.access.authorize(&self.pool, scope, TenantRef::Company(id)).await?;
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Company"))
    }

    pub async fn create(&self, scope: &TenantScope, payload: CreateCompanyPayload) -> Result<Company, AppError> {
        scope.require_superuser()?;

        let mut tx = self.pool.begin().await?;

        if self.repo.document_taken(&mut *tx, &payload.document, None).await? {
            return Err(AppError::validation(DUPLICATE_COMPANY));
        }
        let company = self.repo.create(&mut *tx, &payload).await?;

        tx.commit().await?;

        tracing::info!("🏢 Empresa {} criada: {}", company.id, company.name);
        Ok(company)
    }

    pub async fn update(&self, scope: &TenantScope, id: i64, payload: UpdateCompanyPayload) -> Result<Company, AppError> {
        scope.require_superuser()?;

        let mut tx = self.pool.begin().await?;

        let mut company = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Company"))?;

        if let Some(document) = payload.document.as_deref() {
            if document != company.document && self.repo.document_taken(&mut *tx, document, Some(id)).await? {
                return Err(AppError::validation(DUPLICATE_COMPANY));
            }
        }

        payload.apply(&mut company);
        let updated = self.repo.update(&mut *tx, &company).await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Cascata no banco; arquivos de contratos e recibos são apagados depois do commit.
    pub async fn delete(&self, scope: &TenantScope, id: i64) -> Result<Company, AppError> {
        scope.require_superuser()?;

        let mut tx = self.pool.begin().await?;

        let company = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Company"))?;

        let files = self.attachments.stored_paths(&mut *tx, TenantRef::Company(id)).await?;
        self.repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        self.storage.remove_all_best_effort(&files).await;
        tracing::info!("🗑️ Empresa {} excluída ({} arquivos)", id, files.len());
        Ok(company)
    }

    pub async fn list_users(&self, scope: &TenantScope, id: i64, page: Pagination) -> Result<Vec<User>, AppError> {
        self.access.authorize(&self.pool, scope, TenantRef::Company(id)).await?;
        self.user_repo.list_by_company(&self.pool, id, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{self, TwoCompanies};

    #[sqlx::test(migrations = "./migrations")]
    async fn delete_clears_sales_and_leaves_other_company_intact(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let client_a = fixtures::client(&pool, w.company_a, "111.111.111-11").await;
        fixtures::lead(&pool, w.property_a, client_a).await;
        fixtures::contract(&pool, "CV-1", client_a, w.property_a).await;
        fixtures::expense(&pool, w.project_a, Some(w.property_a)).await;
        let team_a = fixtures::team(&pool, w.company_a, w.manager_a, "Acabamento").await;
        fixtures::assign(&pool, team_a, w.project_a).await;
        let client_b = fixtures::client(&pool, w.company_b, "222.222.222-22").await;
        fixtures::lead(&pool, w.property_b, client_b).await;

        let svc = CompanyService::new(fixtures::access(), fixtures::storage(), pool.clone());
        let deleted = svc.delete(&fixtures::superuser(w.root), w.company_a).await.unwrap();

        assert_eq!(deleted.id, w.company_a);
        assert_eq!(fixtures::count(&pool, "companies").await, 1);
        assert_eq!(fixtures::count(&pool, "contracts").await, 0);
        assert_eq!(fixtures::count(&pool, "expenses").await, 0);
        assert_eq!(fixtures::count(&pool, "teams").await, 0);
        // Só sobra o lead da outra empresa
        assert_eq!(fixtures::count(&pool, "leads").await, 1);
        assert_eq!(fixtures::count(&pool, "clients").await, 1);
        assert_eq!(fixtures::count(&pool, "projects").await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn only_superusers_delete_companies(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let svc = CompanyService::new(fixtures::access(), fixtures::storage(), pool.clone());

        let err = svc.delete(&fixtures::member(w.manager_a, w.company_a), w.company_a).await.unwrap_err();

        assert!(matches!(err, AppError::PermissionDenied(_)));
        assert_eq!(fixtures::count(&pool, "companies").await, 2);
    }
}
