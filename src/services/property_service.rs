// src/services/property_service.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{property_repo::DUPLICATE_PROPERTY, AttachmentRepository, PropertyRepository},
    middleware::tenancy::TenantScope,
    models::{
        ownership::TenantRef,
        property::{
            CreatePropertyPayload, CreatePropertyUpdatePayload, Property, PropertyStatus, PropertyUpdate,
            UpdatePropertyPayload,
        },
    },
    services::{
        access::{ensure_same_company, AccessService},
        storage::StorageService,
    },
};

#[derive(Clone)]
pub struct PropertyService {
    repo: PropertyRepository,
    attachments: AttachmentRepository,
    access: AccessService,
    storage: StorageService,
    pool: PgPool,
}

impl PropertyService {
    pub fn new(access: AccessService, storage: StorageService, pool: PgPool) -> Self {
        Self {
            repo: PropertyRepository::new(),
            attachments: AttachmentRepository::new(),
            access,
            storage,
            pool,
        }
    }

    /// Carrega o imóvel, autoriza pela obra e devolve a empresa resolvida.
    async fn load(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        scope: &TenantScope,
        id: i64,
    ) -> Result<(Property, Option<i64>), AppError> {
        let property = self
            .repo
            .find_by_id(&mut **tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Property"))?;
        let company_id = self.access.authorize_owned(&mut **tx, scope, &property).await?;
        Ok((property, company_id))
    }

    pub async fn list(&self, scope: &TenantScope, page: Pagination) -> Result<Vec<Property>, AppError> {
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(Vec::new());
        }
        self.repo.list(&self.pool, filter.bind_value(), None, page).await
    }

    pub async fn list_by_project(&self, scope: &TenantScope, project_id: i64, page: Pagination) -> Result<Vec<Property>, AppError> {
        self.access.authorize(&self.pool, scope, TenantRef::Project(project_id)).await?;
        self.repo.list_by_project(&self.pool, project_id, page).await
    }

    /// `status` vem cru da rota; valor desconhecido lista as opções válidas.
    pub async fn list_by_status(&self, scope: &TenantScope, status: &str, page: Pagination) -> Result<Vec<Property>, AppError> {
        let status: PropertyStatus = status.parse().map_err(AppError::Validation)?;
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(Vec::new());
        }
        self.repo.list(&self.pool, filter.bind_value(), Some(status), page).await
    }

    pub async fn get(&self, scope: &TenantScope, id: i64) -> Result<Property, AppError> {
        let property = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Property"))?;
        self.access.authorize_owned(&self.pool, scope, &property).await?;
        Ok(property)
    }

    pub async fn create(&self, scope: &TenantScope, payload: CreatePropertyPayload) -> Result<Property, AppError> {
        let mut tx = self.pool.begin().await?;

        self.access
            .authorize(&mut *tx, scope, TenantRef::Project(payload.project_id))
            .await?;
        if self.repo.name_taken(&mut *tx, payload.project_id, &payload.name, None).await? {
            return Err(AppError::validation(DUPLICATE_PROPERTY));
        }

        let property = self.repo.create(&mut *tx, &payload).await?;
        tx.commit().await?;

        tracing::info!("🏠 Imóvel {} criado na obra {}", property.id, property.project_id);
        Ok(property)
    }

    /// Trocar de obra só dentro da mesma empresa.
    pub async fn update(&self, scope: &TenantScope, id: i64, payload: UpdatePropertyPayload) -> Result<Property, AppError> {
        let mut tx = self.pool.begin().await?;

        let (mut property, company_id) = self.load(&mut tx, scope, id).await?;

        let project_changed = payload.project_id.is_some_and(|p| p != property.project_id);
        let name_changed = payload.name.as_deref().is_some_and(|n| n != property.name);

        payload.apply(&mut property);

        if project_changed {
            let target = self
                .access
                .authorize(&mut *tx, scope, TenantRef::Project(property.project_id))
                .await?;
            ensure_same_company(company_id, target, "Project")?;
        }
        if (project_changed || name_changed)
            && self.repo.name_taken(&mut *tx, property.project_id, &property.name, Some(id)).await?
        {
            return Err(AppError::validation(DUPLICATE_PROPERTY));
        }

        let updated = self.repo.update(&mut *tx, &property).await?;
        if project_changed {
            // Despesas do imóvel acompanham a obra nova
            let moved = self.repo.move_expenses(&mut *tx, id, updated.project_id).await?;
            tracing::info!("🚚 Imóvel {} movido para a obra {} ({} despesas)", id, updated.project_id, moved);
        }
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, scope: &TenantScope, id: i64) -> Result<Property, AppError> {
        let mut tx = self.pool.begin().await?;

        let (property, _) = self.load(&mut tx, scope, id).await?;
        let files = self.attachments.stored_paths(&mut *tx, TenantRef::Property(id)).await?;
        self.repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        self.storage.remove_all_best_effort(&files).await;
        tracing::info!("🗑️ Imóvel {} excluído ({} arquivos)", id, files.len());
        Ok(property)
    }

    // --- Notas de andamento ---

    pub async fn list_updates(&self, scope: &TenantScope, id: i64, page: Pagination) -> Result<Vec<PropertyUpdate>, AppError> {
        self.get(scope, id).await?;
        self.repo.list_updates(&self.pool, id, page).await
    }

    pub async fn create_update(
        &self,
        scope: &TenantScope,
        id: i64,
        payload: CreatePropertyUpdatePayload,
    ) -> Result<PropertyUpdate, AppError> {
        let mut tx = self.pool.begin().await?;

        self.load(&mut tx, scope, id).await?;
        let update = self
            .repo
            .create_update(&mut *tx, id, scope.user_id, &payload.title, &payload.content, payload.status)
            .await?;

        tx.commit().await?;
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{self, TwoCompanies};
    use serde_json::json;

    fn move_to(project_id: i64) -> UpdatePropertyPayload {
        serde_json::from_value(json!({ "project_id": project_id })).unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn expenses_follow_the_property_to_its_new_project(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let second = fixtures::project(&pool, w.company_a, w.manager_a, "Residencial Aurora II").await;
        let expense = fixtures::expense(&pool, w.project_a, Some(w.property_a)).await;
        let loose = fixtures::expense(&pool, w.project_a, None).await;
        let svc = PropertyService::new(fixtures::access(), fixtures::storage(), pool.clone());

        let moved = svc
            .update(&fixtures::member(w.manager_a, w.company_a), w.property_a, move_to(second))
            .await
            .unwrap();
        assert_eq!(moved.project_id, second);

        assert_eq!(expense_project(&pool, expense).await, second);
        assert_eq!(expense_project(&pool, loose).await, w.project_a);
    }

    async fn expense_project(pool: &PgPool, id: i64) -> i64 {
        sqlx::query_scalar("SELECT project_id FROM expenses WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn property_cannot_jump_to_another_company(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let svc = PropertyService::new(fixtures::access(), fixtures::storage(), pool.clone());

        let err = svc
            .update(&fixtures::superuser(w.root), w.property_a, move_to(w.project_b))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Project must belong to the same company");
    }
}
