// src/services/finance_service.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{finance_repo::ExpenseFilter, FinanceRepository, PropertyRepository},
    middleware::tenancy::TenantScope,
    models::{
        finance::{CreateExpensePayload, Expense, ExpenseSummary, UpdateExpensePayload},
        ownership::TenantRef,
    },
    services::{
        access::{ensure_same_company, AccessService},
        contract_service::UploadedFile,
        storage::{BlobKind, StorageService},
    },
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    property_repo: PropertyRepository,
    access: AccessService,
    storage: StorageService,
    pool: PgPool,
}

impl FinanceService {
    pub fn new(access: AccessService, storage: StorageService, pool: PgPool) -> Self {
        Self {
            repo: FinanceRepository::new(),
            property_repo: PropertyRepository::new(),
            access,
            storage,
            pool,
        }
    }

    async fn load(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        scope: &TenantScope,
        id: i64,
    ) -> Result<(Expense, Option<i64>), AppError> {
        let expense = self
            .repo
            .find_by_id(&mut **tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Expense"))?;
        let company_id = self.access.authorize_owned(&mut **tx, scope, &expense).await?;
        Ok((expense, company_id))
    }

    /// Imóvel opcional da despesa precisa ser da mesma obra.
    async fn ensure_property_in_project(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        property_id: Option<i64>,
        project_id: i64,
    ) -> Result<(), AppError> {
        let Some(property_id) = property_id else {
            return Ok(());
        };
        let property = self
            .property_repo
            .find_by_id(&mut **tx, property_id)
            .await?
            .ok_or_else(|| AppError::not_found("Property"))?;
        if property.project_id != project_id {
            return Err(AppError::validation("Property does not belong to the specified project"));
        }
        Ok(())
    }

    // =========================================================================
    //  DESPESAS
    // =========================================================================

    pub async fn list(&self, scope: &TenantScope, page: Pagination) -> Result<Vec<Expense>, AppError> {
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(Vec::new());
        }
        let filter = ExpenseFilter { company_id: filter.bind_value(), ..Default::default() };
        self.repo.list(&self.pool, filter, page).await
    }

    pub async fn list_by_project(&self, scope: &TenantScope, project_id: i64, page: Pagination) -> Result<Vec<Expense>, AppError> {
        self.access.authorize(&self.pool, scope, TenantRef::Project(project_id)).await?;
        let filter = ExpenseFilter { project_id: Some(project_id), ..Default::default() };
        self.repo.list(&self.pool, filter, page).await
    }

    pub async fn list_by_property(&self, scope: &TenantScope, property_id: i64, page: Pagination) -> Result<Vec<Expense>, AppError> {
        self.access.authorize(&self.pool, scope, TenantRef::Property(property_id)).await?;
        let filter = ExpenseFilter { property_id: Some(property_id), ..Default::default() };
        self.repo.list(&self.pool, filter, page).await
    }

    /// Total da obra e soma por categoria (todas as categorias aparecem).
    pub async fn project_summary(&self, scope: &TenantScope, project_id: i64) -> Result<ExpenseSummary, AppError> {
        self.access.authorize(&self.pool, scope, TenantRef::Project(project_id)).await?;
        let rows = self.repo.category_totals(&self.pool, None, Some(project_id)).await?;
        Ok(ExpenseSummary::from_totals(rows))
    }

    pub async fn get(&self, scope: &TenantScope, id: i64) -> Result<Expense, AppError> {
        let expense = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Expense"))?;
        self.access.authorize_owned(&self.pool, scope, &expense).await?;
        Ok(expense)
    }

    /// `created_by_id` é sempre quem lança a despesa.
    pub async fn create(&self, scope: &TenantScope, payload: CreateExpensePayload) -> Result<Expense, AppError> {
        let mut tx = self.pool.begin().await?;

        self.access
            .authorize(&mut *tx, scope, TenantRef::Project(payload.project_id))
            .await?;
        self.ensure_property_in_project(&mut tx, payload.property_id, payload.project_id)
            .await?;

        let expense = self.repo.create(&mut *tx, &payload, scope.user_id).await?;
        tx.commit().await?;

        tracing::info!("💸 Despesa {} lançada na obra {} ({})", expense.id, expense.project_id, expense.amount);
        Ok(expense)
    }

    pub async fn update(&self, scope: &TenantScope, id: i64, payload: UpdateExpensePayload) -> Result<Expense, AppError> {
        let mut tx = self.pool.begin().await?;

        let (mut expense, company_id) = self.load(&mut tx, scope, id).await?;

        let project_changed = payload.project_id.is_some_and(|p| p != expense.project_id);
        let property_touched = !payload.property_id.is_missing();

        payload.apply(&mut expense);

        if project_changed {
            let target = self
                .access
                .authorize(&mut *tx, scope, TenantRef::Project(expense.project_id))
                .await?;
            ensure_same_company(company_id, target, "Project")?;
        }
        if project_changed || property_touched {
            self.ensure_property_in_project(&mut tx, expense.property_id, expense.project_id)
                .await?;
        }

        let updated = self.repo.update(&mut *tx, &expense).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, scope: &TenantScope, id: i64) -> Result<Expense, AppError> {
        let mut tx = self.pool.begin().await?;

        let (expense, _) = self.load(&mut tx, scope, id).await?;
        self.repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        if let Some(path) = expense.receipt_path.as_deref() {
            self.storage.remove_best_effort(path).await;
        }
        tracing::info!("🗑️ Despesa {} excluída", id);
        Ok(expense)
    }

    // =========================================================================
    //  RECIBO
    // =========================================================================

    /// Substitui o recibo; o arquivo anterior sai do disco depois do commit.
    pub async fn upload_receipt(
        &self,
        scope: &TenantScope,
        id: i64,
        description: Option<String>,
        file: UploadedFile,
    ) -> Result<Expense, AppError> {
        self.get(scope, id).await?;

        let path = self
            .storage
            .save(BlobKind::Receipt, id, &file.filename, &file.bytes)
            .await?;

        let result = async {
            let mut tx = self.pool.begin().await?;
            let (mut expense, _) = self.load(&mut tx, scope, id).await?;

            let previous = expense.receipt_path.replace(path.clone());
            if description.is_some() {
                expense.receipt_description = description;
            }

            let updated = self.repo.update(&mut *tx, &expense).await?;
            tx.commit().await?;
            Ok::<_, AppError>((updated, previous))
        }
        .await;

        match result {
            Ok((updated, previous)) => {
                if let Some(old) = previous.as_deref() {
                    self.storage.remove_best_effort(old).await;
                }
                tracing::info!("🧾 Recibo da despesa {} atualizado", id);
                Ok(updated)
            }
            Err(e) => {
                self.storage.remove_best_effort(&path).await;
                Err(e)
            }
        }
    }
}
