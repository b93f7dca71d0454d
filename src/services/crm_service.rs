// src/services/crm_service.rs

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{
        contract_repo::ContractFilter,
        crm_repo::{LeadFilter, DUPLICATE_CLIENT},
        ContractRepository, CrmRepository,
    },
    middleware::tenancy::TenantScope,
    models::{
        contract::Contract,
        crm::{Client, CreateClientPayload, CreateLeadPayload, Lead, LeadStatus, UpdateClientPayload, UpdateLeadPayload},
        ownership::TenantRef,
    },
    services::access::{ensure_same_company, AccessService},
};

#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
    contract_repo: ContractRepository,
    access: AccessService,
    pool: PgPool,
}

impl CrmService {
    pub fn new(access: AccessService, pool: PgPool) -> Self {
        Self {
            repo: CrmRepository::new(),
            contract_repo: ContractRepository::new(),
            access,
            pool,
        }
    }

    // =========================================================================
    //  1. CLIENTES
    // =========================================================================

    async fn load_client(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        scope: &TenantScope,
        id: i64,
    ) -> Result<Client, AppError> {
        let client = self
            .repo
            .find_client(&mut **tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Client"))?;
        scope.check(Some(client.company_id))?;
        Ok(client)
    }

    pub async fn list_clients(&self, scope: &TenantScope, page: Pagination) -> Result<Vec<Client>, AppError> {
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(Vec::new());
        }
        self.repo.list_clients(&self.pool, filter.bind_value(), page).await
    }

    pub async fn get_client(&self, scope: &TenantScope, id: i64) -> Result<Client, AppError> {
        let client = self
            .repo
            .find_client(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Client"))?;
        scope.check(Some(client.company_id))?;
        Ok(client)
    }

    pub async fn create_client(&self, scope: &TenantScope, payload: CreateClientPayload) -> Result<Client, AppError> {
        let mut tx = self.pool.begin().await?;

        self.access
            .authorize(&mut *tx, scope, TenantRef::Company(payload.company_id))
            .await?;
        // Documento é único no sistema todo
        if self.repo.document_taken(&mut *tx, &payload.document, None).await? {
            return Err(AppError::validation(DUPLICATE_CLIENT));
        }

        let client = self.repo.create_client(&mut *tx, &payload).await?;
        tx.commit().await?;

        tracing::info!("🤝 Cliente {} criado na empresa {}", client.id, client.company_id);
        Ok(client)
    }

    pub async fn update_client(&self, scope: &TenantScope, id: i64, payload: UpdateClientPayload) -> Result<Client, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut client = self.load_client(&mut tx, scope, id).await?;
        if let Some(document) = payload.document.as_deref() {
            if document != client.document && self.repo.document_taken(&mut *tx, document, Some(id)).await? {
                return Err(AppError::validation(DUPLICATE_CLIENT));
            }
        }

        payload.apply(&mut client);
        let updated = self.repo.update_client(&mut *tx, &client).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Barrado enquanto houver leads ou contratos apontando para o cliente.
    pub async fn delete_client(&self, scope: &TenantScope, id: i64) -> Result<Client, AppError> {
        let mut tx = self.pool.begin().await?;

        let client = self.load_client(&mut tx, scope, id).await?;
        if self.repo.client_has_leads(&mut *tx, id).await? {
            return Err(AppError::Conflict(
                "Cannot delete client with associated leads. Delete the leads first.".to_string(),
            ));
        }
        if self.repo.client_has_contracts(&mut *tx, id).await? {
            return Err(AppError::Conflict(
                "Cannot delete client with associated contracts. Delete the contracts first.".to_string(),
            ));
        }

        self.repo.delete_client(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Cliente {} excluído", id);
        Ok(client)
    }

    pub async fn client_leads(&self, scope: &TenantScope, client_id: i64, page: Pagination) -> Result<Vec<Lead>, AppError> {
        self.get_client(scope, client_id).await?;
        let filter = LeadFilter { client_id: Some(client_id), ..Default::default() };
        self.repo.list_leads(&self.pool, filter, page).await
    }

    pub async fn client_contracts(&self, scope: &TenantScope, client_id: i64, page: Pagination) -> Result<Vec<Contract>, AppError> {
        self.get_client(scope, client_id).await?;
        let filter = ContractFilter { client_id: Some(client_id), ..Default::default() };
        self.contract_repo.list(&self.pool, filter, page).await
    }

    // =========================================================================
    //  2. LEADS
    // =========================================================================

    async fn load_lead(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        scope: &TenantScope,
        id: i64,
    ) -> Result<(Lead, Option<i64>), AppError> {
        let lead = self
            .repo
            .find_lead(&mut **tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Lead"))?;
        let company_id = self.access.authorize_owned(&mut **tx, scope, &lead).await?;
        Ok((lead, company_id))
    }

    pub async fn list_leads(&self, scope: &TenantScope, page: Pagination) -> Result<Vec<Lead>, AppError> {
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(Vec::new());
        }
        let filter = LeadFilter { company_id: filter.bind_value(), ..Default::default() };
        self.repo.list_leads(&self.pool, filter, page).await
    }

    pub async fn leads_by_property(&self, scope: &TenantScope, property_id: i64, page: Pagination) -> Result<Vec<Lead>, AppError> {
        self.access.authorize(&self.pool, scope, TenantRef::Property(property_id)).await?;
        let filter = LeadFilter { property_id: Some(property_id), ..Default::default() };
        self.repo.list_leads(&self.pool, filter, page).await
    }

    /// Leads de um corretor: ele mesmo, superusuário ou colega de empresa.
    pub async fn leads_by_assigned(&self, scope: &TenantScope, user_id: i64, page: Pagination) -> Result<Vec<Lead>, AppError> {
        if user_id != scope.user_id {
            self.access.authorize(&self.pool, scope, TenantRef::User(user_id)).await?;
        }
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(Vec::new());
        }
        let filter = LeadFilter {
            assigned_user_id: Some(user_id),
            company_id: filter.bind_value(),
            ..Default::default()
        };
        self.repo.list_leads(&self.pool, filter, page).await
    }

    pub async fn leads_by_status(&self, scope: &TenantScope, status: &str, page: Pagination) -> Result<Vec<Lead>, AppError> {
        let status: LeadStatus = status.parse().map_err(AppError::Validation)?;
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(Vec::new());
        }
        let filter = LeadFilter { company_id: filter.bind_value(), status: Some(status), ..Default::default() };
        self.repo.list_leads(&self.pool, filter, page).await
    }

    pub async fn get_lead(&self, scope: &TenantScope, id: i64) -> Result<Lead, AppError> {
        let lead = self
            .repo
            .find_lead(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Lead"))?;
        self.access.authorize_owned(&self.pool, scope, &lead).await?;
        Ok(lead)
    }

    pub async fn create_lead(&self, scope: &TenantScope, mut payload: CreateLeadPayload) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let company_id = self
            .access
            .authorize(&mut *tx, scope, TenantRef::Property(payload.property_id))
            .await?;
        let client_company = self.access.company_of(&mut *tx, TenantRef::Client(payload.client_id)).await?;
        ensure_same_company(company_id, client_company, "Client and property")?;

        if let Some(assigned) = payload.assigned_user_id {
            self.access
                .ensure_user_in_company(&mut *tx, assigned, company_id, "Assigned user")
                .await?;
        }
        payload.fill_defaults(scope.user_id, Utc::now().date_naive());

        let lead = self.repo.create_lead(&mut *tx, &payload).await?;
        tx.commit().await?;

        tracing::info!("🎯 Lead {} criado (imóvel {}, cliente {})", lead.id, lead.property_id, lead.client_id);
        Ok(lead)
    }

    /// Mudança de status carimba `last_contact_date` com a data de hoje.
    pub async fn update_lead(&self, scope: &TenantScope, id: i64, payload: UpdateLeadPayload) -> Result<Lead, AppError> {
        if !payload.interest_level_is_valid() {
            return Err(AppError::validation("Interest level must be between 1 and 5"));
        }

        let mut tx = self.pool.begin().await?;

        let (mut lead, company_id) = self.load_lead(&mut tx, scope, id).await?;
        if let Some(assigned) = payload.assigned_user_id.value().copied() {
            if lead.assigned_user_id != Some(assigned) {
                self.access
                    .ensure_user_in_company(&mut *tx, assigned, company_id, "Assigned user")
                    .await?;
            }
        }

        payload.apply(&mut lead, Utc::now().date_naive());
        let updated = self.repo.update_lead(&mut *tx, &lead).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_lead(&self, scope: &TenantScope, id: i64) -> Result<Lead, AppError> {
        let mut tx = self.pool.begin().await?;

        let (lead, _) = self.load_lead(&mut tx, scope, id).await?;
        self.repo.delete_lead(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Lead {} excluído", id);
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{self, TwoCompanies};
    use serde_json::json;

    #[sqlx::test(migrations = "./migrations")]
    async fn created_client_reads_back_within_its_company(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let svc = CrmService::new(fixtures::access(), pool.clone());
        let scope = fixtures::member(w.manager_a, w.company_a);
        let payload: CreateClientPayload = serde_json::from_value(json!({
            "name": "Maria Souza",
            "client_type": "individual",
            "document": "123.456.789-00",
            "email": "maria@example.com",
            "company_id": w.company_a,
        }))
        .unwrap();

        let created = svc.create_client(&scope, payload).await.unwrap();
        let fetched = svc.get_client(&scope, created.id).await.unwrap();
        assert_eq!(fetched.document, "123.456.789-00");
        assert_eq!(fetched.email.as_deref(), Some("maria@example.com"));

        let err = svc
            .get_client(&fixtures::member(w.manager_b, w.company_b), created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn client_with_leads_cannot_be_deleted(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let client = fixtures::client(&pool, w.company_a, "111.111.111-11").await;
        fixtures::lead(&pool, w.property_a, client).await;
        let svc = CrmService::new(fixtures::access(), pool.clone());

        let err = svc.delete_client(&fixtures::superuser(w.root), client).await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(fixtures::count(&pool, "clients").await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn client_without_dependents_is_deleted(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let client = fixtures::client(&pool, w.company_a, "111.111.111-11").await;
        let svc = CrmService::new(fixtures::access(), pool.clone());

        let deleted = svc
            .delete_client(&fixtures::member(w.manager_a, w.company_a), client)
            .await
            .unwrap();

        assert_eq!(deleted.id, client);
        assert_eq!(fixtures::count(&pool, "clients").await, 0);
    }
}
