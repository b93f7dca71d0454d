// src/services/contract_service.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{
        contract_repo::{ContractFilter, DUPLICATE_CONTRACT},
        AttachmentRepository, ContractRepository,
    },
    middleware::tenancy::TenantScope,
    models::{
        contract::{Contract, ContractDocument, CreateContractPayload, UpdateContractPayload},
        ownership::TenantRef,
    },
    services::{
        access::{ensure_same_company, AccessService},
        storage::{BlobKind, StorageService},
    },
};

/// Arquivo recebido no multipart, já lido para a memória.
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct ContractService {
    repo: ContractRepository,
    attachments: AttachmentRepository,
    access: AccessService,
    storage: StorageService,
    pool: PgPool,
}

impl ContractService {
    pub fn new(access: AccessService, storage: StorageService, pool: PgPool) -> Self {
        Self {
            repo: ContractRepository::new(),
            attachments: AttachmentRepository::new(),
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
    ) -> Result<(Contract, Option<i64>), AppError> {
        let contract = self
            .repo
            .find_by_id(&mut **tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Contract"))?;
        let company_id = self.access.authorize_owned(&mut **tx, scope, &contract).await?;
        Ok((contract, company_id))
    }

    // =========================================================================
    //  CONTRATOS
    // =========================================================================

    /// Escopo pela cadeia contrato -> imóvel -> obra -> empresa.
    pub async fn list(&self, scope: &TenantScope, page: Pagination) -> Result<Vec<Contract>, AppError> {
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(Vec::new());
        }
        let filter = ContractFilter { company_id: filter.bind_value(), ..Default::default() };
        self.repo.list(&self.pool, filter, page).await
    }

    pub async fn list_by_property(&self, scope: &TenantScope, property_id: i64, page: Pagination) -> Result<Vec<Contract>, AppError> {
        self.access.authorize(&self.pool, scope, TenantRef::Property(property_id)).await?;
        let filter = ContractFilter { property_id: Some(property_id), ..Default::default() };
        self.repo.list(&self.pool, filter, page).await
    }

    pub async fn get(&self, scope: &TenantScope, id: i64) -> Result<Contract, AppError> {
        let contract = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Contract"))?;
        self.access.authorize_owned(&self.pool, scope, &contract).await?;
        Ok(contract)
    }

    pub async fn create(&self, scope: &TenantScope, payload: CreateContractPayload) -> Result<Contract, AppError> {
        let mut tx = self.pool.begin().await?;

        let company_id = self
            .access
            .authorize(&mut *tx, scope, TenantRef::Property(payload.property_id))
            .await?;
        let client_company = self.access.company_of(&mut *tx, TenantRef::Client(payload.client_id)).await?;
        ensure_same_company(company_id, client_company, "Client and property")?;

        if self.repo.number_taken(&mut *tx, &payload.contract_number, None).await? {
            return Err(AppError::validation(DUPLICATE_CONTRACT));
        }

        let contract = self.repo.create(&mut *tx, &payload).await?;
        tx.commit().await?;

        tracing::info!("📝 Contrato {} ({}) criado", contract.id, contract.contract_number);
        Ok(contract)
    }

    /// Imóvel ou cliente novos são revalidados; cliente e imóvel sempre na mesma empresa.
    pub async fn update(&self, scope: &TenantScope, id: i64, payload: UpdateContractPayload) -> Result<Contract, AppError> {
        let mut tx = self.pool.begin().await?;

        let (mut contract, mut company_id) = self.load(&mut tx, scope, id).await?;

        let property_changed = payload.property_id.is_some_and(|p| p != contract.property_id);
        let number_changed = payload
            .contract_number
            .as_deref()
            .is_some_and(|n| n != contract.contract_number);

        payload.apply(&mut contract);

        if property_changed {
            company_id = self
                .access
                .authorize(&mut *tx, scope, TenantRef::Property(contract.property_id))
                .await?;
        }
        let client_company = self.access.company_of(&mut *tx, TenantRef::Client(contract.client_id)).await?;
        ensure_same_company(company_id, client_company, "Client and property")?;

        if number_changed && self.repo.number_taken(&mut *tx, &contract.contract_number, Some(id)).await? {
            return Err(AppError::validation(DUPLICATE_CONTRACT));
        }

        let updated = self.repo.update(&mut *tx, &contract).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, scope: &TenantScope, id: i64) -> Result<Contract, AppError> {
        let mut tx = self.pool.begin().await?;

        let (contract, _) = self.load(&mut tx, scope, id).await?;
        let files = self.attachments.stored_paths(&mut *tx, TenantRef::Contract(id)).await?;
        self.repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        self.storage.remove_all_best_effort(&files).await;
        tracing::info!("🗑️ Contrato {} excluído ({} anexos)", id, files.len());
        Ok(contract)
    }

    // =========================================================================
    //  ANEXOS
    // =========================================================================

    pub async fn list_documents(&self, scope: &TenantScope, contract_id: i64) -> Result<Vec<ContractDocument>, AppError> {
        self.get(scope, contract_id).await?;
        self.repo.list_documents(&self.pool, contract_id).await
    }

    /// O arquivo vai para o disco antes do INSERT; se o INSERT falhar ele é
    /// removido (best-effort) e o erro segue para o cliente.
    pub async fn upload_document(
        &self,
        scope: &TenantScope,
        contract_id: i64,
        description: Option<String>,
        file: UploadedFile,
    ) -> Result<ContractDocument, AppError> {
        self.get(scope, contract_id).await?;

        let path = self
            .storage
            .save(BlobKind::ContractDocument, contract_id, &file.filename, &file.bytes)
            .await?;

        let inserted = self
            .repo
            .create_document(
                &self.pool,
                contract_id,
                &file.filename,
                description.as_deref(),
                file.content_type.as_deref(),
                &path,
            )
            .await;

        match inserted {
            Ok(document) => {
                tracing::info!("📎 Anexo {} adicionado ao contrato {}", document.id, contract_id);
                Ok(document)
            }
            Err(e) => {
                self.storage.remove_best_effort(&path).await;
                Err(e)
            }
        }
    }

    pub async fn delete_document(&self, scope: &TenantScope, contract_id: i64, document_id: i64) -> Result<ContractDocument, AppError> {
        let mut tx = self.pool.begin().await?;

        self.load(&mut tx, scope, contract_id).await?;
        let document = self
            .repo
            .find_document(&mut *tx, document_id)
            .await?
            .ok_or_else(|| AppError::not_found("Document"))?;
        if document.contract_id != contract_id {
            return Err(AppError::validation("Document does not belong to this contract"));
        }

        self.repo.delete_document(&mut *tx, document_id).await?;
        tx.commit().await?;

        self.storage.remove_best_effort(&document.file_path).await;
        tracing::info!("🗑️ Anexo {} removido do contrato {}", document_id, contract_id);
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{self, TwoCompanies};
    use serde_json::json;

    fn new_contract(number: &str, client_id: i64, property_id: i64) -> CreateContractPayload {
        serde_json::from_value(json!({
            "contract_number": number,
            "type": "sale",
            "client_id": client_id,
            "property_id": property_id,
            "signing_date": "2025-05-01",
            "contract_value": 350000.0,
        }))
        .unwrap()
    }

    fn service(pool: &PgPool) -> ContractService {
        ContractService::new(fixtures::access(), fixtures::storage(), pool.clone())
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn client_and_property_must_share_a_company(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let outsider = fixtures::client(&pool, w.company_b, "222.222.222-22").await;

        let err = service(&pool)
            .create(&fixtures::superuser(w.root), new_contract("CV-1", outsider, w.property_a))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "Client and property must belong to the same company");
        assert_eq!(fixtures::count(&pool, "contracts").await, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn contract_numbers_are_unique(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let client_a = fixtures::client(&pool, w.company_a, "111.111.111-11").await;
        let client_b = fixtures::client(&pool, w.company_b, "222.222.222-22").await;
        let svc = service(&pool);

        let created = svc
            .create(&fixtures::member(w.manager_a, w.company_a), new_contract("CV-1", client_a, w.property_a))
            .await
            .unwrap();
        assert_eq!(
            svc.get(&fixtures::member(w.manager_a, w.company_a), created.id).await.unwrap().contract_number,
            "CV-1"
        );

        // O número é global, mesmo vindo de outra empresa
        let err = svc
            .create(&fixtures::member(w.manager_b, w.company_b), new_contract("CV-1", client_b, w.property_b))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "A contract with this number already exists.");
    }
}
