// src/services/access.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::OwnershipRepository,
    middleware::tenancy::TenantScope,
    models::ownership::{Owned, Ownership, TenantRef},
};

/// Resolvedor único da cadeia de posse + decisão ALLOW/DENY.
/// Todo serviço passa por aqui antes de ler ou escrever um registro.
#[derive(Clone, Default)]
pub struct AccessService {
    ownership: OwnershipRepository,
}

impl AccessService {
    pub fn new(ownership: OwnershipRepository) -> Self {
        Self { ownership }
    }

    /// Empresa dona do registro. Registro inexistente vira NOT_FOUND.
    pub async fn company_of<'e, E>(&self, executor: E, target: TenantRef) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.ownership.company_of(executor, target).await
    }

    /// Resolve e autoriza. Devolve a empresa para as checagens seguintes.
    pub async fn authorize<'e, E>(&self, executor: E, scope: &TenantScope, target: TenantRef) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let company_id = self.company_of(executor, target).await?;
        scope.check(company_id)?;
        Ok(company_id)
    }

    /// Mesma coisa para um registro já carregado: usa o `company_id` direto
    /// quando existe, senão sobe pelo registro pai.
    pub async fn resolve_owned<'e, E, T>(&self, executor: E, record: &T) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
        T: Owned,
    {
        match record.ownership() {
            Ownership::Company(company_id) => Ok(company_id),
            Ownership::Via(parent) => self.company_of(executor, parent).await,
        }
    }

    pub async fn authorize_owned<'e, E, T>(&self, executor: E, scope: &TenantScope, record: &T) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
        T: Owned,
    {
        let company_id = self.resolve_owned(executor, record).await?;
        scope.check(company_id)?;
        Ok(company_id)
    }

    /// Gerente, responsável ou membro: o usuário precisa existir e ser da empresa.
    /// `subject` nomeia o papel nas mensagens ("Manager not found").
    pub async fn ensure_user_in_company<'e, E>(
        &self,
        executor: E,
        user_id: i64,
        company_id: Option<i64>,
        subject: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user_company = match self.company_of(executor, TenantRef::User(user_id)).await {
            Err(AppError::NotFound(_)) => return Err(AppError::not_found(subject)),
            other => other?,
        };
        ensure_same_company(company_id, user_company, subject)
    }

    /// Barra a troca de empresa enquanto algo abaixo do registro continuar na empresa antiga.
    pub async fn ensure_no_foreign_dependents<'e, E>(
        &self,
        executor: E,
        target: TenantRef,
        company_id: Option<i64>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match self.ownership.foreign_dependent(executor, target, company_id).await? {
            Some(kind) => Err(foreign_dependents_error(target, &kind)),
            None => Ok(()),
        }
    }
}

fn foreign_dependents_error(target: TenantRef, kind: &str) -> AppError {
    AppError::validation(format!(
        "{} cannot change company while it has {} linked to another company",
        target.label(),
        kind
    ))
}

/// Referência cruzada entre empresas: "Manager must belong to the same company".
pub fn ensure_same_company(expected: Option<i64>, actual: Option<i64>, subject: &str) -> Result<(), AppError> {
    match (expected, actual) {
        (Some(a), Some(b)) if a == b => Ok(()),
        _ => Err(AppError::validation(format!("{} must belong to the same company", subject))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        auth::User,
        contract::{Contract, ContractDocument, ContractStatus, ContractType},
        crm::{Client, ClientType, Lead, LeadStatus},
        finance::{Expense, ExpenseCategory},
        project::Project,
        property::{Property, PropertyStatus, PropertyType},
        team::{Team, TeamMember},
    };
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use sqlx::postgres::PgPoolOptions;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()
    }

    fn project() -> Project {
        Project {
            id: 3,
            name: "Residencial Aurora".into(),
            description: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            total_area: None,
            budget: None,
            start_date: None,
            expected_end_date: None,
            actual_end_date: None,
            status: Default::default(),
            company_id: 1,
            manager_id: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn property() -> Property {
        Property {
            id: 8,
            name: "Apto 12".into(),
            description: None,
            property_type: PropertyType::Apartment,
            status: PropertyStatus::Planning,
            address: None,
            unit_number: None,
            floor: None,
            area: None,
            bedrooms: None,
            bathrooms: None,
            garage_spots: None,
            price: None,
            construction_cost: None,
            start_date: None,
            expected_completion_date: None,
            actual_completion_date: None,
            is_sold: false,
            sale_date: None,
            sale_price: None,
            project_id: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn direct_owners_carry_their_company() {
        assert_eq!(project().ownership(), Ownership::Company(Some(1)));

        let team = Team {
            id: 1,
            name: "Estrutura".into(),
            description: None,
            company_id: 2,
            manager_id: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(team.ownership(), Ownership::Company(Some(2)));

        let client = Client {
            id: 4,
            name: "Ana".into(),
            client_type: ClientType::Individual,
            document: "111".into(),
            email: None,
            phone: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            notes: None,
            company_id: 9,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(client.ownership(), Ownership::Company(Some(9)));

        let superuser = User {
            id: 1,
            email: "root@example.com".into(),
            username: "root".into(),
            hashed_password: String::new(),
            full_name: None,
            is_active: true,
            is_superuser: true,
            company_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(superuser.ownership(), Ownership::Company(None));
    }

    #[test]
    fn dependents_walk_up_to_their_parent() {
        assert_eq!(property().ownership(), Ownership::Via(TenantRef::Project(3)));

        let member = TeamMember {
            id: 1,
            user_id: 5,
            team_id: 7,
            role: "engineer".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(member.ownership(), Ownership::Via(TenantRef::Team(7)));

        let lead = Lead {
            id: 1,
            property_id: 8,
            client_id: 4,
            status: LeadStatus::InitialContact,
            first_contact_date: None,
            last_contact_date: None,
            next_contact_date: None,
            visit_date: None,
            interest_level: None,
            budget: None,
            notes: None,
            assigned_user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(lead.ownership(), Ownership::Via(TenantRef::Client(4)));

        let contract = Contract {
            id: 2,
            contract_number: "CV-1".into(),
            contract_type: ContractType::Sale,
            description: None,
            client_id: 4,
            property_id: 8,
            signing_date: date(),
            expiration_date: None,
            contract_value: Decimal::new(100, 0),
            status: ContractStatus::Pending,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(contract.ownership(), Ownership::Via(TenantRef::Property(8)));

        let document = ContractDocument {
            id: 1,
            filename: "a.pdf".into(),
            description: None,
            file_type: None,
            file_path: "contracts/2025/05/2/x-a.pdf".into(),
            contract_id: 2,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(document.ownership(), Ownership::Via(TenantRef::Contract(2)));

        let expense = Expense {
            id: 1,
            description: "Cimento".into(),
            category: ExpenseCategory::Materials,
            amount: Decimal::new(10, 0),
            date: date(),
            supplier_name: None,
            supplier_document: None,
            supplier_contact: None,
            receipt_path: None,
            receipt_description: None,
            notes: None,
            project_id: 3,
            property_id: Some(8),
            created_by_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(expense.ownership(), Ownership::Via(TenantRef::Project(3)));
    }

    #[tokio::test]
    async fn direct_ownership_is_checked_without_touching_the_database() {
        // Pool preguiçoso: qualquer query falharia, então o teste prova que nenhuma roda
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        let access = AccessService::default();

        let same = TenantScope { user_id: 5, company_id: Some(1), is_superuser: false };
        let other = TenantScope { user_id: 6, company_id: Some(2), is_superuser: false };

        assert_eq!(access.authorize_owned(&pool, &same, &project()).await.unwrap(), Some(1));
        let err = access.authorize_owned(&pool, &other, &project()).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }

    #[test]
    fn cross_company_references_are_rejected() {
        assert!(ensure_same_company(Some(1), Some(1), "Manager").is_ok());

        let err = ensure_same_company(Some(1), Some(2), "Manager").unwrap_err();
        assert_eq!(err.to_string(), "Manager must belong to the same company");

        // Usuário sem empresa nunca pertence à empresa de ninguém
        assert!(ensure_same_company(Some(1), None, "User").is_err());
    }

    #[test]
    fn foreign_dependents_name_the_record_and_the_dependent() {
        let err = foreign_dependents_error(TenantRef::Team(3), "members");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "Team cannot change company while it has members linked to another company"
        );
    }
}
