// src/db/ownership_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::ownership::TenantRef};

/// Resolve a empresa dona de um registro seguindo a cadeia de posse,
/// com um único SELECT por tipo (join pelas tabelas intermediárias).
#[derive(Clone, Default)]
pub struct OwnershipRepository;

impl OwnershipRepository {
    pub fn new() -> Self {
        Self
    }

    fn company_query(target: &TenantRef) -> &'static str {
        match target {
            TenantRef::Company(_) => "SELECT id FROM companies WHERE id = $1",
            TenantRef::User(_) => "SELECT company_id FROM users WHERE id = $1",
            TenantRef::Team(_) => "SELECT company_id FROM teams WHERE id = $1",
            TenantRef::Project(_) => "SELECT company_id FROM projects WHERE id = $1",
            TenantRef::Client(_) => "SELECT company_id FROM clients WHERE id = $1",
            TenantRef::Property(_) => {
                r#"
                SELECT p.company_id
                FROM properties pr
                JOIN projects p ON p.id = pr.project_id
                WHERE pr.id = $1
                "#
            }
            TenantRef::Lead(_) => {
                r#"
                SELECT c.company_id
                FROM leads l
                JOIN clients c ON c.id = l.client_id
                WHERE l.id = $1
                "#
            }
            TenantRef::Contract(_) => {
                r#"
                SELECT p.company_id
                FROM contracts ct
                JOIN properties pr ON pr.id = ct.property_id
                JOIN projects p ON p.id = pr.project_id
                WHERE ct.id = $1
                "#
            }
            TenantRef::Expense(_) => {
                r#"
                SELECT p.company_id
                FROM expenses e
                JOIN projects p ON p.id = e.project_id
                WHERE e.id = $1
                "#
            }
        }
    }

    /// `Ok(None)` só acontece para usuários sem empresa.
    /// Registro inexistente vira NOT_FOUND ("Project not found", ...).
    pub async fn company_of<'e, E>(&self, executor: E, target: TenantRef) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row: Option<Option<i64>> = sqlx::query_scalar(Self::company_query(&target))
            .bind(target.id())
            .fetch_optional(executor)
            .await?;

        row.ok_or_else(|| AppError::not_found(target.label()))
    }

    /// Dependentes que ficariam em outra empresa se `target` passasse a `company_id`.
    /// Só obras, equipes e usuários mudam de empresa; o resto herda do pai.
    fn foreign_dependents_query(target: &TenantRef) -> Option<&'static str> {
        match target {
            TenantRef::Project(_) => Some(
                r#"
                SELECT 'leads' FROM leads l
                JOIN properties pr ON pr.id = l.property_id
                JOIN clients c ON c.id = l.client_id
                WHERE pr.project_id = $1 AND c.company_id IS DISTINCT FROM $2
                UNION ALL
                SELECT 'lead assignees' FROM leads l
                JOIN properties pr ON pr.id = l.property_id
                JOIN users u ON u.id = l.assigned_user_id
                WHERE pr.project_id = $1 AND u.company_id IS DISTINCT FROM $2
                UNION ALL
                SELECT 'contracts' FROM contracts ct
                JOIN properties pr ON pr.id = ct.property_id
                JOIN clients c ON c.id = ct.client_id
                WHERE pr.project_id = $1 AND c.company_id IS DISTINCT FROM $2
                UNION ALL
                SELECT 'team assignments' FROM team_projects tp
                JOIN teams t ON t.id = tp.team_id
                WHERE tp.project_id = $1 AND t.company_id IS DISTINCT FROM $2
                UNION ALL
                SELECT 'task assignees' FROM project_tasks pt
                JOIN users u ON u.id = pt.assignee_id
                WHERE pt.project_id = $1 AND u.company_id IS DISTINCT FROM $2
                LIMIT 1
                "#,
            ),
            TenantRef::Team(_) => Some(
                r#"
                SELECT 'members' FROM user_teams ut
                JOIN users u ON u.id = ut.user_id
                WHERE ut.team_id = $1 AND u.company_id IS DISTINCT FROM $2
                UNION ALL
                SELECT 'project assignments' FROM team_projects tp
                JOIN projects p ON p.id = tp.project_id
                WHERE tp.team_id = $1 AND p.company_id IS DISTINCT FROM $2
                LIMIT 1
                "#,
            ),
            TenantRef::User(_) => Some(
                r#"
                SELECT 'managed teams' FROM teams
                WHERE manager_id = $1 AND company_id IS DISTINCT FROM $2
                UNION ALL
                SELECT 'managed projects' FROM projects
                WHERE manager_id = $1 AND company_id IS DISTINCT FROM $2
                UNION ALL
                SELECT 'team memberships' FROM user_teams ut
                JOIN teams t ON t.id = ut.team_id
                WHERE ut.user_id = $1 AND t.company_id IS DISTINCT FROM $2
                UNION ALL
                SELECT 'assigned tasks' FROM project_tasks pt
                JOIN projects p ON p.id = pt.project_id
                WHERE pt.assignee_id = $1 AND p.company_id IS DISTINCT FROM $2
                UNION ALL
                SELECT 'assigned leads' FROM leads l
                JOIN clients c ON c.id = l.client_id
                WHERE l.assigned_user_id = $1 AND c.company_id IS DISTINCT FROM $2
                LIMIT 1
                "#,
            ),
            _ => None,
        }
    }

    /// Primeiro tipo de dependente preso a outra empresa ("leads", "members", ...).
    pub async fn foreign_dependent<'e, E>(
        &self,
        executor: E,
        target: TenantRef,
        company_id: Option<i64>,
    ) -> Result<Option<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let Some(sql) = Self::foreign_dependents_query(&target) else {
            return Ok(None);
        };
        let kind: Option<String> = sqlx::query_scalar(sql)
            .bind(target.id())
            .bind(company_id)
            .fetch_optional(executor)
            .await?;
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_chain_goes_through_property_and_project() {
        let sql = OwnershipRepository::company_query(&TenantRef::Contract(1));
        let property_join = sql.find("JOIN properties").unwrap();
        let project_join = sql.find("JOIN projects").unwrap();
        assert!(property_join < project_join);
    }

    #[test]
    fn direct_owners_read_their_own_column() {
        for target in [TenantRef::Team(1), TenantRef::Project(1), TenantRef::Client(1), TenantRef::User(1)] {
            let sql = OwnershipRepository::company_query(&target);
            assert!(!sql.contains("JOIN"), "{:?} não deveria precisar de join", target);
        }
    }

    #[test]
    fn only_movable_records_have_dependents() {
        for target in [TenantRef::Project(1), TenantRef::Team(1), TenantRef::User(1)] {
            let sql = OwnershipRepository::foreign_dependents_query(&target).unwrap();
            assert!(sql.contains("IS DISTINCT FROM $2"));
        }
        assert!(OwnershipRepository::foreign_dependents_query(&TenantRef::Property(1)).is_none());
        assert!(OwnershipRepository::foreign_dependents_query(&TenantRef::Client(1)).is_none());
    }
}
