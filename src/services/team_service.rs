// src/services/team_service.rs

use sqlx::PgPool;

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{
        team_repo::{DUPLICATE_MEMBER, DUPLICATE_TEAM},
        TeamRepository,
    },
    middleware::tenancy::{CompanyFilter, TenantScope},
    models::{
        ownership::TenantRef,
        project::Project,
        team::{AddMemberPayload, CreateTeamPayload, Team, TeamMember, UpdateMemberPayload, UpdateTeamPayload},
    },
    services::access::AccessService,
};

#[derive(Clone)]
pub struct TeamService {
    repo: TeamRepository,
    access: AccessService,
    pool: PgPool,
}

impl TeamService {
    pub fn new(access: AccessService, pool: PgPool) -> Self {
        Self { repo: TeamRepository::new(), access, pool }
    }

    // =========================================================================
    //  EQUIPES
    // =========================================================================

    pub async fn list(&self, scope: &TenantScope, page: Pagination) -> Result<Vec<Team>, AppError> {
        match scope.company_filter() {
            CompanyFilter::Nothing => Ok(Vec::new()),
            filter => self.repo.list(&self.pool, filter.bind_value(), page).await,
        }
    }

    pub async fn get(&self, scope: &TenantScope, id: i64) -> Result<Team, AppError> {
        let team = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
        scope.check(Some(team.company_id))?;
        Ok(team)
    }

    pub async fn create(&self, scope: &TenantScope, payload: CreateTeamPayload) -> Result<Team, AppError> {
        let mut tx = self.pool.begin().await?;

        self.access
            .authorize(&mut *tx, scope, TenantRef::Company(payload.company_id))
            .await?;
        self.access
            .ensure_user_in_company(&mut *tx, payload.manager_id, Some(payload.company_id), "Manager")
            .await?;
        if self.repo.name_taken(&mut *tx, payload.company_id, &payload.name, None).await? {
            return Err(AppError::validation(DUPLICATE_TEAM));
        }

        let team = self
            .repo
            .create(
                &mut *tx,
                &payload.name,
                payload.description.as_deref(),
                payload.company_id,
                payload.manager_id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("👷 Equipe {} criada na empresa {}", team.id, team.company_id);
        Ok(team)
    }

    pub async fn update(&self, scope: &TenantScope, id: i64, payload: UpdateTeamPayload) -> Result<Team, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut team = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
        scope.check(Some(team.company_id))?;

        let company_changed = payload.company_id.is_some_and(|c| c != team.company_id);
        let manager_changed = payload.manager_id.is_some_and(|m| m != team.manager_id);
        let name_changed = payload.name.as_deref().is_some_and(|n| n != team.name);

        payload.apply(&mut team);

        if company_changed {
            self.access.authorize(&mut *tx, scope, TenantRef::Company(team.company_id)).await?;
            self.access
                .ensure_no_foreign_dependents(&mut *tx, TenantRef::Team(id), Some(team.company_id))
                .await?;
        }
        if company_changed || manager_changed {
            self.access
                .ensure_user_in_company(&mut *tx, team.manager_id, Some(team.company_id), "Manager")
                .await?;
        }
        if (company_changed || name_changed)
            && self.repo.name_taken(&mut *tx, team.company_id, &team.name, Some(id)).await?
        {
            return Err(AppError::validation(DUPLICATE_TEAM));
        }

        let updated = self.repo.update(&mut *tx, &team).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, scope: &TenantScope, id: i64) -> Result<Team, AppError> {
        let mut tx = self.pool.begin().await?;

        let team = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
        scope.check(Some(team.company_id))?;

        self.repo.delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🗑️ Equipe {} excluída", id);
        Ok(team)
    }

    // =========================================================================
    //  MEMBROS
    // =========================================================================

    pub async fn list_members(&self, scope: &TenantScope, team_id: i64) -> Result<Vec<TeamMember>, AppError> {
        self.get(scope, team_id).await?;
        self.repo.list_members(&self.pool, team_id).await
    }

    pub async fn add_member(&self, scope: &TenantScope, team_id: i64, payload: AddMemberPayload) -> Result<TeamMember, AppError> {
        let mut tx = self.pool.begin().await?;

        let team = self
            .repo
            .find_by_id(&mut *tx, team_id)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
        scope.check(Some(team.company_id))?;

        self.access
            .ensure_user_in_company(&mut *tx, payload.user_id, Some(team.company_id), "User")
            .await?;
        if self.repo.find_member(&mut *tx, team_id, payload.user_id).await?.is_some() {
            return Err(AppError::validation(DUPLICATE_MEMBER));
        }

        let member = self.repo.add_member(&mut *tx, team_id, payload.user_id, &payload.role).await?;
        tx.commit().await?;

        tracing::info!("➕ Usuário {} entrou na equipe {} como {}", member.user_id, team_id, member.role);
        Ok(member)
    }

    pub async fn update_member(
        &self,
        scope: &TenantScope,
        team_id: i64,
        user_id: i64,
        payload: UpdateMemberPayload,
    ) -> Result<TeamMember, AppError> {
        let mut tx = self.pool.begin().await?;

        let team = self
            .repo
            .find_by_id(&mut *tx, team_id)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
        scope.check(Some(team.company_id))?;

        let member = self
            .repo
            .find_member(&mut *tx, team_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User is not a member of this team".to_string()))?;

        let updated = self.repo.update_member_role(&mut *tx, member.id, &payload.role).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// O gerente da equipe não pode ser removido dela.
    pub async fn remove_member(&self, scope: &TenantScope, team_id: i64, user_id: i64) -> Result<TeamMember, AppError> {
        let mut tx = self.pool.begin().await?;

        let team = self
            .repo
            .find_by_id(&mut *tx, team_id)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
        scope.check(Some(team.company_id))?;

        let member = self
            .repo
            .find_member(&mut *tx, team_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User is not a member of this team".to_string()))?;

        if user_id == team.manager_id {
            return Err(AppError::validation("Cannot remove the team manager from the team"));
        }

        self.repo.remove_member(&mut *tx, member.id).await?;
        tx.commit().await?;

        tracing::info!("➖ Usuário {} saiu da equipe {}", user_id, team_id);
        Ok(member)
    }

    pub async fn list_projects(&self, scope: &TenantScope, team_id: i64) -> Result<Vec<Project>, AppError> {
        self.get(scope, team_id).await?;
        self.repo.projects_of_team(&self.pool, team_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{self, TwoCompanies};
    use serde_json::json;

    fn move_to(company_id: i64, manager_id: i64) -> UpdateTeamPayload {
        serde_json::from_value(json!({ "company_id": company_id, "manager_id": manager_id })).unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn team_with_local_members_stays_put(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let engineer = fixtures::user(&pool, "engenheiro", Some(w.company_a), false).await;
        let team = fixtures::team(&pool, w.company_a, w.manager_a, "Elétrica").await;
        fixtures::member_of(&pool, team, engineer).await;

        let err = TeamService::new(fixtures::access(), pool.clone())
            .update(&fixtures::superuser(w.root), team, move_to(w.company_b, w.manager_b))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Team cannot change company while it has members linked to another company"
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn empty_team_moves_with_new_manager(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let team = fixtures::team(&pool, w.company_a, w.manager_a, "Hidráulica").await;

        let moved = TeamService::new(fixtures::access(), pool.clone())
            .update(&fixtures::superuser(w.root), team, move_to(w.company_b, w.manager_b))
            .await
            .unwrap();

        assert_eq!((moved.company_id, moved.manager_id), (w.company_b, w.manager_b));
    }
}
