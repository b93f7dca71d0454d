// src/services/project_service.rs

use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    common::{db_utils::Pagination, error::AppError},
    db::{
        project_repo::DUPLICATE_PROJECT,
        team_repo::DUPLICATE_ASSIGNMENT,
        AttachmentRepository, ProjectRepository, TeamRepository,
    },
    middleware::tenancy::{CompanyFilter, TenantScope},
    models::{
        ownership::TenantRef,
        project::{
            CreateProjectPayload, CreateProjectUpdatePayload, CreateTaskPayload, Project, ProjectTask,
            ProjectUpdate, UpdateProjectPayload, UpdateTaskPayload,
        },
        team::{AssignTeamPayload, Team, TeamProject},
    },
    services::{
        access::{ensure_same_company, AccessService},
        storage::StorageService,
    },
};

#[derive(Clone)]
pub struct ProjectService {
    repo: ProjectRepository,
    team_repo: TeamRepository,
    attachments: AttachmentRepository,
    access: AccessService,
    storage: StorageService,
    pool: PgPool,
}

impl ProjectService {
    pub fn new(access: AccessService, storage: StorageService, pool: PgPool) -> Self {
        Self {
            repo: ProjectRepository::new(),
            team_repo: TeamRepository::new(),
            attachments: AttachmentRepository::new(),
            access,
            storage,
            pool,
        }
    }

    /// Carrega a obra e confere o escopo.
    async fn load(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        scope: &TenantScope,
        id: i64,
    ) -> Result<Project, AppError> {
        let project = self
            .repo
            .find_by_id(&mut **tx, id)
            .await?
            .ok_or_else(|| AppError::not_found("Project"))?;
        scope.check(Some(project.company_id))?;
        Ok(project)
    }

    // =========================================================================
    //  OBRAS
    // =========================================================================

    pub async fn list(&self, scope: &TenantScope, page: Pagination) -> Result<Vec<Project>, AppError> {
        match scope.company_filter() {
            CompanyFilter::Nothing => Ok(Vec::new()),
            filter => self.repo.list(&self.pool, filter.bind_value(), page).await,
        }
    }

    pub async fn get(&self, scope: &TenantScope, id: i64) -> Result<Project, AppError> {
        let project = self
            .repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Project"))?;
        scope.check(Some(project.company_id))?;
        Ok(project)
    }

    pub async fn create(&self, scope: &TenantScope, payload: CreateProjectPayload) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        self.access
            .authorize(&mut *tx, scope, TenantRef::Company(payload.company_id))
            .await?;
        self.access
            .ensure_user_in_company(&mut *tx, payload.manager_id, Some(payload.company_id), "Manager")
            .await?;
        if self.repo.name_taken(&mut *tx, payload.company_id, &payload.name, None).await? {
            return Err(AppError::validation(DUPLICATE_PROJECT));
        }

        let project = self.repo.create(&mut *tx, &payload).await?;
        tx.commit().await?;

        tracing::info!("🏗️ Obra {} criada na empresa {}", project.id, project.company_id);
        Ok(project)
    }

    pub async fn update(&self, scope: &TenantScope, id: i64, payload: UpdateProjectPayload) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut project = self.load(&mut tx, scope, id).await?;

        let company_changed = payload.company_id.is_some_and(|c| c != project.company_id);
        let manager_changed = payload.manager_id.is_some_and(|m| m != project.manager_id);
        let name_changed = payload.name.as_deref().is_some_and(|n| n != project.name);

        payload.apply(&mut project);

        if company_changed {
            self.access.authorize(&mut *tx, scope, TenantRef::Company(project.company_id)).await?;
            self.access
                .ensure_no_foreign_dependents(&mut *tx, TenantRef::Project(id), Some(project.company_id))
                .await?;
        }
        if company_changed || manager_changed {
            self.access
                .ensure_user_in_company(&mut *tx, project.manager_id, Some(project.company_id), "Manager")
                .await?;
        }
        if (company_changed || name_changed)
            && self.repo.name_taken(&mut *tx, project.company_id, &project.name, Some(id)).await?
        {
            return Err(AppError::validation(DUPLICATE_PROJECT));
        }

        let updated = self.repo.update(&mut *tx, &project).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Cascata no banco; anexos e recibos abaixo da obra saem do disco depois do commit.
    pub async fn delete(&self, scope: &TenantScope, id: i64) -> Result<Project, AppError> {
        let mut tx = self.pool.begin().await?;

        let project = self.load(&mut tx, scope, id).await?;
        let files = self.attachments.stored_paths(&mut *tx, TenantRef::Project(id)).await?;
        self.repo.delete(&mut *tx, id).await?;

        tx.commit().await?;

        self.storage.remove_all_best_effort(&files).await;
        tracing::info!("🗑️ Obra {} excluída ({} arquivos)", id, files.len());
        Ok(project)
    }

    // =========================================================================
    //  EQUIPES DA OBRA
    // =========================================================================

    pub async fn list_teams(&self, scope: &TenantScope, project_id: i64) -> Result<Vec<Team>, AppError> {
        self.get(scope, project_id).await?;
        self.team_repo.teams_of_project(&self.pool, project_id).await
    }

    pub async fn assign_team(&self, scope: &TenantScope, project_id: i64, payload: AssignTeamPayload) -> Result<TeamProject, AppError> {
        let mut tx = self.pool.begin().await?;

        let project = self.load(&mut tx, scope, project_id).await?;
        let team = self
            .team_repo
            .find_by_id(&mut *tx, payload.team_id)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
        ensure_same_company(Some(project.company_id), Some(team.company_id), "Team")?;

        if self.team_repo.find_assignment(&mut *tx, team.id, project_id).await?.is_some() {
            return Err(AppError::validation(DUPLICATE_ASSIGNMENT));
        }

        let assignment = self.team_repo.assign_to_project(&mut *tx, team.id, project_id).await?;
        tx.commit().await?;

        tracing::info!("🔗 Equipe {} alocada na obra {}", team.id, project_id);
        Ok(assignment)
    }

    pub async fn unassign_team(&self, scope: &TenantScope, project_id: i64, team_id: i64) -> Result<TeamProject, AppError> {
        let mut tx = self.pool.begin().await?;

        self.load(&mut tx, scope, project_id).await?;
        let assignment = self
            .team_repo
            .find_assignment(&mut *tx, team_id, project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Team is not assigned to this project".to_string()))?;

        self.team_repo.unassign(&mut *tx, assignment.id).await?;
        tx.commit().await?;
        Ok(assignment)
    }

    // =========================================================================
    //  TAREFAS
    // =========================================================================

    pub async fn list_tasks(&self, scope: &TenantScope, project_id: i64, page: Pagination) -> Result<Vec<ProjectTask>, AppError> {
        self.get(scope, project_id).await?;
        self.repo.list_tasks(&self.pool, project_id, page).await
    }

    pub async fn create_task(&self, scope: &TenantScope, project_id: i64, payload: CreateTaskPayload) -> Result<ProjectTask, AppError> {
        let mut tx = self.pool.begin().await?;

        let project = self.load(&mut tx, scope, project_id).await?;
        if let Some(assignee_id) = payload.assignee_id {
            self.access
                .ensure_user_in_company(&mut *tx, assignee_id, Some(project.company_id), "Assignee")
                .await?;
        }

        let task = self.repo.create_task(&mut *tx, project_id, &payload).await?;
        tx.commit().await?;
        Ok(task)
    }

    /// A tarefa precisa pertencer à obra da rota.
    async fn load_task(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        project_id: i64,
        task_id: i64,
    ) -> Result<ProjectTask, AppError> {
        self.repo
            .find_task(&mut **tx, task_id)
            .await?
            .filter(|t| t.project_id == project_id)
            .ok_or_else(|| AppError::not_found("Task"))
    }

    pub async fn update_task(
        &self,
        scope: &TenantScope,
        project_id: i64,
        task_id: i64,
        payload: UpdateTaskPayload,
    ) -> Result<ProjectTask, AppError> {
        let mut tx = self.pool.begin().await?;

        let project = self.load(&mut tx, scope, project_id).await?;
        let mut task = self.load_task(&mut tx, project_id, task_id).await?;

        if let Some(assignee_id) = payload.assignee_id.value().copied() {
            if task.assignee_id != Some(assignee_id) {
                self.access
                    .ensure_user_in_company(&mut *tx, assignee_id, Some(project.company_id), "Assignee")
                    .await?;
            }
        }

        payload.apply(&mut task);
        let updated = self.repo.update_task(&mut *tx, &task).await?;
        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_task(&self, scope: &TenantScope, project_id: i64, task_id: i64) -> Result<ProjectTask, AppError> {
        let mut tx = self.pool.begin().await?;

        self.load(&mut tx, scope, project_id).await?;
        let task = self.load_task(&mut tx, project_id, task_id).await?;
        self.repo.delete_task(&mut *tx, task_id).await?;

        tx.commit().await?;
        Ok(task)
    }

    // =========================================================================
    //  NOTAS DE ANDAMENTO
    // =========================================================================

    pub async fn list_updates(&self, scope: &TenantScope, project_id: i64, page: Pagination) -> Result<Vec<ProjectUpdate>, AppError> {
        self.get(scope, project_id).await?;
        self.repo.list_updates(&self.pool, project_id, page).await
    }

    /// O autor é sempre quem faz a requisição.
    pub async fn create_update(
        &self,
        scope: &TenantScope,
        project_id: i64,
        payload: CreateProjectUpdatePayload,
    ) -> Result<ProjectUpdate, AppError> {
        let mut tx = self.pool.begin().await?;

        self.load(&mut tx, scope, project_id).await?;
        let update = self
            .repo
            .create_update(&mut *tx, project_id, scope.user_id, &payload.title, &payload.content)
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

    fn service(pool: &PgPool) -> ProjectService {
        ProjectService::new(fixtures::access(), fixtures::storage(), pool.clone())
    }

    fn new_project(company_id: i64, manager_id: i64) -> CreateProjectPayload {
        serde_json::from_value(json!({
            "name": "Vila Nova",
            "company_id": company_id,
            "manager_id": manager_id,
        }))
        .unwrap()
    }

    fn move_to(company_id: i64, manager_id: i64) -> UpdateProjectPayload {
        serde_json::from_value(json!({ "company_id": company_id, "manager_id": manager_id })).unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn created_project_reads_back(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let svc = service(&pool);
        let scope = fixtures::member(w.manager_a, w.company_a);

        let created = svc.create(&scope, new_project(w.company_a, w.manager_a)).await.unwrap();
        let fetched = svc.get(&scope, created.id).await.unwrap();

        assert_eq!(fetched.name, "Vila Nova");
        assert_eq!(fetched.company_id, w.company_a);
        assert_eq!(fetched.status, created.status);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn manager_from_another_company_is_rejected(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;

        let err = service(&pool)
            .create(&fixtures::superuser(w.root), new_project(w.company_a, w.manager_b))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "Manager must belong to the same company");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn other_company_cannot_read_but_superuser_can(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let svc = service(&pool);

        let err = svc.get(&fixtures::member(w.manager_a, w.company_a), w.project_b).await.unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));

        let project = svc.get(&fixtures::superuser(w.root), w.project_b).await.unwrap();
        assert_eq!(project.company_id, w.company_b);

        let listed = svc.list(&fixtures::member(w.manager_a, w.company_a), Pagination::default()).await.unwrap();
        assert!(listed.iter().all(|p| p.company_id == w.company_a));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn moving_project_with_local_leads_is_rejected(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let client = fixtures::client(&pool, w.company_a, "111.111.111-11").await;
        fixtures::lead(&pool, w.property_a, client).await;

        let err = service(&pool)
            .update(&fixtures::superuser(w.root), w.project_a, move_to(w.company_b, w.manager_b))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Project cannot change company while it has leads linked to another company"
        );
        let company: i64 = sqlx::query_scalar("SELECT company_id FROM projects WHERE id = $1")
            .bind(w.project_a)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(company, w.company_a);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn moving_project_with_local_team_is_rejected(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;
        let team = fixtures::team(&pool, w.company_a, w.manager_a, "Fundação").await;
        fixtures::assign(&pool, team, w.project_a).await;

        let err = service(&pool)
            .update(&fixtures::superuser(w.root), w.project_a, move_to(w.company_b, w.manager_b))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("team assignments"));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn project_without_ties_can_change_company(pool: PgPool) {
        let w = TwoCompanies::seed(&pool).await;

        let moved = service(&pool)
            .update(&fixtures::superuser(w.root), w.project_a, move_to(w.company_b, w.manager_b))
            .await
            .unwrap();

        assert_eq!(moved.company_id, w.company_b);
        assert_eq!(moved.manager_id, w.manager_b);
    }
}
