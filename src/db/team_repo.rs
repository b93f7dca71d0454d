// src/db/team_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::{
        db_utils::{map_unique_violation, Pagination},
        error::AppError,
    },
    models::{
        project::Project,
        team::{Team, TeamMember, TeamProject},
    },
};

pub const DUPLICATE_TEAM: &str = "The team with this name already exists in the company.";
pub const DUPLICATE_MEMBER: &str = "User is already a member of this team";
pub const DUPLICATE_ASSIGNMENT: &str = "Team is already assigned to this project";

#[derive(Clone, Default)]
pub struct TeamRepository;

impl TeamRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  EQUIPES
    // =========================================================================

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i64) -> Result<Option<Team>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let team = sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(team)
    }

    pub async fn name_taken<'e, E>(
        &self,
        executor: E,
        company_id: i64,
        name: &str,
        except_id: Option<i64>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM teams
                WHERE company_id = $1 AND name = $2 AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(company_id)
        .bind(name)
        .bind(except_id)
        .fetch_one(executor)
        .await?;
        Ok(taken)
    }

    pub async fn list<'e, E>(&self, executor: E, company_id: Option<i64>, page: Pagination) -> Result<Vec<Team>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT * FROM teams
            WHERE ($1::BIGINT IS NULL OR company_id = $1)
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(company_id)
        .bind(page.offset())
        .bind(page.limit())
        .fetch_all(executor)
        .await?;
        Ok(teams)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        company_id: i64,
        manager_id: i64,
    ) -> Result<Team, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, company_id, manager_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(company_id)
        .bind(manager_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_TEAM))?;
        Ok(team)
    }

    pub async fn update<'e, E>(&self, executor: E, team: &Team) -> Result<Team, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams SET
                name = $2, description = $3, company_id = $4, manager_id = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(team.id)
        .bind(&team.name)
        .bind(&team.description)
        .bind(team.company_id)
        .bind(team.manager_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_TEAM))?;
        Ok(updated)
    }

    /// Vínculos (membros e obras) caem junto via ON DELETE CASCADE.
    pub async fn delete<'e, E>(&self, executor: E, id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  MEMBROS
    // =========================================================================

    pub async fn list_members<'e, E>(&self, executor: E, team_id: i64) -> Result<Vec<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let members = sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM user_teams WHERE team_id = $1 ORDER BY id",
        )
        .bind(team_id)
        .fetch_all(executor)
        .await?;
        Ok(members)
    }

    pub async fn find_member<'e, E>(&self, executor: E, team_id: i64, user_id: i64) -> Result<Option<TeamMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, TeamMember>(
            "SELECT * FROM user_teams WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
        Ok(member)
    }

    pub async fn add_member<'e, E>(&self, executor: E, team_id: i64, user_id: i64, role: &str) -> Result<TeamMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO user_teams (team_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_MEMBER))?;
        Ok(member)
    }

    pub async fn update_member_role<'e, E>(&self, executor: E, member_id: i64, role: &str) -> Result<TeamMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, TeamMember>(
            "UPDATE user_teams SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(member_id)
        .bind(role)
        .fetch_one(executor)
        .await?;
        Ok(member)
    }

    pub async fn remove_member<'e, E>(&self, executor: E, member_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM user_teams WHERE id = $1")
            .bind(member_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  EQUIPES x OBRAS
    // =========================================================================

    pub async fn find_assignment<'e, E>(&self, executor: E, team_id: i64, project_id: i64) -> Result<Option<TeamProject>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, TeamProject>(
            "SELECT * FROM team_projects WHERE team_id = $1 AND project_id = $2",
        )
        .bind(team_id)
        .bind(project_id)
        .fetch_optional(executor)
        .await?;
        Ok(assignment)
    }

    pub async fn assign_to_project<'e, E>(&self, executor: E, team_id: i64, project_id: i64) -> Result<TeamProject, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let assignment = sqlx::query_as::<_, TeamProject>(
            r#"
            INSERT INTO team_projects (team_id, project_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(team_id)
        .bind(project_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, DUPLICATE_ASSIGNMENT))?;
        Ok(assignment)
    }

    pub async fn unassign<'e, E>(&self, executor: E, assignment_id: i64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM team_projects WHERE id = $1")
            .bind(assignment_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn teams_of_project<'e, E>(&self, executor: E, project_id: i64) -> Result<Vec<Team>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.* FROM teams t
            JOIN team_projects tp ON tp.team_id = t.id
            WHERE tp.project_id = $1
            ORDER BY t.id
            "#,
        )
        .bind(project_id)
        .fetch_all(executor)
        .await?;
        Ok(teams)
    }

    pub async fn projects_of_team<'e, E>(&self, executor: E, team_id: i64) -> Result<Vec<Project>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.* FROM projects p
            JOIN team_projects tp ON tp.project_id = p.id
            WHERE tp.team_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(team_id)
        .fetch_all(executor)
        .await?;
        Ok(projects)
    }
}
