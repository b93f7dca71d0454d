// src/models/team.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::patch::Patch;
use crate::models::ownership::{Owned, Ownership, TenantRef};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Team {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Equipe de Fundação")]
    pub name: String,
    pub description: Option<String>,
    pub company_id: i64,
    pub manager_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Team {
    fn ownership(&self) -> Ownership {
        Ownership::Company(Some(self.company_id))
    }
}

// Vínculo usuário <-> equipe (user_teams)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamMember {
    pub id: i64,
    pub user_id: i64,
    pub team_id: i64,
    #[schema(example = "engineer")]
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for TeamMember {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Team(self.team_id))
    }
}

// Vínculo equipe <-> obra (team_projects)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeamProject {
    pub id: i64,
    pub team_id: i64,
    pub project_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for TeamProject {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Project(self.project_id))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeamPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Equipe de Fundação")]
    pub name: String,
    pub description: Option<String>,
    pub company_id: i64,
    pub manager_id: i64,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateTeamPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    pub company_id: Option<i64>,
    pub manager_id: Option<i64>,
}

impl UpdateTeamPayload {
    pub fn apply(self, team: &mut Team) {
        if let Some(name) = self.name {
            team.name = name;
        }
        self.description.apply_to(&mut team.description);
        if let Some(company_id) = self.company_id {
            team.company_id = company_id;
        }
        if let Some(manager_id) = self.manager_id {
            team.manager_id = manager_id;
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddMemberPayload {
    pub user_id: i64,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "engineer")]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMemberPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "architect")]
    pub role: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTeamPayload {
    pub team_id: i64,
}
