// src/models/project.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::common::patch::Patch;
use crate::models::ownership::{Owned, Ownership, TenantRef};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planning,
        ProjectStatus::InProgress,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Cancelled,
    ];
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Project {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Residencial Jardim das Flores")]
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    #[schema(example = 5400.0)]
    pub total_area: Option<f64>,
    #[schema(value_type = Option<f64>, example = 2500000.0)]
    pub budget: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub company_id: i64,
    pub manager_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Project {
    fn ownership(&self) -> Ownership {
        Ownership::Company(Some(self.company_id))
    }
}

// Tarefa do cronograma da obra
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProjectTask {
    pub id: i64,
    #[schema(example = "Concretagem da laje")]
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[schema(example = "pending")]
    pub status: String,
    pub project_id: i64,
    pub assignee_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for ProjectTask {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Project(self.project_id))
    }
}

// Nota de andamento da obra
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ProjectUpdate {
    pub id: i64,
    #[schema(example = "Fundação concluída")]
    pub title: String,
    pub content: String,
    pub project_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for ProjectUpdate {
    fn ownership(&self) -> Ownership {
        Ownership::Via(TenantRef::Project(self.project_id))
    }
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Residencial Jardim das Flores")]
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    #[validate(range(min = 0.0, message = "Area must be positive"))]
    pub total_area: Option<f64>,
    #[schema(value_type = Option<f64>)]
    pub budget: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub expected_end_date: Option<NaiveDate>,
    pub actual_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub company_id: i64,
    pub manager_id: i64,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateProjectPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub address: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub city: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub state: Patch<String>,
    #[schema(value_type = Option<String>)]
    pub zip_code: Patch<String>,
    #[schema(value_type = Option<f64>)]
    pub total_area: Patch<f64>,
    #[schema(value_type = Option<f64>)]
    pub budget: Patch<Decimal>,
    #[schema(value_type = Option<NaiveDate>)]
    pub start_date: Patch<NaiveDate>,
    #[schema(value_type = Option<NaiveDate>)]
    pub expected_end_date: Patch<NaiveDate>,
    #[schema(value_type = Option<NaiveDate>)]
    pub actual_end_date: Patch<NaiveDate>,
    pub status: Option<ProjectStatus>,
    pub company_id: Option<i64>,
    pub manager_id: Option<i64>,
}

impl UpdateProjectPayload {
    pub fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        self.description.apply_to(&mut project.description);
        self.address.apply_to(&mut project.address);
        self.city.apply_to(&mut project.city);
        self.state.apply_to(&mut project.state);
        self.zip_code.apply_to(&mut project.zip_code);
        self.total_area.apply_to(&mut project.total_area);
        self.budget.apply_to(&mut project.budget);
        self.start_date.apply_to(&mut project.start_date);
        self.expected_end_date.apply_to(&mut project.expected_end_date);
        self.actual_end_date.apply_to(&mut project.actual_end_date);
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(company_id) = self.company_id {
            project.company_id = company_id;
        }
        if let Some(manager_id) = self.manager_id {
            project.manager_id = manager_id;
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTaskPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Concretagem da laje")]
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub assignee_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct UpdateTaskPayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: Option<String>,
    #[schema(value_type = Option<String>)]
    pub description: Patch<String>,
    #[schema(value_type = Option<NaiveDate>)]
    pub start_date: Patch<NaiveDate>,
    #[schema(value_type = Option<NaiveDate>)]
    pub end_date: Patch<NaiveDate>,
    pub status: Option<String>,
    #[schema(value_type = Option<i64>)]
    pub assignee_id: Patch<i64>,
}

impl UpdateTaskPayload {
    pub fn apply(self, task: &mut ProjectTask) {
        if let Some(title) = self.title {
            task.title = title;
        }
        self.description.apply_to(&mut task.description);
        self.start_date.apply_to(&mut task.start_date);
        self.end_date.apply_to(&mut task.end_date);
        if let Some(status) = self.status {
            task.status = status;
        }
        self.assignee_id.apply_to(&mut task.assignee_id);
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProjectUpdatePayload {
    #[validate(length(min = 1, message = "required"))]
    pub title: String,
    #[validate(length(min = 1, message = "required"))]
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        let s: ProjectStatus = serde_json::from_str(r#""in_progress""#).unwrap();
        assert_eq!(s, ProjectStatus::InProgress);
        assert_eq!(serde_json::to_string(&ProjectStatus::OnHold).unwrap(), r#""on_hold""#);
    }

    #[test]
    fn update_merges_only_present_fields() {
        let mut task = ProjectTask {
            id: 1,
            title: "Alvenaria".into(),
            description: Some("bloco 1".into()),
            start_date: None,
            end_date: None,
            status: "pending".into(),
            project_id: 3,
            assignee_id: Some(7),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let patch: UpdateTaskPayload =
            serde_json::from_str(r#"{"status": "done", "assignee_id": null}"#).unwrap();
        patch.apply(&mut task);

        assert_eq!(task.status, "done");
        assert_eq!(task.assignee_id, None);
        assert_eq!(task.title, "Alvenaria");
        assert_eq!(task.description.as_deref(), Some("bloco 1"));
    }
}
