// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "API de Gestão de Projetos Imobiliários",
        description = "Obras, imóveis, clientes, contratos e despesas de construtoras"
    ),
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::test_token,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_me,
        handlers::users::update_me,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Companies ---
        handlers::companies::list_companies,
        handlers::companies::create_company,
        handlers::companies::get_company,
        handlers::companies::update_company,
        handlers::companies::delete_company,
        handlers::companies::list_company_users,

        // --- Teams ---
        handlers::teams::list_teams,
        handlers::teams::create_team,
        handlers::teams::get_team,
        handlers::teams::update_team,
        handlers::teams::delete_team,
        handlers::teams::list_members,
        handlers::teams::add_member,
        handlers::teams::update_member,
        handlers::teams::remove_member,
        handlers::teams::list_team_projects,

        // --- Projects ---
        handlers::projects::list_projects,
        handlers::projects::create_project,
        handlers::projects::get_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::projects::list_project_teams,
        handlers::projects::assign_team,
        handlers::projects::unassign_team,
        handlers::projects::list_tasks,
        handlers::projects::create_task,
        handlers::projects::update_task,
        handlers::projects::delete_task,
        handlers::projects::list_updates,
        handlers::projects::create_update,

        // --- Properties ---
        handlers::properties::list_properties,
        handlers::properties::list_by_project,
        handlers::properties::list_by_status,
        handlers::properties::create_property,
        handlers::properties::get_property,
        handlers::properties::update_property,
        handlers::properties::delete_property,
        handlers::properties::list_updates,
        handlers::properties::create_update,

        // --- Clients ---
        handlers::crm::list_clients,
        handlers::crm::create_client,
        handlers::crm::get_client,
        handlers::crm::update_client,
        handlers::crm::delete_client,
        handlers::crm::list_client_leads,
        handlers::crm::list_client_contracts,

        // --- Leads ---
        handlers::crm::list_leads,
        handlers::crm::list_by_property,
        handlers::crm::list_by_assigned,
        handlers::crm::list_by_status,
        handlers::crm::create_lead,
        handlers::crm::get_lead,
        handlers::crm::update_lead,
        handlers::crm::delete_lead,

        // --- Contracts ---
        handlers::contracts::list_contracts,
        handlers::contracts::list_by_property,
        handlers::contracts::create_contract,
        handlers::contracts::get_contract,
        handlers::contracts::update_contract,
        handlers::contracts::delete_contract,
        handlers::documents::list_documents,
        handlers::documents::upload_document,
        handlers::documents::delete_document,

        // --- Expenses ---
        handlers::expenses::list_expenses,
        handlers::expenses::list_by_project,
        handlers::expenses::project_summary,
        handlers::expenses::list_by_property,
        handlers::expenses::create_expense,
        handlers::expenses::get_expense,
        handlers::expenses::update_expense,
        handlers::expenses::delete_expense,
        handlers::expenses::upload_receipt,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_recent_activities,
        handlers::dashboard::get_active_projects,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::LoginForm,
            models::auth::Token,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::UpdateMePayload,

            // --- Companies / Teams ---
            models::company::Company,
            models::company::CreateCompanyPayload,
            models::company::UpdateCompanyPayload,
            models::team::Team,
            models::team::TeamMember,
            models::team::TeamProject,
            models::team::CreateTeamPayload,
            models::team::UpdateTeamPayload,
            models::team::AddMemberPayload,
            models::team::UpdateMemberPayload,
            models::team::AssignTeamPayload,

            // --- Projects ---
            models::project::ProjectStatus,
            models::project::Project,
            models::project::ProjectTask,
            models::project::ProjectUpdate,
            models::project::CreateProjectPayload,
            models::project::UpdateProjectPayload,
            models::project::CreateTaskPayload,
            models::project::UpdateTaskPayload,
            models::project::CreateProjectUpdatePayload,

            // --- Properties ---
            models::property::PropertyType,
            models::property::PropertyStatus,
            models::property::Property,
            models::property::PropertyUpdate,
            models::property::CreatePropertyPayload,
            models::property::UpdatePropertyPayload,
            models::property::CreatePropertyUpdatePayload,

            // --- CRM ---
            models::crm::ClientType,
            models::crm::Client,
            models::crm::CreateClientPayload,
            models::crm::UpdateClientPayload,
            models::crm::LeadStatus,
            models::crm::Lead,
            models::crm::CreateLeadPayload,
            models::crm::UpdateLeadPayload,

            // --- Contracts ---
            models::contract::ContractType,
            models::contract::ContractStatus,
            models::contract::Contract,
            models::contract::ContractDocument,
            models::contract::CreateContractPayload,
            models::contract::UpdateContractPayload,
            models::contract::DocumentUploadForm,

            // --- Finance ---
            models::finance::ExpenseCategory,
            models::finance::Expense,
            models::finance::CategoryTotal,
            models::finance::ExpenseSummary,
            models::finance::CreateExpensePayload,
            models::finance::UpdateExpensePayload,
            models::finance::ReceiptUploadForm,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::RecentActivities,
            models::dashboard::ActivityKind,
            models::dashboard::ActivityEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Login e validação de token"),
        (name = "Users", description = "Usuários e perfil"),
        (name = "Companies", description = "Construtoras (tenants)"),
        (name = "Teams", description = "Equipes e membros"),
        (name = "Projects", description = "Obras, tarefas e notas de andamento"),
        (name = "Properties", description = "Imóveis das obras"),
        (name = "Clients", description = "Clientes"),
        (name = "Leads", description = "Funil de vendas"),
        (name = "Contracts", description = "Contratos e anexos"),
        (name = "Expenses", description = "Despesas e recibos"),
        (name = "Dashboard", description = "Indicadores gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_bearer_scheme_and_core_paths() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().unwrap();
        assert!(components.security_schemes.contains_key("api_jwt"));
        assert!(doc.paths.paths.contains_key("/api/v1/login/access-token"));
        assert!(doc.paths.paths.contains_key("/api/v1/contracts/{id}/documents"));
        assert!(doc.paths.paths.contains_key("/api/v1/dashboard/summary"));
    }
}
