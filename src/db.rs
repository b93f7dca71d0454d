pub mod user_repo;
pub use user_repo::UserRepository;
pub mod ownership_repo;
pub use ownership_repo::OwnershipRepository;
pub mod attachment_repo;
pub use attachment_repo::AttachmentRepository;
pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod team_repo;
pub use team_repo::TeamRepository;
pub mod project_repo;
pub use project_repo::ProjectRepository;
pub mod property_repo;
pub use property_repo::PropertyRepository;
pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod contract_repo;
pub use contract_repo::ContractRepository;
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
