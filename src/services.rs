pub mod access;
pub mod auth;
pub mod storage;
pub mod company_service;
pub mod user_service;
pub mod team_service;
pub mod project_service;
pub mod property_service;
pub mod crm_service;
pub mod contract_service;
pub mod finance_service;
pub mod dashboard_service;

#[cfg(test)]
pub mod fixtures;
