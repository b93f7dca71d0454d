pub mod auth;
pub mod company;
pub mod contract;
pub mod crm;
pub mod dashboard;
pub mod finance;
pub mod ownership;
pub mod project;
pub mod property;
pub mod team;
