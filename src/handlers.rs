pub mod auth;
pub mod users;
pub mod companies;
pub mod teams;
pub mod projects;
pub mod properties;
pub mod crm;
pub mod contracts;
pub mod documents;
pub mod expenses;
pub mod dashboard;
