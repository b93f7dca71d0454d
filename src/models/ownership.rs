// src/models/ownership.rs
//
// Cadeia de posse: todo registro abaixo de Company chega a exatamente
// uma empresa, seja por `company_id` direto ou através do registro pai.

/// Referência a um registro cuja empresa pode ser resolvida no banco.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantRef {
    Company(i64),
    User(i64),
    Team(i64),
    Project(i64),
    Property(i64),
    Client(i64),
    Lead(i64),
    Contract(i64),
    Expense(i64),
}

impl TenantRef {
    /// Nome usado nas mensagens de "X not found".
    pub fn label(&self) -> &'static str {
        match self {
            TenantRef::Company(_) => "Company",
            TenantRef::User(_) => "User",
            TenantRef::Team(_) => "Team",
            TenantRef::Project(_) => "Project",
            TenantRef::Property(_) => "Property",
            TenantRef::Client(_) => "Client",
            TenantRef::Lead(_) => "Lead",
            TenantRef::Contract(_) => "Contract",
            TenantRef::Expense(_) => "Expense",
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            TenantRef::Company(id)
            | TenantRef::User(id)
            | TenantRef::Team(id)
            | TenantRef::Project(id)
            | TenantRef::Property(id)
            | TenantRef::Client(id)
            | TenantRef::Lead(id)
            | TenantRef::Contract(id)
            | TenantRef::Expense(id) => id,
        }
    }
}

/// Como um registro já carregado chega à sua empresa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// O próprio registro carrega o `company_id` (usuários podem não ter empresa).
    Company(Option<i64>),
    /// A empresa é a do registro pai.
    Via(TenantRef),
}

pub trait Owned {
    fn ownership(&self) -> Ownership;
}
