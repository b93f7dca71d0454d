// src/config.rs

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, path::PathBuf, time::Duration};

use crate::{
    db::{DashboardRepository, OwnershipRepository, UserRepository},
    services::{
        access::AccessService,
        auth::{AuthService, TokenService},
        company_service::CompanyService,
        contract_service::ContractService,
        crm_service::CrmService,
        dashboard_service::DashboardService,
        finance_service::FinanceService,
        project_service::ProjectService,
        property_service::PropertyService,
        storage::StorageService,
        team_service::TeamService,
        user_service::UserService,
    },
};

const DEFAULT_EXPIRE_MINUTES: i64 = 60 * 24 * 8; // 8 dias
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Configuração lida uma vez na subida (variáveis de ambiente / `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub api_prefix: String,
    pub upload_dir: PathBuf,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub max_upload_bytes: usize,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a partir de qualquer fonte chave -> valor (testável sem mexer no ambiente).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL deve ser definida"))?;
        let secret_key = get("SECRET_KEY")
            .or_else(|| get("JWT_SECRET"))
            .ok_or_else(|| anyhow!("SECRET_KEY (ou JWT_SECRET) deve ser definida"))?;

        let access_token_expire_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(v) => v.parse().context("ACCESS_TOKEN_EXPIRE_MINUTES inválido")?,
            None => DEFAULT_EXPIRE_MINUTES,
        };
        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DB_MAX_CONNECTIONS inválido")?,
            None => 5,
        };
        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => v.parse().context("MAX_UPLOAD_BYTES inválido")?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let mut api_prefix = get("API_V1_STR").unwrap_or_else(|| "/api/v1".to_string());
        if !api_prefix.starts_with('/') {
            api_prefix.insert(0, '/');
        }
        let api_prefix = api_prefix.trim_end_matches('/').to_string();

        Ok(Self {
            database_url,
            secret_key,
            access_token_expire_minutes,
            api_prefix,
            upload_dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "./uploads".to_string())),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            db_max_connections,
            max_upload_bytes,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub company_service: CompanyService,
    pub team_service: TeamService,
    pub project_service: ProjectService,
    pub property_service: PropertyService,
    pub crm_service: CrmService,
    pub contract_service: ContractService,
    pub finance_service: FinanceService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, settings))
    }

    /// Monta o gráfico de dependências em cima de um pool já criado.
    pub fn with_pool(db_pool: PgPool, settings: Settings) -> Self {
        let access = AccessService::new(OwnershipRepository::new());
        let storage = StorageService::new(settings.upload_dir.clone());
        let tokens = TokenService::new(settings.secret_key.clone(), settings.access_token_expire_minutes);

        Self {
            auth_service: AuthService::new(UserRepository::new(), tokens, db_pool.clone()),
            user_service: UserService::new(access.clone(), db_pool.clone()),
            company_service: CompanyService::new(access.clone(), storage.clone(), db_pool.clone()),
            team_service: TeamService::new(access.clone(), db_pool.clone()),
            project_service: ProjectService::new(access.clone(), storage.clone(), db_pool.clone()),
            property_service: PropertyService::new(access.clone(), storage.clone(), db_pool.clone()),
            crm_service: CrmService::new(access.clone(), db_pool.clone()),
            contract_service: ContractService::new(access.clone(), storage.clone(), db_pool.clone()),
            finance_service: FinanceService::new(access, storage, db_pool.clone()),
            dashboard_service: DashboardService::new(DashboardRepository::new(), db_pool.clone()),
            db_pool,
            settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let s = Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("SECRET_KEY", "k")])).unwrap();
        assert_eq!(s.access_token_expire_minutes, 11520);
        assert_eq!(s.api_prefix, "/api/v1");
        assert_eq!(s.upload_dir, PathBuf::from("./uploads"));
        assert_eq!(s.bind_addr, "0.0.0.0:8000");
        assert_eq!(s.db_max_connections, 5);
        assert_eq!(s.max_upload_bytes, 20 * 1024 * 1024);
    }

    #[test]
    fn accepts_jwt_secret_alias_and_normalizes_prefix() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "legacy"),
            ("API_V1_STR", "api/v2/"),
            ("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
        ]))
        .unwrap();
        assert_eq!(s.secret_key, "legacy");
        assert_eq!(s.api_prefix, "/api/v2");
        assert_eq!(s.access_token_expire_minutes, 30);
    }

    #[test]
    fn missing_or_invalid_values_fail() {
        assert!(Settings::from_lookup(lookup(&[("SECRET_KEY", "k")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).is_err());
        assert!(Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("SECRET_KEY", "k"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ]))
        .is_err());
    }
}
