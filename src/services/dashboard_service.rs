// src/services/dashboard_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    middleware::tenancy::TenantScope,
    models::{
        dashboard::{DashboardSummary, RecentActivities},
        project::Project,
    },
};

const MAX_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn get_summary(&self, scope: &TenantScope) -> Result<DashboardSummary, AppError> {
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(DashboardSummary::empty());
        }
        self.repo.get_summary(&self.pool, filter.bind_value()).await
    }

    /// Cada tabela traz até `limit` linhas; a linha do tempo mescla as três.
    pub async fn recent_activities(&self, scope: &TenantScope, limit: i64) -> Result<RecentActivities, AppError> {
        let limit = limit.clamp(0, MAX_LIMIT);
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(RecentActivities::new(Vec::new(), Vec::new(), Vec::new(), 0));
        }
        let company_id = filter.bind_value();

        let leads = self.repo.recent_leads(&self.pool, company_id, limit).await?;
        let contracts = self.repo.recent_contracts(&self.pool, company_id, limit).await?;
        let expenses = self.repo.recent_expenses(&self.pool, company_id, limit).await?;

        Ok(RecentActivities::new(leads, contracts, expenses, limit as usize))
    }

    pub async fn active_projects(&self, scope: &TenantScope, limit: i64) -> Result<Vec<Project>, AppError> {
        let filter = scope.company_filter();
        if filter.is_nothing() {
            return Ok(Vec::new());
        }
        self.repo
            .active_projects(&self.pool, filter.bind_value(), limit.clamp(0, MAX_LIMIT))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn service() -> DashboardService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nobody@127.0.0.1:1/none")
            .unwrap();
        DashboardService::new(DashboardRepository::new(), pool)
    }

    fn companyless() -> TenantScope {
        TenantScope { user_id: 7, company_id: None, is_superuser: false }
    }

    // Sem empresa nada é consultado: o pool aponta para lugar nenhum.
    #[tokio::test]
    async fn companyless_user_gets_zeroed_summary() {
        let summary = service().get_summary(&companyless()).await.unwrap();
        assert_eq!(summary.projects, 0);
        assert_eq!(summary.lead_status.len(), 7);
        assert!(summary.lead_status.values().all(|n| *n == 0));
        assert_eq!(summary.expense_by_category.len(), 10);
    }

    #[tokio::test]
    async fn companyless_user_gets_no_activity() {
        let svc = service();
        let recent = svc.recent_activities(&companyless(), 10).await.unwrap();
        assert!(recent.timeline.is_empty() && recent.leads.is_empty());
        assert!(svc.active_projects(&companyless(), 10).await.unwrap().is_empty());
    }
}
