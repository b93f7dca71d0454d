// src/db/attachment_repo.rs

use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::ownership::TenantRef};

/// Caminhos de arquivos (anexos de contrato e recibos) guardados abaixo de
/// um registro. Coletados antes do DELETE em cascata para que o disco possa
/// ser limpo depois do commit.
#[derive(Clone, Default)]
pub struct AttachmentRepository;

impl AttachmentRepository {
    pub fn new() -> Self {
        Self
    }

    fn paths_query(root: &TenantRef) -> Option<&'static str> {
        let sql = match root {
            TenantRef::Company(_) => {
                r#"
                SELECT d.file_path FROM contract_documents d
                JOIN contracts ct ON ct.id = d.contract_id
                JOIN properties pr ON pr.id = ct.property_id
                JOIN projects p ON p.id = pr.project_id
                WHERE p.company_id = $1
                UNION ALL
                SELECT e.receipt_path FROM expenses e
                JOIN projects p ON p.id = e.project_id
                WHERE p.company_id = $1 AND e.receipt_path IS NOT NULL
                "#
            }
            TenantRef::Project(_) => {
                r#"
                SELECT d.file_path FROM contract_documents d
                JOIN contracts ct ON ct.id = d.contract_id
                JOIN properties pr ON pr.id = ct.property_id
                WHERE pr.project_id = $1
                UNION ALL
                SELECT receipt_path FROM expenses
                WHERE project_id = $1 AND receipt_path IS NOT NULL
                "#
            }
            TenantRef::Property(_) => {
                r#"
                SELECT d.file_path FROM contract_documents d
                JOIN contracts ct ON ct.id = d.contract_id
                WHERE ct.property_id = $1
                UNION ALL
                SELECT receipt_path FROM expenses
                WHERE property_id = $1 AND receipt_path IS NOT NULL
                "#
            }
            TenantRef::Contract(_) => "SELECT file_path FROM contract_documents WHERE contract_id = $1",
            TenantRef::Expense(_) => {
                "SELECT receipt_path FROM expenses WHERE id = $1 AND receipt_path IS NOT NULL"
            }
            // Demais registros não têm arquivos abaixo deles
            _ => return None,
        };
        Some(sql)
    }

    pub async fn stored_paths<'e, E>(&self, executor: E, root: TenantRef) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let Some(sql) = Self::paths_query(&root) else {
            return Ok(Vec::new());
        };
        let paths: Vec<String> = sqlx::query_scalar(sql)
            .bind(root.id())
            .fetch_all(executor)
            .await?;
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_with_files_cover_documents_and_receipts() {
        for root in [TenantRef::Company(1), TenantRef::Project(1), TenantRef::Property(1)] {
            let sql = AttachmentRepository::paths_query(&root).unwrap();
            assert!(sql.contains("contract_documents"));
            assert!(sql.contains("receipt_path"));
        }
    }

    #[test]
    fn records_without_files_skip_the_query() {
        assert!(AttachmentRepository::paths_query(&TenantRef::Team(1)).is_none());
        assert!(AttachmentRepository::paths_query(&TenantRef::Lead(1)).is_none());
    }
}
