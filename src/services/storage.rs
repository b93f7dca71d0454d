// src/services/storage.rs

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::common::error::AppError;

/// Pasta de primeiro nível de cada tipo de arquivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    ContractDocument,
    Receipt,
}

impl BlobKind {
    fn folder(&self) -> &'static str {
        match self {
            BlobKind::ContractDocument => "contracts",
            BlobKind::Receipt => "expenses",
        }
    }
}

/// Armazenamento em disco local. O banco guarda só o caminho relativo,
/// e a escrita não participa da transação.
#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Grava em `{kind}/{YYYY}/{MM}/{entity_id}/{uuid}-{nome}` e devolve esse caminho.
    pub async fn save(&self, kind: BlobKind, entity_id: i64, filename: &str, bytes: &[u8]) -> Result<String, AppError> {
        let relative = format!(
            "{}/{}/{}/{}-{}",
            kind.folder(),
            Utc::now().format("%Y/%m"),
            entity_id,
            Uuid::new_v4(),
            sanitize_filename(filename)
        );

        let full = self.root.join(&relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;

        tracing::info!("📎 Arquivo salvo em {} ({} bytes)", relative, bytes.len());
        Ok(relative)
    }

    /// Falha ao apagar só vira log: o registro no banco é a fonte da verdade.
    pub async fn remove_best_effort(&self, relative: &str) {
        let full = self.root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&full).await {
            tracing::warn!("⚠️ Não foi possível remover o arquivo {}: {}", full.display(), e);
        }
    }

    pub async fn remove_all_best_effort(&self, paths: &[String]) {
        for path in paths {
            self.remove_best_effort(path).await;
        }
    }
}

/// Mantém só o último componente do nome enviado pelo cliente.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    match base {
        "" | "." | ".." => "file".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_directories_from_uploaded_names() {
        assert_eq!(sanitize_filename("contrato.pdf"), "contrato.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\ana\\nota fiscal.png"), "nota fiscal.png");
        assert_eq!(sanitize_filename("pasta/"), "file");
        assert_eq!(sanitize_filename(".."), "file");
    }

    #[tokio::test]
    async fn saves_under_kind_date_and_entity() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());

        let path = storage
            .save(BlobKind::ContractDocument, 12, "escritura.pdf", b"%PDF-1.4")
            .await
            .unwrap();

        let prefix = format!("contracts/{}/12/", Utc::now().format("%Y/%m"));
        assert!(path.starts_with(&prefix), "{}", path);
        assert!(path.ends_with("-escritura.pdf"));
        assert_eq!(tokio::fs::read(dir.path().join(&path)).await.unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn receipts_go_to_the_expenses_folder() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());
        let path = storage.save(BlobKind::Receipt, 3, "nf.jpg", b"jpg").await.unwrap();
        assert!(path.starts_with("expenses/"));
    }

    #[tokio::test]
    async fn removal_is_best_effort() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageService::new(dir.path());
        let path = storage.save(BlobKind::Receipt, 1, "a.txt", b"x").await.unwrap();

        storage.remove_best_effort(&path).await;
        assert!(!dir.path().join(&path).exists());

        // Segunda remoção não encontra o arquivo e apenas registra o aviso
        storage.remove_best_effort(&path).await;
        storage.remove_all_best_effort(&["nao/existe.pdf".to_string()]).await;
    }
}
