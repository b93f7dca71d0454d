// src/handlers/documents.rs

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantScope,
    models::contract::{ContractDocument, DocumentUploadForm},
    services::contract_service::UploadedFile,
};

/// Lê o multipart `file` + `description` (opcional). Campos extras são ignorados.
pub async fn read_upload(mut multipart: Multipart) -> Result<(Option<String>, UploadedFile), AppError> {
    let mut description = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("description") => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    description = Some(text);
                }
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| "upload".to_string());
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?.to_vec();
                file = Some(UploadedFile { filename, content_type, bytes });
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadUpload("The 'file' field is required".to_string()))?;
    if file.bytes.is_empty() {
        return Err(AppError::BadUpload("The uploaded file is empty".to_string()));
    }
    Ok((description, file))
}

// GET /contracts/{id}/documents
#[utoipa::path(
    get,
    path = "/api/v1/contracts/{id}/documents",
    tag = "Contracts",
    params(("id" = i64, Path, description = "ID do contrato")),
    responses((status = 200, description = "Anexos do contrato", body = Vec<ContractDocument>)),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let documents = app_state.contract_service.list_documents(&scope, id).await?;
    Ok(Json(documents))
}

// POST /contracts/{id}/documents
#[utoipa::path(
    post,
    path = "/api/v1/contracts/{id}/documents",
    tag = "Contracts",
    params(("id" = i64, Path, description = "ID do contrato")),
    request_body(content = DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Anexo enviado", body = ContractDocument),
        (status = 400, description = "Upload sem arquivo")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_document(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (description, file) = read_upload(multipart).await?;

    let document = app_state
        .contract_service
        .upload_document(&scope, id, description, file)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

// DELETE /contracts/{id}/documents/{document_id}
#[utoipa::path(
    delete,
    path = "/api/v1/contracts/{id}/documents/{document_id}",
    tag = "Contracts",
    params(
        ("id" = i64, Path, description = "ID do contrato"),
        ("document_id" = i64, Path, description = "ID do anexo")
    ),
    responses(
        (status = 200, description = "Anexo removido", body = ContractDocument),
        (status = 400, description = "Anexo de outro contrato")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path((id, document_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let document = app_state.contract_service.delete_document(&scope, id, document_id).await?;
    Ok(Json(document))
}
