use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::routes::error_status;
use crate::api::state::AppState;
use crate::application::IngestionReport;
use crate::domain::ports::SearchParams;
use crate::domain::Document;

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub name: String,
    /// Plain text already extracted from the uploaded file; extraction is the
    /// uploader's concern.
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: Uuid,
    pub name: String,
    pub summary: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            summary: doc.summary,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateDocumentResponse {
    pub document: DocumentResponse,
    pub ingestion: IngestionReport,
}

#[derive(Debug, Deserialize)]
pub struct SearchDocumentRequest {
    pub query: String,
    pub top_k: Option<usize>,
    pub min_similarity: Option<f32>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub content: String,
    pub score: f32,
}

pub async fn create_document(
    State(state): State<AppState>,
    Json(request): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<CreateDocumentResponse>), StatusCode> {
    let (doc, report) = state
        .document_service
        .register(&request.name, &request.content)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, retryable = e.is_retryable(), "Failed to create document");
            error_status(&e)
        })?;

    Ok((
        StatusCode::CREATED,
        Json(CreateDocumentResponse {
            document: DocumentResponse::from(doc),
            ingestion: report,
        }),
    ))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, StatusCode> {
    match state.document_service.get(id).await {
        Ok(Some(doc)) => Ok(Json(DocumentResponse::from(doc))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!(error = %e, "Failed to get document");
            Err(error_status(&e))
        }
    }
}

pub async fn list_documents(
    State(state): State<AppState>,
) -> Result<Json<Vec<DocumentResponse>>, StatusCode> {
    match state.document_service.list().await {
        Ok(docs) => Ok(Json(docs.into_iter().map(DocumentResponse::from).collect())),
        Err(e) => {
            tracing::error!(error = %e, "Failed to list documents");
            Err(error_status(&e))
        }
    }
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    match state.document_service.delete(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => {
            tracing::error!(error = %e, "Failed to delete document");
            Err(error_status(&e))
        }
    }
}

pub async fn search_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchDocumentRequest>,
) -> Result<Json<Vec<SearchResultResponse>>, StatusCode> {
    let defaults = &state.config.retrieval;
    let params = SearchParams {
        top_k: request.top_k.unwrap_or(defaults.top_k),
        min_similarity: request.min_similarity.unwrap_or(defaults.min_similarity),
    };

    match state
        .rag_service
        .retrieve_with(id, &request.query, params)
        .await
    {
        Ok(results) => Ok(Json(
            results
                .into_iter()
                .map(|r| SearchResultResponse {
                    chunk_id: r.chunk.id,
                    document_id: r.chunk.document_id,
                    content: r.chunk.content,
                    score: r.score,
                })
                .collect(),
        )),
        Err(e) => {
            tracing::error!(error = %e, "Search failed");
            Err(error_status(&e))
        }
    }
}
