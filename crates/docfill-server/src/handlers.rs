//! HTTP request handlers for the server.
//!
//! Implements upload, status polling, template generation and health check
//! endpoints using axum.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use docfill_domain::{TaskId, TaskRecord};
use docfill_extractor::{fill_template, ExtractionWorker, ExtractorError, Replacement};
use docfill_llm::AnyProvider;
use docfill_store::AnyTaskStore;
use crate::documents::DocumentCache;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

/// Name of the multipart part carrying the document
pub const DOCUMENT_PART: &str = "document";

/// Filename suggested for generated documents
pub const GENERATED_FILENAME: &str = "updated_document.txt";

/// Uploaded document text, kept for substitution
pub type DocumentMap = Arc<RwLock<DocumentCache>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Submits and reports on extraction tasks
    pub worker: ExtractionWorker<AnyProvider, AnyTaskStore>,
    /// Uploaded documents by task id
    pub documents: DocumentMap,
    /// Model label reported by the health check
    pub provider: String,
}

impl AppState {
    /// Create state with an empty document map of the default capacity
    pub fn new(worker: ExtractionWorker<AnyProvider, AnyTaskStore>, provider: impl Into<String>) -> Self {
        Self {
            worker,
            documents: Arc::new(RwLock::new(DocumentCache::default())),
            provider: provider.into(),
        }
    }

    /// Retain at most `max_documents` uploads for `/generate`
    pub fn with_max_documents(mut self, max_documents: usize) -> Self {
        self.documents = Arc::new(RwLock::new(DocumentCache::new(max_documents)));
        self
    }
}

/// Upload acknowledgement
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Id to poll `/status/{task_id}` with
    pub task_id: TaskId,
}

/// Template generation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    /// Task whose uploaded document is the template
    pub task_id: TaskId,
    /// Values to substitute
    pub fields: Vec<Replacement>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Configured model provider
    pub provider: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The request itself is unusable
    BadRequest(String),
    /// Referenced resource does not exist
    NotFound(String),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        AppError::InternalError(e.to_string())
    }
}

/// POST /upload - Accept a document and start extraction
///
/// Responds `202 Accepted` with the task id before the model is called.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut document = None;
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if part.name() == Some(DOCUMENT_PART) {
            let bytes = part
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            document = Some(bytes);
            break;
        }
    }
    let bytes = document.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let text = String::from_utf8_lossy(&bytes).into_owned();
    let handle = state.worker.submit(bytes.to_vec());
    let task_id = handle.task_id;

    let evicted = state
        .documents
        .write()
        .map_err(|e| AppError::InternalError(format!("document map poisoned: {}", e)))?
        .insert(task_id, text);
    for old in evicted {
        info!(task_id = %old, "Evicted oldest uploaded document");
    }

    info!(%task_id, bytes = bytes.len(), "Document accepted");
    Ok((StatusCode::ACCEPTED, Json(UploadResponse { task_id })))
}

/// GET /status/{task_id} - Current task record
async fn status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskRecord>, AppError> {
    let task_id: TaskId = task_id
        .parse()
        .map_err(|e| AppError::BadRequest(format!("Invalid task id: {}", e)))?;

    Ok(Json(state.worker.status(task_id)?))
}

/// POST /generate - Substitute new values into an uploaded document
async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Response, AppError> {
    let filled = {
        let documents = state
            .documents
            .read()
            .map_err(|e| AppError::InternalError(format!("document map poisoned: {}", e)))?;
        let document = documents.get(&request.task_id).ok_or_else(|| {
            warn!(task_id = %request.task_id, "Generate requested for unknown document");
            AppError::NotFound("Document not found".to_string())
        })?;
        fill_template(document, &request.fields)
    };

    info!(task_id = %request.task_id, replacements = request.fields.len(), "Document generated");
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", GENERATED_FILENAME),
            ),
        ],
        filled,
    )
        .into_response())
}

/// GET /health - Liveness and provider
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        provider: state.provider.clone(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState, max_upload_bytes: usize) -> AxumRouter {
    AxumRouter::new()
        .route("/upload", post(upload))
        .route("/status/:task_id", get(status))
        .route("/generate", post(generate))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use docfill_extractor::{ExtractionTask, ExtractorConfig};
    use docfill_llm::MockProvider;
    use docfill_store::MemoryTaskStore;
    use tower::ServiceExt; // for oneshot

    const BOUNDARY: &str = "handlers-boundary";

    fn upload_request(content: &str) -> Request<Body> {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"a.txt\"\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            c = content,
        );
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn create_test_state() -> AppState {
        let task = ExtractionTask::new(
            Arc::new(AnyProvider::Mock(MockProvider::default())),
            Arc::new(AnyTaskStore::Memory(MemoryTaskStore::new())),
            ExtractorConfig::default(),
        )
        .unwrap();
        AppState::new(ExtractionWorker::new(task), "mock")
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = create_router(create_test_state(), 1024);

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_rejects_bad_id() {
        let app = create_router(create_test_state(), 1024);

        let request = Request::builder()
            .uri("/status/not-a-uuid")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_unknown_document() {
        let app = create_router(create_test_state(), 1024);
        let body = format!(r#"{{"taskId":"{}","fields":[]}}"#, TaskId::new());

        let request = Request::builder()
            .method("POST")
            .uri("/generate")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_document_map_stays_bounded() {
        let state = create_test_state().with_max_documents(2);

        for i in 0..5 {
            let app = create_router(state.clone(), 1024);
            let response = app
                .oneshot(upload_request(&format!("letter {}", i)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
            assert!(state.documents.read().unwrap().len() <= 2);
        }

        assert_eq!(state.documents.read().unwrap().len(), 2);
    }
}
