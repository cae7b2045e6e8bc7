use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;
use validator::Validate;

use crate::document::{ContentLoader, InputType, SourceHandle};
use crate::error::{GenerationError, LoadError, SessionError};
use crate::providers::traits::CompletionProvider;
use crate::session::{SessionController, Stage};

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Bounds on what the HTTP layer keeps and serves at once.
#[derive(Debug, Clone)]
pub struct ApiLimits {
    /// Sessions idle for this long are dropped.
    pub session_ttl: Duration,
    pub max_sessions: usize,
    /// Shared by every route.
    pub max_concurrent_requests: usize,
}

impl Default for ApiLimits {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(60 * 60),
            max_sessions: 1000,
            max_concurrent_requests: 64,
        }
    }
}

struct SessionEntry {
    created_at: DateTime<Utc>,
    last_active_ms: AtomicI64,
    controller: Mutex<SessionController>,
}

impl SessionEntry {
    fn touch(&self) {
        self.last_active_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    fn is_expired(&self, ttl: Duration, now_ms: i64) -> bool {
        let idle_ms = now_ms - self.last_active_ms.load(Ordering::Relaxed);
        idle_ms >= 0 && idle_ms as u128 >= ttl.as_millis()
    }
}

#[derive(Clone)]
pub struct AppState {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<SessionEntry>>>>,
    loader: ContentLoader,
    provider: Arc<dyn CompletionProvider>,
    limits: ApiLimits,
}

impl AppState {
    /// Drops idle sessions; returns how many remain.
    async fn evict_expired(&self) -> usize {
        let now_ms = Utc::now().timestamp_millis();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(self.limits.session_ttl, now_ms));
        if sessions.len() < before {
            log::info!("Evicted {} idle sessions", before - sessions.len());
        }
        sessions.len()
    }
}

#[derive(Deserialize)]
pub struct InputTypeRequest {
    input_type: InputType,
}

#[derive(Deserialize, Validate)]
pub struct UrlRequest {
    #[validate(length(min = 1, max = 2048))]
    url: String,
}

#[derive(Deserialize, Validate)]
pub struct QuestionRequest {
    #[validate(length(min = 1))]
    question: String,
}

#[derive(Serialize)]
pub struct SessionView {
    session_id: Uuid,
    created_at: DateTime<Utc>,
    stage: Stage,
    input_type: Option<InputType>,
    has_source: bool,
    question: Option<String>,
    answer: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
pub struct AnswerResponse {
    stage: Stage,
    question: String,
    answer: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    error_kind: String,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<Stage>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    model: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn error_response(
    status: StatusCode,
    error_kind: &str,
    error: String,
    stage: Option<Stage>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error_kind: error_kind.to_string(),
            error,
            stage,
        }),
    )
}

fn session_error(err: SessionError, stage: Stage) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        SessionError::NotReady(_) => StatusCode::CONFLICT,
        SessionError::InvalidSource(_) => StatusCode::BAD_REQUEST,
        SessionError::Load(LoadError::NetworkError(_)) => StatusCode::BAD_GATEWAY,
        SessionError::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Generation(GenerationError::BackendUnreachable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        SessionError::Generation(GenerationError::BackendError(_)) => StatusCode::BAD_GATEWAY,
    };
    error_response(status, &err.kind_name(), err.to_string(), Some(stage))
}

/// Create and configure the API router
pub fn create_api(loader: ContentLoader, provider: Arc<dyn CompletionProvider>) -> Router {
    create_api_with_limits(loader, provider, ApiLimits::default())
}

pub fn create_api_with_limits(
    loader: ContentLoader,
    provider: Arc<dyn CompletionProvider>,
    limits: ApiLimits,
) -> Router {
    let concurrency = GlobalConcurrencyLimitLayer::new(limits.max_concurrent_requests);
    let state = AppState {
        sessions: Arc::new(RwLock::new(HashMap::new())),
        loader,
        provider,
        limits,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/input-type", post(input_type_handler))
        .route("/sessions/:id/upload", post(upload_handler))
        .route("/sessions/:id/url", post(url_handler))
        .route("/sessions/:id/question", post(question_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(concurrency)
        .layer(cors)
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Response {
    let model = state
        .provider
        .get_model_info()
        .await
        .unwrap_or_else(|_| "unknown".to_string());

    Json(HealthResponse {
        status: "Server is running and healthy".to_string(),
        model,
    })
    .into_response()
}

async fn find_session(
    state: &AppState,
    id: Uuid,
) -> Result<Arc<SessionEntry>, (StatusCode, Json<ErrorResponse>)> {
    state.evict_expired().await;

    let entry = state.sessions.read().await.get(&id).cloned().ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            "SessionNotFound",
            format!("No session with id {}", id),
            None,
        )
    })?;
    entry.touch();
    Ok(entry)
}

fn view(id: Uuid, entry: &SessionEntry, controller: &SessionController) -> SessionView {
    let context = controller.context();
    SessionView {
        session_id: id,
        created_at: entry.created_at,
        stage: context.stage,
        input_type: context.input_type,
        has_source: context.source.is_some(),
        question: context.question.clone(),
        answer: context.last_answer.clone(),
        error: context.last_error.clone(),
    }
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), (StatusCode, Json<ErrorResponse>)> {
    if state.evict_expired().await >= state.limits.max_sessions {
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "TooManySessions",
            format!("Session limit of {} reached, try again later", state.limits.max_sessions),
            None,
        ));
    }

    let id = Uuid::new_v4();
    let created_at = Utc::now();
    let entry = Arc::new(SessionEntry {
        created_at,
        last_active_ms: AtomicI64::new(created_at.timestamp_millis()),
        controller: Mutex::new(SessionController::new(
            state.loader.clone(),
            state.provider.clone(),
        )),
    });

    let session = {
        let controller = entry.controller.lock().await;
        view(id, &entry, &controller)
    };
    state.sessions.write().await.insert(id, entry);
    log::info!("Created session {}", id);

    Ok((StatusCode::CREATED, Json(session)))
}

async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<SessionView> {
    let entry = find_session(&state, id).await?;
    let controller = entry.controller.lock().await;
    Ok(Json(view(id, &entry, &controller)))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    match state.sessions.write().await.remove(&id) {
        Some(_) => {
            log::info!("Deleted session {}", id);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn input_type_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<InputTypeRequest>,
) -> ApiResult<SessionView> {
    let entry = find_session(&state, id).await?;
    let mut controller = entry.controller.lock().await;
    controller.select_input_type(request.input_type);
    Ok(Json(view(id, &entry, &controller)))
}

async fn upload_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<SessionView> {
    let entry = find_session(&state, id).await?;
    let mut controller = entry.controller.lock().await;
    controller
        .provide_source(SourceHandle::Upload(body.to_vec()))
        .map_err(|e| session_error(e, controller.stage()))?;
    Ok(Json(view(id, &entry, &controller)))
}

async fn url_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UrlRequest>,
) -> ApiResult<SessionView> {
    request.validate().map_err(|e| {
        error_response(StatusCode::BAD_REQUEST, "InvalidSource", e.to_string(), None)
    })?;

    let entry = find_session(&state, id).await?;
    let mut controller = entry.controller.lock().await;
    controller
        .provide_source(SourceHandle::Url(request.url))
        .map_err(|e| session_error(e, controller.stage()))?;
    Ok(Json(view(id, &entry, &controller)))
}

async fn question_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<QuestionRequest>,
) -> ApiResult<AnswerResponse> {
    // Length >= 1 is the only rule, so a failure means an empty question.
    request.validate().map_err(|_| {
        error_response(StatusCode::BAD_REQUEST, "NotReady", "Enter a question.".to_string(), None)
    })?;

    let entry = find_session(&state, id).await?;
    let mut controller = entry.controller.lock().await;
    match controller.ask(&request.question).await {
        Ok(answer) => Ok(Json(AnswerResponse {
            stage: controller.stage(),
            question: request.question.trim().to_string(),
            answer,
        })),
        Err(e) => Err(session_error(e, controller.stage())),
    }
}
