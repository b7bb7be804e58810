use std::{any::Any, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use integrations::{
    HttpObjectStorage, JwtSessionProvider, MemoryObjectStorage, ObjectStorage, SessionProvider,
};
use server_api::{create_lead, list_leads, update_lead_status, ApiContext};
use shared::{
    domain::{Lead, NewLead},
    error::{ApiError, ErrorCode},
    protocol::{leads_route, LeadEnvelope, UpdateLeadStatusRequest},
};
use storage::LeadStore;
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod pages;
mod render;

use app_state::AppState;
use config::{load_settings, Settings, DEV_SESSION_SECRET};

/// Room for multipart framing and the text fields on top of the resume.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

type HttpError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    if settings.session_secret == DEV_SESSION_SECRET {
        warn!("using the development session secret; set APP__SESSION_SECRET in production");
    }

    let mut api = ApiContext::new(LeadStore::new(), object_storage(&settings)?);
    api.max_resume_bytes = settings.max_resume_bytes;
    let sessions: Arc<dyn SessionProvider> =
        Arc::new(JwtSessionProvider::new(settings.session_config()));

    let state = AppState { api, sessions };
    let app = build_router(Arc::new(state), settings.max_resume_bytes);

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "lead intake server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn object_storage(settings: &Settings) -> anyhow::Result<Arc<dyn ObjectStorage>> {
    match settings.storage_base_url.as_deref() {
        Some(base_url) => {
            info!(%base_url, "resume uploads go to object storage");
            Ok(Arc::new(HttpObjectStorage::new(
                base_url,
                settings.storage_public_url.as_deref(),
                settings.storage_token.clone(),
            )?))
        }
        None => {
            warn!("no object storage configured; resumes are kept in memory");
            Ok(Arc::new(MemoryObjectStorage::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

fn build_router(state: Arc<AppState>, max_resume_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            leads_route(),
            get(http_list_leads)
                .post(http_create_lead)
                .patch(http_update_lead_status),
        )
        .route("/", get(pages::form_page))
        .route("/submit", post(pages::submit_form))
        .route(pages::LOGIN_PATH, get(pages::login_page).post(pages::login))
        .route("/logout", post(pages::logout))
        .route(pages::CONSOLE_PATH, get(pages::console_page))
        .route("/leads-list/reached-out", post(pages::mark_reached_out))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(
            max_resume_bytes.saturating_add(FORM_OVERHEAD_BYTES),
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(error: ApiError) -> HttpError {
    (status_for(error.code), Json(error))
}

fn malformed_body(rejection: JsonRejection) -> HttpError {
    warn!(error = %rejection, "rejected request body");
    reject(ApiError::new(ErrorCode::Validation, rejection.body_text()))
}

fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("request handler panicked");
    reject(ApiError::internal()).into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_create_lead(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewLead>, JsonRejection>,
) -> Result<(StatusCode, Json<LeadEnvelope>), HttpError> {
    let Json(candidate) = payload.map_err(malformed_body)?;
    let lead = create_lead(&state.api, candidate).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(LeadEnvelope::submitted(lead))))
}

async fn http_list_leads(State(state): State<Arc<AppState>>) -> Json<Vec<Lead>> {
    Json(list_leads(&state.api).await)
}

async fn http_update_lead_status(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UpdateLeadStatusRequest>, JsonRejection>,
) -> Result<Json<LeadEnvelope>, HttpError> {
    let Json(request) = payload.map_err(malformed_body)?;
    let lead = update_lead_status(&state.api, request)
        .await
        .map_err(reject)?;
    Ok(Json(LeadEnvelope::status_updated(lead)))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
