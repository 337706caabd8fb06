use crate::artran::decode_records;
use crate::config::{ArtransConfig, ImportTarget};
use crate::console::AutoConfirm;
use crate::database::Database;
use crate::importer::{ArtransImporter, ImportError, ImportOutcome, ImportReport};
use crate::progress::PercentReporter;
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io::{self, Write};
use std::net::SocketAddr;
use std::rc::Rc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: ArtransConfig,
    pub database: Database,
}

pub fn router(state: AppState) -> Router {
    // Artrans exports of large sites run to tens of megabytes.
    Router::new()
        .route("/health", get(health_handler))
        .route("/import", post(import_handler))
        .layer(DefaultBodyLimit::max(64 * 1024 * 1024))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn serve_http(config: ArtransConfig, database: Database) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let state = AppState { config, database };

    tracing::info!(?addr, "HTTP server listening");
    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        api_port: state.config.api_port,
    })
}

async fn import_handler(
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> ApiResult<ImportResponse> {
    let target = ImportTarget::new(params.site_name, params.site_url);
    let database = state.database.clone();
    tracing::info!(bytes = body.len(), "received artrans import request");

    let response =
        tokio::task::spawn_blocking(move || run_streamed_import(&database, target, &body))
            .await
            .map_err(|err| ApiError::Internal(anyhow::Error::new(err)))??;
    Ok(Json(response))
}

/// Runs a confirmed import, collecting the operator output and percentage
/// markers into one text log.
fn run_streamed_import(
    database: &Database,
    target: ImportTarget,
    body: &[u8],
) -> Result<ImportResponse, ApiError> {
    let records = decode_records(body)?;
    let log = SharedLog::default();
    let mut operator = AutoConfirm::new(log.clone());
    let mut progress = PercentReporter::new(log.clone());

    let mut importer = ArtransImporter::new(database, target, &mut operator, &mut progress);
    match importer.run(&records)? {
        ImportOutcome::Completed(report) => Ok(ImportResponse {
            report,
            log: log.into_string(),
        }),
        ImportOutcome::Aborted => Err(ApiError::Internal(anyhow::anyhow!(
            "import aborted despite auto-confirmation"
        ))),
    }
}

#[derive(Clone, Default)]
struct SharedLog(Rc<RefCell<Vec<u8>>>);

impl SharedLog {
    fn into_string(self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ImportParams {
    site_name: Option<String>,
    site_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    #[serde(flatten)]
    pub report: ImportReport,
    pub log: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    api_port: u16,
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn into_response_parts(self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse { message: msg }),
            ApiError::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        message: "internal server error".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.into_response_parts();
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if err.is_preflight() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(anyhow::Error::new(err))
        }
    }
}
