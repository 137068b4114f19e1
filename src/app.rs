use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use log::{error, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::cache::WorkbookCache;
use crate::classify::ColumnClassifier;
use crate::config::Config;
use crate::downloader::{CSV_FILE_NAME, XLSX_FILE_NAME};
use crate::error::{BrowserError, Result};
use crate::graph::{GraphOptions, render_png};
use crate::report::PDF_FILE_NAME;
use crate::summary::{ChartSpec, Dashboard};
use crate::table::Workbook;
use crate::view::{RowDetail, SheetView, ViewQuery, resolve};

pub struct AppState {
    cache: WorkbookCache,
    workbook_path: PathBuf,
}

impl AppState {
    pub fn new(cache: WorkbookCache, workbook_path: PathBuf) -> Self {
        AppState {
            cache,
            workbook_path,
        }
    }

    fn workbook(&self) -> Result<Arc<Workbook>> {
        self.cache.get(&self.workbook_path)
    }

    fn classifier(&self) -> &ColumnClassifier {
        self.cache.loader().classifier()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: Option<String>,
}

#[derive(Serialize)]
struct SheetsResponse {
    workbook: String,
    sheets: Vec<String>,
}

impl IntoResponse for BrowserError {
    fn into_response(self) -> Response {
        let status = match self {
            BrowserError::NotFound { .. } | BrowserError::SheetNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!("Request failed: {}", self);
        (
            status,
            Json(ErrorResponse {
                status: "error".to_string(),
                message: Some(self.to_string()),
            }),
        )
            .into_response()
    }
}

/// Start the web server
///
/// When no workbook can be located the server still starts, but every route only
/// answers with the "no workbook" page.
pub async fn run(config: &Config, bind: &str) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let app = match config.workbook_path() {
        Ok(path) => {
            info!("Using workbook {}", path.display());
            let state = Arc::new(AppState::new(WorkbookCache::default(), path));
            // Load up front so the first interaction does not pay for it
            if let Err(e) = state.workbook() {
                error!("Failed to load workbook: {}", e);
            }
            router(state)
        }
        Err(e) => {
            error!("{}", e);
            missing_workbook_router(&e.to_string())
        }
    };

    let listener = TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/sheets", get(get_sheets))
        .route("/api/view", get(get_view))
        .route("/api/row", get(get_row))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/chart/:kind", get(get_chart))
        .route("/api/export/:format", get(export_view))
        .with_state(state)
}

/// Router used when no workbook exists: the message and nothing else
pub fn missing_workbook_router(message: &str) -> Router {
    let page = include_str!("./static/missing.html").replace("{{message}}", &escape_html(message));
    Router::new().fallback(move || {
        let page = page.clone();
        async move { (StatusCode::NOT_FOUND, Html(page)) }
    })
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

/// Run workbook loading, rendering and export off the async worker threads
async fn blocking<T, F>(job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| BrowserError::Task(e.to_string()))?
}

async fn load_workbook(state: &Arc<AppState>) -> Result<Arc<Workbook>> {
    let state = Arc::clone(state);
    blocking(move || state.workbook()).await
}

async fn get_sheets(State(state): State<Arc<AppState>>) -> Result<Json<SheetsResponse>> {
    let workbook = load_workbook(&state).await?;
    let name = state
        .workbook_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Json(SheetsResponse {
        workbook: name,
        sheets: workbook.sheet_names(),
    }))
}

async fn get_view(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SheetView>> {
    let workbook = load_workbook(&state).await?;
    let view = resolve(&workbook, state.classifier(), &query)?;
    Ok(Json(view.sheet_view()))
}

async fn get_row(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<RowDetail>> {
    let workbook = load_workbook(&state).await?;
    let view = resolve(&workbook, state.classifier(), &query)?;
    Ok(Json(view.row_detail(query.row.unwrap_or(0))))
}

async fn get_dashboard(
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Dashboard>> {
    let workbook = load_workbook(&state).await?;
    let view = resolve(&workbook, state.classifier(), &query)?;
    Ok(Json(view.dashboard()))
}

async fn get_chart(
    Path(kind): Path<String>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response> {
    let png = blocking(move || {
        let workbook = state.workbook()?;
        let view = resolve(&workbook, state.classifier(), &query)?;
        let dashboard = view.dashboard();

        let chart = match kind.as_str() {
            "division" => dashboard.divisions.map(ChartSpec::division),
            "risk" => dashboard.risks.map(ChartSpec::risk),
            _ => None,
        };
        chart
            .map(|chart| render_png(&chart, GraphOptions::default()))
            .transpose()
    })
    .await?;

    // unknown kind, or the column is not bound in this sheet
    let Some(png) = png else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

#[derive(Clone, Copy)]
enum Export {
    Csv,
    Xlsx,
    Pdf,
}

impl Export {
    fn parse(format: &str) -> Option<Self> {
        match format {
            "csv" => Some(Export::Csv),
            "xlsx" => Some(Export::Xlsx),
            "pdf" => Some(Export::Pdf),
            _ => None,
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            Export::Csv => "text/csv",
            Export::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Export::Pdf => "application/pdf",
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            Export::Csv => CSV_FILE_NAME,
            Export::Xlsx => XLSX_FILE_NAME,
            Export::Pdf => PDF_FILE_NAME,
        }
    }
}

async fn export_view(
    Path(format): Path<String>,
    Query(query): Query<ViewQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Response> {
    let Some(export) = Export::parse(&format) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let bytes = blocking(move || {
        let workbook = state.workbook()?;
        let view = resolve(&workbook, state.classifier(), &query)?;
        match export {
            Export::Csv => view.csv(),
            Export::Xlsx => view.xlsx(),
            Export::Pdf => view.pdf(),
        }
    })
    .await?;

    Ok(attachment(export.content_type(), export.file_name(), bytes))
}

fn attachment(content_type: &'static str, file_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
