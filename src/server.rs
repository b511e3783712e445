//! Router and callback transport.
//!
//! Three page routes serve static layouts; `/callback` runs the reactive
//! dispatcher for one control change; everything else falls through to
//! the error page. `/api/health` exposes the load manifest for
//! operational checks.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::dataset::{DatasetStore, TableManifest, ALL_VARIANTS};
use crate::error::DashError;
use crate::logging::{log, obj, v_num, v_str, Domain, Level};
use crate::pages;
use crate::reactive::{dispatch, Control, ControlValues, OutputUpdate, Page};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DatasetStore>,
    pub debug: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/page1", get(mutations_page))
        .route("/page2", get(tf_activity_page))
        .route("/page3", get(drug_sensitivity_page))
        .route("/callback", post(callback))
        .route("/api/health", get(health))
        .fallback(not_found)
        .with_state(state)
}

pub async fn serve(store: Arc<DatasetStore>, cfg: &Config) -> anyhow::Result<()> {
    let state = AppState { store, debug: cfg.debug };
    let app = router(state);
    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log(
        Level::Info,
        Domain::System,
        "listening",
        obj(&[("addr", v_str(&addr))]),
    );
    axum::serve(listener, app).await?;
    Ok(())
}

// =============================================================================
// Pages
// =============================================================================

async fn mutations_page() -> Html<String> {
    page(Page::Mutations)
}

async fn tf_activity_page() -> Html<String> {
    page(Page::TfActivity)
}

async fn drug_sensitivity_page() -> Html<String> {
    page(Page::DrugSensitivity)
}

fn page(page: Page) -> Html<String> {
    log(Level::Debug, Domain::Http, "page", obj(&[("page", v_str(page.path()))]));
    Html(pages::page_html(page))
}

async fn not_found() -> (StatusCode, Html<String>) {
    log(Level::Debug, Domain::Http, "not_found", obj(&[]));
    (StatusCode::NOT_FOUND, Html(pages::not_found_html()))
}

// =============================================================================
// Callback transport
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CallbackRequest {
    pub page: String,
    #[serde(default)]
    pub changed: Option<String>,
    #[serde(default)]
    pub values: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub outputs: Vec<OutputUpdate>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Validate the request envelope: page, changed control, control values
/// (missing fields take their defaults), and the dataset variant.
pub fn parse_callback(
    req: &CallbackRequest,
) -> Result<(Page, Option<Control>, ControlValues), DashError> {
    let page: Page = req.page.parse()?;
    let changed = match req.changed.as_deref() {
        Some(c) => Some(c.parse::<Control>()?),
        None => None,
    };
    let values: ControlValues = serde_json::from_value(Value::Object(req.values.clone()))?;
    values.variant()?;
    Ok((page, changed, values))
}

async fn callback(
    State(state): State<AppState>,
    Json(req): Json<CallbackRequest>,
) -> Result<Json<CallbackResponse>, (StatusCode, Json<ErrorBody>)> {
    let started = Instant::now();
    let (page, changed, values) = parse_callback(&req).map_err(|err| {
        log(
            Level::Warn,
            Domain::Http,
            "bad_callback",
            obj(&[("error", v_str(&err.to_string()))]),
        );
        (StatusCode::BAD_REQUEST, Json(ErrorBody { error: err.to_string() }))
    })?;

    if state.debug {
        log(
            Level::Debug,
            Domain::Http,
            "callback_values",
            obj(&[(
                "values",
                serde_json::to_value(&values).unwrap_or(Value::Null),
            )]),
        );
    }

    let outputs = dispatch(&state.store, page, changed, &values);
    let errors = outputs.iter().filter(|u| u.error.is_some()).count();
    log(
        Level::Info,
        Domain::View,
        "recompute",
        obj(&[
            ("page", v_str(page.path())),
            ("changed", changed.map(|c| v_str(c.id())).unwrap_or(Value::Null)),
            ("outputs", v_num(outputs.len() as f64)),
            ("errors", v_num(errors as f64)),
            ("elapsed_ms", v_num(started.elapsed().as_secs_f64() * 1000.0)),
        ]),
    );

    Ok(Json(CallbackResponse { outputs }))
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    variants: Vec<&'static str>,
    tables: Vec<TableManifest>,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        variants: ALL_VARIANTS.iter().map(|v| v.as_str()).collect(),
        tables: state.store.manifest.clone(),
    })
}
