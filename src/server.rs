use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::RwLock;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    scanner::{self, SharedProgress},
    types::{ScanResults, Site},
};

/// Shared handle for the embedded UI server: the immutable registry plus
/// mutable scan state behind a lock.
#[derive(Clone)]
pub struct AppState {
    sites: Arc<Vec<Site>>,
    concurrency: Option<usize>,
    timeout: Duration,
    inner: Arc<RwLock<ServerState>>,
}

#[derive(Debug)]
struct ServerState {
    status: Status,
    results: Option<ScanResults>,
    progress: Option<SharedProgress>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct Status {
    pub total: u64,
    pub checked: u64,
    pub up: u64,
    pub state: String, // "idle" | "running" | "done"
}

pub async fn spawn_server(
    bind: &str,
    sites: Vec<Site>,
    concurrency: Option<usize>,
    timeout: Duration,
) -> Result<()> {
    let app = build_router(app_state(sites, concurrency, timeout));

    info!("Serving UI on http://{}", bind);
    axum::serve(tokio::net::TcpListener::bind(bind).await?, app).await?;
    Ok(())
}

/// Assemble the API router plus the static dashboard fallback.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sites", get(get_sites))
        .route("/scan", get(run_scan))
        .route("/status", get(get_status))
        .route("/results", get(get_results))
        .with_state(state);

    let static_svc = ServeDir::new("ui").append_index_html_on_directories(true);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_svc)
        .layer(TraceLayer::new_for_http())
}

pub fn app_state(sites: Vec<Site>, concurrency: Option<usize>, timeout: Duration) -> AppState {
    AppState {
        sites: Arc::new(sites),
        concurrency,
        timeout,
        inner: Arc::new(RwLock::new(ServerState {
            status: Status {
                total: 0,
                checked: 0,
                up: 0,
                state: "idle".into(),
            },
            results: None,
            progress: None,
        })),
    }
}

async fn get_sites(State(app): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(app.sites.as_ref().clone()))
}

/// Run a full scan and answer with the per-site outcomes in registry order.
///
/// The scan happens inside the request, like the original dashboard API; the
/// status endpoint lets the UI poll progress while this request is in flight.
async fn run_scan(State(app): State<AppState>) -> impl IntoResponse {
    let progress = SharedProgress::new();
    {
        let mut s = app.inner.write().await;
        s.status = Status {
            total: app.sites.len() as u64,
            checked: 0,
            up: 0,
            state: "running".into(),
        };
        s.results = None;
        s.progress = Some(progress.clone());
    }

    let res =
        scanner::scan_sites_with_progress(&app.sites, app.concurrency, app.timeout, progress)
            .await;

    match res {
        Ok(results) => {
            let mut s = app.inner.write().await;
            s.status = Status {
                total: results.total,
                checked: results.checked,
                up: results.up_count,
                state: "done".into(),
            };
            s.progress = None;
            let body = Json(results.sites.clone());
            s.results = Some(results);
            (StatusCode::OK, body).into_response()
        }
        Err(e) => {
            error!("scan error: {e}");
            let mut s = app.inner.write().await;
            s.status.state = "idle".into();
            s.progress = None;
            (StatusCode::INTERNAL_SERVER_ERROR, format!("scan failed: {e}")).into_response()
        }
    }
}

async fn get_status(State(app): State<AppState>) -> impl IntoResponse {
    let s = app.inner.read().await;
    let (checked, up) = if let Some(p) = s.progress.as_ref() {
        (
            p.checked.load(std::sync::atomic::Ordering::Relaxed),
            p.up_count.load(std::sync::atomic::Ordering::Relaxed),
        )
    } else {
        (s.status.checked, s.status.up)
    };
    let out = Status {
        total: s.status.total,
        checked,
        up,
        state: s.status.state.clone(),
    };
    (StatusCode::OK, Json(out))
}

async fn get_results(State(app): State<AppState>) -> impl IntoResponse {
    let s = app.inner.read().await;
    if let Some(res) = s.results.as_ref() {
        (StatusCode::OK, Json(res.clone())).into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}
