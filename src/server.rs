//! Dashboard HTTP server.
//!
//! One route. Every request runs the full fetch-and-render cycle against
//! the store; nothing is cached between requests. The response is always
//! HTTP 200 with a page; problems show up inside the page, not in the
//! status code.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    extract::{Query, State},
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tracing::info;

use crate::config::AppConfig;
use crate::infra::gdrive::DriveClient;
use crate::output::render_page;
use crate::report::{Dashboard, build_dashboard};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    date: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(dashboard)).with_state(state)
}

#[tracing::instrument(skip(state), fields(date = ?params.date))]
async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> Html<String> {
    let date = params.date.as_deref();

    let dashboard = match &state.config.credential {
        None => Dashboard::error(
            "The GDRIVE_CREDENTIALS_JSON environment variable is not set.".to_string(),
        ),
        Some(credential) => match DriveClient::new(credential).await {
            Ok(client) => build_dashboard(&client, &state.config, date).await,
            Err(e) => Dashboard::error(format!("An error occurred: {e}")),
        },
    };

    Html(render_page(&dashboard, date))
}

/// Binds and serves until the process is stopped.
pub async fn serve(bind: &str, config: AppConfig) -> Result<()> {
    let state = AppState {
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Dashboard server listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
