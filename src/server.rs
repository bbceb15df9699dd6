//! HTTP front end: a single route that fetches, renders and composes the page.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::sync::Arc;

use crate::chart::{render_scatter_svg, AxisRanges, ChartOptions};
use crate::config::AppConfig;
use crate::controls::ControlSet;
use crate::dataset::BoundDataset;
use crate::page::{compose_page, user_message};
use crate::record_store::{FetchOptions, RecordStoreClient, StoreError};

/// Router state. Immutable; every request does its own fetch.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub client: RecordStoreClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let client = RecordStoreClient::from_config(&config.store);
        Self {
            config: Arc::new(config),
            client,
        }
    }

    /// Fetch the configured collection and adapt it for the chart.
    pub fn load_dataset(&self) -> Result<BoundDataset, StoreError> {
        let store = &self.config.store;
        let records = self
            .client
            .fetch(&store.collection_id, &FetchOptions::from(store))?;
        Ok(BoundDataset::from_records(
            &records,
            &self.config.chart.point_color,
        ))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

/// Render the page for `dataset`, or for an empty dataset with a notice if loading failed.
pub fn render_page(config: &AppConfig, loaded: Result<BoundDataset, StoreError>) -> Result<String> {
    let (dataset, notice) = match loaded {
        Ok(dataset) => (dataset, None),
        Err(err) => (BoundDataset::default(), Some(user_message(&err))),
    };
    let opts = ChartOptions::from(&config.chart);
    let chart = render_scatter_svg(&dataset, &opts, AxisRanges::from_dataset(&dataset))?;
    compose_page(&dataset, &ControlSet::default(), &chart, notice.as_deref())
}

/// Fetch and render on a blocking worker; both are synchronous.
fn load_and_render(state: &AppState) -> Result<String> {
    let loaded = state.load_dataset();
    match &loaded {
        Ok(dataset) => tracing::info!(records = dataset.len(), "loaded movies"),
        Err(e) => tracing::warn!("serving page without data: {}", e),
    }
    render_page(&state.config, loaded)
}

async fn index(State(state): State<AppState>) -> Response {
    let rendered = tokio::task::spawn_blocking(move || load_and_render(&state))
        .await
        .map_err(|e| eyre!("page task failed: {}", e))
        .and_then(|r| r);

    match rendered {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("page render failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

/// Bind the configured address and serve until the process is stopped.
pub async fn serve(config: AppConfig) -> Result<()> {
    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind {}: {}", addr, e))?;
    tracing::info!("moviescope listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(AppState::new(config))).await?;
    Ok(())
}
