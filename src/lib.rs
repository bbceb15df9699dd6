use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::Path;

pub mod chart;
pub mod config;
pub mod controls;
pub mod dataset;
pub mod filter;
pub mod page;
pub mod record_store;
pub mod server;

pub use chart::{AxisRanges, ChartOptions, PlotFrame, ScatterSvg};
pub use config::{AppConfig, ConfigManager};
pub use controls::{ControlSet, ControlState};
pub use dataset::BoundDataset;
pub use filter::FilterSession;
pub use moviescope_cli::Args;
pub use record_store::{FetchOptions, Record, RecordStoreClient, StoreError};

/// Application name used for the config directory and log filter
pub const APP_NAME: &str = "moviescope";

/// Control values requested on the command line, starting from the page defaults.
pub fn controls_from_args(args: &Args) -> Result<ControlSet> {
    let mut controls = ControlSet::new();
    if let Some(reviews) = args.min_reviews {
        controls.reviews.set_value(reviews);
    }
    if let Some(year) = args.min_year {
        controls.min_year.set_value(year);
    }
    if let Some(year) = args.max_year {
        controls.max_year.set_value(year);
    }
    if let Some(genre) = &args.genre {
        controls.genre.set_value(genre)?;
    }
    Ok(controls)
}

/// Fetch once, filter with `state` and write the chart to `path`.
/// Returns the number of movies written.
pub fn export_filtered(config: &AppConfig, state: &ControlState, path: &Path) -> Result<usize> {
    let client = RecordStoreClient::from_config(&config.store);
    let records = client
        .fetch(
            &config.store.collection_id,
            &FetchOptions::from(&config.store),
        )
        .map_err(|e| eyre!("{}", page::user_message(&e)))?;
    let full = BoundDataset::from_records(&records, &config.chart.point_color);
    tracing::info!(records = full.len(), "fetched movies for export");

    // Axes come from the full dataset, as on the page.
    let ranges = AxisRanges::from_dataset(&full);
    let visible = FilterSession::new().recompute(&full, state);
    chart::export_chart(path, &visible, &ChartOptions::from(&config.chart), ranges)?;
    Ok(visible.len())
}
