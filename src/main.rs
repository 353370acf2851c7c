use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use catalog_console::infrastructure::{
    ApiClient, AppConfig, CliArgs, LocalStorage, ReqwestTransport, StateStore, StorageManager,
};
use catalog_console::presentation::App;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

async fn create_app() -> Result<App> {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);

    init_logging(&config)?;

    info!(
        version = catalog_console::VERSION,
        api = %config.api.base_url,
        "Starting catalog console"
    );

    let transport = Arc::new(ReqwestTransport::new(
        config.api.base_url.clone(),
        config.request_timeout(),
    )?);
    let api = Arc::new(ApiClient::new(transport));
    let session = Arc::new(LocalStorage::open(storage.session_path())?);

    let state_store = StateStore::new(storage.state_path());
    let saved = state_store.load().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load saved state, starting fresh");
        Default::default()
    });

    Ok(App::new(&config, api, session, state_store, saved))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let app = create_app().await?;

    let mut terminal = ratatui::init();

    let result = app.run(&mut terminal).await;

    ratatui::restore();

    result
}
