use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Default, Parser)]
#[command(
    name = "catalog-console",
    version,
    about = "Terminal administration console for the product catalog",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Catalog API base URL.
    #[arg(long, env = "CATALOG_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Rows per page in the builder tables.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Initial store filter query string, e.g. `q=fiber&channel=Online`.
    #[arg(long, value_name = "QUERY")]
    pub store_query: Option<String>,

    /// Publish status poll interval in milliseconds.
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Maximum publish status polls before giving up.
    #[arg(long)]
    pub poll_max_attempts: Option<u32>,
}
