mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod form;
mod pagination;
mod query;
mod session;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use api::{Api, Registry, ReqwestTransport, ResourceClient};
use cache::QueryCache;
use session::FileTokenStore;

#[derive(Parser, Debug)]
#[command(name = "ms-admin")]
#[command(about = "A terminal admin dashboard for the MS community app")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./ms-admin.yaml, then $XDG_CONFIG_HOME/ms-admin/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// REST API root, overrides the config file and MS_ADMIN_API_URL
  #[arg(long)]
  api_url: Option<String>,
}

/// Log to a daily file; the terminal belongs to the UI
fn init_tracing() -> Option<WorkerGuard> {
  let dir = dirs::data_dir()?.join("ms-admin").join("logs");
  std::fs::create_dir_all(&dir).ok()?;

  let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, "ms-admin.log"));
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ms_admin=info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();
  Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_tracing();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(url) = args.api_url {
    config.api.base_url = url;
  }

  let client = ResourceClient::new(
    config.base_url()?,
    Arc::new(FileTokenStore::open_default()?),
    Arc::new(ReqwestTransport::new()?),
    config.timeout(),
  );
  let api = Api::new(
    client,
    QueryCache::new(config.gc_time()),
    Arc::new(Registry::standard()?),
  );
  tracing::info!(api = %config.api.base_url, "starting ms-admin");

  // Initialize and run the app
  let mut app = app::App::new(ui::Context::new(api, config));
  app.run().await?;

  Ok(())
}
