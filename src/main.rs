mod app;
mod cache;
mod commands;
mod config;
mod event;
mod favorites;
mod query;
mod swapi;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "galdex")]
#[command(about = "A terminal UI for the Star Wars galactic directory")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/galdex/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Listing page to open with
  #[arg(short, long, default_value_t = 1)]
  page: u32,

  /// Search term to open with
  #[arg(short, long, default_value = "")]
  search: String,
}

/// Initialize logging to a file under the user data directory. The TUI
/// owns the terminal, so nothing may write to stderr while it runs.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()?.join("galdex").join("logs");
  let appender = tracing_appender::rolling::daily(log_dir, "galdex.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .with(filter)
    .init();

  Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _log_guard = init_tracing();

  let config = config::Config::load(args.config.as_deref())?;

  let mut app = app::App::new(config, args.page, args.search)?;
  app.run().await?;

  Ok(())
}
