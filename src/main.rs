//! Boardwatch binary entrypoint kept minimal. The full runtime lives in `app`.

mod app;
mod cache;
mod catalog;
mod events;
mod logic;
mod net;
mod state;
mod theme;
mod ui;
mod util;

use std::fmt;
use std::sync::OnceLock;

use clap::Parser;

/// Browse a snowboard price catalog from the terminal.
#[derive(Parser, Debug)]
#[command(name = "boardwatch", version, about)]
struct Args {
    /// Catalog base URL (overrides settings.conf).
    #[arg(long)]
    base_url: Option<String>,

    /// Products revealed per page (overrides settings.conf).
    #[arg(long)]
    page_size: Option<usize>,

    /// Start with this exact brand filter applied.
    #[arg(long)]
    brand: Option<String>,

    /// Start with the discounted-only filter enabled.
    #[arg(long)]
    discount: bool,

    /// Skip the startup fetch and browse the cached catalog.
    #[arg(long)]
    no_refresh: bool,
}

struct BoardwatchTimer;

impl tracing_subscriber::fmt::time::FormatTime for BoardwatchTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        w.write_str(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[tokio::main]
async fn main() {
    // Initialize tracing, writing to <config>/logs/boardwatch.log.
    {
        let mut log_path = theme::logs_dir();
        log_path.push("boardwatch.log");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            Ok(file) => {
                let (non_blocking, guard) = tracing_appender::non_blocking(file);
                let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(non_blocking)
                    .with_timer(BoardwatchTimer)
                    .init();
                let _ = LOG_GUARD.set(guard);
                tracing::info!(path = %log_path.display(), "logging initialized");
            }
            Err(e) => {
                // Fallback: stderr logger so startup is never blocked.
                let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
                tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .with_ansi(true)
                    .with_timer(BoardwatchTimer)
                    .init();
                tracing::warn!(error = %e, "failed to open log file; using stderr");
            }
        }
    }

    let args = Args::parse();
    let opts = app::LaunchOptions {
        base_url: args.base_url,
        page_size: args.page_size,
        brand: args.brand,
        discount: args.discount,
        no_refresh: args.no_refresh,
    };
    tracing::info!(?opts, "boardwatch starting");
    if let Err(err) = app::run(opts).await {
        tracing::error!(error = ?err, "application error");
    }
    tracing::info!("boardwatch exited");
}
