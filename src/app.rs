//! Application runtime: terminal lifecycle, background workers, and the main
//! event loop.
//!
//! The binary entrypoint stays minimal; everything long-lived happens here.
use std::time::Duration;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::{select, sync::mpsc};

use crate::state::{AppState, CatalogLoad, DataOrigin, ListView, LoadedCatalog, RefreshRequest};
use crate::ui::ui;
use crate::{cache, catalog, logic, net};

/// Launch parameters resolved from the command line.
#[derive(Clone, Debug, Default)]
pub struct LaunchOptions {
    /// Override the configured catalog base URL.
    pub base_url: Option<String>,
    /// Override the configured page size.
    pub page_size: Option<usize>,
    /// Brand filter to apply once the catalog arrives.
    pub brand: Option<String>,
    /// Start with the discounted-only filter enabled.
    pub discount: bool,
    /// Skip the startup fetch and work from the cached catalog.
    pub no_refresh: bool,
}

fn setup_terminal() -> Result<()> {
    enable_raw_mode()?;
    execute!(std::io::stdout(), EnterAlternateScreen)?;
    Ok(())
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(std::io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Turn a raw catalog into a ready-to-ingest [`LoadedCatalog`].
fn prepare(
    raw: &catalog::RawCatalog,
    origin: DataOrigin,
    base_url: &str,
    cache_path: &std::path::Path,
) -> LoadedCatalog {
    let products = catalog::normalize(&raw.products, base_url);
    let stats = catalog::summarize(&products, &raw.metadata);
    let cache_age = match origin {
        DataOrigin::Cache => cache::age(cache_path),
        DataOrigin::Fresh => None,
    };
    LoadedCatalog {
        products,
        stats,
        origin,
        cache_age,
    }
}

/// Apply a finished load to the application state, or surface its failure.
fn handle_load(app: &mut AppState, load: CatalogLoad) {
    if load.id != app.latest_load_id {
        tracing::debug!(id = load.id, latest = app.latest_load_id, "discarding stale load");
        return;
    }
    app.loading = false;
    match load.outcome {
        Ok(loaded) => {
            if loaded.origin == DataOrigin::Cache {
                logic::toast(app, "Fetch failed - showing cached data");
            }
            logic::ingest(app, loaded);
        }
        Err(err) => {
            tracing::error!(error = %err, "catalog load failed");
            if app.view.products().is_empty() {
                app.load_failed = true;
                app.modal = crate::state::Modal::Alert {
                    message: format!("Failed to load catalog: {err}"),
                };
            } else {
                logic::toast(app, format!("Refresh failed: {err}"));
            }
        }
    }
}

/// Clear an expired toast.
fn expire_toast(app: &mut AppState) {
    if let Some(deadline) = app.toast_expires_at
        && std::time::Instant::now() >= deadline
    {
        app.toast_message = None;
        app.toast_expires_at = None;
    }
}

/// Start the boardwatch TUI runtime and run the main event loop.
///
/// - Resolves settings and launch options into the initial [`AppState`]
/// - Spawns the catalog fetch worker, an input polling thread, and a
///   periodic tick task
/// - Drives rendering via `ratatui` and delegates input to `events`
///
/// Returns `Ok(())` on normal shutdown or an error if initialization fails.
pub async fn run(opts: LaunchOptions) -> Result<()> {
    let prefs = crate::theme::settings();
    let base_url = opts
        .base_url
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or(prefs.base_url);
    let page_size = opts.page_size.filter(|n| *n > 0).unwrap_or(prefs.page_size);

    let mut app = AppState {
        base_url: base_url.clone(),
        ..Default::default()
    };
    app.view = ListView::new(page_size);
    app.view.set_sort(prefs.sort_key);
    app.view.set_discount_only(opts.discount);
    app.pending_brand = opts.brand;

    setup_terminal()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(std::io::stdout()))?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<CEvent>();
    let (refresh_tx, mut refresh_rx) = mpsc::unbounded_channel::<RefreshRequest>();
    let (load_tx, mut load_rx) = mpsc::unbounded_channel::<CatalogLoad>();
    let (tick_tx, mut tick_rx) = mpsc::unbounded_channel::<()>();

    // Catalog fetch worker. Requests are processed one at a time; anything
    // that queued up meanwhile is coalesced into the newest request.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()?;
    let worker_base = base_url.clone();
    let worker_cache = app.cache_path.clone();
    tokio::spawn(async move {
        while let Some(req) = refresh_rx.recv().await {
            let mut latest = req;
            while let Ok(next) = refresh_rx.try_recv() {
                latest = next;
            }
            let outcome = net::load_catalog(&client, &worker_base, &worker_cache)
                .await
                .map(|(raw, origin)| prepare(&raw, origin, &worker_base, &worker_cache));
            let _ = load_tx.send(CatalogLoad {
                id: latest.id,
                outcome,
            });
        }
    });

    // Input polling thread, forwarding terminal events to the async loop.
    std::thread::spawn(move || {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(50))
                && let Ok(ev) = event::read()
            {
                if event_tx.send(ev).is_err() {
                    break;
                }
            }
        }
    });

    // Periodic tick for toast expiry and redraws while loading.
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(200));
        loop {
            interval.tick().await;
            if tick_tx.send(()).is_err() {
                break;
            }
        }
    });

    if opts.no_refresh {
        // Offline start: serve whatever the cache holds, without a fetch.
        match cache::load(&app.cache_path) {
            Some(raw) => {
                let loaded = prepare(&raw, DataOrigin::Cache, &base_url, &app.cache_path);
                logic::ingest(&mut app, loaded);
            }
            None => {
                app.load_failed = true;
                app.modal = crate::state::Modal::Alert {
                    message: "No cached catalog yet - press r to fetch one".to_string(),
                };
            }
        }
    } else if prefs.refresh_on_start {
        logic::request_refresh(&mut app, &refresh_tx);
    }

    loop {
        let _ = terminal.draw(|f| ui(f, &mut app));

        select! {
            Some(ev) = event_rx.recv() => {
                if crate::events::handle_event(ev, &mut app, &refresh_tx) {
                    break;
                }
            }
            Some(load) = load_rx.recv() => {
                handle_load(&mut app, load);
            }
            Some(()) = tick_rx.recv() => {
                expire_toast(&mut app);
            }
            else => break,
        }
    }

    restore_terminal()?;
    Ok(())
}
