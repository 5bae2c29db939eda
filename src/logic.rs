//! Interaction logic between input events and the list view state machine.
//!
//! This module centralizes the non-UI behavior that reacts to user commands:
//! search editing, filter and sort cycling with selection preservation,
//! navigation with automatic page reveal at the bottom of the list, catalog
//! ingestion, and refresh dispatch with a single-flight guard.
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::state::{AppState, LoadedCatalog, Product, RefreshRequest};

/// How long footer toasts stay visible.
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Show a transient footer message.
pub fn toast(app: &mut AppState, message: impl Into<String>) {
    app.toast_message = Some(message.into());
    app.toast_expires_at = Some(Instant::now() + TOAST_TTL);
}

/// Ask the fetch worker for a new catalog, unless a fetch is already in
/// flight (duplicate triggers are ignored, keeping the fetch single-flight).
///
/// The allocated id is recorded so the event loop can discard results from
/// superseded requests.
pub fn request_refresh(app: &mut AppState, refresh_tx: &mpsc::UnboundedSender<RefreshRequest>) {
    if app.loading {
        return;
    }
    let id = app.next_load_id;
    app.next_load_id += 1;
    app.latest_load_id = id;
    app.loading = true;
    let _ = refresh_tx.send(RefreshRequest { id });
}

/// Re-select the product with `prev_id` if it is still visible; otherwise
/// clamp the selection index, clearing it when the list is empty.
fn restore_selection(app: &mut AppState, prev_id: Option<String>) {
    let visible_len = app.view.visible_len();
    if visible_len == 0 {
        app.selected = 0;
        app.list_state.select(None);
        return;
    }
    let pos = prev_id
        .filter(|id| !id.is_empty())
        .and_then(|id| app.view.visible().iter().position(|p| p.id == id));
    app.selected = pos.unwrap_or_else(|| app.selected.min(visible_len - 1));
    app.list_state.select(Some(app.selected));
}

/// Reset the highlight to the top of the list (used after filter changes).
pub fn reset_selection(app: &mut AppState) {
    app.selected = 0;
    app.list_state.select(if app.view.visible_len() == 0 {
        None
    } else {
        Some(0)
    });
}

/// The product currently under the highlight, if any.
pub fn selected_product(app: &AppState) -> Option<Product> {
    app.view.visible().into_iter().nth(app.selected)
}

/// Append a character to the search keyword.
pub fn search_push(app: &mut AppState, c: char) {
    let mut kw = app.view.search_keyword().to_string();
    kw.push(c);
    app.view.set_search(&kw);
    reset_selection(app);
}

/// Remove the last character of the search keyword.
pub fn search_pop(app: &mut AppState) {
    let mut kw = app.view.search_keyword().to_string();
    kw.pop();
    app.view.set_search(&kw);
    reset_selection(app);
}

/// Clear the search keyword entirely.
pub fn search_clear(app: &mut AppState) {
    app.view.set_search("");
    reset_selection(app);
}

/// Step the brand filter through "all brands" plus every distinct brand of
/// the loaded catalog.
pub fn cycle_brand(app: &mut AppState, forward: bool) {
    if app.brand_options.is_empty() {
        return;
    }
    let mut options: Vec<&str> = vec![""];
    options.extend(app.brand_options.iter().map(String::as_str));
    let current = options
        .iter()
        .position(|b| *b == app.view.brand_filter())
        .unwrap_or(0);
    let next = if forward {
        (current + 1) % options.len()
    } else {
        (current + options.len() - 1) % options.len()
    };
    app.view.set_brand_filter(options[next]);
    reset_selection(app);
}

/// Toggle the discounted-only filter.
pub fn toggle_discount(app: &mut AppState) {
    let on = !app.view.discount_only();
    app.view.set_discount_only(on);
    reset_selection(app);
}

/// Advance to the next sort key, keeping the highlighted product selected
/// when it is still within the revealed window.
pub fn cycle_sort(app: &mut AppState) {
    let prev_id = selected_product(app).map(|p| p.id);
    app.view.set_sort(app.view.sort_key().next());
    restore_selection(app, prev_id);
}

/// Move the highlight by `delta`, revealing the next page when the cursor
/// pushes past the bottom of the window and more products exist.
pub fn move_sel(app: &mut AppState, delta: isize) {
    let mut visible_len = app.view.visible_len();
    if visible_len == 0 {
        return;
    }
    let target = app.selected as isize + delta;
    if target >= visible_len as isize && app.view.has_more() {
        app.view.load_more();
        visible_len = app.view.visible_len();
    }
    let max = visible_len as isize - 1;
    app.selected = target.clamp(0, max) as usize;
    app.list_state.select(Some(app.selected));
}

/// Move the highlight by one page.
pub fn page_move(app: &mut AppState, forward: bool) {
    let step = app.view.page_size() as isize;
    move_sel(app, if forward { step } else { -step });
}

/// Jump to the first or last revealed product.
pub fn jump_to_edge(app: &mut AppState, top: bool) {
    let visible_len = app.view.visible_len();
    if visible_len == 0 {
        return;
    }
    app.selected = if top { 0 } else { visible_len - 1 };
    app.list_state.select(Some(app.selected));
}

/// Ingest a prepared catalog into the application state.
///
/// Replaces the product set (which restarts search/brand filters and
/// paging), applies a launch-time brand filter once, refreshes header stats
/// and brand options, and keeps the highlighted product when possible.
pub fn ingest(app: &mut AppState, loaded: LoadedCatalog) {
    let prev_id = selected_product(app).map(|p| p.id);
    app.view.load(loaded.products);
    if let Some(brand) = app.pending_brand.take() {
        app.view.set_brand_filter(&brand);
    }
    app.stats = loaded.stats;
    app.origin = Some(loaded.origin);
    app.cache_age = loaded.cache_age;
    app.load_failed = false;
    app.brand_options = crate::catalog::distinct_brands(app.view.products());
    restore_selection(app, prev_id);
}

/// Clipboard payload for the "copy price info" action:
/// `"{brand} {name} - {price}"`.
pub fn price_line(p: &Product) -> String {
    format!(
        "{} {} - {}",
        p.brand,
        p.name,
        crate::util::format_price(p.current_price)
    )
    .trim_start()
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CatalogStats, DataOrigin, SortKey};

    fn board(id: &str, brand: &str, name: &str, price: Option<f64>) -> Product {
        Product {
            id: id.to_string(),
            brand: brand.to_string(),
            name: name.to_string(),
            current_price: price,
            ..Default::default()
        }
    }

    fn loaded(products: Vec<Product>) -> LoadedCatalog {
        let stats = CatalogStats {
            total: products.len(),
            brands: 1,
            last_updated: "unknown".into(),
        };
        LoadedCatalog {
            products,
            stats,
            origin: DataOrigin::Fresh,
            cache_age: None,
        }
    }

    fn app_with(products: Vec<Product>) -> AppState {
        let mut app = AppState::default();
        ingest(&mut app, loaded(products));
        app
    }

    #[tokio::test]
    async fn refresh_requests_are_single_flight() {
        let mut app = AppState::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        request_refresh(&mut app, &tx);
        assert!(app.loading);
        assert_eq!(app.latest_load_id, 1);
        // A second trigger while in flight is ignored.
        request_refresh(&mut app, &tx);
        assert_eq!(app.latest_load_id, 1);
        let first = rx.try_recv().expect("one request queued");
        assert_eq!(first.id, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn moving_past_the_bottom_reveals_the_next_page() {
        let products: Vec<Product> = (0..25)
            .map(|i| board(&format!("id{i}"), "Burton", &format!("Board {i:02}"), None))
            .collect();
        let mut app = app_with(products);
        assert_eq!(app.view.visible_len(), 10);
        app.selected = 9;
        move_sel(&mut app, 1);
        assert_eq!(app.view.visible_len(), 20);
        assert_eq!(app.selected, 10);
        // At the true end the cursor pins to the last row.
        app.selected = 19;
        move_sel(&mut app, 1);
        assert_eq!(app.view.visible_len(), 25);
        move_sel(&mut app, 100);
        assert_eq!(app.selected, 24);
        assert_eq!(app.view.visible_len(), 25);
    }

    #[test]
    fn brand_cycle_wraps_through_all_option() {
        let mut app = app_with(vec![
            board("a", "Burton", "Alpha", None),
            board("b", "Capita", "Bravo", None),
        ]);
        assert_eq!(app.view.brand_filter(), "");
        cycle_brand(&mut app, true);
        assert_eq!(app.view.brand_filter(), "Burton");
        cycle_brand(&mut app, true);
        assert_eq!(app.view.brand_filter(), "Capita");
        cycle_brand(&mut app, true);
        assert_eq!(app.view.brand_filter(), "");
        cycle_brand(&mut app, false);
        assert_eq!(app.view.brand_filter(), "Capita");
    }

    #[test]
    fn sort_cycle_preserves_selected_product() {
        let mut app = app_with(vec![
            board("a", "Burton", "Alpha", Some(300.0)),
            board("b", "Burton", "Bravo", Some(100.0)),
            board("c", "Burton", "Charlie", Some(200.0)),
        ]);
        app.selected = 2; // "Charlie"
        app.list_state.select(Some(2));
        // Name -> Brand keeps order; Brand -> PriceAsc moves Charlie.
        cycle_sort(&mut app);
        cycle_sort(&mut app);
        assert_eq!(app.view.sort_key(), SortKey::PriceAsc);
        let visible = app.view.visible();
        assert_eq!(visible[app.selected].id, "c");
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn ingest_applies_pending_brand_once() {
        let mut app = AppState::default();
        app.pending_brand = Some("Capita".into());
        ingest(
            &mut app,
            loaded(vec![
                board("a", "Burton", "Alpha", None),
                board("b", "Capita", "Bravo", None),
            ]),
        );
        assert_eq!(app.view.brand_filter(), "Capita");
        assert_eq!(app.view.visible_len(), 1);
        assert_eq!(app.brand_options, vec!["Burton", "Capita"]);
        // A later reload clears the filter like any other.
        ingest(&mut app, loaded(vec![board("a", "Burton", "Alpha", None)]));
        assert_eq!(app.view.brand_filter(), "");
    }

    #[test]
    fn search_editing_updates_filter_and_selection() {
        let mut app = app_with(vec![
            board("a", "Burton", "Alpha", None),
            board("b", "Capita", "Bravo", None),
        ]);
        for c in "capita".chars() {
            search_push(&mut app, c);
        }
        assert_eq!(app.view.search_keyword(), "capita");
        assert_eq!(app.view.visible_len(), 1);
        assert_eq!(app.list_state.selected(), Some(0));
        search_pop(&mut app);
        assert_eq!(app.view.search_keyword(), "capit");
        search_clear(&mut app);
        assert_eq!(app.view.search_keyword(), "");
        assert_eq!(app.view.visible_len(), 2);
    }

    #[test]
    fn price_line_formats_payload() {
        let p = board("a", "Burton", "Custom Flying V", Some(649.95));
        assert_eq!(price_line(&p), "Burton Custom Flying V - $649.95");
        let unpriced = board("b", "", "Mystery", None);
        assert_eq!(price_line(&unpriced), "Mystery - n/a");
    }
}
