//! Event handling layer for boardwatch's TUI.
//!
//! Converts raw `crossterm` events into mutations on [`AppState`]:
//!
//! - Modal handling has precedence and captures `Enter`/`Esc` while open.
//! - Search focus: printable keys edit the keyword, arrows still move the
//!   list highlight.
//! - List focus: vim-like navigation plus action keys for brand cycling,
//!   discount toggle, sort cycling, refresh, detail view, and clipboard.
//!
//! All functions here are synchronous; the only outbound effect is sending a
//! refresh request over the provided channel.
use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use crate::logic;
use crate::state::{AppState, Focus, Modal, Product, RefreshRequest};

/// Dispatch a single input event.
///
/// Returns `true` to signal the application should exit.
pub fn handle_event(
    ev: CEvent,
    app: &mut AppState,
    refresh_tx: &mpsc::UnboundedSender<RefreshRequest>,
) -> bool {
    match ev {
        CEvent::Key(key) if key.kind == KeyEventKind::Press => handle_key(key, app, refresh_tx),
        _ => false,
    }
}

/// Copy `payload` to the clipboard and toast the outcome.
fn copy_with_toast(app: &mut AppState, payload: &str, what: &str) {
    match crate::util::copy_to_clipboard(payload) {
        Ok(()) => logic::toast(app, format!("{what} copied to clipboard")),
        Err(hint) => logic::toast(app, hint),
    }
}

/// Clipboard actions shared by the list and the detail modal.
fn copy_link(app: &mut AppState, product: &Product) {
    match product.product_url.clone() {
        Some(url) => copy_with_toast(app, &url, "Link"),
        None => logic::toast(app, "No product link for this listing"),
    }
}

fn copy_price_info(app: &mut AppState, product: &Product) {
    let payload = logic::price_line(product);
    copy_with_toast(app, &payload, "Price info");
}

/// Keys while a modal is open. Never exits the application.
fn handle_modal_key(key: KeyEvent, app: &mut AppState) -> bool {
    match &app.modal {
        Modal::Detail { product } => {
            let product = product.clone();
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                    app.modal = Modal::None;
                }
                KeyCode::Char('y') => copy_link(app, &product),
                KeyCode::Char('p') => copy_price_info(app, &product),
                _ => {}
            }
        }
        Modal::Alert { .. } | Modal::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')
            ) {
                app.modal = Modal::None;
            }
        }
        Modal::None => {}
    }
    false
}

fn handle_key(
    key: KeyEvent,
    app: &mut AppState,
    refresh_tx: &mpsc::UnboundedSender<RefreshRequest>,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    if !matches!(app.modal, Modal::None) {
        return handle_modal_key(key, app);
    }

    // Keys shared by both focus targets.
    match key.code {
        KeyCode::Tab => {
            app.focus = match app.focus {
                Focus::Search => Focus::List,
                Focus::List => Focus::Search,
            };
            return false;
        }
        KeyCode::F(5) => {
            logic::request_refresh(app, refresh_tx);
            return false;
        }
        KeyCode::F(1) => {
            app.modal = Modal::Help;
            return false;
        }
        KeyCode::Up => {
            logic::move_sel(app, -1);
            return false;
        }
        KeyCode::Down => {
            logic::move_sel(app, 1);
            return false;
        }
        KeyCode::PageUp => {
            logic::page_move(app, false);
            return false;
        }
        KeyCode::PageDown => {
            logic::page_move(app, true);
            return false;
        }
        KeyCode::Enter => {
            if let Some(product) = logic::selected_product(app) {
                app.modal = Modal::Detail { product };
            }
            return false;
        }
        _ => {}
    }

    match app.focus {
        Focus::Search => match key.code {
            KeyCode::Esc => {
                if app.view.search_keyword().is_empty() {
                    return true;
                }
                logic::search_clear(app);
            }
            KeyCode::Backspace => logic::search_pop(app),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                logic::search_push(app, c);
            }
            _ => {}
        },
        Focus::List => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Char('j') => logic::move_sel(app, 1),
            KeyCode::Char('k') => logic::move_sel(app, -1),
            KeyCode::Char('g') => logic::jump_to_edge(app, true),
            KeyCode::Char('G') => logic::jump_to_edge(app, false),
            KeyCode::Char('b') => logic::cycle_brand(app, true),
            KeyCode::Char('B') => logic::cycle_brand(app, false),
            KeyCode::Char('d') => logic::toggle_discount(app),
            KeyCode::Char('s') => logic::cycle_sort(app),
            KeyCode::Char('r') => logic::request_refresh(app, refresh_tx),
            KeyCode::Char('y') => {
                if let Some(product) = logic::selected_product(app) {
                    copy_link(app, &product);
                }
            }
            KeyCode::Char('p') => {
                if let Some(product) = logic::selected_product(app) {
                    copy_price_info(app, &product);
                }
            }
            KeyCode::Char('?') => app.modal = Modal::Help,
            KeyCode::Char('/') => app.focus = Focus::Search,
            _ => {}
        },
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CatalogStats, DataOrigin, LoadedCatalog};

    fn key(code: KeyCode) -> CEvent {
        CEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn app_with_products(n: usize) -> AppState {
        let products = (0..n)
            .map(|i| Product {
                id: format!("id{i}"),
                brand: "Burton".into(),
                name: format!("Board {i:02}"),
                ..Default::default()
            })
            .collect();
        let mut app = AppState::default();
        logic::ingest(
            &mut app,
            LoadedCatalog {
                products,
                stats: CatalogStats::default(),
                origin: DataOrigin::Fresh,
                cache_age: None,
            },
        );
        app
    }

    #[tokio::test]
    async fn typing_in_search_focus_filters_the_list() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_with_products(5);
        assert!(!handle_event(key(KeyCode::Char('0')), &mut app, &tx));
        assert!(!handle_event(key(KeyCode::Char('3')), &mut app, &tx));
        assert_eq!(app.view.search_keyword(), "03");
        assert_eq!(app.view.visible_len(), 1);
        assert!(!handle_event(key(KeyCode::Backspace), &mut app, &tx));
        assert_eq!(app.view.search_keyword(), "0");
    }

    #[tokio::test]
    async fn esc_clears_search_before_exiting() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_with_products(2);
        handle_event(key(KeyCode::Char('x')), &mut app, &tx);
        assert!(!handle_event(key(KeyCode::Esc), &mut app, &tx));
        assert_eq!(app.view.search_keyword(), "");
        assert!(handle_event(key(KeyCode::Esc), &mut app, &tx));
    }

    #[tokio::test]
    async fn list_focus_action_keys() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = app_with_products(25);
        handle_event(key(KeyCode::Tab), &mut app, &tx);
        assert_eq!(app.focus, Focus::List);
        handle_event(key(KeyCode::Char('j')), &mut app, &tx);
        assert_eq!(app.selected, 1);
        handle_event(key(KeyCode::Char('s')), &mut app, &tx);
        assert_eq!(app.view.sort_key(), crate::state::SortKey::Brand);
        handle_event(key(KeyCode::Char('r')), &mut app, &tx);
        assert!(app.loading);
        assert!(rx.try_recv().is_ok());
        // A second refresh while loading is coalesced away.
        handle_event(key(KeyCode::Char('r')), &mut app, &tx);
        assert!(rx.try_recv().is_err());
        assert!(handle_event(key(KeyCode::Char('q')), &mut app, &tx));
    }

    #[tokio::test]
    async fn enter_opens_and_esc_closes_the_detail_modal() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_with_products(3);
        handle_event(key(KeyCode::Enter), &mut app, &tx);
        assert!(matches!(app.modal, Modal::Detail { .. }));
        // Modal captures exit keys instead of quitting.
        assert!(!handle_event(key(KeyCode::Esc), &mut app, &tx));
        assert!(matches!(app.modal, Modal::None));
    }

    #[tokio::test]
    async fn ctrl_c_always_exits() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = app_with_products(1);
        app.modal = Modal::Help;
        let ev = CEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(handle_event(ev, &mut app, &tx));
    }
}
