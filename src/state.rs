//! Core application state types for boardwatch's TUI.
//!
//! This module defines the data structures shared across the application:
//! the canonical [`Product`] record, the [`ListView`] state machine that owns
//! filtering/sorting/pagination, and the central [`AppState`] container
//! mutated by the event and UI layers.
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::Instant;

/// Default number of products revealed per "page" of the list.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Where the currently displayed catalog came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataOrigin {
    /// Fetched from the remote endpoint during this session.
    Fresh,
    /// Served from the on-disk copy of the last successful fetch.
    Cache,
}

/// Canonical product record derived from the wire catalog.
///
/// All string fields default to empty when the feed omits them; prices are
/// `None` when absent or unparsable.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Product {
    /// Stable identifier assigned by the scraper (short hash).
    pub id: String,
    /// Brand name, e.g. "Burton".
    pub brand: String,
    /// Display name of the board.
    pub name: String,
    /// Current price in catalog currency, if known.
    pub current_price: Option<f64>,
    /// Pre-discount price, if the listing carries one.
    pub original_price: Option<f64>,
    /// Discount label as published, e.g. "20%"; empty when none.
    pub discount: String,
    /// Coarse category derived from the listing title.
    pub category: String,
    /// Fully resolved image URL (may be empty).
    pub image_url: String,
    /// Link to the product page, if the listing carries one.
    pub product_url: Option<String>,
}

impl Product {
    /// Whether the listing is discounted, either via an explicit label or a
    /// current price below the original one.
    pub fn has_discount(&self) -> bool {
        if !self.discount.trim().is_empty() {
            return true;
        }
        matches!(
            (self.current_price, self.original_price),
            (Some(current), Some(original)) if current < original
        )
    }
}

/// Sorting mode for the product list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Ascending, case-insensitive on product name.
    #[default]
    Name,
    /// Ascending, case-insensitive on brand.
    Brand,
    /// Cheapest first; unpriced items always last.
    PriceAsc,
    /// Most expensive first; unpriced items always last.
    PriceDesc,
}

impl SortKey {
    /// Stable key used in the settings file.
    pub fn as_config_key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Brand => "brand",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }

    /// Parse a settings-file value, accepting a few legacy spellings.
    pub fn from_config_key(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "brand" => Some(Self::Brand),
            "price_asc" | "price_low" | "cheapest" => Some(Self::PriceAsc),
            "price_desc" | "price_high" => Some(Self::PriceDesc),
            _ => None,
        }
    }

    /// Short label for the status line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Brand => "brand",
            Self::PriceAsc => "price asc",
            Self::PriceDesc => "price desc",
        }
    }

    /// The next mode in the cycle order used by the sort key binding.
    pub fn next(&self) -> Self {
        match self {
            Self::Name => Self::Brand,
            Self::Brand => Self::PriceAsc,
            Self::PriceAsc => Self::PriceDesc,
            Self::PriceDesc => Self::Name,
        }
    }
}

/// Compare two optional prices so that unpriced items sort after priced ones
/// regardless of direction.
fn cmp_price(a: Option<f64>, b: Option<f64>, descending: bool) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if descending { ord.reverse() } else { ord }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort `items` in place according to `key`. The sort is stable, so products
/// with equal keys keep their catalog order.
pub fn sort_products(items: &mut [Product], key: SortKey) {
    match key {
        SortKey::Name => {
            items.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        SortKey::Brand => {
            items.sort_by(|a, b| a.brand.to_lowercase().cmp(&b.brand.to_lowercase()));
        }
        SortKey::PriceAsc => {
            items.sort_by(|a, b| cmp_price(a.current_price, b.current_price, false));
        }
        SortKey::PriceDesc => {
            items.sort_by(|a, b| cmp_price(a.current_price, b.current_price, true));
        }
    }
}

/// The product list state machine: single source of truth for what the user
/// currently sees.
///
/// Owns the full product set plus the active search keyword, brand filter,
/// discount filter, sort key, and pagination window. The visible subset is
/// always recomputed on demand from those parameters, never cached, so a
/// rendered page can never mix two filter states.
#[derive(Clone, Debug)]
pub struct ListView {
    products: Vec<Product>,
    search_keyword: String,
    brand_filter: String,
    discount_only: bool,
    sort_key: SortKey,
    page_size: usize,
    /// Requested window size; always a positive multiple of `page_size`.
    requested: usize,
}

impl ListView {
    /// Create an empty view revealing `page_size` items per page.
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            products: Vec::new(),
            search_keyword: String::new(),
            brand_filter: String::new(),
            discount_only: false,
            sort_key: SortKey::default(),
            page_size,
            requested: page_size,
        }
    }

    /// Replace the product set wholesale and restart search, brand filter and
    /// pagination. The sort key and the discount entry filter persist, since
    /// both are session preferences rather than per-catalog state.
    pub fn load(&mut self, products: Vec<Product>) {
        self.products = products;
        self.search_keyword.clear();
        self.brand_filter.clear();
        self.requested = self.page_size;
    }

    /// Full (unfiltered) product set in catalog order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Active search keyword (may be empty).
    pub fn search_keyword(&self) -> &str {
        &self.search_keyword
    }

    /// Active exact brand filter; empty means "all brands".
    pub fn brand_filter(&self) -> &str {
        &self.brand_filter
    }

    /// Whether only discounted listings are shown.
    pub fn discount_only(&self) -> bool {
        self.discount_only
    }

    /// Active sort key.
    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Page size this view was created with.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Set the search keyword (case-insensitive substring over name and
    /// brand; empty matches everything) and restart pagination.
    pub fn set_search(&mut self, keyword: &str) {
        self.search_keyword = keyword.to_string();
        self.requested = self.page_size;
    }

    /// Set the exact brand filter (empty clears it) and restart pagination.
    pub fn set_brand_filter(&mut self, brand: &str) {
        self.brand_filter = brand.to_string();
        self.requested = self.page_size;
    }

    /// Toggle the discounted-only filter and restart pagination.
    pub fn set_discount_only(&mut self, on: bool) {
        self.discount_only = on;
        self.requested = self.page_size;
    }

    /// Change the sort key. Pagination is preserved: the same number of items
    /// stays revealed, but which items occupy the window may change.
    pub fn set_sort(&mut self, key: SortKey) {
        self.sort_key = key;
    }

    /// Reveal one more page. Returns `false` (and does nothing) when the
    /// filtered set is already fully visible.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.requested += self.page_size;
        true
    }

    fn matches(&self, p: &Product) -> bool {
        if !self.search_keyword.is_empty() {
            let kw = self.search_keyword.to_lowercase();
            if !p.name.to_lowercase().contains(&kw) && !p.brand.to_lowercase().contains(&kw) {
                return false;
            }
        }
        if !self.brand_filter.is_empty() && p.brand != self.brand_filter {
            return false;
        }
        if self.discount_only && !p.has_discount() {
            return false;
        }
        true
    }

    /// Number of products passing the current filters.
    pub fn filtered_len(&self) -> usize {
        self.products.iter().filter(|p| self.matches(p)).count()
    }

    /// The visible subset: filter, sort, then slice to the revealed window.
    pub fn visible(&self) -> Vec<Product> {
        let mut items: Vec<Product> = self
            .products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();
        sort_products(&mut items, self.sort_key);
        items.truncate(self.requested);
        items
    }

    /// Length of [`ListView::visible`] without materializing it.
    pub fn visible_len(&self) -> usize {
        self.filtered_len().min(self.requested)
    }

    /// Whether more filtered products exist beyond the revealed window.
    pub fn has_more(&self) -> bool {
        self.visible_len() < self.filtered_len()
    }
}

/// Summary statistics for the catalog header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogStats {
    /// Total product count.
    pub total: usize,
    /// Number of distinct brands.
    pub brands: usize,
    /// Publisher timestamp of the feed ("unknown" when absent).
    pub last_updated: String,
}

/// Refresh request sent to the fetch worker, correlated by id so stale
/// responses can be discarded.
#[derive(Clone, Copy, Debug)]
pub struct RefreshRequest {
    /// Monotonic identifier allocated by the event loop.
    pub id: u64,
}

/// A fully prepared catalog, ready to be ingested into the view.
#[derive(Clone, Debug)]
pub struct LoadedCatalog {
    /// Normalized products in feed order.
    pub products: Vec<Product>,
    /// Header statistics derived from feed metadata and products.
    pub stats: CatalogStats,
    /// Whether this data is fresh or served from the cache fallback.
    pub origin: DataOrigin,
    /// Age of the cache file when `origin` is [`DataOrigin::Cache`].
    pub cache_age: Option<std::time::Duration>,
}

/// Outcome of a catalog load attempt, echoing the originating request id.
#[derive(Debug)]
pub struct CatalogLoad {
    /// Echoed identifier from the originating [`RefreshRequest`].
    pub id: u64,
    /// The prepared catalog, or the error that prevented loading one.
    pub outcome: Result<LoadedCatalog, crate::net::FetchError>,
}

/// Modal dialog state for the UI.
#[derive(Debug, Clone, Default)]
pub enum Modal {
    /// No modal; the list is interactive.
    #[default]
    None,
    /// Informational alert with a non-interactive message.
    Alert {
        /// Message body shown in the dialog.
        message: String,
    },
    /// Full details for a single product.
    Detail {
        /// The product being inspected.
        product: Product,
    },
    /// Help overlay with keybindings. Dismissed with Esc/Enter.
    Help,
}

/// Which part of the UI currently has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Search input: printable keys edit the keyword.
    Search,
    /// Product list: vim-style navigation and action keys.
    List,
}

/// Global application state shared by the event, networking, and UI layers.
///
/// Mutated only from the main event loop in response to input events and
/// background fetch results.
#[derive(Debug)]
pub struct AppState {
    /// The product list state machine.
    pub view: ListView,
    /// Header statistics for the current catalog.
    pub stats: CatalogStats,
    /// Origin of the current catalog; `None` before the first load.
    pub origin: Option<DataOrigin>,
    /// Age of the cached blob when showing cached data.
    pub cache_age: Option<std::time::Duration>,
    /// Whether a catalog fetch is in flight (single-flight guard).
    pub loading: bool,
    /// Set when the initial load failed and there is nothing to show.
    pub load_failed: bool,
    /// Index into the visible subset that is currently highlighted.
    pub selected: usize,
    /// List widget selection state.
    pub list_state: ListState,
    /// Which part of the UI receives keys.
    pub focus: Focus,
    /// Active modal dialog, if any.
    pub modal: Modal,
    /// Distinct brands of the loaded catalog, for the brand filter cycle.
    pub brand_options: Vec<String>,
    /// Brand filter requested at launch, applied once data arrives.
    pub pending_brand: Option<String>,
    /// Transient status message shown in the footer.
    pub toast_message: Option<String>,
    /// Deadline after which the toast is cleared.
    pub toast_expires_at: Option<Instant>,
    /// Identifier of the most recent refresh request.
    pub latest_load_id: u64,
    /// Next refresh identifier to allocate.
    pub next_load_id: u64,
    /// Base URL of the catalog publisher.
    pub base_url: String,
    /// Path of the cached raw catalog blob.
    pub cache_path: PathBuf,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: ListView::new(DEFAULT_PAGE_SIZE),
            stats: CatalogStats::default(),
            origin: None,
            cache_age: None,
            loading: false,
            load_failed: false,
            selected: 0,
            list_state: ListState::default(),
            focus: Focus::Search,
            modal: Modal::None,
            brand_options: Vec::new(),
            pending_brand: None,
            toast_message: None,
            toast_expires_at: None,
            latest_load_id: 0,
            next_load_id: 1,
            base_url: crate::theme::Settings::default().base_url,
            cache_path: crate::theme::cache_dir().join(crate::cache::CACHE_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(id: &str, brand: &str, name: &str, price: Option<f64>) -> Product {
        Product {
            id: id.to_string(),
            brand: brand.to_string(),
            name: name.to_string(),
            current_price: price,
            ..Default::default()
        }
    }

    fn catalog(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| board(&format!("id{i}"), "Burton", &format!("Board {i:02}"), Some(i as f64)))
            .collect()
    }

    #[test]
    fn paging_scenario_25_products_page_size_10() {
        let mut view = ListView::new(10);
        view.load(catalog(25));
        assert_eq!(view.visible().len(), 10);
        assert!(view.has_more());
        assert!(view.load_more());
        assert_eq!(view.visible().len(), 20);
        assert!(view.load_more());
        assert_eq!(view.visible().len(), 25);
        assert!(!view.has_more());
        // At the end, a further call is a no-op.
        assert!(!view.load_more());
        assert_eq!(view.visible().len(), 25);
    }

    #[test]
    fn paging_never_shrinks_or_overruns() {
        let mut view = ListView::new(10);
        view.load(catalog(25));
        let mut prev = view.visible_len();
        for _ in 0..10 {
            view.load_more();
            let len = view.visible_len();
            assert!(len >= prev);
            assert!(len <= view.filtered_len());
            prev = len;
        }
    }

    #[test]
    fn search_matches_name_or_brand_case_insensitively() {
        let mut view = ListView::new(10);
        let mut items = catalog(20);
        items.push(board("x1", "Lib Tech", "Orca", Some(500.0)));
        items.push(board("x2", "lib tech", "Dynamo", Some(450.0)));
        view.load(items);
        view.set_search("LIB");
        let visible = view.visible();
        assert_eq!(visible.len(), 2);
        assert!(
            visible
                .iter()
                .all(|p| p.brand.to_lowercase().contains("lib"))
        );
        view.set_search("");
        assert_eq!(view.filtered_len(), 22);
    }

    #[test]
    fn search_resets_pagination() {
        let mut view = ListView::new(10);
        view.load(catalog(25));
        view.load_more();
        assert_eq!(view.visible_len(), 20);
        view.set_search("board");
        assert_eq!(view.visible_len(), 10);
    }

    #[test]
    fn brand_filter_is_exact() {
        let mut view = ListView::new(10);
        let mut items = catalog(3);
        items.push(board("y1", "Lib Tech", "Orca", None));
        view.load(items);
        view.set_brand_filter("Lib Tech");
        assert_eq!(view.filtered_len(), 1);
        // Exact match: a differently cased brand is a different filter value.
        view.set_brand_filter("lib tech");
        assert_eq!(view.filtered_len(), 0);
        view.set_brand_filter("");
        assert_eq!(view.filtered_len(), 4);
    }

    #[test]
    fn filter_order_does_not_matter() {
        let mut items = catalog(10);
        items.push(board("z1", "Lib Tech", "Board 99", Some(1.0)));
        let mut a = ListView::new(5);
        a.load(items.clone());
        a.set_search("board");
        a.set_brand_filter("Burton");
        let mut b = ListView::new(5);
        b.load(items);
        b.set_brand_filter("Burton");
        b.set_search("board");
        let ids_a: Vec<String> = a.visible().into_iter().map(|p| p.id).collect();
        let ids_b: Vec<String> = b.visible().into_iter().map(|p| p.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn sort_is_idempotent_and_keeps_window_size() {
        let mut view = ListView::new(10);
        view.load(catalog(25));
        view.load_more();
        view.set_sort(SortKey::PriceDesc);
        let once: Vec<String> = view.visible().into_iter().map(|p| p.id).collect();
        view.set_sort(SortKey::PriceDesc);
        let twice: Vec<String> = view.visible().into_iter().map(|p| p.id).collect();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 20);
    }

    #[test]
    fn sort_applies_to_whole_filtered_set_before_paging() {
        let mut view = ListView::new(2);
        view.load(vec![
            board("a", "Burton", "Alpha", Some(900.0)),
            board("b", "Burton", "Bravo", Some(100.0)),
            board("c", "Burton", "Charlie", Some(500.0)),
            board("d", "Burton", "Delta", Some(50.0)),
        ]);
        view.set_sort(SortKey::PriceAsc);
        let visible = view.visible();
        // The cheapest two of the full set, not of the first page.
        assert_eq!(visible[0].id, "d");
        assert_eq!(visible[1].id, "b");
    }

    #[test]
    fn unpriced_products_sort_last_in_both_directions() {
        let items = vec![
            board("a", "Burton", "Alpha", None),
            board("b", "Burton", "Bravo", Some(300.0)),
            board("c", "Burton", "Charlie", Some(100.0)),
            board("d", "Burton", "Delta", None),
        ];
        for key in [SortKey::PriceAsc, SortKey::PriceDesc] {
            let mut sorted = items.clone();
            sort_products(&mut sorted, key);
            assert!(sorted[0].current_price.is_some());
            assert!(sorted[1].current_price.is_some());
            assert!(sorted[2].current_price.is_none());
            assert!(sorted[3].current_price.is_none());
            // Ties among unpriced items keep catalog order.
            assert_eq!(sorted[2].id, "a");
            assert_eq!(sorted[3].id, "d");
        }
    }

    #[test]
    fn name_sort_ties_keep_catalog_order() {
        let mut items = vec![
            board("first", "Burton", "Same", None),
            board("second", "Burton", "same", None),
            board("third", "Burton", "Aardvark", None),
        ];
        sort_products(&mut items, SortKey::Name);
        assert_eq!(items[0].id, "third");
        assert_eq!(items[1].id, "first");
        assert_eq!(items[2].id, "second");
    }

    #[test]
    fn load_resets_filters_and_is_idempotent() {
        let mut view = ListView::new(10);
        view.load(catalog(25));
        view.set_search("board");
        view.set_brand_filter("Burton");
        view.load_more();
        view.load(catalog(25));
        assert_eq!(view.search_keyword(), "");
        assert_eq!(view.brand_filter(), "");
        assert_eq!(view.visible_len(), 10);
        let before: Vec<String> = view.visible().into_iter().map(|p| p.id).collect();
        view.load(catalog(25));
        let after: Vec<String> = view.visible().into_iter().map(|p| p.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn discount_filter_keeps_labeled_and_implicit_discounts() {
        let mut labeled = board("a", "Burton", "Alpha", Some(100.0));
        labeled.discount = "20%".into();
        let mut implicit = board("b", "Burton", "Bravo", Some(80.0));
        implicit.original_price = Some(100.0);
        let full_price = board("c", "Burton", "Charlie", Some(100.0));
        let mut view = ListView::new(10);
        view.load(vec![labeled, implicit, full_price]);
        view.set_discount_only(true);
        let ids: Vec<String> = view.visible().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn short_filtered_set_caps_visible_window() {
        let mut view = ListView::new(10);
        let mut items = catalog(20);
        for (i, p) in items.iter_mut().enumerate().take(3) {
            p.brand = "Capita".into();
            p.id = format!("cap{i}");
        }
        view.load(items);
        view.set_search("capita");
        assert_eq!(view.visible_len(), 3);
        assert!(!view.has_more());
        assert!(!view.load_more());
    }

    #[test]
    fn sort_key_config_round_trip() {
        for key in [
            SortKey::Name,
            SortKey::Brand,
            SortKey::PriceAsc,
            SortKey::PriceDesc,
        ] {
            assert_eq!(SortKey::from_config_key(key.as_config_key()), Some(key));
        }
        assert_eq!(
            SortKey::from_config_key("price_low"),
            Some(SortKey::PriceAsc)
        );
        assert_eq!(SortKey::from_config_key("bogus"), None);
    }
}
