//! Wire-format catalog types and normalization into canonical products.
//!
//! The published feed is a single JSON document `{products: [...],
//! metadata: {...}}` scraped from a retailer; every field may be absent or
//! null, so everything here is total over missing data.
use serde_json::Value;

use crate::state::{CatalogStats, Product};

/// One product record as published, untrusted and fully optional.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct RawProduct {
    /// Scraper-assigned identifier (short hash).
    #[serde(default)]
    pub id: Option<String>,
    /// Detected brand name.
    #[serde(default)]
    pub brand: Option<String>,
    /// Listing title.
    #[serde(default)]
    pub name: Option<String>,
    /// Current price; historically either `"$129.99"` or a bare number.
    #[serde(default, deserialize_with = "de_price")]
    pub current_price: Option<String>,
    /// Pre-discount price, same formats as `current_price`.
    #[serde(default, deserialize_with = "de_price")]
    pub original_price: Option<String>,
    /// Discount label, e.g. `"20%"`.
    #[serde(default)]
    pub discount: Option<String>,
    /// Coarse category derived from the title.
    #[serde(default)]
    pub category: Option<String>,
    /// Retailer-hosted image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Mirrored image filename relative to the publisher's image directory.
    #[serde(default)]
    pub local_image: Option<String>,
    /// Link to the retailer product page.
    #[serde(default)]
    pub product_url: Option<String>,
}

/// Feed-level metadata block; any field may be missing.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct RawMetadata {
    /// Publisher's product count.
    #[serde(default)]
    pub total_products: Option<u64>,
    /// Publisher's distinct-brand count.
    #[serde(default)]
    pub unique_brands: Option<u64>,
    /// Publisher timestamp of the last scrape.
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// The complete wire catalog as fetched (and as cached on disk).
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct RawCatalog {
    /// Product records in scrape order.
    #[serde(default, deserialize_with = "de_null_default")]
    pub products: Vec<RawProduct>,
    /// Feed metadata.
    #[serde(default, deserialize_with = "de_null_default")]
    pub metadata: RawMetadata,
}

/// Treat an explicit JSON `null` the same as an absent field.
fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    use serde::Deserialize;
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a price published either as a string or as a bare JSON number;
/// anything else becomes `None`.
fn de_price<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Parse a currency-prefixed price string, e.g. `"$1,299.99"`.
///
/// Leading non-numeric characters and thousands separators are stripped;
/// anything that still fails to parse yields `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let start = trimmed.find(|c: char| c.is_ascii_digit())?;
    let digits: String = trimmed[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    digits.parse::<f64>().ok()
}

/// Resolve the display image URL for a raw record.
///
/// A mirrored `local_image` wins and resolves under the publisher's image
/// directory; otherwise the retailer `image_url` is used verbatim; otherwise
/// the result is empty.
pub fn resolve_image_url(raw: &RawProduct, base_url: &str) -> String {
    if let Some(local) = raw.local_image.as_deref()
        && !local.is_empty()
    {
        return format!("{}/web/images/{local}", base_url.trim_end_matches('/'));
    }
    raw.image_url.clone().unwrap_or_default()
}

/// Map raw feed records into canonical [`Product`]s.
///
/// Pure and total: missing fields map to empty strings or `None`, and the
/// output order matches the input order so that later stable sorts break
/// ties deterministically.
pub fn normalize(raw: &[RawProduct], base_url: &str) -> Vec<Product> {
    raw.iter()
        .map(|r| Product {
            id: r.id.clone().unwrap_or_default(),
            brand: r.brand.clone().unwrap_or_default(),
            name: r.name.clone().unwrap_or_default(),
            current_price: r.current_price.as_deref().and_then(parse_price),
            original_price: r.original_price.as_deref().and_then(parse_price),
            discount: r.discount.clone().unwrap_or_default(),
            category: r.category.clone().unwrap_or_default(),
            image_url: resolve_image_url(r, base_url),
            product_url: r.product_url.clone().filter(|u| !u.is_empty()),
        })
        .collect()
}

/// Derive header statistics, preferring feed metadata when it is present and
/// non-zero/non-empty and falling back to values computed from the products.
pub fn summarize(products: &[Product], metadata: &RawMetadata) -> CatalogStats {
    let total = match metadata.total_products {
        Some(n) if n > 0 => n as usize,
        _ => products.len(),
    };
    let brands = match metadata.unique_brands {
        Some(n) if n > 0 => n as usize,
        _ => {
            let distinct: std::collections::BTreeSet<&str> =
                products.iter().map(|p| p.brand.as_str()).collect();
            distinct.len()
        }
    };
    let last_updated = metadata
        .last_updated
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    CatalogStats {
        total,
        brands,
        last_updated,
    }
}

/// Distinct brand names of the catalog, sorted case-insensitively, for the
/// brand filter cycle. Empty brands are skipped.
pub fn distinct_brands(products: &[Product]) -> Vec<String> {
    let mut brands: Vec<String> = products
        .iter()
        .map(|p| p.brand.clone())
        .filter(|b| !b.is_empty())
        .collect();
    brands.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
    brands.dedup();
    brands
}
