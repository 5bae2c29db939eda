//! On-disk persistence of the last successfully fetched raw catalog.
//!
//! A single JSON blob, written after every successful fetch and read once as
//! a fallback when a fetch fails. All IO here is best-effort: failures are
//! logged and reported as misses, never propagated.
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::catalog::RawCatalog;

/// File name of the cached blob under the cache directory.
pub const CACHE_FILE: &str = "snowboards_data.json";

/// Read the cached catalog, if a readable and parsable blob exists.
pub fn load(path: &Path) -> Option<RawCatalog> {
    let body = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no cached catalog");
            return None;
        }
    };
    match serde_json::from_str::<RawCatalog>(&body) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cached catalog unreadable");
            None
        }
    }
}

/// Persist `catalog` as the new fallback blob.
pub fn store(path: &Path, catalog: &RawCatalog) {
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    match serde_json::to_string(catalog) {
        Ok(body) => {
            if let Err(e) = fs::write(path, body) {
                tracing::warn!(path = %path.display(), error = %e, "failed to write catalog cache");
            } else {
                tracing::debug!(path = %path.display(), products = catalog.products.len(), "catalog cached");
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to serialize catalog cache"),
    }
}

/// Age of the cached blob, from its modification time.
pub fn age(path: &Path) -> Option<Duration> {
    let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
    let modified: chrono::DateTime<chrono::Utc> = modified.into();
    (chrono::Utc::now() - modified).to_std().ok()
}
