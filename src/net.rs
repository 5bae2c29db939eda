//! Catalog retrieval over HTTP with a one-shot cache fallback.
use std::fmt;
use std::path::Path;

use crate::cache;
use crate::catalog::RawCatalog;
use crate::state::DataOrigin;

/// Failure modes of a catalog load.
#[derive(Debug)]
pub enum FetchError {
    /// The request could not be sent or the response body not read.
    Network(reqwest::Error),
    /// The endpoint answered with a non-success status.
    Http {
        /// HTTP status returned by the endpoint.
        status: reqwest::StatusCode,
    },
    /// The response body was not a valid catalog document.
    Parse(serde_json::Error),
    /// The fetch failed and no cached fallback was available.
    CacheMiss {
        /// Formatted description of the fetch failure that preceded the miss.
        cause: String,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(err) => write!(f, "network error: {err}"),
            Self::Http { status } => write!(f, "catalog endpoint returned {status}"),
            Self::Parse(err) => write!(f, "malformed catalog document: {err}"),
            Self::CacheMiss { cause } => {
                write!(f, "no cached catalog after failed fetch ({cause})")
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Network(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Http { .. } | Self::CacheMiss { .. } => None,
        }
    }
}

/// Fetch the catalog document from `<base_url>/web/data.json`, with a
/// timestamp query parameter to defeat intermediary caching.
pub async fn fetch_catalog(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<RawCatalog, FetchError> {
    let url = format!(
        "{}/web/data.json?t={}",
        base_url.trim_end_matches('/'),
        chrono::Utc::now().timestamp()
    );
    tracing::debug!(url = %url, "fetching catalog");
    let resp = client.get(&url).send().await.map_err(FetchError::Network)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Http { status });
    }
    let body = resp.bytes().await.map_err(FetchError::Network)?;
    let catalog = serde_json::from_slice::<RawCatalog>(&body).map_err(FetchError::Parse)?;
    tracing::info!(products = catalog.products.len(), "catalog fetched");
    Ok(catalog)
}

/// Load the catalog: remote fetch first, then a single cache fallback.
///
/// On fetch success the blob is cached for next time. On failure the cached
/// blob (if any) is served and labeled [`DataOrigin::Cache`]; when neither
/// source yields data, a [`FetchError::CacheMiss`] carrying the fetch
/// failure is returned.
pub async fn load_catalog(
    client: &reqwest::Client,
    base_url: &str,
    cache_path: &Path,
) -> Result<(RawCatalog, DataOrigin), FetchError> {
    match fetch_catalog(client, base_url).await {
        Ok(catalog) => {
            cache::store(cache_path, &catalog);
            Ok((catalog, DataOrigin::Fresh))
        }
        Err(err) => {
            tracing::warn!(error = %err, "catalog fetch failed, trying cache");
            match cache::load(cache_path) {
                Some(catalog) => {
                    tracing::info!(products = catalog.products.len(), "serving cached catalog");
                    Ok((catalog, DataOrigin::Cache))
                }
                None => Err(FetchError::CacheMiss {
                    cause: err.to_string(),
                }),
            }
        }
    }
}
