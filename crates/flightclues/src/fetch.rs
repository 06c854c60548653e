//! Record acquisition: pages the remote flight listing into a local store.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::verify::{append_segment, parse_base_url};

/// Why pagination stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// A page had no items.
    EmptyPage {
        /// Page number.
        page: u32,
    },
    /// A page answered with a non-success status.
    Status {
        /// Page number.
        page: u32,
        /// HTTP status code.
        status: u16,
    },
    /// A page could not be fetched or decoded.
    Failed {
        /// Page number.
        page: u32,
        /// What went wrong.
        reason: String,
    },
}

/// Result of paging through the listing.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSummary {
    /// Records accumulated across pages, in page order.
    pub records: Vec<Value>,
    /// Pages that contributed records.
    pub pages: u32,
    /// Why the walk ended.
    pub stop_reason: StopReason,
}

/// Client for the paginated `/flights` listing.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    listing_url: Url,
    page_size: u32,
}

impl FetchClient {
    /// Create a client for the listing under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str, page_size: u32, timeout: Duration) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            listing_url: append_segment(&base, "flights")?,
            page_size,
        })
    }

    /// URL of one listing page (pages start at 1).
    #[must_use]
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.listing_url.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &self.page_size.to_string());
        url
    }

    /// Walk the listing from page 1 until a page is empty or fails.
    ///
    /// Failures end the walk but are not errors; whatever was collected
    /// before them is returned.
    pub async fn fetch_all(&self) -> FetchSummary {
        let mut records = Vec::new();
        let mut page = 1;

        let stop_reason = loop {
            let url = self.page_url(page);
            debug!("Fetching {url}");

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(page, error = %e, "Listing request failed");
                    break StopReason::Failed {
                        page,
                        reason: e.to_string(),
                    };
                }
            };

            let status = response.status();
            if !status.is_success() {
                warn!(page, status = status.as_u16(), "Listing returned an error status");
                break StopReason::Status {
                    page,
                    status: status.as_u16(),
                };
            }

            let body: Value = match response.json().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(page, error = %e, "Listing page is not valid JSON");
                    break StopReason::Failed {
                        page,
                        reason: e.to_string(),
                    };
                }
            };

            let items = match body {
                Value::Object(mut map) => match map.remove("items") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            };
            if items.is_empty() {
                break StopReason::EmptyPage { page };
            }

            info!(page, items = items.len(), "Fetched page");
            records.extend(items);
            page += 1;
        };

        FetchSummary {
            records,
            pages: page - 1,
            stop_reason,
        }
    }
}

/// Write records to the store as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`Error::DirectoryCreate`] if the parent directory cannot be
/// created, or an I/O or JSON error on write failure.
pub fn write_store(path: impl AsRef<Path>, records: &[Value]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    info!(records = records.len(), "Record store written to {}", path.display());
    Ok(())
}

/// Create `dir` and its parents.
///
/// # Errors
///
/// Returns [`Error::DirectoryCreate`] on failure.
pub(crate) fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
        path: dir.to_path_buf(),
        source,
    })
}

/// Create the parent directory of a file path, if it has one.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => ensure_dir(parent),
        None => Ok(()),
    }
}
