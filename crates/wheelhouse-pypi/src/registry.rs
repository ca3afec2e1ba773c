//! PyPI registry client with a per-run project cache.
//!
//! Every distinct (normalized) package name triggers exactly one network
//! call per run; all outcomes, including misses and network failures, are
//! cached so a flaky package is not re-fetched for every requester.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use wheelhouse_core::requirement::normalize_name;
use wheelhouse_util::errors::WheelhouseError;

use crate::release::ProjectIndex;

/// Public PyPI base URL.
pub const PYPI_BASE_URL: &str = "https://pypi.org";

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Typed outcome of a project lookup.
///
/// Recovery policy lives in the resolution engine, not here: the engine
/// treats `NotFound` and `NetworkError` the same way (skip + warning), but
/// the distinction is kept for the audit log.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Found(Arc<ProjectIndex>),
    NotFound,
    NetworkError(String),
}

/// Build a shared reqwest client for registry and artifact requests.
pub fn build_client() -> miette::Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent("wheelhouse/0.2")
        .build()
        .map_err(|e| {
            WheelhouseError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            }
            .into()
        })
}

/// A registry endpoint plus the run-scoped project cache.
pub struct Registry {
    base_url: String,
    client: Client,
    /// Keyed by normalized name. The lock is held across the fetch so the
    /// one-call-per-name invariant also holds under the worker-pool variant
    /// (index fetches serialize; artifact downloads do not).
    cache: Mutex<HashMap<String, FetchOutcome>>,
}

impl Registry {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// JSON project document URL for a package name.
    pub fn project_url(&self, name: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, normalize_name(name))
    }

    /// Fetch a package's project document, consulting the run cache first.
    pub async fn fetch(&self, name: &str) -> FetchOutcome {
        let key = normalize_name(name);
        let mut cache = self.cache.lock().await;
        if let Some(outcome) = cache.get(&key) {
            debug!(package = %key, "registry cache hit");
            return outcome.clone();
        }

        let outcome = self.fetch_uncached(&key).await;
        cache.insert(key, outcome.clone());
        outcome
    }

    async fn fetch_uncached(&self, name: &str) -> FetchOutcome {
        let url = self.project_url(name);
        let mut last_err = String::new();

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                tokio::time::sleep(RETRY_DELAY * attempt).await;
            }

            match self.client.get(&url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return FetchOutcome::NotFound;
                    }
                    if status.is_server_error() {
                        last_err = format!("HTTP {status} from {url}");
                        continue;
                    }
                    if !status.is_success() {
                        return FetchOutcome::NetworkError(format!("HTTP {status} fetching {url}"));
                    }
                    return match resp.json::<ProjectIndex>().await {
                        Ok(index) => FetchOutcome::Found(Arc::new(index)),
                        Err(e) => FetchOutcome::NetworkError(format!(
                            "Malformed project document from {url}: {e}"
                        )),
                    };
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last_err = format!("{e}");
                    continue;
                }
                Err(e) => {
                    return FetchOutcome::NetworkError(format!("Request to {url} failed: {e}"));
                }
            }
        }

        warn!(package = %name, error = %last_err, "registry unreachable after retries");
        FetchOutcome::NetworkError(format!(
            "Failed after {MAX_RETRIES} retries for {url}: {last_err}"
        ))
    }
}
