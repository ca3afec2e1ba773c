//! The seam between the resolution engine and the outside world.
//!
//! The engine only ever talks to a [`PackageProvider`]: project documents
//! for resolution, in-memory artifact bytes for wheel METADATA fallback,
//! and artifact persistence for the final download fan-out. The production
//! implementation wraps the PyPI registry client; tests substitute an
//! in-memory fixture.

use std::future::Future;
use std::path::Path;

use reqwest::Client;

use wheelhouse_pypi::download;
use wheelhouse_pypi::registry::{FetchOutcome, Registry};

/// Source of project documents and artifact bytes for one resolution run.
pub trait PackageProvider: Send + Sync + 'static {
    /// Fetch a package's project document (cached per name per run).
    fn project(&self, name: &str) -> impl Future<Output = FetchOutcome> + Send;

    /// Download an artifact into memory (wheel METADATA extraction).
    /// `Ok(None)` means the artifact URL answered 404.
    fn artifact_bytes(
        &self,
        url: &str,
    ) -> impl Future<Output = miette::Result<Option<Vec<u8>>>> + Send;

    /// Persist an artifact to disk, deleting any partial file on failure.
    /// Returns the number of bytes written (0 when already present).
    fn fetch_artifact(
        &self,
        url: &str,
        dest: &Path,
        label: &str,
        show_progress: bool,
    ) -> impl Future<Output = miette::Result<u64>> + Send;
}

/// Production provider: the PyPI registry plus a shared HTTP client.
pub struct PypiProvider {
    registry: Registry,
    client: Client,
}

impl PypiProvider {
    pub fn new(index_url: &str, client: Client) -> Self {
        Self {
            registry: Registry::new(index_url, client.clone()),
            client,
        }
    }
}

impl PackageProvider for PypiProvider {
    async fn project(&self, name: &str) -> FetchOutcome {
        self.registry.fetch(name).await
    }

    async fn artifact_bytes(&self, url: &str) -> miette::Result<Option<Vec<u8>>> {
        download::download_bytes(&self.client, url).await
    }

    async fn fetch_artifact(
        &self,
        url: &str,
        dest: &Path,
        label: &str,
        show_progress: bool,
    ) -> miette::Result<u64> {
        download::fetch_artifact(&self.client, url, dest, label, show_progress).await
    }
}
