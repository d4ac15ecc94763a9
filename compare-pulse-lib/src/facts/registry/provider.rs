use super::client::{Client, DownloadsPoint, Packument};
use super::registry_facts::{PackageMetadata, RegistryFacts};
use crate::Result;
use crate::facts::fetch_error::FetchResult;
use crate::facts::resilient_http::RetryPolicy;
use chrono::{DateTime, Utc};

const LOG_TARGET: &str = "  registry";

/// Default download counts endpoint.
pub const DEFAULT_NPM_DOWNLOADS_URL: &str = "https://api.npmjs.org";

/// Default package metadata endpoint.
pub const DEFAULT_NPM_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// Fetches package metrics from the registry.
#[derive(Debug, Clone)]
pub struct Provider {
    client: Client,
}

impl Provider {
    pub fn new(
        downloads_url: impl Into<String>,
        registry_url: impl Into<String>,
        retry: RetryPolicy,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::new(downloads_url, registry_url, retry, now)?,
        })
    }

    /// Fetch the weekly downloads and package metadata concurrently.
    ///
    /// Returns `None` without issuing any request when `package` is blank.
    pub async fn fetch(&self, package: &str) -> Option<RegistryFacts> {
        let package = package.trim();
        if package.is_empty() {
            return None;
        }

        log::info!(target: LOG_TARGET, "Querying package registry for '{package}'");

        let (downloads, metadata) = tokio::join!(self.get_downloads(package), self.get_metadata(package));
        let facts = RegistryFacts { downloads, metadata };

        for (group, e) in facts.failures() {
            log::warn!(target: LOG_TARGET, "Could not fetch {group} for '{package}': {e}");
        }

        Some(facts)
    }

    async fn get_downloads(&self, package: &str) -> FetchResult<u64> {
        let point: DownloadsPoint = self.client.get_json(&self.client.downloads_url(package)).await?;
        Ok(point.downloads.filter(|&d| d >= 0).map_or(0, i64::cast_unsigned))
    }

    async fn get_metadata(&self, package: &str) -> FetchResult<PackageMetadata> {
        let doc: Packument = self.client.get_json(&self.client.metadata_url(package)).await?;

        Ok(PackageMetadata {
            latest_version: doc.dist_tags.and_then(|tags| tags.latest),
            maintainers: doc
                .maintainers
                .as_ref()
                .and_then(serde_json::Value::as_array)
                .map(|list| list.len() as u64),
        })
    }
}
