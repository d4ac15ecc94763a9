//! Package-registry API client
//!
//! Talks to two services: the download counts API and the package metadata registry.

use crate::facts::fetch_error::{FetchError, FetchResult};
use crate::facts::resilient_http::{RetryPolicy, resilient_get};
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Characters escaped in a package name used as a path segment. `@` stays as is.
const PACKAGE_SEGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'%').add(b'/').add(b'?');

/// Body of the `downloads/point/last-week` endpoint.
#[derive(Debug, Deserialize)]
pub struct DownloadsPoint {
    #[serde(default)]
    pub downloads: Option<i64>,
}

/// The parts of a package document that are used.
#[derive(Debug, Deserialize)]
pub struct Packument {
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: Option<DistTags>,

    /// Kept loose since only arrays are counted.
    #[serde(default)]
    pub maintainers: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct DistTags {
    #[serde(default)]
    pub latest: Option<String>,
}

#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    downloads_base: String,
    registry_base: String,
    retry: RetryPolicy,
    now: DateTime<Utc>,
}

impl Client {
    pub fn new(
        downloads_url: impl Into<String>,
        registry_url: impl Into<String>,
        retry: RetryPolicy,
        now: DateTime<Utc>,
    ) -> crate::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().user_agent(crate::USER_AGENT).build()?,
            downloads_base: downloads_url.into().trim_end_matches('/').to_string(),
            registry_base: registry_url.into().trim_end_matches('/').to_string(),
            retry,
            now,
        })
    }

    /// URL of the weekly download count for `package`.
    #[must_use]
    pub fn downloads_url(&self, package: &str) -> String {
        format!("{}/downloads/point/last-week/{package}", self.downloads_base)
    }

    /// URL of the metadata document for `package`.
    ///
    /// The separator of a scoped name is encoded so the name stays a single path segment.
    #[must_use]
    pub fn metadata_url(&self, package: &str) -> String {
        format!("{}/{}", self.registry_base, utf8_percent_encode(package, PACKAGE_SEGMENT))
    }

    /// Make an API call and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        let resp = resilient_get(&self.client, url, &self.retry).await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status, None, self.now));
        }

        Ok(resp.json().await?)
    }
}
