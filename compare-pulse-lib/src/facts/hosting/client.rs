//! Code-host API client
//!
//! Minimal client for the GitHub REST API, limited to the repository summary,
//! release listing and commit activity endpoints.

use crate::facts::fetch_error::{FetchError, FetchResult, RateLimitInfo};
use crate::facts::resilient_http::{RetryPolicy, resilient_get};
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

const LOG_TARGET: &str = "   hosting";

/// Media type requested from the code host.
const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";

static LAST_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[?&]page=(\d+)>;\s*rel="last""#).expect("last-page pattern is valid"));

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub stargazers_count: Option<i64>,
    pub forks_count: Option<i64>,
    #[serde(default)]
    pub subscribers_count: Option<i64>,
    #[serde(default)]
    pub watchers_count: Option<i64>,
    #[serde(default)]
    pub open_issues_count: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One week of the commit activity statistics.
#[derive(Debug, Deserialize)]
pub struct WeeklyCommitActivity {
    #[serde(default)]
    pub total: Option<i64>,
}

/// Code-host API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
    now: DateTime<Utc>,
}

impl Client {
    /// Create a new client with an optional authentication token.
    pub fn new(token: Option<&str>, base_url: impl Into<String>, retry: RetryPolicy, now: DateTime<Utc>) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();
        let _ = headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_MEDIA_TYPE));

        if let Some(t) = token.map(str::trim).filter(|t| !t.is_empty()) {
            let mut auth_val = HeaderValue::from_str(&format!("token {t}"))?;
            auth_val.set_sensitive(true);
            let _ = headers.insert(AUTHORIZATION, auth_val);
        }

        let client = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
            now,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a repository endpoint, with an optional path suffix.
    #[must_use]
    pub fn repo_url(&self, owner: &str, repo: &str, suffix: &str) -> String {
        format!("{}/repos/{owner}/{repo}{suffix}", self.base_url)
    }

    /// Make an API call and classify the result.
    pub async fn api_call(&self, url: &str) -> FetchResult<reqwest::Response> {
        let resp = resilient_get(&self.client, url, &self.retry).await?;

        let rate_limit = extract_rate_limit_from_headers(resp.headers());
        if let Some(info) = rate_limit {
            log::trace!(target: LOG_TARGET, "{} requests left until {}", info.remaining, info.reset_at);
        }

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        Err(FetchError::from_status(status, rate_limit, self.now))
    }

    /// Make an API call and decode its JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        let resp = self.api_call(url).await?;
        Ok(resp.json().await?)
    }
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;
    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;
    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}

/// Page number of the `rel="last"` link in a `Link` header.
///
/// With one item per page this is the total item count.
#[must_use]
pub fn last_page_from_link(link: &str) -> Option<u64> {
    LAST_PAGE.captures(link)?.get(1)?.as_str().parse().ok()
}
