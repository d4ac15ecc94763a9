use super::client::{Client, Repository, WeeklyCommitActivity, last_page_from_link};
use super::hosting_facts::{HostingFacts, RepoSummary, clamp_count};
use crate::Result;
use crate::facts::fetch_error::{FetchError, FetchResult};
use crate::facts::repo_ref::RepoRef;
use crate::facts::resilient_http::RetryPolicy;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::LINK;

const LOG_TARGET: &str = "   hosting";

/// Default code-host API endpoint.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Number of trailing weeks of commit activity kept.
const COMMIT_WEEKS: usize = 4;

/// Fetches repository metrics from the code host.
#[derive(Debug, Clone)]
pub struct Provider {
    client: Client,
}

impl Provider {
    pub fn new(token: Option<&str>, base_url: impl Into<String>, retry: RetryPolicy, now: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            client: Client::new(token, base_url, retry, now)?,
        })
    }

    /// Fetch the repository summary, release count and commit activity concurrently.
    ///
    /// Never fails as a whole; each read carries its own outcome.
    pub async fn fetch(&self, repo: &RepoRef) -> HostingFacts {
        log::info!(target: LOG_TARGET, "Querying code host for '{repo}'");

        let (summary, releases, commit_activity) = tokio::join!(
            self.get_repo_summary(repo),
            self.get_release_count(repo),
            self.get_commit_activity(repo),
        );

        let facts = HostingFacts {
            summary,
            releases,
            commit_activity,
        };

        for (group, e) in facts.failures() {
            log::warn!(target: LOG_TARGET, "Could not fetch {group} for '{repo}': {e}");
        }

        facts
    }

    async fn get_repo_summary(&self, repo: &RepoRef) -> FetchResult<RepoSummary> {
        let url = self.client.repo_url(repo.owner(), repo.repo(), "");
        let info: Repository = self.client.get_json(&url).await?;

        Ok(RepoSummary {
            stars: clamp_count(info.stargazers_count),
            forks: clamp_count(info.forks_count),
            watchers: clamp_count(info.subscribers_count.or(info.watchers_count)),
            open_issues: clamp_count(info.open_issues_count),
            created_at: info.created_at,
            pushed_at: info.pushed_at,
            updated_at: info.updated_at,
        })
    }

    /// Release count, taken from the last page number when listing one release per page.
    async fn get_release_count(&self, repo: &RepoRef) -> FetchResult<u64> {
        let url = self.client.repo_url(repo.owner(), repo.repo(), "/releases?per_page=1");
        let resp = self.client.api_call(&url).await?;

        let last_page = resp
            .headers()
            .get(LINK)
            .and_then(|h| h.to_str().ok())
            .and_then(last_page_from_link);

        if let Some(count) = last_page {
            return Ok(count);
        }

        let releases: Vec<serde_json::Value> = resp.json().await?;
        Ok(releases.len() as u64)
    }

    /// Totals of the last four weeks of commit activity, oldest first.
    async fn get_commit_activity(&self, repo: &RepoRef) -> FetchResult<Vec<u64>> {
        let url = self.client.repo_url(repo.owner(), repo.repo(), "/stats/commit_activity");
        let resp = self.client.api_call(&url).await?;

        if resp.status() == StatusCode::ACCEPTED {
            log::debug!(target: LOG_TARGET, "Commit statistics for '{repo}' are still being computed");
            return Err(FetchError::Status(StatusCode::ACCEPTED.as_u16()));
        }

        let weeks: Vec<WeeklyCommitActivity> = resp.json().await?;
        let skip = weeks.len().saturating_sub(COMMIT_WEEKS);

        Ok(weeks.into_iter().skip(skip).map(|w| clamp_count(w.total)).collect())
    }
}
