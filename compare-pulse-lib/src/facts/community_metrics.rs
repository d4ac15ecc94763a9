use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A snapshot of community metrics for one compared entity.
///
/// Every count defaults to zero and every optional field to absent, so
/// [`CommunityMetrics::default`] is the "nothing known yet" value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityMetrics {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub releases: u64,

    /// Commit totals of the last four weeks, oldest first.
    #[serde(rename = "commits4w")]
    pub commits_4w: Vec<u64>,

    pub issues_open: u64,

    /// Package downloads over the last week.
    pub npm_downloads: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub npm_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CommunityMetrics {
    /// Sum of the four weekly commit totals.
    #[must_use]
    pub fn commits_total(&self) -> u64 {
        self.commits_4w.iter().sum()
    }
}
