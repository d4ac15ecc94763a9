use crate::facts::community_metrics::CommunityMetrics;
use crate::facts::fetch_error::{FetchError, FetchResult};
use crate::facts::metric_group::MetricGroup;
use chrono::{DateTime, Utc};

/// Counters and timestamps from the repository summary endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSummary {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Outcome of the three code-host reads for one repository.
///
/// Each read succeeds or fails on its own.
#[derive(Debug, Clone)]
pub struct HostingFacts {
    pub summary: FetchResult<RepoSummary>,
    pub releases: FetchResult<u64>,
    pub commit_activity: FetchResult<Vec<u64>>,
}

impl HostingFacts {
    /// Overwrite the fields of `metrics` whose read succeeded.
    ///
    /// A failed commit activity read degrades to an empty series.
    pub fn apply_to(&self, metrics: &mut CommunityMetrics) {
        if let Ok(summary) = &self.summary {
            metrics.stars = summary.stars;
            metrics.forks = summary.forks;
            metrics.watchers = summary.watchers;
            metrics.issues_open = summary.open_issues;
            metrics.created_at = summary.created_at;
            metrics.pushed_at = summary.pushed_at;
            metrics.updated_at = summary.updated_at;
        }

        if let Ok(releases) = self.releases {
            metrics.releases = releases;
        }

        metrics.commits_4w = self.commit_activity.as_ref().map_or_else(|_| Vec::new(), Clone::clone);
    }

    /// The reads that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (MetricGroup, &FetchError)> {
        [
            (MetricGroup::RepoSummary, self.summary.as_ref().err()),
            (MetricGroup::Releases, self.releases.as_ref().err()),
            (MetricGroup::CommitActivity, self.commit_activity.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(group, err)| err.map(|e| (group, e)))
    }
}

/// Clamp a count reported by the API to a non-negative value.
pub(super) fn clamp_count(value: Option<i64>) -> u64 {
    value.filter(|&v| v >= 0).map_or(0, i64::cast_unsigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RepoSummary {
        RepoSummary {
            stars: 10,
            forks: 2,
            watchers: 3,
            open_issues: 4,
            created_at: DateTime::from_timestamp(1_704_067_200, 0),
            pushed_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_apply_all_successful() {
        let facts = HostingFacts {
            summary: Ok(summary()),
            releases: Ok(7),
            commit_activity: Ok(vec![1, 2, 3, 4]),
        };

        let mut metrics = CommunityMetrics::default();
        facts.apply_to(&mut metrics);

        assert_eq!(metrics.stars, 10);
        assert_eq!(metrics.forks, 2);
        assert_eq!(metrics.watchers, 3);
        assert_eq!(metrics.issues_open, 4);
        assert_eq!(metrics.releases, 7);
        assert_eq!(metrics.commits_4w, vec![1, 2, 3, 4]);
        assert!(metrics.created_at.is_some());
        assert_eq!(facts.failures().count(), 0);
    }

    #[test]
    fn test_apply_keeps_fields_of_failed_reads() {
        let facts = HostingFacts {
            summary: Err(FetchError::NotFound),
            releases: Err(FetchError::Status(500)),
            commit_activity: Err(FetchError::Status(202)),
        };

        let mut metrics = CommunityMetrics {
            stars: 99,
            releases: 5,
            commits_4w: vec![9, 9, 9, 9],
            ..CommunityMetrics::default()
        };
        facts.apply_to(&mut metrics);

        assert_eq!(metrics.stars, 99);
        assert_eq!(metrics.releases, 5);
        assert!(metrics.commits_4w.is_empty());

        let groups: Vec<_> = facts.failures().map(|(group, _)| group).collect();
        assert_eq!(
            groups,
            vec![MetricGroup::RepoSummary, MetricGroup::Releases, MetricGroup::CommitActivity]
        );
    }

    #[test]
    fn test_partial_failure() {
        let facts = HostingFacts {
            summary: Ok(summary()),
            releases: Ok(1),
            commit_activity: Err(FetchError::Status(202)),
        };

        let mut metrics = CommunityMetrics::default();
        facts.apply_to(&mut metrics);

        assert_eq!(metrics.stars, 10);
        assert_eq!(metrics.forks, 2);
        assert!(metrics.commits_4w.is_empty());

        let failures: Vec<_> = facts.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, MetricGroup::CommitActivity);
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(Some(5)), 5);
        assert_eq!(clamp_count(Some(0)), 0);
        assert_eq!(clamp_count(Some(-3)), 0);
        assert_eq!(clamp_count(None), 0);
    }
}
