use crate::facts::community_metrics::CommunityMetrics;
use crate::facts::fetch_error::{FetchError, FetchResult};
use crate::facts::metric_group::MetricGroup;

/// Fields taken from a package's metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMetadata {
    pub latest_version: Option<String>,
    pub maintainers: Option<u64>,
}

/// Outcome of the two registry reads for one package.
#[derive(Debug, Clone)]
pub struct RegistryFacts {
    pub downloads: FetchResult<u64>,
    pub metadata: FetchResult<PackageMetadata>,
}

impl RegistryFacts {
    /// Overwrite the fields of `metrics` whose read succeeded.
    pub fn apply_to(&self, metrics: &mut CommunityMetrics) {
        if let Ok(downloads) = self.downloads {
            metrics.npm_downloads = downloads;
        }

        if let Ok(metadata) = &self.metadata {
            metrics.npm_version.clone_from(&metadata.latest_version);
            metrics.maintainers = metadata.maintainers;
        }
    }

    /// The reads that failed, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (MetricGroup, &FetchError)> {
        [
            (MetricGroup::Downloads, self.downloads.as_ref().err()),
            (MetricGroup::PackageMetadata, self.metadata.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(group, err)| err.map(|e| (group, e)))
    }
}
