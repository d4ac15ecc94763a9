use strum::Display;

/// A group of metric fields filled in by one remote read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MetricGroup {
    #[strum(to_string = "repository summary")]
    RepoSummary,

    #[strum(to_string = "releases")]
    Releases,

    #[strum(to_string = "commit activity")]
    CommitActivity,

    #[strum(to_string = "downloads")]
    Downloads,

    #[strum(to_string = "package metadata")]
    PackageMetadata,
}
