use super::cache::Cache;
use super::community_metrics::CommunityMetrics;
use super::comparison::{ComparisonConfig, EntityConfig};
use super::entity::{EntityKey, EntityMap};
use super::fetch_error::FetchError;
use super::metric_group::MetricGroup;
use super::repo_ref::{self, RepoRef};
use super::{hosting, registry};
use crate::Result;
use chrono::{DateTime, Utc};
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use strum::Display;

const LOG_TARGET: &str = " collector";

/// Where an entity's metrics came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Source {
    Cache,
    Network,
}

/// Metrics for one entity, plus the reads that failed while producing them.
///
/// A failed read leaves its fields at their defaults, so `failures` is what tells a genuine
/// zero apart from a missing value.
#[derive(Debug, Clone)]
pub struct EntityReport {
    pub metrics: CommunityMetrics,
    pub source: Source,
    pub failures: Vec<(MetricGroup, FetchError)>,
}

/// Gathers community metrics for both compared entities, going through the cache.
#[derive(Debug)]
pub struct Collector {
    hosting: hosting::Provider,
    registry: registry::Provider,
    cache: Cache,

    /// Bumped by every [`Collector::clear`]. Collections that started in an older epoch don't write back.
    epoch: AtomicU64,

    /// Held while clearing, and while checking the epoch and writing an entry.
    writes: Mutex<()>,
}

/// Cache key for an entity's merged metrics.
///
/// Built from the normalized repository reference (empty when not configured) and the trimmed
/// package name.
#[must_use]
pub fn cache_key(repo: Option<&RepoRef>, package: &str) -> String {
    let repo = repo.map(ToString::to_string).unwrap_or_default();
    format!("community:{repo}|{}", package.trim())
}

impl Collector {
    #[must_use]
    pub const fn new(hosting: hosting::Provider, registry: registry::Provider, cache: Cache) -> Self {
        Self {
            hosting,
            registry,
            cache,
            epoch: AtomicU64::new(0),
            writes: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Collect metrics for both entities concurrently.
    ///
    /// Individual read failures only degrade the affected fields. An error is returned only when
    /// the store itself is unusable.
    pub async fn collect(&self, now: DateTime<Utc>, config: &ComparisonConfig) -> Result<EntityMap<EntityReport>> {
        self.cache.store().ensure_dir()?;
        let cache = self.cache.at(now);
        let epoch = self.epoch.load(Ordering::Acquire);

        let (openspec, speckit) = tokio::join!(
            self.collect_entity(&cache, epoch, EntityKey::OpenSpec, config.get(EntityKey::OpenSpec)),
            self.collect_entity(&cache, epoch, EntityKey::SpecKit, config.get(EntityKey::SpecKit)),
        );

        Ok(EntityMap::new(openspec, speckit))
    }

    async fn collect_entity(&self, cache: &Cache, epoch: u64, key: EntityKey, entity: &EntityConfig) -> EntityReport {
        let repo = repo_ref::normalize(&entity.github_repo);
        let package = entity.npm_pkg.trim();
        let cache_key = cache_key(repo.as_ref(), package);

        if let Some(metrics) = cache.load::<CommunityMetrics>(&cache_key) {
            log::info!(target: LOG_TARGET, "Using cached metrics for {key}");
            return EntityReport {
                metrics,
                source: Source::Cache,
                failures: Vec::new(),
            };
        }

        if repo.is_none() && !entity.github_repo.trim().is_empty() {
            log::warn!(target: LOG_TARGET, "Ignoring malformed repository reference '{}' for {key}", entity.github_repo);
        }

        let hosting = async {
            match &repo {
                Some(repo) => Some(self.hosting.fetch(repo).await),
                None => None,
            }
        };

        let (hosting, registry) = tokio::join!(hosting, self.registry.fetch(package));

        let mut metrics = CommunityMetrics::default();
        let mut failures = Vec::new();

        if let Some(facts) = &hosting {
            facts.apply_to(&mut metrics);
            failures.extend(facts.failures().map(|(group, e)| (group, e.clone())));
        }

        if let Some(facts) = &registry {
            facts.apply_to(&mut metrics);
            failures.extend(facts.failures().map(|(group, e)| (group, e.clone())));
        }

        {
            let _writing = self.lock_writes();
            if self.epoch.load(Ordering::Acquire) != epoch {
                log::debug!(target: LOG_TARGET, "Cache was cleared during collection, not caching metrics for {key}");
            } else if let Err(e) = cache.save(&cache_key, &metrics) {
                log::warn!(target: LOG_TARGET, "Could not cache metrics for {key}: {e:#}");
            }
        }

        EntityReport {
            metrics,
            source: Source::Network,
            failures,
        }
    }

    /// Fresh cached metrics of both entities, without any network request.
    #[must_use]
    pub fn cached(&self, now: DateTime<Utc>, config: &ComparisonConfig) -> EntityMap<Option<CommunityMetrics>> {
        let cache = self.cache.at(now);
        EntityMap::from_fn(|key| {
            let entity = config.get(key);
            let repo = repo_ref::normalize(&entity.github_repo);
            cache.load(&cache_key(repo.as_ref(), &entity.npm_pkg))
        })
    }

    /// Remove both entities' cached metrics. No network request is made.
    ///
    /// Collections already running when this is called won't cache what they fetch.
    pub fn clear(&self, config: &ComparisonConfig) -> Result<()> {
        let _writing = self.lock_writes();
        let _ = self.epoch.fetch_add(1, Ordering::AcqRel);

        for (key, entity) in config.entities.iter() {
            let repo = repo_ref::normalize(&entity.github_repo);
            self.cache.remove(&cache_key(repo.as_ref(), &entity.npm_pkg))?;
            log::debug!(target: LOG_TARGET, "Cleared cached metrics for {key}");
        }

        Ok(())
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
