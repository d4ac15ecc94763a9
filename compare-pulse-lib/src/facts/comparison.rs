//! What is being compared: a display name, a repository reference and a package name per entity.

use super::entity::{EntityKey, EntityMap};
use super::store::Store;
use crate::Result;
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "comparison";

/// Store key under which the comparison config is persisted.
pub const CONFIG_KEY: &str = "compare:cfg";

/// Settings for one compared entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityConfig {
    pub name: String,

    /// Free-form repository reference, normalized before use.
    pub github_repo: String,

    pub npm_pkg: String,
}

impl EntityConfig {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Settings for both compared entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonConfig {
    pub entities: EntityMap<EntityConfig>,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            entities: EntityMap::new(EntityConfig::named("OpenSpec"), EntityConfig::named("SpecKit")),
        }
    }
}

impl ComparisonConfig {
    #[must_use]
    pub const fn get(&self, key: EntityKey) -> &EntityConfig {
        self.entities.get(key)
    }

    pub const fn get_mut(&mut self, key: EntityKey) -> &mut EntityConfig {
        self.entities.get_mut(key)
    }

    /// Load the persisted config, falling back to the defaults when absent or unreadable.
    #[must_use]
    pub fn load(store: &Store) -> Self {
        match store.get(CONFIG_KEY) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!(target: LOG_TARGET, "Ignoring unreadable comparison config: {e:#}");
                Self::default()
            }
        }
    }

    /// Persist this config.
    pub fn save(&self, store: &Store) -> Result<()> {
        store.put(CONFIG_KEY, self)
    }
}
