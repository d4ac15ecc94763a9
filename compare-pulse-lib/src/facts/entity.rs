use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// One of the two projects being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKey {
    #[value(name = "openspec")]
    OpenSpec,

    #[value(name = "speckit")]
    SpecKit,
}

/// A value for each compared entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMap<T> {
    pub openspec: T,
    pub speckit: T,
}

impl<T> EntityMap<T> {
    #[must_use]
    pub const fn new(openspec: T, speckit: T) -> Self {
        Self { openspec, speckit }
    }

    /// Build a map by calling `f` once per entity.
    pub fn from_fn(mut f: impl FnMut(EntityKey) -> T) -> Self {
        Self {
            openspec: f(EntityKey::OpenSpec),
            speckit: f(EntityKey::SpecKit),
        }
    }

    #[must_use]
    pub const fn get(&self, key: EntityKey) -> &T {
        match key {
            EntityKey::OpenSpec => &self.openspec,
            EntityKey::SpecKit => &self.speckit,
        }
    }

    pub const fn get_mut(&mut self, key: EntityKey) -> &mut T {
        match key {
            EntityKey::OpenSpec => &mut self.openspec,
            EntityKey::SpecKit => &mut self.speckit,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(EntityKey, T) -> U) -> EntityMap<U> {
        EntityMap {
            openspec: f(EntityKey::OpenSpec, self.openspec),
            speckit: f(EntityKey::SpecKit, self.speckit),
        }
    }

    /// Iterate over `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &T)> {
        EntityKey::iter().map(move |key| (key, self.get(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn test_entity_key_strings() {
        assert_eq!(EntityKey::OpenSpec.to_string(), "openspec");
        assert_eq!(EntityKey::SpecKit.to_string(), "speckit");
        assert_eq!(EntityKey::from_str("openspec").unwrap(), EntityKey::OpenSpec);
        assert_eq!(EntityKey::from_str("speckit").unwrap(), EntityKey::SpecKit);
        let _ = EntityKey::from_str("other").unwrap_err();
    }

    #[test]
    fn test_entity_key_serde() {
        assert_eq!(serde_json::to_string(&EntityKey::SpecKit).unwrap(), r#""speckit""#);
        let key: EntityKey = serde_json::from_str(r#""openspec""#).unwrap();
        assert_eq!(key, EntityKey::OpenSpec);
    }

    #[test]
    fn test_entity_map_accessors() {
        let mut map = EntityMap::new(1, 2);
        assert_eq!(*map.get(EntityKey::OpenSpec), 1);
        assert_eq!(*map.get(EntityKey::SpecKit), 2);

        *map.get_mut(EntityKey::SpecKit) = 5;
        assert_eq!(map.speckit, 5);
    }

    #[test]
    fn test_entity_map_from_fn_and_map() {
        let map = EntityMap::from_fn(|key| key.to_string());
        assert_eq!(map.openspec, "openspec");

        let lens = map.map(|_, s| s.len());
        assert_eq!(lens, EntityMap::new(8, 7));
    }

    #[test]
    fn test_entity_map_iter_order() {
        let map = EntityMap::new("a", "b");
        let items: Vec<_> = map.iter().collect();
        assert_eq!(items, vec![(EntityKey::OpenSpec, &"a"), (EntityKey::SpecKit, &"b")]);
    }

    #[test]
    fn test_entity_map_serde_shape() {
        let json = serde_json::to_value(EntityMap::new(1, 2)).unwrap();
        assert_eq!(json, serde_json::json!({"openspec": 1, "speckit": 2}));
    }
}
