use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod orig {
    use serde::{Deserialize, Serialize};

    /// The station's `short_name` in the raw feeds. Trips refer to stations by this.
    #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub struct StationID(pub String);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationID(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TripID(pub usize);

impl CheapID for StationID {
    fn new(x: usize) -> Self {
        Self(x)
    }
}
impl CheapID for TripID {
    fn new(x: usize) -> Self {
        Self(x)
    }
}

pub trait CheapID: Copy {
    fn new(x: usize) -> Self;
}

/// Interns string IDs from the raw feeds into dense integers. Stations and trips share one
/// mapping, so station IDs that only ever appear in trips still get a (countable) ID, but
/// nothing in the station list will ever claim it.
#[derive(Clone, Serialize, Deserialize)]
pub struct IDMapping<K: Ord, V> {
    orig_to_cheap: BTreeMap<K, V>,
}

impl<K: Clone + std::fmt::Debug + Ord, V: CheapID> IDMapping<K, V> {
    pub fn new() -> Self {
        Self {
            orig_to_cheap: BTreeMap::new(),
        }
    }

    pub fn insert_new(&mut self, orig: K) -> Result<V> {
        let cheap = V::new(self.orig_to_cheap.len());
        if self.orig_to_cheap.insert(orig.clone(), cheap).is_some() {
            bail!("Duplicate ID {:?}", orig);
        }
        Ok(cheap)
    }

    pub fn insert_idempotent(&mut self, orig: &K) -> V {
        if let Some(x) = self.orig_to_cheap.get(orig) {
            return *x;
        }
        let v = V::new(self.orig_to_cheap.len());
        self.orig_to_cheap.insert(orig.clone(), v);
        v
    }

    pub fn len(&self) -> usize {
        self.orig_to_cheap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orig_to_cheap.is_empty()
    }
}

impl<K: Clone + std::fmt::Debug + Ord, V: CheapID> Default for IDMapping<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orig(x: &str) -> orig::StationID {
        orig::StationID(x.to_string())
    }

    #[test]
    fn test_insert_new_rejects_duplicates() {
        let mut ids: IDMapping<orig::StationID, StationID> = IDMapping::new();
        assert_eq!(ids.insert_new(orig("5329.03")).unwrap(), StationID(0));
        assert_eq!(ids.insert_new(orig("6140.05")).unwrap(), StationID(1));
        assert!(ids.insert_new(orig("5329.03")).is_err());
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_insert_idempotent_reuses_ids() {
        let mut ids: IDMapping<orig::StationID, StationID> = IDMapping::new();
        let a = ids.insert_new(orig("A")).unwrap();
        assert_eq!(ids.insert_idempotent(&orig("A")), a);
        let b = ids.insert_idempotent(&orig("B"));
        assert_ne!(a, b);
        assert_eq!(ids.insert_idempotent(&orig("B")), b);
        assert_eq!(ids.len(), 2);
    }
}
