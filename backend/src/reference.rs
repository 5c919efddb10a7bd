//! Point-in-time snapshot of the reference data a submission is checked
//! against: regions, comunas per region, food types and social networks.
//!
//! A snapshot is loaded per request and never cached across requests.

use crate::error::AppError;
use crate::store::{Region, Store};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    /// Regions ordered by id.
    pub regions: Vec<Region>,
    /// Comuna names keyed by the id of the region they belong to.
    pub comunas_by_region: BTreeMap<i64, Vec<String>>,
    pub food_types: Vec<String>,
    /// Allowed network names, catch-all included.
    pub social_networks: Vec<String>,
}

impl ReferenceSnapshot {
    pub fn load(store: &Store) -> Result<Self, AppError> {
        let regions = store.regions()?;

        let mut comunas_by_region: BTreeMap<i64, Vec<String>> =
            regions.iter().map(|r| (r.id, Vec::new())).collect();
        for comuna in store.comunas()? {
            comunas_by_region
                .entry(comuna.region_id)
                .or_default()
                .push(comuna.name);
        }

        Ok(Self {
            regions,
            comunas_by_region,
            food_types: store.food_types()?,
            social_networks: store.social_networks()?,
        })
    }

    pub fn region_names(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.name.clone()).collect()
    }

    pub fn has_region(&self, name: &str) -> bool {
        self.region_id(name).is_some()
    }

    pub fn region_id(&self, name: &str) -> Option<i64> {
        self.regions.iter().find(|r| r.name == name).map(|r| r.id)
    }

    /// Comunas of the named region; empty when the region is unknown.
    pub fn comunas_of(&self, region_name: &str) -> &[String] {
        self.region_id(region_name)
            .and_then(|id| self.comunas_by_region.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_comuna(&self, name: &str) -> bool {
        self.comunas_by_region
            .values()
            .any(|comunas| comunas.iter().any(|c| c == name))
    }

    /// Every comuna name, grouped region by region in region id order.
    pub fn all_comunas(&self) -> Vec<String> {
        self.comunas_by_region.values().flatten().cloned().collect()
    }

    /// List-of-lists view where position `i` holds the comunas of `regions[i]`.
    pub fn comunas_by_region_position(&self) -> Vec<Vec<String>> {
        self.regions
            .iter()
            .map(|r| self.comunas_by_region.get(&r.id).cloned().unwrap_or_default())
            .collect()
    }
}
