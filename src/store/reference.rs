use std::collections::HashSet;
use std::path::Path;

use log::{info, warn};
use serde::de::DeserializeOwned;

use crate::model::reference::{City, Country, PlaceName, Region};

use super::persist::JsonFile;

/// Read-only geographic lookup tables.
#[derive(Debug, Default)]
pub struct ReferenceData {
    countries: Vec<Country>,
    regions: Vec<Region>,
    cities: Vec<City>,
}

impl ReferenceData {
    pub fn new(countries: Vec<Country>, regions: Vec<Region>, cities: Vec<City>) -> Self {
        Self {
            countries,
            regions,
            cities,
        }
    }

    /// Load `countries.json`, `states.json` and `cities.json` from `dir`.
    /// A table that cannot be read is left empty.
    pub async fn load(dir: &Path) -> Self {
        let data = Self {
            countries: load_table(dir, "countries.json").await,
            regions: load_table(dir, "states.json").await,
            cities: load_table(dir, "cities.json").await,
        };
        info!(
            "Loaded: {} countries, {} states, {} cities",
            data.countries.len(),
            data.regions.len(),
            data.cities.len()
        );
        data
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }

    pub fn countries(&self) -> Vec<PlaceName> {
        distinct(self.countries.iter().map(|c| c.name.as_str()))
    }

    pub fn states(&self, country: &str) -> Vec<PlaceName> {
        distinct(
            self.regions
                .iter()
                .filter(|s| same_place(&s.country_name, country))
                .map(|s| s.name.as_str()),
        )
    }

    pub fn cities(&self, country: &str, state: &str) -> Vec<PlaceName> {
        distinct(
            self.cities
                .iter()
                .filter(|c| same_place(&c.country_name, country) && same_place(&c.state_name, state))
                .map(|c| c.name.as_str()),
        )
    }
}

async fn load_table<T: DeserializeOwned>(dir: &Path, name: &str) -> Vec<T> {
    let file = JsonFile::new(dir, name);
    match file.load().await {
        Ok(Some(rows)) => rows,
        Ok(None) => {
            warn!("Reference table {} not found", file.path().display());
            Vec::new()
        }
        Err(e) => {
            warn!("Error loading {}: {e}", file.path().display());
            Vec::new()
        }
    }
}

fn same_place(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Unique names in first-seen order.
fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<PlaceName> {
    let mut seen = HashSet::new();
    names
        .filter(|name| seen.insert(*name))
        .map(|name| PlaceName {
            name: name.to_string(),
        })
        .collect()
}
