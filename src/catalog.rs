// Static species tables: the starter choices and the wild encounter pool.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of starters offered to a new player.
pub const STARTER_COUNT: usize = 3;

/// A species template. Owned creatures copy the name and hp at creation and
/// never refer back to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub name: String,
    pub hp: u32,
}

impl Species {
    pub fn new(name: &str, hp: u32) -> Self {
        Self {
            name: name.to_string(),
            hp,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalog file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("catalog must list exactly 3 starters, found {0}")]
    StarterCount(usize),

    #[error("catalog wild pool is empty")]
    EmptyWildPool,

    #[error("species {0} has zero hp")]
    ZeroHp(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub starters: Vec<Species>,
    pub wild: Vec<Species>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            starters: vec![
                Species::new("Treecko", 40),
                Species::new("Torchic", 45),
                Species::new("Mudkip", 50),
            ],
            wild: vec![
                Species::new("Poochyena", 30),
                Species::new("Zigzagoon", 28),
                Species::new("Ralts", 25),
                Species::new("Pikachu", 35),
            ],
        }
    }
}

impl Catalog {
    /// Load a catalog from a JSON file of the form
    /// `{ "starters": [{"name": .., "hp": ..}], "wild": [..] }`.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.starters.len() != STARTER_COUNT {
            return Err(CatalogError::StarterCount(self.starters.len()));
        }
        if self.wild.is_empty() {
            return Err(CatalogError::EmptyWildPool);
        }
        if let Some(zero) = self.starters.iter().chain(&self.wild).find(|s| s.hp == 0) {
            return Err(CatalogError::ZeroHp(zero.name.clone()));
        }
        Ok(())
    }

    pub fn starter(&self, index: usize) -> Option<&Species> {
        self.starters.get(index)
    }
}
