use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// A single finish/cladding product record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(rename = "type")]
    pub material_type: String,
    #[serde(default)]
    pub application: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub texture: String,
    #[serde(default)]
    pub finish: String,
    #[serde(default)]
    pub coverage: String,
    /// Display string in the catalog's own format, e.g. `"$25-45/m2"`.
    /// Numeric bounds are recovered with [`parse_price_range`].
    #[serde(default)]
    pub price_range: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub name: String,
    #[serde(default)]
    pub characteristics: String,
    #[serde(default)]
    pub palette: Vec<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    #[serde(rename = "type")]
    pub space_type: String,
    #[serde(default)]
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizeCategory {
    pub range: String,
    #[serde(default)]
    pub optimization: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BathroomFinishes {
    #[serde(default)]
    pub ceramics: Vec<Material>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paints {
    #[serde(default)]
    pub interior_paints: Vec<Material>,
    #[serde(default)]
    pub exterior_paints: Vec<Material>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Flooring {
    #[serde(default)]
    pub ceramic_floors: Vec<Material>,
    #[serde(default)]
    pub wood_floors: Vec<Material>,
    #[serde(default)]
    pub vinyl_floors: Vec<Material>,
}

/// Static reference data describing styles, spaces, sizes, and the material
/// categories the chat layer draws from. Loaded once, immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub styles: BTreeMap<String, Style>,
    pub spaces: BTreeMap<String, Space>,
    pub sizes: BTreeMap<String, SizeCategory>,
    #[serde(default)]
    pub bathroom_finishes: BathroomFinishes,
    #[serde(default)]
    pub paints: Paints,
    #[serde(default)]
    pub flooring: Flooring,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse catalog file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogOptions {
    pub styles: Vec<String>,
    pub spaces: Vec<String>,
    pub sizes: Vec<String>,
}

pub const VALID_CATEGORIES: [&str; 3] = ["bathroom_finishes", "paints", "flooring"];

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Catalog =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        for (key, style) in &catalog.styles {
            if style.materials.is_empty() {
                warn!("Style '{}' has no materials defined", key);
            }
        }

        info!(
            "Loaded catalog from {}: {} style(s), {} space(s), {} size(s)",
            path.display(),
            catalog.styles.len(),
            catalog.spaces.len(),
            catalog.sizes.len()
        );
        Ok(catalog)
    }

    pub fn style(&self, key: &str) -> Option<&Style> {
        self.styles.get(key)
    }

    pub fn space(&self, key: &str) -> Option<&Space> {
        self.spaces.get(key)
    }

    pub fn size(&self, key: &str) -> Option<&SizeCategory> {
        self.sizes.get(key)
    }

    /// Materials for one of the fixed chat categories; `None` for an
    /// unknown category name.
    pub fn materials_by_category(&self, category: &str) -> Option<Vec<&Material>> {
        match category {
            "bathroom_finishes" => Some(self.bathroom_finishes.ceramics.iter().collect()),
            "paints" => Some(
                self.paints
                    .interior_paints
                    .iter()
                    .chain(self.paints.exterior_paints.iter())
                    .collect(),
            ),
            "flooring" => Some(
                self.flooring
                    .ceramic_floors
                    .iter()
                    .chain(self.flooring.wood_floors.iter())
                    .chain(self.flooring.vinyl_floors.iter())
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn options(&self) -> CatalogOptions {
        CatalogOptions {
            styles: self.styles.keys().cloned().collect(),
            spaces: self.spaces.keys().cloned().collect(),
            sizes: self.sizes.keys().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub low: u32,
    pub high: u32,
}

/// Parses a catalog price string such as `"$25-45/m2"` into its numeric
/// bounds. Malformed or inverted ranges yield `None` so callers can skip
/// them without failing the whole report.
pub fn parse_price_range(raw: &str) -> Option<PriceRange> {
    let cleaned = raw.replace('$', "");
    let bounds = cleaned.split('/').next()?.trim();
    let (low, high) = bounds.split_once('-')?;
    let low = low.trim().parse::<u32>().ok()?;
    let high = high.trim().parse::<u32>().ok()?;
    if low > high {
        return None;
    }
    Some(PriceRange { low, high })
}
