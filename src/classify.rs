//! Heuristic product classification
//!
//! Buckets a raw product-name candidate into one of a closed set of
//! categories by case-insensitive keyword matching. Categories are tested
//! in a fixed priority order and the first match wins, so classification
//! is pure and deterministic for a given keyword table.

use serde::{Deserialize, Serialize};

/// Closed set of product categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCategory {
    /// Grains and cereals
    Granos,
    /// Oilseeds
    Oleaginosas,
    /// Prepared/balanced feed
    Alimentos,
    /// Milling byproducts
    Subproductos,
    /// Default bucket
    Otros,
}

impl ProductCategory {
    /// Label as persisted in the `productos.categoria` column
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Granos => "GRANOS",
            ProductCategory::Oleaginosas => "OLEAGINOSAS",
            ProductCategory::Alimentos => "ALIMENTOS",
            ProductCategory::Subproductos => "SUBPRODUCTOS",
            ProductCategory::Otros => "OTROS",
        }
    }
}

const GRAIN_KEYWORDS: &[&str] = &["MAIZ", "SORGO", "TRIGO", "AVENA", "CEBADA"];
const OILSEED_KEYWORDS: &[&str] = &["SOYA", "CANOLA", "GIRASOL"];
const FEED_KEYWORDS: &[&str] = &["ALIMENTO", "BALANCEADO"];
const BYPRODUCT_KEYWORDS: &[&str] = &["SALVADO", "MELAZA", "PASTA", "HARINA"];

/// Priority order matters: a name matching several tables gets the first
/// one, e.g. "PASTA DE SOYA" is an oilseed, not a byproduct.
const CATEGORY_TABLE: &[(ProductCategory, &[&str])] = &[
    (ProductCategory::Granos, GRAIN_KEYWORDS),
    (ProductCategory::Oleaginosas, OILSEED_KEYWORDS),
    (ProductCategory::Alimentos, FEED_KEYWORDS),
    (ProductCategory::Subproductos, BYPRODUCT_KEYWORDS),
];

/// Classify a product name. Returns `Otros` when no keyword matches.
pub fn classify_product(name: &str) -> ProductCategory {
    let upper = name.to_uppercase();
    for (category, keywords) in CATEGORY_TABLE {
        if keywords.iter().any(|kw| upper.contains(kw)) {
            return *category;
        }
    }
    ProductCategory::Otros
}
