use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed product taxonomy. `Others` is the fallback for unmatched names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fruits,
    Vegetables,
    Spices,
    Grains,
    Others,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Fruits,
        Category::Vegetables,
        Category::Spices,
        Category::Grains,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Fruits => "fruits",
            Category::Vegetables => "vegetables",
            Category::Spices => "spices",
            Category::Grains => "grains",
            Category::Others => "others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

/// One extracted bulletin row.
///
/// `id` is the 1-based position of the row within the parse that produced it.
/// It is not stable across parses or languages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: usize,
    pub name: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub category: Category,
}

/// The full parsed price list for one language at one fetch instant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub subtitle: String,
    pub date: String,
    pub prices: Vec<Product>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
    pub lang: String,
}

/// Single-price projection used by the retail and wholesale views
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceView {
    pub id: usize,
    pub name: String,
    pub price: f64,
    pub unit: String,
    pub category: Category,
}

/// Which bulletin column a projection reads its price from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    /// Reads the `avg` column
    Retail,
    /// Reads the `min` column
    Wholesale,
}

impl PriceType {
    pub fn price_of(&self, product: &Product) -> f64 {
        match self {
            PriceType::Retail => product.avg,
            PriceType::Wholesale => product.min,
        }
    }

    pub fn project(&self, product: &Product) -> PriceView {
        PriceView {
            id: product.id,
            name: product.name.clone(),
            price: self.price_of(product),
            unit: product.unit.clone(),
            category: product.category,
        }
    }
}
