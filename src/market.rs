//! Query engine over freshly parsed bulletin snapshots.
//!
//! Every operation re-reads its bulletin through the [`BulletinSource`], so
//! there is no cache and no shared mutable state between requests.

use crate::classifier::Classifier;
use crate::constants::DEFAULT_LANG;
use crate::error::{MarketError, Result};
use crate::numerals::NumeralNormalizer;
use crate::parser::{ExtractedTable, TableExtractor};
use crate::source::BulletinSource;
use crate::types::{Category, PriceType, PriceView, Product, Snapshot};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Min,
    Max,
    Avg,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "min" => Ok(SortField::Min),
            "max" => Ok(SortField::Max),
            "avg" => Ok(SortField::Avg),
            other => Err(format!("unknown sort field '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Lenient parse: anything other than "desc" sorts ascending.
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Options for [`MarketService::get_market_prices`].
///
/// Defaults: English bulletin, no category filter, source row order, no limit.
#[derive(Debug, Clone)]
pub struct PriceQuery {
    pub lang: String,
    pub limit: Option<usize>,
    /// Matched case-insensitively against the category name
    pub category: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_order: SortOrder,
}

impl Default for PriceQuery {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            limit: None,
            category: None,
            sort_by: None,
            sort_order: SortOrder::Asc,
        }
    }
}

/// Options for the retail and wholesale projections
#[derive(Debug, Clone)]
pub struct ProjectionQuery {
    pub lang: String,
    pub limit: Option<usize>,
}

impl Default for ProjectionQuery {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            limit: None,
        }
    }
}

/// Options for [`MarketService::search_products`]. An empty `query` matches
/// every product; rejecting it is left to the caller.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    pub lang: String,
    pub limit: Option<usize>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            lang: DEFAULT_LANG.to_string(),
            limit: None,
        }
    }
}

/// A projected snapshot: header fields plus single-price rows
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    pub subtitle: String,
    pub date: String,
    pub prices: Vec<PriceView>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: chrono::DateTime<Utc>,
    pub lang: String,
    #[serde(rename = "priceType")]
    pub price_type: PriceType,
}

pub struct MarketService {
    source: Arc<dyn BulletinSource>,
    extractor: TableExtractor,
    classifier: Classifier,
    normalizer: NumeralNormalizer,
    default_lang: String,
}

impl MarketService {
    pub fn new(source: Arc<dyn BulletinSource>) -> Self {
        Self {
            source,
            extractor: TableExtractor::new(),
            classifier: Classifier::default(),
            normalizer: NumeralNormalizer::default(),
            default_lang: DEFAULT_LANG.to_string(),
        }
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_normalizer(mut self, normalizer: NumeralNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_default_lang(mut self, lang: impl Into<String>) -> Self {
        self.default_lang = lang.into();
        self
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    /// Reads and parses the bulletin for `lang` into a fresh snapshot.
    pub async fn snapshot(&self, lang: &str) -> Result<Snapshot> {
        let markup = self.source.read(lang).await?;
        let table = self.extractor.extract(&markup);
        Ok(self.assemble(table, lang))
    }

    fn assemble(&self, table: ExtractedTable, lang: &str) -> Snapshot {
        let prices = table
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| Product {
                id: i + 1,
                category: self.classifier.classify(&row.name),
                min: self.normalizer.normalize(&row.min, lang),
                max: self.normalizer.normalize(&row.max, lang),
                avg: self.normalizer.normalize(&row.avg, lang),
                name: row.name,
                unit: row.unit,
            })
            .collect();

        Snapshot {
            subtitle: table.subtitle,
            date: table.date,
            prices,
            last_updated: Utc::now(),
            lang: lang.to_string(),
        }
    }

    /// Full pipeline: parse, filter by category, sort, then truncate.
    pub async fn get_market_prices(&self, query: &PriceQuery) -> Result<Snapshot> {
        let snapshot = self
            .filtered_prices(query)
            .await
            .map_err(|e| MarketError::during("fetch market prices", e))?;

        ::metrics::counter!("market_queries_total", "operation" => "prices").increment(1);
        info!(
            lang = %query.lang,
            category = ?query.category,
            sort_by = ?query.sort_by,
            "Market prices served: {} records",
            snapshot.prices.len()
        );
        Ok(snapshot)
    }

    async fn filtered_prices(&self, query: &PriceQuery) -> Result<Snapshot> {
        let mut snapshot = self.snapshot(&query.lang).await?;

        if let Some(category) = query.category.as_deref() {
            let wanted = category.trim();
            snapshot
                .prices
                .retain(|p| p.category.as_str().eq_ignore_ascii_case(wanted));
        }

        if let Some(field) = query.sort_by {
            sort_products(&mut snapshot.prices, field, query.sort_order);
        }

        if let Some(limit) = query.limit {
            snapshot.prices.truncate(limit);
        }

        Ok(snapshot)
    }

    pub async fn get_retail_prices(&self, query: &ProjectionQuery) -> Result<Projection> {
        self.project(query, PriceType::Retail)
            .await
            .map_err(|e| MarketError::during("fetch retail prices", e))
    }

    pub async fn get_wholesale_prices(&self, query: &ProjectionQuery) -> Result<Projection> {
        self.project(query, PriceType::Wholesale)
            .await
            .map_err(|e| MarketError::during("fetch wholesale prices", e))
    }

    async fn project(&self, query: &ProjectionQuery, price_type: PriceType) -> Result<Projection> {
        let full = self
            .filtered_prices(&PriceQuery {
                lang: query.lang.clone(),
                limit: query.limit,
                ..PriceQuery::default()
            })
            .await?;

        ::metrics::counter!("market_queries_total", "operation" => "projection").increment(1);
        debug!("Projecting {} records as {:?}", full.prices.len(), price_type);
        Ok(Projection {
            prices: full.prices.iter().map(|p| price_type.project(p)).collect(),
            subtitle: full.subtitle,
            date: full.date,
            last_updated: full.last_updated,
            lang: full.lang,
            price_type,
        })
    }

    /// Distinct categories of the default-language snapshot, first-seen order.
    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        let snapshot = self
            .snapshot(&self.default_lang)
            .await
            .map_err(|e| MarketError::during("fetch categories", e))?;

        let mut categories: Vec<Category> = Vec::new();
        for product in &snapshot.prices {
            if !categories.contains(&product.category) {
                categories.push(product.category);
            }
        }

        ::metrics::counter!("market_queries_total", "operation" => "categories").increment(1);
        info!("Categories served: {}", categories.len());
        Ok(categories)
    }

    /// Case-insensitive substring match of the query against product names.
    pub async fn search_products(&self, query: &SearchQuery) -> Result<Snapshot> {
        let mut snapshot = self
            .snapshot(&query.lang)
            .await
            .map_err(|e| MarketError::during("search products", e))?;

        let needle = query.query.to_lowercase();
        snapshot
            .prices
            .retain(|p| p.name.to_lowercase().contains(&needle));

        if let Some(limit) = query.limit {
            snapshot.prices.truncate(limit);
        }

        ::metrics::counter!("market_queries_total", "operation" => "search").increment(1);
        info!(
            lang = %query.lang,
            "Search '{}' matched {} records",
            query.query,
            snapshot.prices.len()
        );
        Ok(snapshot)
    }
}

/// Stable sort; descending flips the comparator so ties keep source order.
pub fn sort_products(products: &mut [Product], field: SortField, order: SortOrder) {
    products.sort_by(|a, b| {
        let ord = compare_by(a, b, field);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

fn compare_by(a: &Product, b: &Product, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::Min => a.min.total_cmp(&b.min),
        SortField::Max => a.max.total_cmp(&b.max),
        SortField::Avg => a.avg.total_cmp(&b.avg),
    }
}
