use crate::constants::SERVICE_NAME;
use crate::envelope::{ApiError, ApiResponse};
use crate::market::{
    MarketService, PriceQuery, Projection, ProjectionQuery, SearchQuery, SortField, SortOrder,
};
use crate::types::{Category, PriceType, PriceView, Product};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::Method,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use hyper::Server;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

type SharedService = Arc<MarketService>;
type ApiResult<T, M> = Result<Json<ApiResponse<T, M>>, ApiError>;

/// Raw query string for `/market/prices`. Everything arrives as text and is
/// coerced here.
#[derive(Debug, Default, Deserialize)]
pub struct PricesParams {
    pub lang: Option<String>,
    pub limit: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectionParams {
    pub lang: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub lang: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PricesMetadata {
    pub subtitle: String,
    pub date: String,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
    pub lang: String,
    pub total: usize,
    pub category: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<SortField>,
    #[serde(rename = "sortOrder")]
    pub sort_order: SortOrder,
}

#[derive(Debug, Serialize)]
pub struct ProjectionMetadata {
    pub subtitle: String,
    pub date: String,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
    pub lang: String,
    pub total: usize,
    #[serde(rename = "priceType")]
    pub price_type: PriceType,
}

#[derive(Debug, Serialize)]
pub struct CategoriesMetadata {
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchMetadata {
    pub query: String,
    pub lang: String,
    pub total: usize,
    #[serde(rename = "lastUpdated")]
    pub last_updated: DateTime<Utc>,
}

/// Numeric coercion for `limit`. Non-numeric values mean "no limit".
fn parse_limit(raw: Option<&str>) -> Option<usize> {
    let raw = raw?.trim();
    match raw.parse::<usize>() {
        Ok(limit) => Some(limit),
        Err(_) => {
            debug!("Ignoring non-numeric limit '{}'", raw);
            None
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn lang_or_default(raw: Option<String>, service: &MarketService) -> String {
    non_empty(raw).unwrap_or_else(|| service.default_lang().to_string())
}

impl PricesParams {
    pub fn into_query(self, service: &MarketService) -> PriceQuery {
        let sort_by = non_empty(self.sort_by).and_then(|s| match s.parse::<SortField>() {
            Ok(field) => Some(field),
            Err(e) => {
                debug!("Ignoring sortBy: {}", e);
                None
            }
        });
        PriceQuery {
            limit: parse_limit(self.limit.as_deref()),
            lang: lang_or_default(self.lang, service),
            category: non_empty(self.category),
            sort_by,
            sort_order: self
                .sort_order
                .as_deref()
                .map(SortOrder::parse_lenient)
                .unwrap_or_default(),
        }
    }
}

impl ProjectionParams {
    pub fn into_query(self, service: &MarketService) -> ProjectionQuery {
        ProjectionQuery {
            limit: parse_limit(self.limit.as_deref()),
            lang: lang_or_default(self.lang, service),
        }
    }
}

impl SearchParams {
    /// Fails with `InvalidQuery` when `q` is absent or blank.
    pub fn into_query(self, service: &MarketService) -> Result<SearchQuery, ApiError> {
        let query = non_empty(self.q)
            .ok_or_else(|| ApiError::invalid_query("Search query is required"))?;
        Ok(SearchQuery {
            query,
            limit: parse_limit(self.limit.as_deref()),
            lang: lang_or_default(self.lang, service),
        })
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn market_prices(
    State(service): State<SharedService>,
    params: Result<Query<PricesParams>, QueryRejection>,
) -> ApiResult<Vec<Product>, PricesMetadata> {
    let Query(params) = params?;
    let query = params.into_query(&service);
    let snapshot = service.get_market_prices(&query).await?;

    let metadata = PricesMetadata {
        subtitle: snapshot.subtitle,
        date: snapshot.date,
        last_updated: snapshot.last_updated,
        lang: snapshot.lang,
        total: snapshot.prices.len(),
        category: query.category,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
    };
    Ok(Json(ApiResponse::success(snapshot.prices, metadata)))
}

async fn retail_prices(
    State(service): State<SharedService>,
    params: Result<Query<ProjectionParams>, QueryRejection>,
) -> ApiResult<Vec<PriceView>, ProjectionMetadata> {
    let Query(params) = params?;
    let projection = service
        .get_retail_prices(&params.into_query(&service))
        .await?;
    Ok(Json(projection_response(projection)))
}

async fn wholesale_prices(
    State(service): State<SharedService>,
    params: Result<Query<ProjectionParams>, QueryRejection>,
) -> ApiResult<Vec<PriceView>, ProjectionMetadata> {
    let Query(params) = params?;
    let projection = service
        .get_wholesale_prices(&params.into_query(&service))
        .await?;
    Ok(Json(projection_response(projection)))
}

fn projection_response(
    projection: Projection,
) -> ApiResponse<Vec<PriceView>, ProjectionMetadata> {
    let metadata = ProjectionMetadata {
        subtitle: projection.subtitle,
        date: projection.date,
        last_updated: projection.last_updated,
        lang: projection.lang,
        total: projection.prices.len(),
        price_type: projection.price_type,
    };
    ApiResponse::success(projection.prices, metadata)
}

async fn categories(
    State(service): State<SharedService>,
) -> ApiResult<Vec<Category>, CategoriesMetadata> {
    let categories = service.get_categories().await?;
    let metadata = CategoriesMetadata {
        total: categories.len(),
    };
    Ok(Json(ApiResponse::success(categories, metadata)))
}

async fn search(
    State(service): State<SharedService>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Vec<Product>, SearchMetadata> {
    let Query(params) = params?;
    let query = params.into_query(&service)?;
    let snapshot = service.search_products(&query).await?;

    let metadata = SearchMetadata {
        query: query.query,
        lang: snapshot.lang,
        total: snapshot.prices.len(),
        last_updated: snapshot.last_updated,
    };
    Ok(Json(ApiResponse::success(snapshot.prices, metadata)))
}

/// Create the HTTP router with all market routes
pub fn create_server(service: SharedService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/market/prices", get(market_prices))
        .route("/market/retail", get(retail_prices))
        .route("/market/wholesale", get(wholesale_prices))
        .route("/market/categories", get(categories))
        .route("/market/search", get(search))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(service)
}

/// Start the HTTP server on the given address, stopping on Ctrl-C
pub async fn start_server(service: SharedService, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_server(service);

    info!("HTTP server running on http://{}", addr);
    info!("Market prices: http://{}/market/prices?lang=en", addr);

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
