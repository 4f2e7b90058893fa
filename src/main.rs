use anyhow::Context;
use clap::{Parser, Subcommand};
use market_prices::config::Config;
use market_prices::market::{MarketService, PriceQuery, SearchQuery, SortField, SortOrder};
use market_prices::source::{FsBulletinSource, InMemoryBulletinSource};
use market_prices::{logging, metrics, server};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "market_prices")]
#[command(about = "Market price bulletin parser and query API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Directory for rolling log files
    #[arg(long, default_value = "logs")]
    log_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the market query API over HTTP
    Serve {
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
        /// Expose Prometheus metrics on this port
        #[arg(long)]
        metrics_port: Option<u16>,
    },
    /// Print the parsed price snapshot as JSON
    Prices {
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// One of: name, min, max, avg
        #[arg(long)]
        sort_by: Option<String>,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        sort_order: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Parse a bulletin read from stdin and print the snapshot as JSON
    Parse {
        /// Language of the piped bulletin (selects numeral handling)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Search product names and print matches as JSON
    Search {
        #[arg(long)]
        query: String,
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli.log_dir);

    let config = Config::load().context("failed to load configuration")?;
    let source = FsBulletinSource::new(config.market.bulletin_dir.clone());
    let service = MarketService::new(Arc::new(source))
        .with_default_lang(config.market.default_lang.clone());
    let default_lang = service.default_lang().to_string();

    match cli.command {
        Commands::Serve { port, metrics_port } => {
            if let Some(metrics_port) = metrics_port {
                metrics::init_metrics(metrics_port);
            }
            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{}:{}", config.server.host, port)
                .parse()
                .with_context(|| format!("invalid bind address {}:{}", config.server.host, port))?;
            info!(
                "Serving bulletins from {}",
                config.market.bulletin_dir.display()
            );
            server::start_server(Arc::new(service), addr).await?;
        }
        Commands::Prices {
            lang,
            category,
            sort_by,
            sort_order,
            limit,
        } => {
            let sort_by = match sort_by {
                Some(s) => Some(s.parse::<SortField>().map_err(anyhow::Error::msg)?),
                None => None,
            };
            let query = PriceQuery {
                lang: lang.unwrap_or(default_lang),
                limit,
                category,
                sort_by,
                sort_order: SortOrder::parse_lenient(&sort_order),
            };
            let snapshot = service.get_market_prices(&query).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Parse { lang } => {
            let lang = lang.unwrap_or(default_lang);
            let source = InMemoryBulletinSource::from_reader(&lang, tokio::io::stdin()).await?;
            let snapshot = MarketService::new(Arc::new(source)).snapshot(&lang).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Commands::Search { query, lang, limit } => {
            let query = SearchQuery {
                query,
                lang: lang.unwrap_or(default_lang),
                limit,
            };
            let snapshot = service.search_products(&query).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}
