use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Bulletin for language '{lang}' is unavailable: {reason}")]
    SourceUnavailable { lang: String, reason: String },

    #[error("Failed to {operation}: {source}")]
    Pipeline {
        operation: &'static str,
        #[source]
        source: Box<MarketError>,
    },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl MarketError {
    /// Wraps a pipeline failure with the name of the operation that hit it.
    pub fn during(operation: &'static str, err: MarketError) -> Self {
        MarketError::Pipeline {
            operation,
            source: Box::new(err),
        }
    }

    /// Short machine-readable tag used in API error envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            MarketError::SourceUnavailable { .. } => "SourceUnavailable",
            MarketError::Pipeline { source, .. } => source.kind(),
            MarketError::InvalidQuery(_) => "InvalidQuery",
            _ => "UnknownFailure",
        }
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
