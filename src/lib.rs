pub mod classifier;
pub mod config;
pub mod constants;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod market;
pub mod metrics;
pub mod numerals;
pub mod parser;
pub mod server;
pub mod source;
pub mod types;
