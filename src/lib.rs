// Library crate for the futures order CLI
// Re-exports the modules used by the binary and the integration tests

pub mod bot;
pub mod cache;
pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod ordering;
pub mod types;
pub mod utils;

pub use bot::FuturesBot;
pub use cache::PrecisionCache;
pub use config::BotConfig;
pub use connection::{BinanceFutures, FuturesApi};
pub use error::BotError;
pub use types::{FormattedOrderParams, OrderRequest, OrderResult, OrderType, Side, SymbolPrecision};
