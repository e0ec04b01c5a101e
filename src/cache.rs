// Per-symbol precision cache
// Filled lazily from exchange info, never refreshed or evicted while the owner lives

use crate::connection::FuturesApi;
use crate::error::Result;
use crate::types::SymbolPrecision;
use log::{error, info, warn};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Symbol → precision map owned by a single bot instance.
///
/// The lock is held across the whole check-fetch-populate sequence so that
/// concurrent callers never fetch the same symbol twice.
#[derive(Default)]
pub struct PrecisionCache {
    entries: Mutex<HashMap<String, SymbolPrecision>>,
}

impl PrecisionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached precision for `symbol`, fetching it on a miss.
    ///
    /// Returns `None` when the symbol is unknown or the fetch fails. Neither
    /// outcome is cached, so a later call tries again.
    pub async fn resolve<A>(&self, api: &A, symbol: &str) -> Option<SymbolPrecision>
    where
        A: FuturesApi + ?Sized,
    {
        let mut entries = self.entries.lock().await;
        if let Some(hit) = entries.get(symbol) {
            return Some(hit.clone());
        }

        match fetch_symbol_precision(api, symbol).await {
            Ok(Some(precision)) => {
                entries.insert(symbol.to_string(), precision.clone());
                Some(precision)
            }
            Ok(None) => {
                warn!(
                    "PRECISION: could not retrieve precision for {}, orders for it cannot be formatted",
                    symbol
                );
                None
            }
            Err(err) => {
                error!("PRECISION: failed to fetch exchange info for {}: {}", symbol, err);
                None
            }
        }
    }

    /// Cached value only, no I/O.
    pub async fn get(&self, symbol: &str) -> Option<SymbolPrecision> {
        self.entries.lock().await.get(symbol).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Resolve a batch of symbols up front. Returns how many are now cached.
    pub async fn warmup<A>(&self, api: &A, symbols: &[String]) -> usize
    where
        A: FuturesApi + ?Sized,
    {
        info!("PRECISION: warming up cache for {} symbols", symbols.len());
        let mut cached = 0;
        for symbol in symbols {
            if self.resolve(api, symbol).await.is_some() {
                cached += 1;
            }
        }
        info!("PRECISION: warmup complete, {}/{} symbols cached", cached, symbols.len());
        cached
    }
}

/// Look `symbol` up in the exchange's instrument list.
///
/// `Ok(None)` means the exchange answered but has no usable entry for the
/// symbol; `Err` carries the transport or exchange failure.
pub async fn fetch_symbol_precision<A>(api: &A, symbol: &str) -> Result<Option<SymbolPrecision>>
where
    A: FuturesApi + ?Sized,
{
    let exchange_info = api.exchange_info().await?;

    let Some(entry) = exchange_info.symbols.into_iter().find(|s| s.symbol == symbol) else {
        warn!("PRECISION: symbol '{}' not found in exchange info", symbol);
        return Ok(None);
    };

    match (entry.price_precision, entry.quantity_precision) {
        (Some(price_precision), Some(quantity_precision)) => {
            info!(
                "PRECISION: fetched precision for {}: price precision = {}, quantity precision = {}",
                symbol, price_precision, quantity_precision
            );
            Ok(Some(SymbolPrecision {
                symbol: entry.symbol,
                price_precision,
                quantity_precision,
            }))
        }
        _ => {
            warn!(
                "PRECISION: exchange info for {} lacks pricePrecision/quantityPrecision",
                symbol
            );
            Ok(None)
        }
    }
}
