// BOT: owns the exchange client and the precision cache for one session

use crate::cache::PrecisionCache;
use crate::config::BotConfig;
use crate::connection::{BinanceFutures, FuturesApi};
use crate::error::{BotError, Result};
use crate::types::AccountInfo;
use log::{error, info, warn};
use rust_decimal::Decimal;
use std::sync::Arc;

pub struct FuturesBot {
    pub(crate) api: Arc<dyn FuturesApi>,
    pub(crate) precisions: PrecisionCache,
}

impl FuturesBot {
    /// Build a REST client from `config` and validate the session.
    pub async fn connect(config: &BotConfig) -> Result<Self> {
        if !config.has_credentials() {
            error!("BOT: API key or secret is missing, cannot connect to Binance");
            return Err(BotError::ConnectionFailure(
                "API key or secret is missing".to_string(),
            ));
        }

        let client = BinanceFutures::new(config)?;
        info!(
            "BOT: connecting to {} ({})",
            client.base_url(),
            if config.testnet { "testnet" } else { "production" }
        );
        Self::connect_with(Arc::new(client)).await
    }

    /// Validate the session on an existing client.
    ///
    /// A failed ping is fatal, and so is an account lookup the exchange rejects
    /// for bad credentials or signature. Server time and other account lookup
    /// failures are only logged.
    pub async fn connect_with(api: Arc<dyn FuturesApi>) -> Result<Self> {
        if let Err(err) = api.ping().await {
            error!("BOT: connection check failed: {}", err);
            return Err(BotError::ConnectionFailure(err.to_string()));
        }
        info!("BOT: successfully connected to Binance Futures");

        let bot = Self {
            api,
            precisions: PrecisionCache::new(),
        };

        match bot.server_time().await {
            Ok(ms) => info!("BOT: Binance server time: {} ms", ms),
            Err(err) => warn!("BOT: could not fetch server time: {}", err),
        }
        match bot.account_info().await {
            Ok(_) => {}
            Err(err) if err.is_auth_rejection() => {
                error!("BOT: Binance rejected the API credentials: {}", err);
                return Err(BotError::ConnectionFailure(format!("credentials rejected: {err}")));
            }
            Err(err) => warn!("BOT: could not fetch account info during startup: {}", err),
        }

        Ok(bot)
    }

    pub fn precision_cache(&self) -> &PrecisionCache {
        &self.precisions
    }

    pub fn api(&self) -> &Arc<dyn FuturesApi> {
        &self.api
    }

    pub async fn server_time(&self) -> Result<i64> {
        self.api.server_time().await
    }

    pub async fn account_info(&self) -> Result<AccountInfo> {
        match self.api.account_info().await {
            Ok(info) => {
                info!("BOT: retrieved futures account information");
                for asset in &info.assets {
                    info!(
                        "BOT: asset {}: wallet balance {}, cross wallet balance {}",
                        asset.asset, asset.wallet_balance, asset.cross_wallet_balance
                    );
                }
                info!("BOT: total initial margin: {}", info.total_initial_margin);
                Ok(info)
            }
            Err(err) => {
                error!("BOT: failed to get account info: {}", err);
                Err(err)
            }
        }
    }

    /// Last traded price. A genuine price of zero is `Ok(0)`, never an error stand-in.
    pub async fn market_price(&self, symbol: &str) -> Result<Decimal> {
        match self.api.symbol_ticker(symbol).await {
            Ok(ticker) => {
                info!("BOT: current market price for {}: {}", symbol, ticker.price);
                Ok(ticker.price)
            }
            Err(err) => {
                error!("BOT: failed to get market price for {}: {}", symbol, err);
                Err(err)
            }
        }
    }
}
