// Shared test helpers: an in-memory FuturesApi with call counters

#![allow(dead_code)]

use async_trait::async_trait;
use futures_bot::error::{BotError, Result};
use futures_bot::types::{
    AccountAsset, AccountInfo, ExchangeInfo, ExchangeSymbol, FormattedOrderParams, OrderResult,
    TickerPrice,
};
use futures_bot::{FuturesApi, FuturesBot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct MockApi {
    pub symbols: Mutex<Vec<ExchangeSymbol>>,
    pub ticker_price: Mutex<Decimal>,
    pub fail_ping: AtomicBool,
    pub fail_account: AtomicBool,
    pub account_unreachable: AtomicBool,
    pub fail_exchange_info: AtomicBool,
    pub reject_orders: AtomicBool,
    pub ping_calls: AtomicUsize,
    pub account_calls: AtomicUsize,
    pub exchange_info_calls: AtomicUsize,
    pub order_calls: AtomicUsize,
    pub placed: Mutex<Vec<FormattedOrderParams>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            symbols: Mutex::new(vec![
                exchange_symbol("BTCUSDT", Some(2), Some(3)),
                exchange_symbol("ETHUSDT", Some(2), Some(3)),
                exchange_symbol("DOGEUSDT", Some(6), Some(0)),
            ]),
            ticker_price: Mutex::new(dec!(65000.10)),
            fail_ping: AtomicBool::new(false),
            fail_account: AtomicBool::new(false),
            account_unreachable: AtomicBool::new(false),
            fail_exchange_info: AtomicBool::new(false),
            reject_orders: AtomicBool::new(false),
            ping_calls: AtomicUsize::new(0),
            account_calls: AtomicUsize::new(0),
            exchange_info_calls: AtomicUsize::new(0),
            order_calls: AtomicUsize::new(0),
            placed: Mutex::new(Vec::new()),
        }
    }
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn exchange_info_calls(&self) -> usize {
        self.exchange_info_calls.load(Ordering::SeqCst)
    }

    pub fn order_calls(&self) -> usize {
        self.order_calls.load(Ordering::SeqCst)
    }

    /// Exchange-info and order calls; the connect bootstrap is not included.
    pub fn network_calls_after_connect(&self) -> usize {
        self.exchange_info_calls() + self.order_calls()
    }

    pub fn last_order(&self) -> Option<FormattedOrderParams> {
        self.placed.lock().unwrap().last().cloned()
    }

    pub fn set_symbols(&self, symbols: Vec<ExchangeSymbol>) {
        *self.symbols.lock().unwrap() = symbols;
    }
}

pub fn exchange_symbol(symbol: &str, price: Option<i32>, quantity: Option<i32>) -> ExchangeSymbol {
    ExchangeSymbol {
        symbol: symbol.to_string(),
        price_precision: price,
        quantity_precision: quantity,
        status: Some("TRADING".to_string()),
    }
}

#[async_trait]
impl FuturesApi for MockApi {
    async fn ping(&self) -> Result<()> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_ping.load(Ordering::SeqCst) {
            return Err(BotError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    async fn server_time(&self) -> Result<i64> {
        Ok(1_700_000_000_000)
    }

    async fn account_info(&self) -> Result<AccountInfo> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        if self.account_unreachable.load(Ordering::SeqCst) {
            return Err(BotError::Transport("request timed out".to_string()));
        }
        if self.fail_account.load(Ordering::SeqCst) {
            return Err(BotError::ExchangeRejected {
                status: 401,
                code: Some(-2015),
                message: "Invalid API-key, IP, or permissions for action.".to_string(),
            });
        }
        Ok(AccountInfo {
            assets: vec![AccountAsset {
                asset: "USDT".to_string(),
                wallet_balance: dec!(1000),
                cross_wallet_balance: dec!(1000),
                available_balance: dec!(950),
                margin_balance: dec!(1000),
                unrealized_profit: Decimal::ZERO,
            }],
            total_initial_margin: dec!(50),
            total_unrealized_profit: Decimal::ZERO,
            total_wallet_balance: dec!(1000),
            total_margin_balance: dec!(1000),
            available_balance: dec!(950),
        })
    }

    async fn symbol_ticker(&self, symbol: &str) -> Result<TickerPrice> {
        Ok(TickerPrice {
            symbol: symbol.to_string(),
            price: *self.ticker_price.lock().unwrap(),
            time: None,
        })
    }

    async fn exchange_info(&self) -> Result<ExchangeInfo> {
        self.exchange_info_calls.fetch_add(1, Ordering::SeqCst);
        // give concurrent callers a chance to interleave
        tokio::time::sleep(Duration::from_millis(5)).await;
        if self.fail_exchange_info.load(Ordering::SeqCst) {
            return Err(BotError::Transport("request timed out".to_string()));
        }
        Ok(ExchangeInfo {
            symbols: self.symbols.lock().unwrap().clone(),
        })
    }

    async fn create_order(&self, params: &FormattedOrderParams) -> Result<OrderResult> {
        let id = self.order_calls.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        self.placed.lock().unwrap().push(params.clone());
        if self.reject_orders.load(Ordering::SeqCst) {
            return Err(BotError::ExchangeRejected {
                status: 400,
                code: Some(-2019),
                message: "Margin is insufficient.".to_string(),
            });
        }
        Ok(OrderResult {
            order_id: id,
            symbol: params.symbol.clone(),
            side: params.side.as_str().to_string(),
            order_type: params.order_type.as_str().to_string(),
            status: "NEW".to_string(),
            client_order_id: None,
            price: params.price.as_deref().and_then(|p| p.parse().ok()),
            avg_price: None,
            orig_qty: params.quantity.parse().ok(),
            executed_qty: None,
            fills: Vec::new(),
        })
    }
}

pub async fn connected_bot(api: &Arc<MockApi>) -> FuturesBot {
    FuturesBot::connect_with(api.clone())
        .await
        .expect("mock connection should succeed")
}
