// CONNECTION: Binance USDT-M futures REST access
// FuturesApi is the RPC boundary the bot talks to; BinanceFutures implements it over HTTP

use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::types::{AccountInfo, ExchangeInfo, FormattedOrderParams, OrderResult, ServerTime, TickerPrice};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";
pub const MAINNET_BASE_URL: &str = "https://fapi.binance.com";

/// Exchange calls the bot depends on. Every call returns an explicit result;
/// callers decide what a failure means.
#[async_trait]
pub trait FuturesApi: Send + Sync {
    async fn ping(&self) -> Result<()>;
    /// Server time in milliseconds since the epoch.
    async fn server_time(&self) -> Result<i64>;
    async fn account_info(&self) -> Result<AccountInfo>;
    async fn symbol_ticker(&self, symbol: &str) -> Result<TickerPrice>;
    async fn exchange_info(&self) -> Result<ExchangeInfo>;
    async fn create_order(&self, params: &FormattedOrderParams) -> Result<OrderResult>;
}

/// Error body returned by Binance on rejected requests.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

#[derive(Clone)]
pub struct BinanceFutures {
    http: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    recv_window_ms: u64,
}

impl BinanceFutures {
    pub fn new(config: &BotConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("futures-bot/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|err| BotError::ConnectionFailure(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            recv_window_ms: config.recv_window_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn public_get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        send_json(self.http.get(&url).query(query)).await
    }

    async fn signed_get<T: DeserializeOwned>(&self, path: &str, params: Vec<(String, String)>) -> Result<T> {
        let query = self.sign_params(params)?;
        let url = format!("{}{}?{}", self.base_url, path, query);
        send_json(self.http.get(&url).header("X-MBX-APIKEY", &self.api_key)).await
    }

    async fn signed_post<T: DeserializeOwned>(&self, path: &str, params: Vec<(String, String)>) -> Result<T> {
        let body = self.sign_params(params)?;
        let url = format!("{}{}", self.base_url, path);
        send_json(
            self.http
                .post(&url)
                .header("X-MBX-APIKEY", &self.api_key)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(body),
        )
        .await
    }

    fn sign_params(&self, mut params: Vec<(String, String)>) -> Result<String> {
        params.push(("timestamp".into(), Utc::now().timestamp_millis().to_string()));
        if self.recv_window_ms > 0 {
            params.push(("recvWindow".into(), self.recv_window_ms.to_string()));
        }
        let query = serde_urlencoded::to_string(&params)
            .map_err(|err| BotError::invalid(format!("failed to encode request parameters: {err}")))?;
        let signature = sign_query(&self.api_secret, &query)?;
        Ok(format!("{query}&signature={signature}"))
    }
}

#[async_trait]
impl FuturesApi for BinanceFutures {
    async fn ping(&self) -> Result<()> {
        let _: serde_json::Value = self.public_get("/fapi/v1/ping", &[]).await?;
        Ok(())
    }

    async fn server_time(&self) -> Result<i64> {
        let time: ServerTime = self.public_get("/fapi/v1/time", &[]).await?;
        Ok(time.server_time)
    }

    async fn account_info(&self) -> Result<AccountInfo> {
        self.signed_get("/fapi/v2/account", Vec::new()).await
    }

    async fn symbol_ticker(&self, symbol: &str) -> Result<TickerPrice> {
        self.public_get("/fapi/v1/ticker/price", &[("symbol", symbol)]).await
    }

    async fn exchange_info(&self) -> Result<ExchangeInfo> {
        self.public_get("/fapi/v1/exchangeInfo", &[]).await
    }

    async fn create_order(&self, params: &FormattedOrderParams) -> Result<OrderResult> {
        self.signed_post("/fapi/v1/order", params.to_params()).await
    }
}

/// Hex-encoded HMAC-SHA256 of `query` keyed with the API secret.
pub fn sign_query(secret: &str, query: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| BotError::ConnectionFailure(format!("failed to init signer: {err}")))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T> {
    let resp = builder.send().await?;
    let resp = ensure_success(resp).await?;
    Ok(resp.json().await?)
}

async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    log::error!("CONNECTION: binance api error: {} - {}", status, body);
    Err(classify_error(status.as_u16(), &body))
}

/// Map a non-success HTTP response onto the error taxonomy.
///
/// Any response carrying a Binance `{code, msg}` body is an application-level
/// rejection. Server errors without one are transport failures.
pub fn classify_error(status: u16, body: &str) -> BotError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) => BotError::ExchangeRejected {
            status,
            code: Some(err.code),
            message: err.msg,
        },
        Err(_) if status >= 500 || status == 408 => {
            BotError::Transport(format!("server returned {status}: {body}"))
        }
        Err(_) => BotError::ExchangeRejected {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}
