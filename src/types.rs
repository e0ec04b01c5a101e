use crate::error::{BotError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Order vocabulary
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl FromStr for Side {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(BotError::invalid(format!(
                "invalid side '{other}', must be 'BUY' or 'SELL'"
            ))),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl FromStr for OrderType {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            other => Err(BotError::invalid(format!(
                "invalid order type '{other}', must be 'MARKET' or 'LIMIT'"
            ))),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LIMIT orders are always sent good-till-cancelled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TimeInForce {
    #[default]
    #[serde(rename = "GTC")]
    Gtc,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
        }
    }
}

// ============================================================================
// Precision and order parameters
// ============================================================================

/// Decimal precision an instrument accepts for price and quantity.
/// A negative value means the field trades in multiples of `10^|precision|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolPrecision {
    pub symbol: String,
    pub price_precision: i32,
    pub quantity_precision: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<String>, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
        }
    }

    pub fn limit(symbol: impl Into<String>, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
        }
    }

    /// Build a request from raw user-facing strings.
    ///
    /// Symbol, side and type are trimmed and upper-cased. Any unknown side or
    /// type, an empty symbol, or a quantity/price that is not a positive
    /// decimal fails with [`BotError::InvalidOrderSpec`].
    pub fn parse(
        symbol: &str,
        side: &str,
        order_type: &str,
        quantity: &str,
        price: Option<&str>,
    ) -> Result<Self> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(BotError::invalid("symbol cannot be empty"));
        }
        let side = side.parse::<Side>()?;
        let order_type = order_type.parse::<OrderType>()?;
        let quantity = parse_positive_decimal("quantity", quantity)?;
        let price = price
            .map(|p| parse_positive_decimal("price", p))
            .transpose()?;

        Ok(Self {
            symbol,
            side,
            order_type,
            quantity,
            price,
        })
    }
}

pub fn parse_positive_decimal(field: &str, raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    let value = parse_decimal_truncating(raw)
        .ok_or_else(|| BotError::invalid(format!("{field} '{raw}' is not a valid number")))?;
    if value <= Decimal::ZERO {
        return Err(BotError::invalid(format!(
            "{field} must be a positive number, got {raw}"
        )));
    }
    Ok(value)
}

/// Parse without ever rounding. Fractional digits beyond what `Decimal` can
/// hold are dropped, so the result is never above the typed value.
fn parse_decimal_truncating(raw: &str) -> Option<Decimal> {
    if let Ok(value) = Decimal::from_str_exact(raw) {
        return Some(value);
    }
    if let Some((int, frac)) = raw.split_once('.') {
        if !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()) {
            return (0..frac.len()).rev().find_map(|keep| {
                let candidate = if keep == 0 {
                    int.to_string()
                } else {
                    format!("{int}.{}", &frac[..keep])
                };
                Decimal::from_str_exact(&candidate).ok()
            });
        }
    }
    Decimal::from_scientific(raw).ok()
}

/// Exact payload handed to `create_order`: quantity and price are already
/// truncated to the instrument's precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedOrderParams {
    pub symbol: String,
    pub side: Side,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(rename = "timeInForce", skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<TimeInForce>,
}

impl FormattedOrderParams {
    /// Key/value pairs in request order, ready for signing.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("symbol".to_string(), self.symbol.clone()),
            ("side".to_string(), self.side.as_str().to_string()),
            ("type".to_string(), self.order_type.as_str().to_string()),
            ("quantity".to_string(), self.quantity.clone()),
        ];
        if let Some(price) = &self.price {
            params.push(("price".to_string(), price.clone()));
        }
        if let Some(tif) = self.time_in_force {
            params.push(("timeInForce".to_string(), tif.as_str().to_string()));
        }
        params
    }
}

impl fmt::Display for FormattedOrderParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .to_params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        write!(f, "{{{}}}", pairs.join(", "))
    }
}

// ============================================================================
// Exchange payloads
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ServerTime {
    #[serde(rename = "serverTime")]
    pub server_time: i64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountAsset {
    pub asset: String,
    pub wallet_balance: Decimal,
    #[serde(default)]
    pub cross_wallet_balance: Decimal,
    #[serde(default)]
    pub available_balance: Decimal,
    #[serde(default)]
    pub margin_balance: Decimal,
    #[serde(default)]
    pub unrealized_profit: Decimal,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    #[serde(default)]
    pub assets: Vec<AccountAsset>,
    #[serde(default)]
    pub total_initial_margin: Decimal,
    #[serde(default)]
    pub total_unrealized_profit: Decimal,
    #[serde(default)]
    pub total_wallet_balance: Decimal,
    #[serde(default)]
    pub total_margin_balance: Decimal,
    #[serde(default)]
    pub available_balance: Decimal,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: Decimal,
    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeSymbol {
    pub symbol: String,
    #[serde(rename = "pricePrecision", default)]
    pub price_precision: Option<i32>,
    #[serde(rename = "quantityPrecision", default)]
    pub quantity_precision: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<ExchangeSymbol>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Fill {
    pub price: Decimal,
    pub qty: Decimal,
    #[serde(default)]
    pub commission: Option<Decimal>,
    #[serde(rename = "commissionAsset", default)]
    pub commission_asset: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    pub order_id: i64,
    pub symbol: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub status: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub avg_price: Option<Decimal>,
    #[serde(default)]
    pub orig_qty: Option<Decimal>,
    #[serde(default)]
    pub executed_qty: Option<Decimal>,
    #[serde(default)]
    pub fills: Vec<Fill>,
}

impl OrderResult {
    /// First fill price, falling back to a non-zero average price.
    pub fn executed_price(&self) -> Option<Decimal> {
        self.fills
            .first()
            .map(|fill| fill.price)
            .or(self.avg_price.filter(|p| !p.is_zero()))
    }
}
