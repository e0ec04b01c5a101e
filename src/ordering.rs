// ORDERING: order validation, precision formatting and submission

use crate::bot::FuturesBot;
use crate::error::{BotError, Result};
use crate::types::{FormattedOrderParams, OrderRequest, OrderResult, OrderType, Side, TimeInForce};
use crate::utils::format_decimal;
use log::{error, info};
use rust_decimal::Decimal;

impl FuturesBot {
    /// Turn a request into the exact parameters sent to the exchange.
    ///
    /// Local checks (quantity, missing LIMIT price) run before any request so
    /// an invalid order never causes I/O.
    pub async fn normalize(&self, request: &OrderRequest) -> Result<FormattedOrderParams> {
        let symbol = request.symbol.trim();
        if symbol.is_empty() {
            return Err(BotError::invalid("symbol cannot be empty"));
        }
        if request.quantity <= Decimal::ZERO {
            return Err(BotError::invalid(format!(
                "quantity must be positive, got {}",
                request.quantity
            )));
        }
        let limit_price = match (request.order_type, request.price) {
            (OrderType::Limit, None) => {
                error!("ORDERING: price is required for LIMIT orders");
                return Err(BotError::MissingPrice);
            }
            (OrderType::Limit, Some(price)) if price <= Decimal::ZERO => {
                return Err(BotError::invalid(format!("price must be positive, got {price}")));
            }
            (OrderType::Limit, Some(price)) => Some(price),
            (OrderType::Market, _) => None,
        };

        let precision = self
            .precisions
            .resolve(self.api.as_ref(), symbol)
            .await
            .ok_or_else(|| {
                error!("ORDERING: failed to get precision for {}, cannot place order", symbol);
                BotError::PrecisionUnavailable {
                    symbol: symbol.to_string(),
                }
            })?;

        let quantity = format_decimal(request.quantity, precision.quantity_precision);
        info!(
            "ORDERING: original quantity: {}, formatted quantity: {}",
            request.quantity, quantity
        );
        if is_zero_string(&quantity) {
            return Err(BotError::invalid(format!(
                "quantity {} truncates to zero at precision {}",
                request.quantity, precision.quantity_precision
            )));
        }

        let (price, time_in_force) = match limit_price {
            Some(raw) => {
                let formatted = format_decimal(raw, precision.price_precision);
                info!("ORDERING: original price: {}, formatted price: {}", raw, formatted);
                if is_zero_string(&formatted) {
                    return Err(BotError::invalid(format!(
                        "price {} truncates to zero at precision {}",
                        raw, precision.price_precision
                    )));
                }
                (Some(formatted), Some(TimeInForce::Gtc))
            }
            None => (None, None),
        };

        Ok(FormattedOrderParams {
            symbol: symbol.to_string(),
            side: request.side,
            order_type: request.order_type,
            quantity,
            price,
            time_in_force,
        })
    }

    /// Normalize and submit. Exchange failures are logged with the formatted
    /// parameters and returned, never swallowed.
    pub async fn place_order(&self, request: &OrderRequest) -> Result<OrderResult> {
        let params = self.normalize(request).await?;
        info!("ORDERING: attempting to place {} order: {}", params.order_type, params);

        match self.api.create_order(&params).await {
            Ok(order) => {
                info!(
                    "ORDERING: order placed successfully: id={} status={} symbol={}",
                    order.order_id, order.status, order.symbol
                );
                Ok(order)
            }
            Err(err) => {
                error!("ORDERING: failed to place order: {} (params: {})", err, params);
                Err(err)
            }
        }
    }

    pub async fn place_market_order(&self, symbol: &str, side: Side, quantity: Decimal) -> Result<OrderResult> {
        info!("ORDERING: placing MARKET {} order for {} {}", side, quantity, symbol);
        self.place_order(&OrderRequest::market(symbol, side, quantity)).await
    }

    pub async fn place_limit_order(
        &self,
        symbol: &str,
        side: Side,
        quantity: Decimal,
        price: Decimal,
    ) -> Result<OrderResult> {
        info!(
            "ORDERING: placing LIMIT {} order for {} {} at {}",
            side, quantity, symbol, price
        );
        self.place_order(&OrderRequest::limit(symbol, side, quantity, price)).await
    }
}

fn is_zero_string(formatted: &str) -> bool {
    formatted.chars().all(|c| c == '0' || c == '.')
}
