// Interactive menu: reads choices and order fields, prints results
// Generic over the input/output streams so a session can be scripted

use crate::bot::FuturesBot;
use crate::error::BotError;
use crate::types::{parse_positive_decimal, AccountInfo, OrderResult, OrderType, Side};
use anyhow::Result;
use log::{info, warn};
use rust_decimal::Decimal;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    MarketOrder,
    LimitOrder,
    AccountInfo,
    MarketPrice,
    Exit,
}

impl MenuChoice {
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            1 => Some(MenuChoice::MarketOrder),
            2 => Some(MenuChoice::LimitOrder),
            3 => Some(MenuChoice::AccountInfo),
            4 => Some(MenuChoice::MarketPrice),
            5 => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

pub struct Menu<'a, R, W> {
    bot: &'a FuturesBot,
    input: R,
    out: W,
    default_symbol: String,
    default_quantity: Decimal,
}

/// Outcome of a prompt: a value, or the input stream ended.
type Prompted<T> = Option<T>;

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(bot: &'a FuturesBot, input: R, out: W, default_symbol: &str, default_quantity: Decimal) -> Self {
        Self {
            bot,
            input,
            out,
            default_symbol: default_symbol.to_string(),
            default_quantity,
        }
    }

    /// Run until the user exits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        info!("CLI: starting Binance Futures trading bot CLI");
        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt_choice()? else {
                break;
            };
            match choice {
                MenuChoice::MarketOrder => {
                    if !self.order_flow(OrderType::Market).await? {
                        break;
                    }
                }
                MenuChoice::LimitOrder => {
                    if !self.order_flow(OrderType::Limit).await? {
                        break;
                    }
                }
                MenuChoice::AccountInfo => self.account_flow().await?,
                MenuChoice::MarketPrice => {
                    if !self.price_flow().await? {
                        break;
                    }
                }
                MenuChoice::Exit => {
                    writeln!(self.out, "Exiting Trading Bot :)")?;
                    break;
                }
            }
        }
        info!("CLI: trading bot CLI exited");
        Ok(())
    }

    fn print_menu(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Trading Bot Menu ---")?;
        writeln!(self.out, "1. Place Market Order")?;
        writeln!(self.out, "2. Place Limit Order")?;
        writeln!(self.out, "3. Get Account Info")?;
        writeln!(self.out, "4. Get Market Price")?;
        writeln!(self.out, "5. Exit")?;
        writeln!(self.out, "------------------------")?;
        Ok(())
    }

    /// Returns `false` when input ended mid-flow.
    async fn order_flow(&mut self, order_type: OrderType) -> Result<bool> {
        let heading = title(order_type);
        writeln!(self.out, "\n--- Place {heading} Order ---")?;

        let Some(symbol) = self.prompt_symbol()? else { return Ok(false) };
        let Some(side) = self.prompt_side()? else { return Ok(false) };
        let quantity_prompt = format!("Enter quantity (e.g., {}): ", self.default_quantity);
        let Some(quantity) = self.prompt_decimal(&quantity_prompt, "quantity")? else {
            return Ok(false);
        };

        let result = match order_type {
            OrderType::Market => {
                writeln!(
                    self.out,
                    "\nAttempting to place MARKET {side} order for {quantity} {symbol}..."
                )?;
                self.bot.place_market_order(&symbol, side, quantity).await
            }
            OrderType::Limit => {
                let Some(price) = self.prompt_decimal("Enter limit price: ", "price")? else {
                    return Ok(false);
                };
                writeln!(
                    self.out,
                    "\nAttempting to place LIMIT {side} order for {quantity} {symbol} at {price}..."
                )?;
                self.bot.place_limit_order(&symbol, side, quantity, price).await
            }
        };

        match result {
            Ok(order) => self.print_order(order_type, &order)?,
            Err(err) => self.print_failure(&format!("Failed to place {order_type} order"), &err)?,
        }
        Ok(true)
    }

    async fn account_flow(&mut self) -> Result<()> {
        writeln!(self.out, "\n--- Account Information ---")?;
        match self.bot.account_info().await {
            Ok(info) => self.print_account(&info)?,
            Err(err) => self.print_failure("Failed to retrieve account information", &err)?,
        }
        Ok(())
    }

    async fn price_flow(&mut self) -> Result<bool> {
        writeln!(self.out, "\n--- Get Market Price ---")?;
        let Some(symbol) = self.prompt_symbol()? else { return Ok(false) };
        match self.bot.market_price(&symbol).await {
            Ok(price) => writeln!(self.out, "\nCurrent Market Price for {symbol}: {price}")?,
            Err(err) => self.print_failure(&format!("Failed to retrieve market price for {symbol}"), &err)?,
        }
        Ok(true)
    }

    fn print_order(&mut self, order_type: OrderType, order: &OrderResult) -> Result<()> {
        writeln!(self.out, "\n{} Order Placed Successfully!", title(order_type))?;
        writeln!(self.out, "Order ID: {}", order.order_id)?;
        writeln!(self.out, "Symbol: {}", order.symbol)?;
        writeln!(self.out, "Side: {}", order.side)?;
        writeln!(self.out, "Type: {}", order.order_type)?;
        match order_type {
            OrderType::Limit => {
                if let Some(price) = order.price {
                    writeln!(self.out, "Price: {price}")?;
                }
                writeln!(self.out, "Status: {}", order.status)?;
            }
            OrderType::Market => {
                writeln!(self.out, "Status: {}", order.status)?;
                if let Some(price) = order.executed_price() {
                    writeln!(self.out, "Executed Price: {price}")?;
                }
            }
        }
        Ok(())
    }

    fn print_account(&mut self, info: &AccountInfo) -> Result<()> {
        writeln!(self.out, "\nAccount Details:")?;
        for asset in &info.assets {
            writeln!(self.out, "  Asset: {}", asset.asset)?;
            writeln!(self.out, "    Wallet Balance: {}", asset.wallet_balance)?;
            writeln!(self.out, "    Available Balance: {}", asset.available_balance)?;
            writeln!(self.out, "    Margin Balance: {}", asset.margin_balance)?;
        }
        writeln!(self.out, "  Total Initial Margin: {}", info.total_initial_margin)?;
        writeln!(self.out, "  Total Unrealized Profit: {}", info.total_unrealized_profit)?;
        Ok(())
    }

    fn print_failure(&mut self, what: &str, err: &BotError) -> Result<()> {
        writeln!(self.out, "\n{what}: {err}")?;
        if !err.is_validation() {
            writeln!(self.out, "Check logs for details.")?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------------

    fn read_line(&mut self, prompt: &str) -> Result<Prompted<String>> {
        write!(self.out, "{prompt}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn reject(&mut self, raw: &str, message: &str) -> Result<()> {
        warn!("CLI: user input validation failed: '{}'. {}", raw, message);
        writeln!(self.out, "Error: {message}")?;
        Ok(())
    }

    fn prompt_choice(&mut self) -> Result<Prompted<MenuChoice>> {
        loop {
            let Some(raw) = self.read_line("Enter your choice (1-5): ")? else {
                return Ok(None);
            };
            match raw.parse::<u32>().ok().and_then(MenuChoice::from_number) {
                Some(choice) => return Ok(Some(choice)),
                None => self.reject(&raw, "Choice must be between 1 and 5.")?,
            }
        }
    }

    fn prompt_symbol(&mut self) -> Result<Prompted<String>> {
        let prompt = format!("Enter trading symbol (e.g., {}): ", self.default_symbol);
        loop {
            let Some(raw) = self.read_line(&prompt)? else {
                return Ok(None);
            };
            if raw.is_empty() {
                self.reject(&raw, "Symbol cannot be empty.")?;
                continue;
            }
            return Ok(Some(raw.to_uppercase()));
        }
    }

    fn prompt_side(&mut self) -> Result<Prompted<Side>> {
        loop {
            let Some(raw) = self.read_line("Enter order side (BUY/SELL): ")? else {
                return Ok(None);
            };
            match raw.parse::<Side>() {
                Ok(side) => return Ok(Some(side)),
                Err(_) => self.reject(&raw, "Side must be 'BUY' or 'SELL'.")?,
            }
        }
    }

    fn prompt_decimal(&mut self, prompt: &str, field: &str) -> Result<Prompted<Decimal>> {
        loop {
            let Some(raw) = self.read_line(prompt)? else {
                return Ok(None);
            };
            match parse_positive_decimal(field, &raw) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => {
                    let message = match err {
                        BotError::InvalidOrderSpec(msg) => msg,
                        other => other.to_string(),
                    };
                    self.reject(&raw, &message)?;
                }
            }
        }
    }
}

fn title(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "Market",
        OrderType::Limit => "Limit",
    }
}
