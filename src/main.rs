use anyhow::Result;
use clap::Parser;
use futures_bot::cli::Menu;
use futures_bot::config::load_config;
use futures_bot::{logging, FuturesBot};
use log::{error, info};
use rust_decimal::Decimal;
use std::io;
use std::path::PathBuf;

/// Binance USDT-M futures order CLI
#[derive(Parser, Debug)]
#[command(name = "futures-bot")]
#[command(about = "Place market and limit orders on Binance Futures with precision-safe formatting")]
#[command(version)]
struct Cli {
    /// YAML config file (defaults to ./config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the production endpoint instead of the testnet
    #[arg(long)]
    mainnet: bool,

    /// Symbol suggested in prompts
    #[arg(long)]
    symbol: Option<String>,

    /// Quantity suggested in prompts
    #[arg(long)]
    quantity: Option<Decimal>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Cli::parse();

    let mut config = load_config(args.config.as_deref())?;
    if args.mainnet {
        config.testnet = false;
    }
    if let Some(symbol) = args.symbol {
        config.default_symbol = symbol.to_uppercase();
    }
    if let Some(quantity) = args.quantity {
        config.default_quantity = quantity;
    }
    config.validate()?;
    info!("Starting Binance Futures trading bot with config: {:?}", config);

    let bot = match FuturesBot::connect(&config).await {
        Ok(bot) => bot,
        Err(err) => {
            error!("Bot failed to connect to Binance, exiting CLI: {}", err);
            eprintln!(
                "\nFailed to connect to Binance {}. Please check your API keys and internet connection.",
                if config.testnet { "Testnet" } else { "Futures" }
            );
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut menu = Menu::new(
        &bot,
        stdin.lock(),
        io::stdout(),
        &config.default_symbol,
        config.default_quantity,
    );
    menu.run().await
}
