//! CLI commands and handlers
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, FeatureFlags};
use crate::domain::allowance::{AllowanceCalculator, AllowanceType};
use crate::domain::quote::{FeeThresholder, TradeQuote, TradeQuoteRequest};
use crate::infrastructure::thornode::{QuoteResolver, ThornodeClient, ThornodePoolFeeSource};
use crate::shared::amount::to_base_unit;
use crate::shared::errors::AppError;
use crate::shared::types::{chains, Asset, AssetId};

#[derive(Parser)]
#[command(name = "swapflow")]
#[command(about = "Cross-chain swap quoting and allowance inspection")]
pub struct Cli {
    /// Path to config file (optional)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a swap quote and print it, or the classified failure
    Quote(QuoteArgs),

    /// Print the allowance the first hop of a quote requires
    Allowance {
        #[command(flatten)]
        quote: QuoteArgs,

        /// exact or unlimited (overrides config)
        #[arg(long)]
        allowance_type: Option<AllowanceType>,
    },
}

#[derive(Args, Clone, Debug)]
pub struct QuoteArgs {
    /// Sell asset symbol (BTC, ETH, USDC, ...)
    #[arg(long)]
    pub from: String,

    /// Buy asset symbol
    #[arg(long)]
    pub to: String,

    /// Sell amount in precision units, e.g. 1.5
    #[arg(long)]
    pub amount: String,

    /// Receive address on the buy asset's chain
    #[arg(long)]
    pub destination: Option<String>,

    /// Affiliate fee in basis points (overrides config)
    #[arg(long)]
    pub affiliate_bps: Option<u32>,

    /// Streaming swap interval in blocks (overrides config)
    #[arg(long)]
    pub streaming_interval: Option<u32>,
}

/// Assets the CLI can name by symbol
const KNOWN_ASSETS: [(&str, &str, &str, u32); 11] = [
    ("BTC", chains::BITCOIN, "slip44:0", 8),
    ("BCH", chains::BITCOIN_CASH, "slip44:145", 8),
    ("LTC", chains::LITECOIN, "slip44:2", 8),
    ("DOGE", chains::DOGECOIN, "slip44:3", 8),
    ("ETH", chains::ETHEREUM, "slip44:60", 18),
    ("USDC", chains::ETHEREUM, "erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", 6),
    ("USDT", chains::ETHEREUM, "erc20:0xdac17f958d2ee523a2206206994597c13d831ec7", 6),
    ("AVAX", chains::AVALANCHE, "slip44:60", 18),
    ("BNB", chains::BNB_SMART_CHAIN, "slip44:60", 18),
    ("ATOM", chains::COSMOS_HUB, "slip44:118", 6),
    ("RUNE", chains::THORCHAIN, "slip44:931", 8),
];

pub fn known_asset(symbol: &str) -> Result<Asset, AppError> {
    let symbol = symbol.to_uppercase();
    let (symbol, chain_id, asset, precision) = KNOWN_ASSETS
        .iter()
        .find(|(known, _, _, _)| *known == symbol)
        .ok_or_else(|| AppError::InvalidArgument(format!("Unknown asset symbol: {}", symbol)))?;
    let asset_id: AssetId = format!("{}/{}", chain_id, asset).parse()?;
    Ok(Asset::new(asset_id, *symbol, *precision))
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: Config) -> Result<(), AppError> {
        match command {
            Commands::Quote(args) => Self::execute_quote_command(args, config).await,
            Commands::Allowance { quote, allowance_type } => {
                let allowance_type = allowance_type.unwrap_or(config.trade.allowance_type);
                Self::execute_allowance_command(quote, allowance_type, config).await
            }
        }
    }

    /// Build the quote request from CLI arguments and config
    pub fn build_request(args: &QuoteArgs, config: &Config) -> Result<TradeQuoteRequest, AppError> {
        let sell_asset = known_asset(&args.from)?;
        let buy_asset = known_asset(&args.to)?;
        let sell_amount = to_base_unit(&args.amount, sell_asset.precision)?;

        let mut request = TradeQuoteRequest::new(sell_asset, buy_asset, sell_amount)
            .with_affiliate_bps(args.affiliate_bps.unwrap_or(config.trade.affiliate_bps));
        if let Some(destination) = &args.destination {
            request = request.with_receive_address(destination.clone());
        }
        if let Some(interval) = args.streaming_interval.or(config.trade.streaming_interval) {
            request = request.with_streaming(interval);
        }
        Ok(request)
    }

    fn resolver(config: &Config) -> QuoteResolver {
        let client = ThornodeClient::new(config.backend_base_url(), config.backend_timeout());
        let fees = FeeThresholder::new(Arc::new(ThornodePoolFeeSource::new(client.clone())));
        QuoteResolver::new(client, fees, config.backend.affiliate_name.clone())
    }

    async fn resolve(args: &QuoteArgs, config: &Config) -> Result<TradeQuote, AppError> {
        let request = Self::build_request(args, config)?;
        info!(
            "🔍 Quoting {} {} -> {} via {}",
            args.amount,
            request.sell_asset.symbol,
            request.buy_asset.symbol,
            config.backend_base_url()
        );

        match Self::resolver(config).resolve(&request).await {
            Ok(quote) => Ok(quote),
            Err(e) => {
                warn!("Quote failed: {}", e);
                println!("{}", serde_json::to_string_pretty(&json!({ "error": &e }))?);
                Err(e.into())
            }
        }
    }

    /// Execute quote command
    async fn execute_quote_command(args: QuoteArgs, config: Config) -> Result<(), AppError> {
        let quote = Self::resolve(&args, &config).await?;
        let output = json!({
            "identity": quote.identity(),
            "is_unsafe": quote.is_unsafe(),
            "quote": quote,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    /// Execute allowance command
    async fn execute_allowance_command(
        args: QuoteArgs,
        allowance_type: AllowanceType,
        config: Config,
    ) -> Result<(), AppError> {
        let quote = Self::resolve(&args, &config).await?;
        let hop = quote
            .first_hop()
            .ok_or_else(|| AppError::InvalidArgument("quote has no steps".to_string()))?;

        let calculator = AllowanceCalculator::new(config.permit_policy());
        let requirement = calculator.required_allowance(hop, allowance_type);
        let output = json!({
            "allowance_type": allowance_type,
            "requires_approval_transaction": requirement.requires_approval_transaction(),
            "requirement": requirement,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
