//! Quote domain - trade quote requests, normalized quotes and fee thresholding

mod fee_thresholder;
mod identity;

pub use fee_thresholder::{FeeThresholder, PoolFeeSource};
pub use identity::QuoteIdentity;

#[cfg(test)]
pub use fee_thresholder::MockPoolFeeSource;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::shared::amount::base_units;
use crate::shared::errors::QuoteError;
use crate::shared::types::Asset;

/// Outcome of a quote request: the quote, or a classified failure
pub type QuoteOutcome = Result<TradeQuote, QuoteError>;

/// Streaming swap parameters. The interval only exists alongside streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamingParams {
    /// Blocks between sub-swaps
    pub interval: u32,
}

/// Immutable quote request built from the current trade input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeQuoteRequest {
    pub sell_asset: Asset,
    pub buy_asset: Asset,
    pub sell_amount_base_unit: BigUint,
    pub receive_address: Option<String>,
    pub affiliate_bps: u32,
    pub streaming: Option<StreamingParams>,
    pub account_number: u32,
}

impl TradeQuoteRequest {
    pub fn new(sell_asset: Asset, buy_asset: Asset, sell_amount_base_unit: BigUint) -> Self {
        Self {
            sell_asset,
            buy_asset,
            sell_amount_base_unit,
            receive_address: None,
            affiliate_bps: 0,
            streaming: None,
            account_number: 0,
        }
    }

    pub fn with_receive_address(mut self, receive_address: impl Into<String>) -> Self {
        self.receive_address = Some(receive_address.into());
        self
    }

    pub fn with_streaming(mut self, interval: u32) -> Self {
        self.streaming = Some(StreamingParams { interval });
        self
    }

    pub fn with_account_number(mut self, account_number: u32) -> Self {
        self.account_number = account_number;
        self
    }

    /// Copy of this request carrying a different affiliate fee
    pub fn with_affiliate_bps(&self, affiliate_bps: u32) -> Self {
        Self { affiliate_bps, ..self.clone() }
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.is_some()
    }
}

/// Direction of a bridge quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgeDirection {
    Deposit,
    Withdrawal,
}

/// One hop of a quote, in execution order
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeQuoteStep {
    pub sell_asset: Asset,
    pub buy_asset: Asset,
    pub account_number: u32,
    #[serde(with = "base_units")]
    pub sell_amount_including_protocol_fees_base_unit: BigUint,
    #[serde(with = "base_units")]
    pub buy_amount_base_unit: BigUint,
    /// Spender of the sell asset allowance
    pub allowance_contract: String,
    /// Protocol that produced the hop
    pub source: String,
    pub rate: String,
    pub estimated_execution_time_ms: Option<u64>,
    pub is_streaming: bool,
}

/// Normalized multi-hop quote. Only [`TradeQuote::new`] builds one, so the
/// hop list is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TradeQuote {
    steps: Vec<TradeQuoteStep>,
    pub receive_address: Option<String>,
    pub affiliate_bps: u32,
    pub is_streaming: bool,
    #[serde(serialize_with = "base_units::option::serialize")]
    pub recommended_minimum_base_unit: Option<BigUint>,
    pub bridge_direction: Option<BridgeDirection>,
    pub memo: Option<String>,
    /// Unix seconds after which the backend no longer honors the quote
    pub expiry: Option<i64>,
}

impl TradeQuote {
    /// Build a quote from its hops. A quote always has at least one hop.
    pub fn new(steps: Vec<TradeQuoteStep>) -> Result<Self, QuoteError> {
        if steps.is_empty() {
            return Err(QuoteError::generic("quote contains no steps"));
        }
        let is_streaming = steps.iter().any(|step| step.is_streaming);
        Ok(Self {
            steps,
            receive_address: None,
            affiliate_bps: 0,
            is_streaming,
            recommended_minimum_base_unit: None,
            bridge_direction: None,
            memo: None,
            expiry: None,
        })
    }

    pub fn steps(&self) -> &[TradeQuoteStep] {
        &self.steps
    }

    pub fn first_hop(&self) -> Option<&TradeQuoteStep> {
        self.steps.first()
    }

    /// The sell amount is below the backend's recommended minimum, so the
    /// protocol fees eat a disproportionate share of the trade.
    pub fn is_unsafe(&self) -> bool {
        match (&self.recommended_minimum_base_unit, self.first_hop()) {
            (Some(minimum), Some(hop)) => {
                hop.sell_amount_including_protocol_fees_base_unit < *minimum
            }
            _ => false,
        }
    }

    pub fn estimated_execution_time_ms(&self) -> Option<u64> {
        self.first_hop().and_then(|hop| hop.estimated_execution_time_ms)
    }

    pub fn is_bridge_withdrawal(&self) -> bool {
        self.bridge_direction == Some(BridgeDirection::Withdrawal)
    }

    pub fn identity(&self) -> QuoteIdentity {
        QuoteIdentity::of(self)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::shared::types::AssetId;

    pub fn eth() -> Asset {
        Asset::new("eip155:1/slip44:60".parse::<AssetId>().unwrap(), "ETH", 18)
    }

    pub fn usdc() -> Asset {
        Asset::new(
            "eip155:1/erc20:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
                .parse::<AssetId>()
                .unwrap(),
            "USDC",
            6,
        )
    }

    pub fn btc() -> Asset {
        Asset::new(
            "bip122:000000000019d6689c085ae165831e93/slip44:0"
                .parse::<AssetId>()
                .unwrap(),
            "BTC",
            8,
        )
    }

    pub fn step(sell_asset: Asset, buy_asset: Asset, sell_amount: u64) -> TradeQuoteStep {
        TradeQuoteStep {
            sell_asset,
            buy_asset,
            account_number: 0,
            sell_amount_including_protocol_fees_base_unit: BigUint::from(sell_amount),
            buy_amount_base_unit: BigUint::from(1_000u32),
            allowance_contract: "0xd37bbe5744d730a1d98d8dc97c42f0ca46ad7146".to_string(),
            source: "THORChain".to_string(),
            rate: "0.5".to_string(),
            estimated_execution_time_ms: None,
            is_streaming: false,
        }
    }

    pub fn quote(steps: Vec<TradeQuoteStep>) -> TradeQuote {
        TradeQuote::new(steps).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_quote_requires_steps() {
        let err = TradeQuote::new(vec![]).unwrap_err();
        assert_eq!(err.kind, crate::shared::errors::QuoteErrorKind::Generic);
    }

    #[test]
    fn test_steps_keep_hop_order() {
        let q = quote(vec![step(eth(), usdc(), 10), step(usdc(), btc(), 20)]);
        let symbols: Vec<_> = q.steps().iter().map(|s| s.sell_asset.symbol.as_str()).collect();
        assert_eq!(symbols, ["ETH", "USDC"]);
        assert_eq!(q.first_hop(), q.steps().first());
    }

    #[test]
    fn test_unsafe_when_below_recommended_minimum() {
        let mut q = quote(vec![step(usdc(), btc(), 1_000_000)]);
        assert!(!q.is_unsafe());

        q.recommended_minimum_base_unit = Some(BigUint::from(2_000_000u32));
        assert!(q.is_unsafe());

        q.recommended_minimum_base_unit = Some(BigUint::from(1_000_000u32));
        assert!(!q.is_unsafe());
    }

    #[test]
    fn test_streaming_follows_steps() {
        let mut hop = step(eth(), btc(), 10);
        hop.is_streaming = true;
        hop.estimated_execution_time_ms = Some(600_000);
        let q = quote(vec![hop]);
        assert!(q.is_streaming);
        assert_eq!(q.estimated_execution_time_ms(), Some(600_000));
    }

    #[test]
    fn test_with_affiliate_bps_leaves_original_untouched() {
        let request =
            TradeQuoteRequest::new(eth(), btc(), BigUint::from(100u32)).with_affiliate_bps(50);
        let thresholded = request.with_affiliate_bps(0);
        assert_eq!(thresholded.affiliate_bps, 0);
        assert_eq!(request.affiliate_bps, 50);
        assert_eq!(thresholded.sell_amount_base_unit, request.sell_amount_base_unit);
    }

    #[test]
    fn test_quote_serde_keeps_amounts_as_strings() {
        let mut q = quote(vec![step(usdc(), btc(), 1_000_000)]);
        q.recommended_minimum_base_unit = Some(BigUint::from(5u32));
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(
            json["steps"][0]["sell_amount_including_protocol_fees_base_unit"],
            "1000000"
        );
        assert_eq!(json["recommended_minimum_base_unit"], "5");
        assert_eq!(json["steps"].as_array().map(Vec::len), Some(1));
    }
}
