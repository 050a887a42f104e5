//! Swap quote resolution against the protocol node
//!
//! One request per call, no retries. Failures come back as classified
//! [`QuoteError`] values so the caller can decide whether to offer a retry.

use num_bigint::BigUint;
use num_traits::Zero;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use super::client::ThornodeClient;
use super::pool_assets::pool_asset_id;
use super::types::{QuoteResponse, QuoteResponseSuccess};
use super::THORCHAIN_FIXED_PRECISION;
use crate::domain::quote::{
    FeeThresholder, QuoteOutcome, TradeQuote, TradeQuoteRequest, TradeQuoteStep,
};
use crate::shared::amount::{from_base_unit, parse_base_unit, rescale};
use crate::shared::errors::QuoteError;
use crate::shared::types::chains;

const QUOTE_PATH: &str = "/lcd/thorchain/quote/swap";
const BCH_ADDRESS_PREFIX: &str = "bitcoincash:";
pub const THORCHAIN_SOURCE: &str = "THORChain";
pub const THORCHAIN_STREAMING_SOURCE: &str = "THORChain • Streaming";

static NOT_ENOUGH_FEE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)not enough fee|not enough to pay transaction fee").expect("valid regex")
});
static TRADING_HALTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"trading is halted").expect("valid regex"));

/// Resolves swap quotes from the protocol node
pub struct QuoteResolver {
    client: ThornodeClient,
    fee_thresholder: FeeThresholder,
    affiliate_name: String,
}

impl QuoteResolver {
    pub fn new(
        client: ThornodeClient,
        fee_thresholder: FeeThresholder,
        affiliate_name: impl Into<String>,
    ) -> Self {
        Self { client, fee_thresholder, affiliate_name: affiliate_name.into() }
    }

    pub async fn resolve(&self, request: &TradeQuoteRequest) -> QuoteOutcome {
        let from_asset = pool_asset_id(&request.sell_asset)?;
        let to_asset = pool_asset_id(&request.buy_asset)?;

        let affiliate_bps = self
            .fee_thresholder
            .threshold(&request.sell_asset, &request.sell_amount_base_unit, request.affiliate_bps)
            .await
            .map_err(|e| QuoteError::generic(e.to_string()))?;
        let request = request.with_affiliate_bps(affiliate_bps);

        let query = self.build_query(&request, from_asset, to_asset);
        info!(
            "🔍 Requesting quote {} {} -> {}",
            request.sell_amount_base_unit, request.sell_asset.symbol, request.buy_asset.symbol
        );

        let response: QuoteResponse = self.client.get_json(QUOTE_PATH, &query).await?;
        let success = classify_response(response, &request)?;
        normalize_quote(success, &request)
    }

    fn build_query(
        &self,
        request: &TradeQuoteRequest,
        from_asset: String,
        to_asset: String,
    ) -> Vec<(&'static str, String)> {
        let amount = rescale(
            &request.sell_amount_base_unit,
            request.sell_asset.precision,
            THORCHAIN_FIXED_PRECISION,
        );

        let mut query = vec![
            ("amount", amount.to_string()),
            ("from_asset", from_asset),
            ("to_asset", to_asset),
        ];
        if let Some(destination) = receive_address_for(request) {
            query.push(("destination", destination));
        }
        query.push(("affiliate_bps", request.affiliate_bps.to_string()));
        query.push(("affiliate", self.affiliate_name.clone()));
        if let Some(streaming) = request.streaming {
            query.push(("streaming_interval", streaming.interval.to_string()));
        }
        query
    }
}

/// Receive address in the destination chain's expected format
fn receive_address_for(request: &TradeQuoteRequest) -> Option<String> {
    let address = request.receive_address.as_deref()?;
    if request.buy_asset.chain_id() == chains::BITCOIN_CASH {
        return Some(address.replace(BCH_ADDRESS_PREFIX, ""));
    }
    Some(address.to_string())
}

/// Classify a decoded quote body. The fee pattern is checked first: it is the
/// most specific and halted/generic messages may overlap with it.
pub fn classify_response(
    response: QuoteResponse,
    request: &TradeQuoteRequest,
) -> Result<QuoteResponseSuccess, QuoteError> {
    match response {
        QuoteResponse::Error { error } if NOT_ENOUGH_FEE.is_match(&error) => {
            debug!("Quote rejected as too small: {}", error);
            Err(QuoteError::amount_too_small())
        }
        QuoteResponse::Error { error } if TRADING_HALTED.is_match(&error) => {
            warn!(
                "Trading halted for {} -> {}",
                request.sell_asset.symbol, request.buy_asset.symbol
            );
            Err(QuoteError::trading_halted(
                request.sell_asset.asset_id.clone(),
                request.buy_asset.asset_id.clone(),
            ))
        }
        QuoteResponse::Error { error } => Err(QuoteError::generic(error)),
        QuoteResponse::Success(success) => Ok(success),
    }
}

fn parse_fixed_amount(field: &str, value: &str, precision: u32) -> Result<BigUint, QuoteError> {
    let amount = parse_base_unit(value)
        .map_err(|e| QuoteError::generic(format!("invalid {}: {}", field, e)))?;
    Ok(rescale(&amount, THORCHAIN_FIXED_PRECISION, precision))
}

/// Build the single-hop quote from a successful response
pub fn normalize_quote(
    success: QuoteResponseSuccess,
    request: &TradeQuoteRequest,
) -> QuoteOutcome {
    let expected_amount_out = success
        .expected_amount_out
        .as_deref()
        .ok_or_else(|| QuoteError::generic("quote response has no expected_amount_out"))?;
    let buy_precision = request.buy_asset.precision;
    let buy_amount = parse_fixed_amount("expected_amount_out", expected_amount_out, buy_precision)?;

    let recommended_minimum = success
        .recommended_min_amount_in
        .as_deref()
        .map(|value| {
            parse_fixed_amount("recommended_min_amount_in", value, request.sell_asset.precision)
        })
        .transpose()?;

    let estimated_execution_time_ms = success
        .total_swap_seconds
        .map(|seconds| {
            seconds.checked_mul(1_000).ok_or_else(|| {
                QuoteError::generic(format!("total_swap_seconds out of range: {}", seconds))
            })
        })
        .transpose()?;

    let sell_precision = request.sell_asset.precision;
    let is_streaming = request.is_streaming();
    let step = TradeQuoteStep {
        sell_asset: request.sell_asset.clone(),
        buy_asset: request.buy_asset.clone(),
        account_number: request.account_number,
        sell_amount_including_protocol_fees_base_unit: request.sell_amount_base_unit.clone(),
        rate: rate(&request.sell_amount_base_unit, sell_precision, &buy_amount, buy_precision),
        buy_amount_base_unit: buy_amount,
        allowance_contract: success.router.clone().unwrap_or_default(),
        source: if is_streaming { THORCHAIN_STREAMING_SOURCE } else { THORCHAIN_SOURCE }
            .to_string(),
        estimated_execution_time_ms,
        is_streaming,
    };

    if let Some(warning) = &success.warning {
        debug!("Quote warning: {}", warning);
    }

    let mut quote = TradeQuote::new(vec![step])?;
    quote.receive_address = request.receive_address.clone();
    quote.affiliate_bps = request.affiliate_bps;
    quote.is_streaming = is_streaming;
    quote.recommended_minimum_base_unit = recommended_minimum;
    quote.memo = success.memo;
    quote.expiry = success.expiry;
    Ok(quote)
}

/// Buy amount per unit of sell amount, in precision units, 8 decimals
fn rate(sell: &BigUint, sell_precision: u32, buy: &BigUint, buy_precision: u32) -> String {
    if sell.is_zero() {
        return "0".to_string();
    }
    let numerator = rescale(buy, buy_precision, THORCHAIN_FIXED_PRECISION + sell_precision);
    from_base_unit(&(numerator / sell), THORCHAIN_FIXED_PRECISION)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use mockito::{Matcher, Server};
    use rstest::rstest;
    use tokio::net::TcpListener;

    use super::*;
    use crate::domain::quote::fixtures::*;
    use crate::domain::quote::MockPoolFeeSource;
    use crate::shared::errors::{FeeError, QuoteErrorKind};
    use crate::shared::types::{Asset, AssetId};

    fn request() -> TradeQuoteRequest {
        TradeQuoteRequest::new(eth(), btc(), BigUint::from(10u32).pow(18))
            .with_receive_address("bc1qreceiver")
            .with_affiliate_bps(50)
    }

    fn fee_source(fee: u64) -> FeeThresholder {
        let mut source = MockPoolFeeSource::new();
        source.expect_outbound_fee().returning(move |_| Ok(BigUint::from(fee)));
        FeeThresholder::new(Arc::new(source))
    }

    fn resolver(url: &str, fees: FeeThresholder) -> QuoteResolver {
        QuoteResolver::new(ThornodeClient::new(url, Duration::from_secs(5)), fees, "ss")
    }

    #[rstest]
    #[case::not_enough_fee("not enough fee to cover transaction", QuoteErrorKind::AmountTooSmall)]
    #[case::fee_case_insensitive("Not Enough Fee", QuoteErrorKind::AmountTooSmall)]
    #[case::transaction_fee(
        "failed to simulate swap: not enough to pay transaction fee",
        QuoteErrorKind::AmountTooSmall
    )]
    #[case::fee_wins_over_halt("trading is halted: not enough fee", QuoteErrorKind::AmountTooSmall)]
    #[case::halted("trading is halted", QuoteErrorKind::TradingHalted)]
    #[case::halted_is_case_sensitive("Trading Is Halted", QuoteErrorKind::Generic)]
    #[case::generic("pool does not exist", QuoteErrorKind::Generic)]
    fn test_classify_error(#[case] message: &str, #[case] expected: QuoteErrorKind) {
        let response = QuoteResponse::Error { error: message.to_string() };
        let err = classify_response(response, &request()).unwrap_err();
        assert_eq!(err.kind, expected);
    }

    #[test]
    fn test_generic_message_passes_through() {
        let response = QuoteResponse::Error { error: "pool does not exist".to_string() };
        let err = classify_response(response, &request()).unwrap_err();
        assert_eq!(err.message, "pool does not exist");
        assert_eq!(err.details, None);
    }

    #[test]
    fn test_halted_carries_asset_ids() {
        let response = QuoteResponse::Error { error: "trading is halted".to_string() };
        let err = classify_response(response, &request()).unwrap_err();
        let details = err.details.unwrap();
        assert_eq!(details.sell_asset_id, eth().asset_id);
        assert_eq!(details.buy_asset_id, btc().asset_id);
    }

    #[test]
    fn test_normalize_rescales_amounts() {
        let success = QuoteResponseSuccess {
            expected_amount_out: Some("5000000".to_string()),
            recommended_min_amount_in: Some("2000000".to_string()),
            router: Some("0xd37bbe5744d730a1d98d8dc97c42f0ca46ad7146".to_string()),
            total_swap_seconds: Some(720),
            ..Default::default()
        };
        let quote = normalize_quote(success, &request()).unwrap();
        let hop = quote.first_hop().unwrap();

        // BTC shares the fixed precision
        assert_eq!(hop.buy_amount_base_unit, BigUint::from(5_000_000u32));
        // 0.02 ETH in wei
        assert_eq!(
            quote.recommended_minimum_base_unit,
            Some(BigUint::from(20_000_000_000_000_000u64))
        );
        assert_eq!(hop.estimated_execution_time_ms, Some(720_000));
        assert_eq!(hop.allowance_contract, "0xd37bbe5744d730a1d98d8dc97c42f0ca46ad7146");
        assert_eq!(hop.source, THORCHAIN_SOURCE);
        assert_eq!(hop.rate, "0.05");
        assert!(!quote.is_unsafe());
    }

    #[test]
    fn test_normalize_requires_expected_amount() {
        let err = normalize_quote(QuoteResponseSuccess::default(), &request()).unwrap_err();
        assert_eq!(err.kind, QuoteErrorKind::Generic);
    }

    #[test]
    fn test_oversized_swap_duration_is_generic() {
        let success = QuoteResponseSuccess {
            expected_amount_out: Some("1".to_string()),
            total_swap_seconds: Some(u64::MAX / 10),
            ..Default::default()
        };
        let err = normalize_quote(success, &request()).unwrap_err();
        assert_eq!(err.kind, QuoteErrorKind::Generic);
        assert!(err.message.contains("total_swap_seconds"));
    }

    #[test]
    fn test_bch_prefix_is_stripped() {
        let bch = Asset::new(
            "bip122:000000000000000000651ef99cb9fcbf/slip44:145".parse::<AssetId>().unwrap(),
            "BCH",
            8,
        );
        let to_bch = TradeQuoteRequest::new(eth(), bch, BigUint::from(1u32))
            .with_receive_address("bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a");
        assert_eq!(
            receive_address_for(&to_bch).as_deref(),
            Some("qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a")
        );

        // only applied when buying BCH
        let to_btc = TradeQuoteRequest::new(eth(), btc(), BigUint::from(1u32))
            .with_receive_address("bitcoincash:abc");
        assert_eq!(receive_address_for(&to_btc).as_deref(), Some("bitcoincash:abc"));
    }

    #[tokio::test]
    async fn test_resolve_sends_fixed_precision_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", QUOTE_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("amount".into(), "100000000".into()),
                Matcher::UrlEncoded("from_asset".into(), "ETH.ETH".into()),
                Matcher::UrlEncoded("to_asset".into(), "BTC.BTC".into()),
                Matcher::UrlEncoded("destination".into(), "bc1qreceiver".into()),
                Matcher::UrlEncoded("affiliate_bps".into(), "50".into()),
                Matcher::UrlEncoded("affiliate".into(), "ss".into()),
            ]))
            .with_body(r#"{"expected_amount_out": "5000000", "router": "0xrouter"}"#)
            .expect(1)
            .create_async()
            .await;

        let quote = resolver(&server.url(), fee_source(1)).resolve(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(quote.affiliate_bps, 50);
        assert_eq!(quote.first_hop().unwrap().allowance_contract, "0xrouter");
    }

    #[tokio::test]
    async fn test_resolve_applies_thresholded_fee() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", QUOTE_PATH)
            .match_query(Matcher::UrlEncoded("affiliate_bps".into(), "0".into()))
            .with_body(r#"{"expected_amount_out": "1"}"#)
            .create_async()
            .await;

        // outbound fee far above 50 bps of 1 ETH
        let fees = fee_source(10u64.pow(18));
        let quote = resolver(&server.url(), fees).resolve(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(quote.affiliate_bps, 0);
    }

    #[tokio::test]
    async fn test_resolve_streaming_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", QUOTE_PATH)
            .match_query(Matcher::UrlEncoded("streaming_interval".into(), "3".into()))
            .with_body(r#"{"expected_amount_out": "1", "total_swap_seconds": 900}"#)
            .create_async()
            .await;

        let quote = resolver(&server.url(), fee_source(1))
            .resolve(&request().with_streaming(3))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(quote.is_streaming);
        assert_eq!(quote.first_hop().unwrap().source, THORCHAIN_STREAMING_SOURCE);
    }

    #[tokio::test]
    async fn test_resolve_classifies_error_status_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", QUOTE_PATH)
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error": "not enough fee to cover transaction"}"#)
            .create_async()
            .await;

        let err = resolver(&server.url(), fee_source(1)).resolve(&request()).await.unwrap_err();
        assert_eq!(err.kind, QuoteErrorKind::AmountTooSmall);
    }

    #[tokio::test]
    async fn test_resolve_non_json_body_is_generic() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", QUOTE_PATH)
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let err = resolver(&server.url(), fee_source(1)).resolve(&request()).await.unwrap_err();
        assert_eq!(err.kind, QuoteErrorKind::Generic);
    }

    #[tokio::test]
    async fn test_resolve_timeout_is_generic() {
        // accepts connections but never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let client = ThornodeClient::new(url, Duration::from_millis(100));
        let resolver = QuoteResolver::new(client, fee_source(1), "ss");

        let err = resolver.resolve(&request()).await.unwrap_err();
        assert_eq!(err.kind, QuoteErrorKind::Generic);
        assert!(err.message.contains("timed out"));
        drop(listener);
    }

    #[tokio::test]
    async fn test_unsupported_asset_makes_no_call() {
        let mut source = MockPoolFeeSource::new();
        source.expect_outbound_fee().never();
        let fees = FeeThresholder::new(Arc::new(source));
        let arb = Asset::new("eip155:42161/slip44:60".parse::<AssetId>().unwrap(), "ETH", 18);
        let request =
            TradeQuoteRequest::new(eth(), arb, BigUint::from(1u32)).with_affiliate_bps(50);

        // nothing listens on this address
        let err = resolver("http://127.0.0.1:9", fees).resolve(&request).await.unwrap_err();
        assert_eq!(err.kind, QuoteErrorKind::Generic);
        assert!(err.message.contains("Unsupported asset"));
    }

    #[tokio::test]
    async fn test_fee_lookup_failure_blocks_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", QUOTE_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let mut source = MockPoolFeeSource::new();
        source
            .expect_outbound_fee()
            .returning(|_| Err(FeeError::FeeLookupFailed("no pool".to_string())));
        let fees = FeeThresholder::new(Arc::new(source));

        let err = resolver(&server.url(), fees).resolve(&request()).await.unwrap_err();
        mock.assert_async().await;
        assert_eq!(err.kind, QuoteErrorKind::Generic);
        assert!(err.message.contains("no pool"));
    }
}
