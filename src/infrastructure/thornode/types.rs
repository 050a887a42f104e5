//! Wire types of the protocol node

use serde::Deserialize;

/// Quote endpoint body: an error, or the quote itself
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuoteResponse {
    Error { error: String },
    Success(QuoteResponseSuccess),
}

/// Fields of a successful quote the normalizer reads. Amounts are strings in
/// fixed 8-decimal accounting units.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteResponseSuccess {
    pub expected_amount_out: Option<String>,
    pub recommended_min_amount_in: Option<String>,
    pub inbound_address: Option<String>,
    pub router: Option<String>,
    pub memo: Option<String>,
    pub expiry: Option<i64>,
    pub warning: Option<String>,
    pub total_swap_seconds: Option<u64>,
    pub streaming_swap_seconds: Option<u64>,
    pub fees: Option<QuoteFees>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteFees {
    pub asset: Option<String>,
    pub affiliate: Option<String>,
    pub outbound: Option<String>,
    pub total_bps: Option<u32>,
}

/// `/thorchain/network`
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkResponse {
    pub native_outbound_fee_rune: String,
}

/// `/thorchain/pool/{pool}`
#[derive(Debug, Clone, Deserialize)]
pub struct PoolResponse {
    pub asset: String,
    pub balance_asset: String,
    pub balance_rune: String,
    pub status: Option<String>,
}
