//! THORChain node adapter: quote resolution and outbound fee lookup

mod client;
mod pool_assets;
mod pool_fees;
mod quote_resolver;
mod types;

pub use client::ThornodeClient;
pub use pool_assets::{pool_asset_id, RUNE_POOL_ID};
pub use pool_fees::ThornodePoolFeeSource;
pub use quote_resolver::{
    classify_response, normalize_quote, QuoteResolver, THORCHAIN_SOURCE,
    THORCHAIN_STREAMING_SOURCE,
};
pub use types::{QuoteResponse, QuoteResponseSuccess};

/// Accounting precision of every amount the node sends or receives
pub const THORCHAIN_FIXED_PRECISION: u32 = 8;
