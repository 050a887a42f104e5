//! Asset id <-> pool notation (`ETH.ETH`, `ETH.USDC-0XA0B8...`)

use crate::shared::errors::BackendError;
use crate::shared::types::{chains, Asset};

/// Pool chain prefix and native pool symbol per supported chain
const POOL_CHAINS: [(&str, &str, &str); 9] = [
    (chains::BITCOIN, "BTC", "BTC"),
    (chains::BITCOIN_CASH, "BCH", "BCH"),
    (chains::LITECOIN, "LTC", "LTC"),
    (chains::DOGECOIN, "DOGE", "DOGE"),
    (chains::ETHEREUM, "ETH", "ETH"),
    (chains::AVALANCHE, "AVAX", "AVAX"),
    (chains::BNB_SMART_CHAIN, "BSC", "BNB"),
    (chains::COSMOS_HUB, "GAIA", "ATOM"),
    (chains::THORCHAIN, "THOR", "RUNE"),
];

/// Pool id of the protocol's own native asset, which has no pool
pub const RUNE_POOL_ID: &str = "THOR.RUNE";

pub fn pool_asset_id(asset: &Asset) -> Result<String, BackendError> {
    let (_, chain, native_symbol) = POOL_CHAINS
        .iter()
        .find(|(chain_id, _, _)| *chain_id == asset.chain_id())
        .ok_or_else(|| BackendError::UnsupportedAsset(asset.asset_id.to_string()))?;

    if asset.is_native() {
        return Ok(format!("{}.{}", chain, native_symbol));
    }

    let contract = asset
        .asset_id
        .token_address()
        .ok_or_else(|| BackendError::UnsupportedAsset(asset.asset_id.to_string()))?;
    Ok(format!(
        "{}.{}-{}",
        chain,
        asset.symbol.to_uppercase(),
        contract.to_uppercase()
    ))
}
