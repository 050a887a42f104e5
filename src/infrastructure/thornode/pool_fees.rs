use async_trait::async_trait;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

use super::client::ThornodeClient;
use super::pool_assets::{pool_asset_id, RUNE_POOL_ID};
use super::types::{NetworkResponse, PoolResponse};
use super::THORCHAIN_FIXED_PRECISION;
use crate::domain::quote::PoolFeeSource;
use crate::shared::amount::{parse_base_unit, rescale};
use crate::shared::errors::FeeError;
use crate::shared::types::Asset;

const NETWORK_PATH: &str = "/lcd/thorchain/network";
const POOL_PATH: &str = "/lcd/thorchain/pool";

/// Outbound fees derived from the node's native fee and pool depths
pub struct ThornodePoolFeeSource {
    client: ThornodeClient,
}

impl ThornodePoolFeeSource {
    pub fn new(client: ThornodeClient) -> Self {
        Self { client }
    }

    async fn native_outbound_fee(&self) -> Result<BigUint, FeeError> {
        let network: NetworkResponse = self.client.get_json(NETWORK_PATH, &[]).await?;
        parse_fee_amount("native_outbound_fee_rune", &network.native_outbound_fee_rune)
    }
}

fn parse_fee_amount(field: &str, value: &str) -> Result<BigUint, FeeError> {
    parse_base_unit(value).map_err(|e| FeeError::FeeLookupFailed(format!("{}: {}", field, e)))
}

#[async_trait]
impl PoolFeeSource for ThornodePoolFeeSource {
    async fn outbound_fee(&self, asset: &Asset) -> Result<BigUint, FeeError> {
        let pool = pool_asset_id(asset)?;
        let native_fee = self.native_outbound_fee().await?;

        if pool == RUNE_POOL_ID {
            return Ok(rescale(&native_fee, THORCHAIN_FIXED_PRECISION, asset.precision));
        }

        let path = format!("{}/{}", POOL_PATH, pool);
        let depth: PoolResponse = self.client.get_json(&path, &[]).await?;
        let balance_asset = parse_fee_amount("balance_asset", &depth.balance_asset)?;
        let balance_rune = parse_fee_amount("balance_rune", &depth.balance_rune)?;
        if balance_rune.is_zero() {
            return Err(FeeError::FeeLookupFailed(format!("pool {} has no depth", pool)));
        }

        let fee = native_fee * balance_asset / balance_rune;
        debug!("Outbound fee for {}: {} (fixed precision)", pool, fee);
        Ok(rescale(&fee, THORCHAIN_FIXED_PRECISION, asset.precision))
    }
}
