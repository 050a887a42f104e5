//! Affiliate fee thresholding
//!
//! The affiliate fee is collected by the protocol and paid out through the
//! same outbound mechanism as any withdrawal. A fee smaller than the outbound
//! fee of the pool can never be collected, so it is dropped entirely.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

use crate::shared::amount::BPS_DENOMINATOR;
use crate::shared::errors::FeeError;
use crate::shared::types::Asset;

/// Read-only lookup of the current outbound fee for an asset's pool
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PoolFeeSource: Send + Sync {
    /// Outbound fee expressed in base units of `asset`
    async fn outbound_fee(&self, asset: &Asset) -> Result<BigUint, FeeError>;
}

/// Decides the effective affiliate fee for a sell amount
#[derive(Clone)]
pub struct FeeThresholder {
    source: Arc<dyn PoolFeeSource>,
}

impl FeeThresholder {
    pub fn new(source: Arc<dyn PoolFeeSource>) -> Self {
        Self { source }
    }

    /// Effective fee in basis points: `requested_bps`, or 0 when the fee it
    /// implies on `sell_amount_base_unit` is below the pool's outbound fee.
    pub async fn threshold(
        &self,
        sell_asset: &Asset,
        sell_amount_base_unit: &BigUint,
        requested_bps: u32,
    ) -> Result<u32, FeeError> {
        if requested_bps == 0 {
            return Ok(0);
        }

        let outbound_fee = self.source.outbound_fee(sell_asset).await?;
        if is_below_outbound_fee(sell_amount_base_unit, requested_bps, &outbound_fee) {
            debug!(
                "Affiliate fee of {} bps on {} {} is below outbound fee {}, dropping it",
                requested_bps, sell_amount_base_unit, sell_asset.symbol, outbound_fee
            );
            return Ok(0);
        }

        Ok(requested_bps)
    }
}

/// `amount * bps / 10_000 < outbound_fee`, compared without division so that
/// fractional fees are never rounded up past the floor.
pub fn is_below_outbound_fee(amount: &BigUint, bps: u32, outbound_fee: &BigUint) -> bool {
    if outbound_fee.is_zero() {
        return false;
    }
    amount * BigUint::from(bps) < outbound_fee * BigUint::from(BPS_DENOMINATOR)
}
