//! Allowance domain - how much a spender must be allowed to move before a hop executes

mod allowance_calculator;

pub use allowance_calculator::AllowanceCalculator;

use std::str::FromStr;

use alloy_primitives::U256;
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::shared::amount::base_units;
use crate::shared::types::AssetId;

/// Protocol source that signs Permit2 messages instead of relying on approvals
pub const ZRX_PERMIT2_SOURCE_ID: &str = "0x Permit2";

/// Approval amount policy chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowanceType {
    #[default]
    Exact,
    Unlimited,
}

impl AllowanceType {
    /// Permit signatures are scoped to the traded amount.
    pub fn supports_permit(&self) -> bool {
        matches!(self, AllowanceType::Exact)
    }
}

impl FromStr for AllowanceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(AllowanceType::Exact),
            "unlimited" | "infinite" => Ok(AllowanceType::Unlimited),
            _ => Err(format!("Unknown allowance type: {}", s)),
        }
    }
}

/// How the allowance is granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AllowancePath {
    /// On-chain `approve` transaction
    StandardApproval,
    /// Off-chain signed permit, no approval transaction
    GaslessPermit,
}

/// Gasless permit eligibility, supplied explicitly rather than read from a global toggle
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermitPolicy {
    pub enabled: bool,
    pub sources: Vec<String>,
}

impl PermitPolicy {
    pub fn new(enabled: bool, sources: Vec<String>) -> Self {
        Self { enabled, sources }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn source_supports_permit(&self, source: &str) -> bool {
        self.enabled && self.sources.iter().any(|s| s == source)
    }
}

/// Allowance a hop needs before it can execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllowanceRequirement {
    pub asset_id: AssetId,
    pub spender: String,
    #[serde(with = "base_units")]
    pub required_amount: BigUint,
    pub path_kind: AllowancePath,
}

impl AllowanceRequirement {
    /// An on-chain approval must be mined before the swap is submitted.
    pub fn requires_approval_transaction(&self) -> bool {
        self.path_kind == AllowancePath::StandardApproval && !self.required_amount.is_zero()
    }
}

/// `2^256 - 1`, the largest ERC-20 allowance
pub fn max_allowance() -> BigUint {
    BigUint::from_bytes_be(&U256::MAX.to_be_bytes::<32>())
}
