//! Allowance requirement calculation

use num_bigint::BigUint;
use num_traits::Zero;

use super::{max_allowance, AllowancePath, AllowanceRequirement, AllowanceType, PermitPolicy};
use crate::domain::quote::TradeQuoteStep;

/// Determines the allowance a hop needs and whether the permit path applies
#[derive(Debug, Clone, Default)]
pub struct AllowanceCalculator {
    policy: PermitPolicy,
}

impl AllowanceCalculator {
    pub fn new(policy: PermitPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PermitPolicy {
        &self.policy
    }

    /// Permit applies only to non-native sell assets of a permit-capable
    /// source under a permit-compatible allowance type.
    pub fn is_permit_hop(&self, step: &TradeQuoteStep, allowance_type: AllowanceType) -> bool {
        self.policy.source_supports_permit(&step.source)
            && allowance_type.supports_permit()
            && !step.sell_asset.is_native()
    }

    pub fn required_allowance(
        &self,
        step: &TradeQuoteStep,
        allowance_type: AllowanceType,
    ) -> AllowanceRequirement {
        let required_amount = if step.sell_asset.is_native() {
            BigUint::zero()
        } else {
            approval_amount(&step.sell_amount_including_protocol_fees_base_unit, allowance_type)
        };

        let path_kind = if self.is_permit_hop(step, allowance_type) {
            AllowancePath::GaslessPermit
        } else {
            AllowancePath::StandardApproval
        };

        AllowanceRequirement {
            asset_id: step.sell_asset.asset_id.clone(),
            spender: step.allowance_contract.clone(),
            required_amount,
            path_kind,
        }
    }
}

/// Amount to approve for a sell amount under an allowance policy
pub fn approval_amount(sell_amount_base_unit: &BigUint, allowance_type: AllowanceType) -> BigUint {
    match allowance_type {
        AllowanceType::Exact => sell_amount_base_unit.clone(),
        AllowanceType::Unlimited => max_allowance(),
    }
}
