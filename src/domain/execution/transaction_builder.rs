//! Allowance transaction construction

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use num_bigint::BigUint;

use super::TransactionRequest;
use crate::domain::allowance::AllowanceRequirement;
use crate::shared::errors::ApprovalError;

sol! {
    function approve(address spender, uint256 amount) external returns (bool);
}

/// Builds ERC-20 allowance transactions
pub struct TransactionBuilder;

impl TransactionBuilder {
    /// `approve(spender, amount)` on the sell asset's token contract
    pub fn build_approval(
        requirement: &AllowanceRequirement,
        from: &str,
        account_number: u32,
    ) -> Result<TransactionRequest, ApprovalError> {
        let token = requirement.asset_id.token_address().ok_or_else(|| {
            ApprovalError::ApprovalSubmissionFailed(format!(
                "{} is not a token contract asset",
                requirement.asset_id
            ))
        })?;

        let spender: Address = requirement.spender.parse().map_err(|_| {
            ApprovalError::ApprovalSubmissionFailed(format!(
                "invalid spender address: {}",
                requirement.spender
            ))
        })?;
        let amount = to_u256(&requirement.required_amount)?;
        let data = approveCall { spender, amount }.abi_encode();

        Ok(TransactionRequest {
            chain_id: requirement.asset_id.chain_id().to_string(),
            account_number,
            from: from.to_string(),
            to: token.to_string(),
            data: format!("0x{}", hex::encode(data)),
            value: "0".to_string(),
        })
    }
}

fn to_u256(value: &BigUint) -> Result<U256, ApprovalError> {
    U256::try_from_be_slice(&value.to_bytes_be()).ok_or_else(|| {
        let message = format!("allowance {} does not fit in uint256", value);
        ApprovalError::ApprovalSubmissionFailed(message)
    })
}
