//! Allowance-raising transaction submission

use std::time::Duration;

use tokio::time::timeout;
use tracing::{error, info};

use super::{TransactionBuilder, WalletSigner};
use crate::domain::allowance::{AllowanceCalculator, AllowanceType};
use crate::domain::quote::TradeQuoteStep;
use crate::shared::errors::ApprovalError;

/// Submits the on-chain approval a hop requires
#[derive(Debug, Clone)]
pub struct ApprovalExecutor {
    calculator: AllowanceCalculator,
    timeout: Duration,
}

impl ApprovalExecutor {
    pub fn new(calculator: AllowanceCalculator, timeout: Duration) -> Self {
        Self { calculator, timeout }
    }

    pub fn calculator(&self) -> &AllowanceCalculator {
        &self.calculator
    }

    /// Approve the step's allowance contract to spend its sell amount and
    /// return the approval transaction hash.
    pub async fn approve(
        &self,
        step: &TradeQuoteStep,
        wallet: &dyn WalletSigner,
        allowance_type: AllowanceType,
        from: &str,
    ) -> Result<String, ApprovalError> {
        let requirement = self.calculator.required_allowance(step, allowance_type);
        if step.sell_asset.is_native() {
            return Err(ApprovalError::ApprovalSubmissionFailed(format!(
                "{} is native and has no allowance",
                step.sell_asset.symbol
            )));
        }

        let request = TransactionBuilder::build_approval(&requirement, from, step.account_number)?;

        info!(
            "Submitting {:?} approval of {} {} for spender {}",
            allowance_type, requirement.required_amount, step.sell_asset.symbol, requirement.spender
        );

        let tx_hash = match timeout(self.timeout, wallet.sign_and_broadcast(&request)).await {
            Ok(Ok(tx_hash)) => tx_hash,
            Ok(Err(e)) => {
                error!("Approval broadcast failed: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                error!("Approval timed out after {:?}", self.timeout);
                return Err(ApprovalError::ApprovalSubmissionFailed(format!(
                    "approval timed out after {:?}",
                    self.timeout
                )));
            }
        };

        info!("Approval transaction sent: {}", tx_hash);
        Ok(tx_hash)
    }
}
