//! Execution domain - transaction construction, signing and hop submission

mod approval_executor;
mod transaction_builder;

pub use approval_executor::ApprovalExecutor;
pub use transaction_builder::TransactionBuilder;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::domain::allowance::AllowanceRequirement;
use crate::domain::quote::TradeQuoteStep;
use crate::shared::errors::ExecutionError;

/// Unsigned transaction handed to the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub chain_id: String,
    pub account_number: u32,
    pub from: String,
    pub to: String,
    /// 0x-prefixed calldata
    pub data: String,
    /// Native value in base units
    pub value: String,
}

/// Opaque signing capability of the connected wallet
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Sign and broadcast, returning the transaction hash
    async fn sign_and_broadcast(
        &self,
        request: &TransactionRequest,
    ) -> Result<String, ExecutionError>;
}

/// Executes a single hop once its allowance is in place
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SwapExecutor: Send + Sync {
    async fn execute_hop(
        &self,
        hop_index: usize,
        step: &TradeQuoteStep,
        allowance: &AllowanceRequirement,
        from: &str,
    ) -> Result<String, ExecutionError>;
}

/// Transaction hash produced for a hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HopTransaction {
    pub hop_index: usize,
    pub tx_hash: String,
}
