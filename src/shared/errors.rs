//! Error handling for the application

use serde::Serialize;
use thiserror::Error;

use crate::shared::types::AssetId;

/// Asset identifier errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetIdError {
    #[error("Malformed asset id: {0}")]
    Malformed(String),
}

/// Amount conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid decimal amount: {0}")]
    InvalidDecimal(String),

    #[error("Invalid base unit amount: {0}")]
    InvalidBaseUnit(String),
}

/// Classification of a failed quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QuoteErrorKind {
    /// The sell amount does not cover the protocol fees.
    AmountTooSmall,
    /// The protocol has halted trading for one of the pools.
    TradingHalted,
    Generic,
}

/// Assets involved in a failed quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteErrorDetails {
    pub sell_asset_id: AssetId,
    pub buy_asset_id: AssetId,
}

/// Quote failure returned to the caller as a value
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{kind:?}: {message}")]
pub struct QuoteError {
    pub kind: QuoteErrorKind,
    pub message: String,
    pub details: Option<QuoteErrorDetails>,
}

impl QuoteError {
    pub fn amount_too_small() -> Self {
        Self {
            kind: QuoteErrorKind::AmountTooSmall,
            message: "Sell amount is too small to cover the protocol fees".to_string(),
            details: None,
        }
    }

    pub fn trading_halted(sell_asset_id: AssetId, buy_asset_id: AssetId) -> Self {
        Self {
            kind: QuoteErrorKind::TradingHalted,
            message: "Trading is halted, cannot process swap".to_string(),
            details: Some(QuoteErrorDetails { sell_asset_id, buy_asset_id }),
        }
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self { kind: QuoteErrorKind::Generic, message: message.into(), details: None }
    }
}

/// Protocol backend transport errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Invalid response (status {status}): {message}")]
    InvalidResponse { status: u16, message: String },

    #[error("Unsupported asset: {0}")]
    UnsupportedAsset(String),
}

impl From<BackendError> for QuoteError {
    fn from(err: BackendError) -> Self {
        QuoteError::generic(err.to_string())
    }
}

impl From<BackendError> for FeeError {
    fn from(err: BackendError) -> Self {
        FeeError::FeeLookupFailed(err.to_string())
    }
}

/// Affiliate fee thresholding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    #[error("Outbound fee lookup failed: {0}")]
    FeeLookupFailed(String),
}

/// Errors reported by wallet signers and swap executors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Rejected by signer: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Allowance transaction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    #[error("Approval submission failed: {0}")]
    ApprovalSubmissionFailed(String),
}

impl From<ExecutionError> for ApprovalError {
    fn from(err: ExecutionError) -> Self {
        ApprovalError::ApprovalSubmissionFailed(err.to_string())
    }
}

/// Missing inputs detected while preparing a submission
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPrecondition {
    #[error("missing wallet")]
    MissingWallet,

    #[error("missing active quote")]
    MissingQuote,

    #[error("missing trade quote step")]
    MissingStep,
}

/// Single failure signal surfaced by the trade confirmation controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Submission precondition failed: {0}")]
    Precondition(#[from] SubmissionPrecondition),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error("Swap submission failed on hop {hop_index}: {source}")]
    Swap {
        hop_index: usize,
        #[source]
        source: ExecutionError,
    },

    #[error("A submission is already in flight for this session")]
    InFlight,

    #[error("The active quote has already been confirmed")]
    AlreadyConfirmed,
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<AssetIdError> for AppError {
    fn from(err: AssetIdError) -> Self {
        AppError::InvalidArgument(err.to_string())
    }
}

impl From<AmountError> for AppError {
    fn from(err: AmountError) -> Self {
        AppError::InvalidArgument(err.to_string())
    }
}
