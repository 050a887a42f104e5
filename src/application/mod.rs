//! Application layer - use cases and services

pub mod commands;
pub mod trade_confirmation;

pub use commands::{Cli, CommandExecutor, Commands};
pub use trade_confirmation::{
    SubmissionReceipt, SubmitInput, SubmitOutcome, TradeConfirmationController, WalletState,
};
