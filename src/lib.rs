//! Swapflow - cross-chain swap quoting, allowance checks and trade confirmation
//! Built with Domain-Driven Design principles

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{SubmitOutcome, TradeConfirmationController};
pub use domain::allowance::AllowanceCalculator;
pub use domain::confirmation::{AcknowledgementGate, ActiveQuoteSession};
pub use domain::execution::ApprovalExecutor;
pub use domain::quote::{FeeThresholder, TradeQuote, TradeQuoteRequest};
pub use infrastructure::QuoteResolver;
