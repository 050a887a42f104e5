//! Domain layer - quotes, allowances, acknowledgement gating and execution

pub mod allowance;
pub mod confirmation;
pub mod execution;
pub mod quote;
