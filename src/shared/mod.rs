//! Shared components - common types, errors, and amount conversion

pub mod types;
pub mod errors;
pub mod amount;
