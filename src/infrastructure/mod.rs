//! Infrastructure layer - protocol backend adapters

pub mod thornode;

pub use thornode::{QuoteResolver, ThornodeClient, ThornodePoolFeeSource};
