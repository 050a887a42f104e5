//! Confirmation domain - acknowledgement gating of the active quote

mod acknowledgement_gate;
mod session;

pub use acknowledgement_gate::{
    Acknowledgement, AcknowledgementFlags, AcknowledgementGate, GateState,
    STREAMING_ACKNOWLEDGEMENT_THRESHOLD_MS,
};
pub use session::{AcknowledgeOutcome, AcknowledgementRequest, ActiveQuoteSession, ConfirmedQuote};
