//! Acknowledgement gating of trade submission
//!
//! The rules below are evaluated in order and the first unacknowledged match
//! wins. An earlier gate must be acknowledged before a later one is even
//! considered, so the user is walked through them one at a time.

use serde::{Deserialize, Serialize};

use crate::domain::quote::TradeQuote;

/// Streaming swaps expected to take at least this long need an acknowledgement
pub const STREAMING_ACKNOWLEDGEMENT_THRESHOLD_MS: u64 = 5 * 60 * 1_000;

/// Gate position for the active quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateState {
    /// No quote evaluated
    Clear,
    AwaitingUnsafeAck,
    AwaitingStreamingAck,
    AwaitingBridgeAck,
    Ready,
}

impl GateState {
    pub fn pending_acknowledgement(&self) -> Option<Acknowledgement> {
        match self {
            GateState::AwaitingUnsafeAck => Some(Acknowledgement::UnsafePrice),
            GateState::AwaitingStreamingAck => Some(Acknowledgement::Streaming),
            GateState::AwaitingBridgeAck => Some(Acknowledgement::BridgeWithdrawal),
            GateState::Clear | GateState::Ready => None,
        }
    }
}

/// User acknowledgements a quote may require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Acknowledgement {
    UnsafePrice,
    Streaming,
    BridgeWithdrawal,
}

impl Acknowledgement {
    pub fn awaiting_state(&self) -> GateState {
        match self {
            Acknowledgement::UnsafePrice => GateState::AwaitingUnsafeAck,
            Acknowledgement::Streaming => GateState::AwaitingStreamingAck,
            Acknowledgement::BridgeWithdrawal => GateState::AwaitingBridgeAck,
        }
    }
}

/// Acknowledgements given for the current quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AcknowledgementFlags {
    pub unsafe_price: bool,
    pub streaming: bool,
    pub bridge_withdrawal: bool,
}

impl AcknowledgementFlags {
    pub fn is_acknowledged(&self, acknowledgement: Acknowledgement) -> bool {
        match acknowledgement {
            Acknowledgement::UnsafePrice => self.unsafe_price,
            Acknowledgement::Streaming => self.streaming,
            Acknowledgement::BridgeWithdrawal => self.bridge_withdrawal,
        }
    }

    pub fn acknowledge(&mut self, acknowledgement: Acknowledgement) {
        match acknowledgement {
            Acknowledgement::UnsafePrice => self.unsafe_price = true,
            Acknowledgement::Streaming => self.streaming = true,
            Acknowledgement::BridgeWithdrawal => self.bridge_withdrawal = true,
        }
    }
}

struct GateRule {
    acknowledgement: Acknowledgement,
    applies: fn(&TradeQuote) -> bool,
}

fn is_long_streaming(quote: &TradeQuote) -> bool {
    quote.is_streaming
        && quote
            .estimated_execution_time_ms()
            .is_some_and(|ms| ms >= STREAMING_ACKNOWLEDGEMENT_THRESHOLD_MS)
}

/// Precedence order of the gates
const RULES: [GateRule; 3] = [
    GateRule { acknowledgement: Acknowledgement::UnsafePrice, applies: TradeQuote::is_unsafe },
    GateRule { acknowledgement: Acknowledgement::Streaming, applies: is_long_streaming },
    GateRule {
        acknowledgement: Acknowledgement::BridgeWithdrawal,
        applies: TradeQuote::is_bridge_withdrawal,
    },
];

/// Pure transition function of the acknowledgement state machine
pub struct AcknowledgementGate;

impl AcknowledgementGate {
    pub fn evaluate(quote: Option<&TradeQuote>, flags: &AcknowledgementFlags) -> GateState {
        let Some(quote) = quote else {
            return GateState::Clear;
        };

        RULES
            .iter()
            .find(|rule| !flags.is_acknowledged(rule.acknowledgement) && (rule.applies)(quote))
            .map(|rule| rule.acknowledgement.awaiting_state())
            .unwrap_or(GateState::Ready)
    }
}
