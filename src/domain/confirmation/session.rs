//! Active quote session

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::acknowledgement_gate::{
    Acknowledgement, AcknowledgementFlags, AcknowledgementGate, GateState,
};
use crate::domain::quote::{QuoteIdentity, TradeQuote};
use crate::shared::errors::{SubmissionError, SubmissionPrecondition};

/// Request for the UI to show an acknowledgement for a specific quote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcknowledgementRequest {
    pub acknowledgement: Acknowledgement,
    pub state: GateState,
    pub quote_identity: QuoteIdentity,
    pub estimated_execution_time_ms: Option<u64>,
}

/// Result of an acknowledgement action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcknowledgeOutcome {
    /// Flag recorded; the gate moved to this state
    Accepted(GateState),
    /// The acknowledgement was raised for a quote that has since been replaced
    Stale(GateState),
    /// The acknowledgement is not the one the gate is waiting on
    NotPending(GateState),
}

/// Quote committed for execution. Never changes once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedQuote {
    pub quote: TradeQuote,
    pub identity: QuoteIdentity,
    pub confirmed_at: DateTime<Utc>,
}

/// Single-writer state of one trade-input lifecycle
#[derive(Debug)]
pub struct ActiveQuoteSession {
    id: Uuid,
    quote: Option<TradeQuote>,
    identity: Option<QuoteIdentity>,
    flags: AcknowledgementFlags,
    state: GateState,
    confirmed: Option<ConfirmedQuote>,
}

impl Default for ActiveQuoteSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveQuoteSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            quote: None,
            identity: None,
            flags: AcknowledgementFlags::default(),
            state: GateState::Clear,
            confirmed: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn active_quote(&self) -> Option<&TradeQuote> {
        self.quote.as_ref()
    }

    pub fn identity(&self) -> Option<&QuoteIdentity> {
        self.identity.as_ref()
    }

    pub fn flags(&self) -> AcknowledgementFlags {
        self.flags
    }

    pub fn gate_state(&self) -> GateState {
        self.state
    }

    pub fn confirmed_quote(&self) -> Option<&ConfirmedQuote> {
        self.confirmed.as_ref()
    }

    /// Replace the active quote. A different identity clears every
    /// acknowledgement in the same step as the swap. Returns whether the
    /// identity changed.
    pub fn update_quote(&mut self, quote: Option<TradeQuote>) -> bool {
        let identity = quote.as_ref().map(TradeQuote::identity);
        let changed = identity != self.identity;

        if changed {
            debug!(
                "Session {}: active quote changed {:?} -> {:?}",
                self.id, self.identity, identity
            );
            self.flags = AcknowledgementFlags::default();
            self.state = GateState::Clear;
            self.identity = identity;
        }
        self.quote = quote;
        self.evaluate();
        changed
    }

    /// Recompute the gate from the current quote and flags
    pub fn evaluate(&mut self) -> GateState {
        self.state = AcknowledgementGate::evaluate(self.quote.as_ref(), &self.flags);
        self.state
    }

    /// Record an acknowledgement raised for `identity`
    pub fn acknowledge(
        &mut self,
        acknowledgement: Acknowledgement,
        identity: &QuoteIdentity,
    ) -> AcknowledgeOutcome {
        if self.identity.as_ref() != Some(identity) {
            info!(
                "Session {}: ignoring {:?} acknowledgement for superseded quote {}",
                self.id, acknowledgement, identity
            );
            return AcknowledgeOutcome::Stale(self.state);
        }

        if self.state.pending_acknowledgement() != Some(acknowledgement) {
            warn!(
                "Session {}: ignoring {:?} acknowledgement, gate is {:?}",
                self.id, acknowledgement, self.state
            );
            return AcknowledgeOutcome::NotPending(self.state);
        }

        self.flags.acknowledge(acknowledgement);
        AcknowledgeOutcome::Accepted(self.evaluate())
    }

    /// Acknowledgement request for the current gate position, if it awaits one
    pub fn acknowledgement_request(&self) -> Option<AcknowledgementRequest> {
        let acknowledgement = self.state.pending_acknowledgement()?;
        let quote_identity = self.identity.clone()?;
        Some(AcknowledgementRequest {
            acknowledgement,
            state: self.state,
            quote_identity,
            estimated_execution_time_ms: self
                .quote
                .as_ref()
                .and_then(TradeQuote::estimated_execution_time_ms),
        })
    }

    /// Commit the active quote. Irreversible: later quote updates never
    /// touch the confirmed quote.
    pub fn confirm(&mut self) -> Result<ConfirmedQuote, SubmissionError> {
        if self.confirmed.is_some() {
            return Err(SubmissionError::AlreadyConfirmed);
        }
        let quote = self.quote.clone().ok_or(SubmissionPrecondition::MissingQuote)?;
        let identity = self.identity.clone().ok_or(SubmissionPrecondition::MissingQuote)?;

        let confirmed = ConfirmedQuote { quote, identity, confirmed_at: Utc::now() };
        self.confirmed = Some(confirmed.clone());
        info!("Session {}: confirmed quote {}", self.id, confirmed.identity);
        Ok(confirmed)
    }
}
