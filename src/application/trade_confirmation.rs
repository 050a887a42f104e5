//! Trade confirmation controller
//!
//! Owns the active quote session of one trade-input lifecycle and drives it
//! from quote arrival through acknowledgements to approval and swap
//! submission. Every call is serialized through the session lock, and at
//! most one submission runs at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::domain::allowance::AllowanceType;
use crate::domain::confirmation::{
    AcknowledgeOutcome, AcknowledgementRequest, ActiveQuoteSession, ConfirmedQuote, GateState,
};
use crate::domain::execution::{ApprovalExecutor, HopTransaction, SwapExecutor, WalletSigner};
use crate::domain::quote::{QuoteIdentity, TradeQuote};
use crate::shared::errors::{SubmissionError, SubmissionPrecondition};

/// Connected wallet as seen by the controller
#[derive(Clone, Default)]
pub struct WalletState {
    pub is_connected: bool,
    /// Demo wallets can browse quotes but never trade
    pub is_demo: bool,
    pub signer: Option<Arc<dyn WalletSigner>>,
    pub address: Option<String>,
}

impl WalletState {
    pub fn connected(signer: Arc<dyn WalletSigner>, address: impl Into<String>) -> Self {
        Self {
            is_connected: true,
            is_demo: false,
            signer: Some(signer),
            address: Some(address.into()),
        }
    }

    fn can_trade(&self) -> bool {
        self.is_connected && !self.is_demo
    }
}

/// Everything a submission needs besides the session
#[derive(Clone, Default)]
pub struct SubmitInput {
    pub wallet: WalletState,
    pub allowance_type: AllowanceType,
}

/// Transactions sent for a confirmed quote, in hop order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    pub quote_identity: QuoteIdentity,
    pub approvals: Vec<HopTransaction>,
    pub swaps: Vec<HopTransaction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No usable wallet; nothing was attempted
    NeedsWalletConnect,
    /// The gate is waiting on the user
    AcknowledgementRequired(AcknowledgementRequest),
    /// The acknowledgement no longer matches the gate: its quote was replaced
    /// or the gate is waiting on a different acknowledgement
    StaleAcknowledgement(GateState),
    Submitted(SubmissionReceipt),
    Failed(SubmissionError),
}

/// Holds the in-flight flag for the duration of a submission
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct TradeConfirmationController {
    session: RwLock<ActiveQuoteSession>,
    in_flight: AtomicBool,
    approval_executor: ApprovalExecutor,
    swap_executor: Arc<dyn SwapExecutor>,
}

impl TradeConfirmationController {
    pub fn new(approval_executor: ApprovalExecutor, swap_executor: Arc<dyn SwapExecutor>) -> Self {
        Self {
            session: RwLock::new(ActiveQuoteSession::new()),
            in_flight: AtomicBool::new(false),
            approval_executor,
            swap_executor,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Replace the active quote and return the resulting gate state
    pub async fn update_quote(&self, quote: Option<TradeQuote>) -> GateState {
        let mut session = self.session.write().await;
        session.update_quote(quote);
        session.gate_state()
    }

    pub async fn gate_state(&self) -> GateState {
        self.session.read().await.gate_state()
    }

    pub async fn acknowledgement_request(&self) -> Option<AcknowledgementRequest> {
        self.session.read().await.acknowledgement_request()
    }

    pub async fn confirmed_quote(&self) -> Option<ConfirmedQuote> {
        self.session.read().await.confirmed_quote().cloned()
    }

    /// Drop the current session and begin a new trade-input lifecycle
    pub async fn start_new_session(&self) {
        let mut session = self.session.write().await;
        debug!("Closing session {}", session.id());
        *session = ActiveQuoteSession::new();
    }

    /// Record the user's answer to `request` and resume the submission
    pub async fn acknowledge(
        &self,
        request: &AcknowledgementRequest,
        input: &SubmitInput,
    ) -> SubmitOutcome {
        let outcome = self
            .session
            .write()
            .await
            .acknowledge(request.acknowledgement, &request.quote_identity);

        match outcome {
            AcknowledgeOutcome::Accepted(state) => {
                debug!("{:?} acknowledged, gate now {:?}", request.acknowledgement, state);
                self.submit(input).await
            }
            AcknowledgeOutcome::Stale(state) | AcknowledgeOutcome::NotPending(state) => {
                SubmitOutcome::StaleAcknowledgement(state)
            }
        }
    }

    pub async fn submit(&self, input: &SubmitInput) -> SubmitOutcome {
        if !input.wallet.can_trade() {
            info!("Submission requires a connected wallet");
            return SubmitOutcome::NeedsWalletConnect;
        }

        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            warn!("Submission rejected, another one is in flight");
            return SubmitOutcome::Failed(SubmissionError::InFlight);
        };

        match self.prepare_and_execute(input).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("❌ Submission failed: {}", e);
                SubmitOutcome::Failed(e)
            }
        }
    }

    async fn prepare_and_execute(
        &self,
        input: &SubmitInput,
    ) -> Result<SubmitOutcome, SubmissionError> {
        let signer = input
            .wallet
            .signer
            .clone()
            .ok_or(SubmissionPrecondition::MissingWallet)?;
        let from = input
            .wallet
            .address
            .as_deref()
            .ok_or(SubmissionPrecondition::MissingWallet)?;

        let confirmed = {
            let mut session = self.session.write().await;
            let state = session.evaluate();
            let quote = session.active_quote().ok_or(SubmissionPrecondition::MissingQuote)?;
            quote.first_hop().ok_or(SubmissionPrecondition::MissingStep)?;

            if state != GateState::Ready {
                let request = session
                    .acknowledgement_request()
                    .ok_or(SubmissionPrecondition::MissingQuote)?;
                info!("Awaiting {:?} acknowledgement", request.acknowledgement);
                return Ok(SubmitOutcome::AcknowledgementRequired(request));
            }

            session.confirm()?
        };

        let receipt = self
            .execute(&confirmed, signer.as_ref(), from, input.allowance_type)
            .await?;
        info!(
            "✅ Submitted quote {} ({} approvals, {} swaps)",
            receipt.quote_identity,
            receipt.approvals.len(),
            receipt.swaps.len()
        );
        Ok(SubmitOutcome::Submitted(receipt))
    }

    /// Hops run strictly in order, each approval resolving before its swap
    async fn execute(
        &self,
        confirmed: &ConfirmedQuote,
        signer: &dyn WalletSigner,
        from: &str,
        allowance_type: AllowanceType,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let mut approvals = Vec::new();
        let mut swaps = Vec::new();

        for (hop_index, step) in confirmed.quote.steps().iter().enumerate() {
            let requirement = self
                .approval_executor
                .calculator()
                .required_allowance(step, allowance_type);

            if requirement.requires_approval_transaction() {
                let tx_hash = self
                    .approval_executor
                    .approve(step, signer, allowance_type, from)
                    .await?;
                approvals.push(HopTransaction { hop_index, tx_hash });
            }

            let tx_hash = self
                .swap_executor
                .execute_hop(hop_index, step, &requirement, from)
                .await
                .map_err(|source| SubmissionError::Swap { hop_index, source })?;
            swaps.push(HopTransaction { hop_index, tx_hash });
        }

        Ok(SubmissionReceipt { quote_identity: confirmed.identity.clone(), approvals, swaps })
    }
}
