//! The confirmation state machine and signing-session driver.
//!
//! One session drives one transaction through the signer's dialogue:
//! the opening sign request, demand-paced data chunks, confirmation
//! prompts relayed to the user-decision collaborator, and finally a
//! signature, a cancellation, or a failure.
//!
//! The state machine itself is transport-free: [`SigningSession`]
//! consumes one signer response at a time and yields the next request
//! to send, which keeps every transition unit-testable. The async
//! [`sign_transaction`] driver owns the exchange loop.

use log::debug;

use common::error::FailureCode;
use common::message::{Prompt, Request, Response};

use crate::chunk::ChunkStream;
use crate::error::{CancelReason, SignError};
use crate::signature::{finalize, Signature};
use crate::transport::Transport;
use crate::tx::{PolicyContext, TransactionRequest};

/// Answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Acknowledge the prompt.
    Affirm,
    /// Reject the prompt, aborting the session.
    Deny,
}

/// Supplies answers to the signer's confirmation prompts.
///
/// May represent a human at a terminal or an automated test double.
/// Every outstanding prompt is answered exactly once; answers are
/// never fabricated by the session itself.
pub trait Decider {
    fn decide(&mut self, prompt: &Prompt) -> Decision;
}

impl<F: FnMut(&Prompt) -> Decision> Decider for F {
    fn decide(&mut self, prompt: &Prompt) -> Decision {
        self(prompt)
    }
}

/// Session policy captured when the session opens. Toggling the
/// caller's `PolicyContext` mid-session has no effect on a running
/// session.
#[derive(Debug, Clone, Copy)]
struct PolicySnapshot {
    advanced_mode: bool,
    data_present: bool,
    chain_id: Option<u64>,
}

#[derive(Debug)]
enum State {
    /// Serving data chunks on signer demand (also the opening state
    /// when the payload fits inline).
    AwaitingChunks,
    /// Relaying confirmation prompts.
    AwaitingConfirmation,
    /// Terminal: signature produced.
    Signed(Signature),
    /// Terminal: aborted by user or policy.
    Cancelled(CancelReason),
    /// Terminal: rejected by the signer.
    Failed(FailureCode),
}

/// State for one in-flight signing request. At most one session may be
/// active per signer; the signer itself is the serializing resource.
pub struct SigningSession {
    policy: PolicySnapshot,
    chunks: ChunkStream,
    state: State,
    /// Set once the session is committed to ending in cancellation:
    /// either the host sent `Cancel`, or the advanced-mode-off data
    /// warning was acknowledged. A signature arriving afterwards is a
    /// protocol violation.
    pending_cancel: Option<CancelReason>,
}

impl SigningSession {
    /// Opens a session for a validated request, snapshotting policy.
    pub fn new(policy: &PolicyContext, request: &TransactionRequest, chunks: ChunkStream) -> Self {
        Self {
            policy: PolicySnapshot {
                advanced_mode: policy.advanced_mode,
                data_present: !request.data.is_empty(),
                chain_id: request.chain_id,
            },
            chunks,
            state: State::AwaitingChunks,
            pending_cancel: None,
        }
    }

    /// Consumes one signer response and returns the next request to
    /// send, or `None` when a terminal state was reached.
    pub fn on_response(
        &mut self,
        response: Response,
        decider: &mut dyn Decider,
    ) -> Result<Option<Request>, SignError> {
        match response {
            Response::DataRequest => self.on_data_request().map(Some),
            Response::ButtonRequest(prompt) => self.on_prompt(prompt, decider).map(Some),
            Response::Signature(raw) => {
                if self.pending_cancel.is_some() {
                    return Err(SignError::Protocol("signature after cancellation"));
                }
                // with advanced mode off, a data-carrying transaction must
                // end in cancellation after the warning, never a signature
                if self.policy.data_present && !self.policy.advanced_mode {
                    return Err(SignError::Protocol(
                        "signature for data payload with advanced mode off",
                    ));
                }
                let signature = finalize(raw, self.policy.chain_id)
                    .ok_or(SignError::Protocol("chain id exceeds recovery-id range"))?;
                self.state = State::Signed(signature);
                Ok(None)
            }
            Response::Failure(code) => {
                self.state = if code == FailureCode::ActionCancelled {
                    State::Cancelled(self.pending_cancel.unwrap_or(CancelReason::UserDeclined))
                } else {
                    State::Failed(code)
                };
                Ok(None)
            }
        }
    }

    fn on_data_request(&mut self) -> Result<Request, SignError> {
        if self.pending_cancel.is_some() {
            return Err(SignError::Protocol("data requested after cancellation"));
        }
        if !matches!(self.state, State::AwaitingChunks) {
            return Err(SignError::Protocol("data requested after confirmation began"));
        }
        match self.chunks.pull() {
            Some(chunk) => Ok(Request::DataChunk { chunk }),
            None => Err(SignError::Protocol("data requested past declared length")),
        }
    }

    fn on_prompt(
        &mut self,
        prompt: Prompt,
        decider: &mut dyn Decider,
    ) -> Result<Request, SignError> {
        if self.pending_cancel.is_some() {
            return Err(SignError::Protocol("prompt after cancellation"));
        }
        self.state = State::AwaitingConfirmation;

        match decider.decide(&prompt) {
            Decision::Deny => {
                self.pending_cancel = Some(CancelReason::UserDeclined);
                Ok(Request::Cancel)
            }
            Decision::Affirm => {
                // With advanced mode off and a data payload present, the
                // warning prompt only educates: the signer cancels the
                // operation even on an affirmative acknowledgment.
                if prompt == Prompt::Warning
                    && self.policy.data_present
                    && !self.policy.advanced_mode
                {
                    self.pending_cancel = Some(CancelReason::PolicyWarning);
                }
                Ok(Request::ButtonAck)
            }
        }
    }

    /// Resolves the session into its terminal outcome.
    fn into_outcome(self) -> Result<Signature, SignError> {
        match self.state {
            State::Signed(signature) => Ok(signature),
            State::Cancelled(reason) => Err(SignError::Cancelled(reason)),
            State::Failed(code) => Err(SignError::Signer(code)),
            State::AwaitingChunks | State::AwaitingConfirmation => {
                Err(SignError::Protocol("session ended without terminal state"))
            }
        }
    }
}

/// Signs one transaction through the signer behind `transport`.
///
/// Local validation runs first: a malformed request never opens a
/// session. Prompts are answered by `decider`. On success, the raw
/// signature is finalized per the session's chain id.
pub async fn sign_transaction<T: Transport>(
    transport: &T,
    request: &TransactionRequest,
    policy: &PolicyContext,
    decider: &mut dyn Decider,
) -> Result<Signature, SignError> {
    let (open, payload) = request.to_sign_request()?;
    let mut session = SigningSession::new(policy, request, payload.into_stream());

    debug!(
        "opening signing session: data_length={} chain_id={:?} advanced_mode={}",
        request.data.len(),
        request.chain_id,
        policy.advanced_mode
    );

    let mut outgoing = open;
    loop {
        let response = transport
            .exchange(&outgoing)
            .await
            .map_err(|e| SignError::Transport(Box::new(e)))?;
        debug!("signer response: {:?}", response);

        match session.on_response(response, decider)? {
            Some(next) => outgoing = next,
            None => return session.into_outcome(),
        }
    }
}
