//! Errors surfaced to callers of the signing client.

use common::error::FailureCode;

/// Transaction fields subject to local validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Account nonce.
    Nonce,
    /// Gas price.
    GasPrice,
    /// Gas limit.
    GasLimit,
    /// Transferred value.
    Value,
    /// EIP-155 chain id.
    ChainId,
    /// Data payload.
    Data,
    /// BIP32 derivation path.
    Path,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Nonce => write!(f, "nonce"),
            Field::GasPrice => write!(f, "gas price"),
            Field::GasLimit => write!(f, "gas limit"),
            Field::Value => write!(f, "value"),
            Field::ChainId => write!(f, "chain id"),
            Field::Data => write!(f, "data"),
            Field::Path => write!(f, "derivation path"),
        }
    }
}

/// Why a session ended in cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user answered a prompt negatively.
    UserDeclined,
    /// The advanced-mode-off data warning aborted the session. The
    /// warning was acknowledged, but the operational outcome is still
    /// cancellation.
    PolicyWarning,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::UserDeclined => write!(f, "declined by user"),
            CancelReason::PolicyWarning => write!(f, "aborted by advanced-mode policy"),
        }
    }
}

/// Errors that can occur while signing a transaction.
///
/// `MissingField`, `FieldOverflow` and `InvalidContractCreation` are
/// detected locally, before any message reaches the signer.
/// `Cancelled` is a normal outcome, not a malfunction.
#[derive(Debug)]
pub enum SignError {
    /// A required numeric field is absent.
    MissingField(Field),
    /// A field's canonical encoding exceeds its protocol ceiling.
    FieldOverflow(Field),
    /// Contract creation (empty recipient) with an empty data payload.
    InvalidContractCreation,
    /// The signer's behavior was inconsistent with the session state.
    Protocol(&'static str),
    /// The session ended without a signature, by user or policy choice.
    Cancelled(CancelReason),
    /// The signer explicitly rejected the request.
    Signer(FailureCode),
    /// The underlying channel failed.
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl std::fmt::Display for SignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignError::MissingField(field) => write!(f, "missing required field: {}", field),
            SignError::FieldOverflow(field) => {
                write!(f, "field exceeds protocol size limit: {}", field)
            }
            SignError::InvalidContractCreation => {
                write!(f, "contract creation requires a non-empty data payload")
            }
            SignError::Protocol(detail) => write!(f, "protocol violation: {}", detail),
            SignError::Cancelled(reason) => write!(f, "signing cancelled: {}", reason),
            SignError::Signer(code) => write!(f, "signer failure: {}", code),
            SignError::Transport(e) => write!(f, "transport error: {}", e),
        }
    }
}

impl std::error::Error for SignError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SignError::Transport(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}
