//! Request and Response message types for the signing dialogue.
//!
//! These enums define the full set of messages exchanged between the
//! host and the signer during one signing session. Messages are
//! serialized with postcard; the transport's framing is out of scope.
//!
//! The dialogue is strictly half-duplex: the host sends one `Request`
//! and waits for exactly one `Response` before sending anything else.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::error::FailureCode;
use crate::types::{Bip32Path, RawSignature};

/// Request messages from host to signer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Opens a signing session for one transaction.
    ///
    /// Numeric fields are canonical big-endian byte strings: minimal
    /// length, no leading zero byte, empty string for zero. `to` is
    /// exactly 20 bytes, or empty for contract creation. The data
    /// payload is carried as an initial chunk plus the declared total
    /// length; the signer pulls the remainder with `DataRequest`.
    SignTx {
        /// BIP32 derivation path of the signing key.
        path: Bip32Path,
        /// Account nonce, canonical big-endian.
        nonce: Vec<u8>,
        /// Gas price, canonical big-endian.
        gas_price: Vec<u8>,
        /// Gas limit, canonical big-endian.
        gas_limit: Vec<u8>,
        /// Recipient address, 20 bytes or empty.
        to: Vec<u8>,
        /// Transferred value in wei, canonical big-endian.
        value: Vec<u8>,
        /// First chunk of the data payload (up to the inline limit).
        data_initial_chunk: Vec<u8>,
        /// Total data payload length in bytes.
        data_length: u32,
        /// EIP-155 chain id; absent or zero selects legacy signing.
        chain_id: Option<u64>,
    },

    /// Next chunk of the data payload, sent only after a `DataRequest`.
    DataChunk {
        /// Payload bytes, in strict forward order.
        chunk: Vec<u8>,
    },

    /// Affirmative answer to the outstanding prompt.
    ButtonAck,

    /// Negative answer to the outstanding prompt; aborts the session.
    Cancel,
}

/// Response messages from signer to host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The signer is ready for the next data chunk.
    DataRequest,

    /// The signer is showing a prompt and waits for an acknowledgment.
    ButtonRequest(Prompt),

    /// Terminal: the transaction was signed.
    Signature(RawSignature),

    /// Terminal: the signer rejected or aborted the request.
    Failure(FailureCode),
}

/// Prompt kinds the signer may display.
///
/// A closed but extensible set: prompts this host does not special-case
/// arrive as `Other` and are still relayed to the user for an answer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Confirm recipient and value.
    ConfirmOutput,
    /// Confirm the data payload.
    ConfirmData,
    /// Policy warning. With advanced mode off and a data payload
    /// present, acknowledging this prompt still cancels the session.
    Warning,
    /// Prompt code unknown to this host.
    Other(u8),
}
