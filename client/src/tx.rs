//! Caller-facing transaction request and policy context.
//!
//! All local validation lives here: a malformed request is rejected
//! before any message is exchanged with the signer.

use common::message::Request;
use common::types::{Bip32Path, EthAddress, MAX_BIP32_PATH_DEPTH};

use crate::chunk::{PreparedPayload, DATA_CHUNK_SIZE, INLINE_DATA_LIMIT};
use crate::encode::{
    encode_be, GAS_LIMIT_MAX_BYTES, GAS_PRICE_MAX_BYTES, NONCE_MAX_BYTES, VALUE_MAX_BYTES,
};
use crate::error::{Field, SignError};
use crate::signature::MAX_CHAIN_ID;

/// A transaction to be signed. Immutable once submitted.
///
/// `to == None` signals contract creation, which requires a non-empty
/// data payload. An absent or zero `chain_id` selects legacy
/// (non-EIP-155) signing.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    /// BIP32 derivation path of the signing key.
    pub path: Vec<u32>,
    /// Account nonce.
    pub nonce: Option<u128>,
    /// Gas price in wei.
    pub gas_price: Option<u128>,
    /// Gas limit.
    pub gas_limit: Option<u128>,
    /// Recipient address; `None` deploys a new contract.
    pub to: Option<EthAddress>,
    /// Transferred value in wei.
    pub value: u128,
    /// Data payload.
    pub data: Vec<u8>,
    /// EIP-155 chain id.
    pub chain_id: Option<u64>,
}

/// Per-call session policy, snapshotted when the session opens.
///
/// The original system kept this as a process-wide toggle applied to
/// the device; here it is an explicit value threaded into each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyContext {
    /// Whether the signer is allowed to display and confirm data
    /// payloads. With this off, any transaction carrying data ends in
    /// cancellation after a warning prompt.
    pub advanced_mode: bool,
}

impl TransactionRequest {
    /// Validates the request and builds the opening wire message plus
    /// the prepared data payload.
    ///
    /// Fails with `MissingField`, `FieldOverflow` or
    /// `InvalidContractCreation` without any signer interaction.
    pub fn to_sign_request(&self) -> Result<(Request, PreparedPayload), SignError> {
        let nonce = self.require(Field::Nonce, self.nonce, NONCE_MAX_BYTES)?;
        let gas_price = self.require(Field::GasPrice, self.gas_price, GAS_PRICE_MAX_BYTES)?;
        let gas_limit = self.require(Field::GasLimit, self.gas_limit, GAS_LIMIT_MAX_BYTES)?;
        let value =
            encode_be(self.value, VALUE_MAX_BYTES).ok_or(SignError::FieldOverflow(Field::Value))?;

        if self.to.is_none() && self.data.is_empty() {
            return Err(SignError::InvalidContractCreation);
        }
        if self.path.len() > MAX_BIP32_PATH_DEPTH {
            return Err(SignError::FieldOverflow(Field::Path));
        }
        if self.chain_id.is_some_and(|id| id > MAX_CHAIN_ID) {
            return Err(SignError::FieldOverflow(Field::ChainId));
        }

        let payload = PreparedPayload::prepare(&self.data, INLINE_DATA_LIMIT, DATA_CHUNK_SIZE);
        let data_length = declared_data_length(payload.total_length())?;

        let request = Request::SignTx {
            path: Bip32Path::from_slice(&self.path),
            nonce,
            gas_price,
            gas_limit,
            to: self.to.map(|a| a.to_vec()).unwrap_or_default(),
            value,
            data_initial_chunk: payload.initial_chunk().to_vec(),
            data_length,
            chain_id: self.chain_id,
        };

        Ok((request, payload))
    }

    fn require(
        &self,
        field: Field,
        value: Option<u128>,
        max_bytes: usize,
    ) -> Result<Vec<u8>, SignError> {
        let value = value.ok_or(SignError::MissingField(field))?;
        encode_be(value, max_bytes).ok_or(SignError::FieldOverflow(field))
    }
}

/// The wire format declares the data length as a u32; anything larger
/// cannot be streamed and is rejected locally.
fn declared_data_length(len: usize) -> Result<u32, SignError> {
    u32::try_from(len).map_err(|_| SignError::FieldOverflow(Field::Data))
}

/// Parses a derivation path string like `m/44'/60'/0'/0/0` into u32
/// components with the hardened flag set.
pub fn parse_derivation_path(path: &str) -> Result<Vec<u32>, String> {
    let mut components = path.split('/').collect::<Vec<&str>>();

    if let Some(first) = components.first() {
        if *first == "m" {
            components.remove(0);
        }
    }

    let mut indices = Vec::new();
    for comp in components {
        let hardened = comp.ends_with('\'') || comp.ends_with('h');
        let raw_index = if hardened {
            &comp[..comp.len() - 1]
        } else {
            comp
        };

        let index: u32 = raw_index
            .parse()
            .map_err(|e| format!("Invalid index '{}': {}", comp, e))?;

        let child_number = if hardened {
            0x80000000u32
                .checked_add(index)
                .ok_or_else(|| format!("Index overflow for '{}'", comp))?
        } else {
            index
        };

        indices.push(child_number);
    }

    Ok(indices)
}
