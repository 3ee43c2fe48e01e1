//! Final signature assembly.
//!
//! The signer returns a recovery bit plus the raw scalars; the host is
//! responsible for encoding the recovery identifier. For transactions
//! bound to a chain, EIP-155 applies: `v = recovery_bit + chain_id * 2
//! + 35`, which ties the signature to that chain and prevents
//! cross-chain replay. Without a chain id, `v = 27 + recovery_bit`.

use common::types::RawSignature;

/// A finalized ECDSA signature, ready for transaction assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Recovery identifier: 27/28 legacy, or EIP-155 encoded.
    pub v: u64,
    /// R component (32 bytes, big-endian).
    pub r: [u8; 32],
    /// S component (32 bytes, big-endian).
    pub s: [u8; 32],
}

/// Largest chain id whose EIP-155 `v` fits in a `u64` for either
/// recovery bit. Request validation rejects larger ids up front.
pub const MAX_CHAIN_ID: u64 = (u64::MAX - 36) / 2;

/// Applies the chain-aware recovery-identifier encoding to a raw
/// signature. A `chain_id` of `None` or zero selects legacy encoding.
/// `r` and `s` pass through unchanged.
///
/// Returns `None` when the encoded `v` does not fit in a `u64`. The
/// arithmetic runs in `u128` so no chain id can wrap.
pub fn finalize(raw: RawSignature, chain_id: Option<u64>) -> Option<Signature> {
    let recovery_bit = (raw.recovery_bit & 1) as u128;
    let v = match chain_id {
        None | Some(0) => 27 + recovery_bit,
        Some(id) => recovery_bit + u128::from(id) * 2 + 35,
    };
    Some(Signature {
        v: u64::try_from(v).ok()?,
        r: raw.r,
        s: raw.s,
    })
}
