//! Core types shared between host and signer.
//!
//! Serialized via postcard; validation happens on each side after
//! deserialization.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Maximum BIP32 derivation path depth.
pub const MAX_BIP32_PATH_DEPTH: usize = 10;

/// Ethereum address (20 bytes).
pub type EthAddress = [u8; 20];

/// BIP32 derivation path.
///
/// Stored as a vector of u32 values where hardened indices have the
/// 0x80000000 bit set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Bip32Path(pub Vec<u32>);

impl Bip32Path {
    /// Creates a new empty path.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a path from a slice.
    pub fn from_slice(path: &[u32]) -> Self {
        Self(path.to_vec())
    }

    /// Returns the path length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the path as a slice.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

/// Raw signature as produced by the signer: a recovery bit plus the
/// fixed-length big-endian scalars.
///
/// The host is responsible for turning the recovery bit into a final
/// `v` value (legacy 27/28 or EIP-155).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RawSignature {
    /// Recovery identifier, 0 or 1.
    pub recovery_bit: u8,
    /// R component (32 bytes, big-endian).
    pub r: [u8; 32],
    /// S component (32 bytes, big-endian, low-S normalized).
    pub s: [u8; 32],
}
