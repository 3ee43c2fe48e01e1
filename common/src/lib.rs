//! Wire-protocol types for the hardware-signer signing dialogue.
//!
//! This crate defines the messages exchanged between the host and the
//! signer, shared so that both sides agree on the exact vocabulary.
//! Everything here is serializable with postcard.
//!
//! # Security Note
//!
//! This crate sits on the trust boundary. The host must treat every
//! `Response` as untrusted input and validate it against the session
//! state before acting on it.

#![no_std]

extern crate alloc;

pub mod error;
pub mod message;
pub mod types;

pub use error::FailureCode;
pub use message::{Prompt, Request, Response};
pub use types::{Bip32Path, EthAddress, RawSignature};
