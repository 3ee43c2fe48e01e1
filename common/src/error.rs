//! Failure codes reported by the signer.
//!
//! These codes are carried in the `Failure` response frame and propagated
//! to the host verbatim. Messages are kept terse to avoid leaking
//! security-relevant information.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Failure codes for the signing dialogue.
///
/// Each variant maps to a specific code in the wire protocol.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FailureCode {
    /// The signer received a message it did not expect in its current state.
    UnexpectedMessage = 0x01,
    /// Malformed or out-of-range data in the request.
    DataError = 0x02,
    /// The operation was cancelled, by the user or by policy.
    ActionCancelled = 0x03,
    /// The signer failed while processing an otherwise valid request.
    ProcessError = 0x04,
    /// The signer holds no key material.
    NotInitialized = 0x05,
    /// Internal firmware error.
    FirmwareError = 0x09,
}

impl FailureCode {
    /// Returns the failure code as a u8.
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCode::UnexpectedMessage => write!(f, "Unexpected message"),
            FailureCode::DataError => write!(f, "Data error"),
            FailureCode::ActionCancelled => write!(f, "Action cancelled"),
            FailureCode::ProcessError => write!(f, "Process error"),
            FailureCode::NotInitialized => write!(f, "Device not initialized"),
            FailureCode::FirmwareError => write!(f, "Firmware error"),
        }
    }
}
