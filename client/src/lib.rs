//! Host-side client for an interactive hardware-signer transaction
//! protocol.
//!
//! The signer holds the private key material; this crate implements
//! the host half of the signing dialogue: canonical field encoding,
//! demand-paced payload chunking, the confirmation state machine, and
//! EIP-155 signature finalization. The byte transport and the signer
//! firmware are external collaborators behind the [`Transport`] trait.
//!
//! # Example
//!
//! ```no_run
//! use hwsign_client::{
//!     sign_transaction, Decision, PolicyContext, TcpTransport, TransactionRequest,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = TcpTransport::connect("127.0.0.1:9999".parse()?).await?;
//! let request = TransactionRequest {
//!     path: vec![0, 0],
//!     nonce: Some(0),
//!     gas_price: Some(20_000_000_000),
//!     gas_limit: Some(21_000),
//!     to: Some([0x11; 20]),
//!     value: 1_000_000_000_000_000_000,
//!     data: vec![],
//!     chain_id: Some(1),
//! };
//! let mut approve = |_: &hwsign_client::Prompt| Decision::Affirm;
//! let sig = sign_transaction(&transport, &request, &PolicyContext::default(), &mut approve)
//!     .await?;
//! println!("v: {}", sig.v);
//! # Ok(())
//! # }
//! ```

pub mod chunk;
pub mod encode;
pub mod error;
pub mod session;
pub mod signature;
pub mod transport;
pub mod tx;

pub use common::error::FailureCode;
pub use common::message::{Prompt, Request, Response};
pub use common::types::{Bip32Path, EthAddress, RawSignature};

pub use error::{CancelReason, Field, SignError};
pub use session::{sign_transaction, Decider, Decision, SigningSession};
pub use signature::{Signature, MAX_CHAIN_ID};
pub use transport::{TcpTransport, Transport};
pub use tx::{parse_derivation_path, PolicyContext, TransactionRequest};
