//! End-to-end signing scenarios against a scripted mock signer.
//!
//! The mock implements the signer's observable side of the dialogue:
//! it pulls data chunks on demand, emits the prompt sequence for each
//! recognized scenario, and returns a configured raw signature or
//! failure. Scenario data follows the original device test vectors.

use std::collections::VecDeque;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use hex_literal::hex;

use hwsign_client::{
    sign_transaction, CancelReason, Decision, FailureCode, PolicyContext, Prompt, RawSignature,
    Request, Response, SignError, TransactionRequest, Transport,
};

#[derive(Debug)]
enum Phase {
    Idle,
    Streaming { expected: usize, received: Vec<u8> },
    Confirming { current: Prompt, queue: VecDeque<Prompt> },
    Done,
}

struct MockState {
    phase: Phase,
    data_payload: Vec<u8>,
}

/// In-process signer double.
struct MockSigner {
    /// Device-side policy: whether data payloads may be displayed.
    advanced_mode: bool,
    recovery_bit: u8,
    r: [u8; 32],
    s: [u8; 32],
    /// Respond to the opening request with this failure.
    fail_with: Option<FailureCode>,
    /// Misbehave: request one chunk past the declared length.
    greedy: bool,
    exchanges: AtomicU64,
    state: Mutex<MockState>,
}

impl MockSigner {
    fn new(advanced_mode: bool, recovery_bit: u8) -> Self {
        Self {
            advanced_mode,
            recovery_bit,
            r: hex!("9b61192a161d056c66cfbbd331edb2d783a0193bd4f65f49ee965f791d898f72"),
            s: hex!("49c0bbe35131592c6ed5c871ac457feeb16a1493f64237387fab9b83c1a202f7"),
            fail_with: None,
            greedy: false,
            exchanges: AtomicU64::new(0),
            state: Mutex::new(MockState {
                phase: Phase::Idle,
                data_payload: Vec::new(),
            }),
        }
    }

    fn total_exchanges(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }

    /// The data payload as reassembled by the device.
    fn received_payload(&self) -> Vec<u8> {
        self.state.lock().unwrap().data_payload.clone()
    }

    fn prompt_queue(&self, data_present: bool) -> VecDeque<Prompt> {
        let mut queue = VecDeque::from([Prompt::ConfirmOutput]);
        if data_present {
            if self.advanced_mode {
                queue.push_back(Prompt::ConfirmData);
            } else {
                // the device educates, then cancels on acknowledgment
                queue.push_back(Prompt::Warning);
            }
        }
        queue
    }

    fn advance(&self, state: &mut MockState) -> Response {
        let (expected, received_len) = match &state.phase {
            Phase::Streaming { expected, received } => (*expected, received.len()),
            _ => return Response::Failure(FailureCode::UnexpectedMessage),
        };

        if received_len < expected {
            return Response::DataRequest;
        }
        if self.greedy {
            state.phase = Phase::Streaming {
                expected: usize::MAX,
                received: Vec::new(),
            };
            return Response::DataRequest;
        }

        if let Phase::Streaming { received, .. } = std::mem::replace(&mut state.phase, Phase::Done)
        {
            state.data_payload = received;
        }
        let queue = self.prompt_queue(expected > 0);
        self.next_prompt(state, queue)
    }

    fn next_prompt(&self, state: &mut MockState, mut queue: VecDeque<Prompt>) -> Response {
        match queue.pop_front() {
            Some(prompt) => {
                state.phase = Phase::Confirming {
                    current: prompt,
                    queue,
                };
                Response::ButtonRequest(prompt)
            }
            None => {
                state.phase = Phase::Done;
                Response::Signature(RawSignature {
                    recovery_bit: self.recovery_bit,
                    r: self.r,
                    s: self.s,
                })
            }
        }
    }
}

#[async_trait]
impl Transport for MockSigner {
    type Error = Infallible;

    async fn exchange(&self, request: &Request) -> Result<Response, Infallible> {
        self.exchanges.fetch_add(1, Ordering::Relaxed);
        let mut state = self.state.lock().unwrap();

        let response = match request {
            Request::SignTx {
                data_initial_chunk,
                data_length,
                ..
            } => {
                if let Some(code) = self.fail_with {
                    state.phase = Phase::Done;
                    Response::Failure(code)
                } else {
                    state.phase = Phase::Streaming {
                        expected: *data_length as usize,
                        received: data_initial_chunk.clone(),
                    };
                    self.advance(&mut state)
                }
            }
            Request::DataChunk { chunk } => {
                if let Phase::Streaming { received, .. } = &mut state.phase {
                    received.extend_from_slice(chunk);
                }
                self.advance(&mut state)
            }
            Request::ButtonAck => match std::mem::replace(&mut state.phase, Phase::Done) {
                Phase::Confirming { current, queue } => {
                    // a Warning acknowledgment with advanced mode off still
                    // cancels the operation
                    if current == Prompt::Warning && !self.advanced_mode {
                        Response::Failure(FailureCode::ActionCancelled)
                    } else {
                        self.next_prompt(&mut state, queue)
                    }
                }
                _ => Response::Failure(FailureCode::UnexpectedMessage),
            },
            Request::Cancel => {
                state.phase = Phase::Done;
                Response::Failure(FailureCode::ActionCancelled)
            }
        };

        Ok(response)
    }
}

fn base_request() -> TransactionRequest {
    TransactionRequest {
        path: vec![0, 0],
        nonce: Some(0),
        gas_price: Some(20),
        gas_limit: Some(20),
        to: Some(hex!("1d1c328764a41bda0492b66baa30c4a339ff85ef")),
        value: 10,
        data: vec![],
        chain_id: None,
    }
}

fn advanced() -> PolicyContext {
    PolicyContext {
        advanced_mode: true,
    }
}

// ============================================================================
// Legacy (non-EIP-155) scenarios
// ============================================================================

#[tokio::test]
async fn test_sign_nodata_v27() {
    let signer = MockSigner::new(false, 0);
    let mut seen = Vec::new();
    let mut decider = |p: &Prompt| {
        seen.push(*p);
        Decision::Affirm
    };

    let sig = sign_transaction(&signer, &base_request(), &PolicyContext::default(), &mut decider)
        .await
        .unwrap();

    assert_eq!(sig.v, 27);
    assert_eq!(
        sig.r,
        hex!("9b61192a161d056c66cfbbd331edb2d783a0193bd4f65f49ee965f791d898f72")
    );
    assert_eq!(
        sig.s,
        hex!("49c0bbe35131592c6ed5c871ac457feeb16a1493f64237387fab9b83c1a202f7")
    );
    assert_eq!(seen, vec![Prompt::ConfirmOutput]);
}

#[tokio::test]
async fn test_sign_nodata_v28_recovery_bit_flips() {
    let signer = MockSigner::new(false, 1);
    let mut request = base_request();
    request.nonce = Some(123456);
    request.gas_price = Some(20000);
    request.gas_limit = Some(20000);
    request.value = 12345678901234567890;

    let mut approve = |_: &Prompt| Decision::Affirm;
    let sig = sign_transaction(&signer, &request, &PolicyContext::default(), &mut approve)
        .await
        .unwrap();

    assert_eq!(sig.v, 28);
}

// ============================================================================
// EIP-155 scenarios (chain id 3)
// ============================================================================

#[tokio::test]
async fn test_sign_eip155_v41() {
    let signer = MockSigner::new(false, 0);
    let mut request = base_request();
    request.path = vec![0x8000002C, 0x80000001, 0x80000000, 0, 0];
    request.gas_price = Some(20_000_000_000);
    request.gas_limit = Some(21_000);
    request.to = Some(hex!("8ea7a3fccc211ed48b763b4164884ddbcf3b0a98"));
    request.value = 100_000_000_000_000_000;
    request.chain_id = Some(3);

    let mut approve = |_: &Prompt| Decision::Affirm;
    let sig = sign_transaction(&signer, &request, &PolicyContext::default(), &mut approve)
        .await
        .unwrap();

    // recovery_bit = 0 under chain id 3: 0 + 2*3 + 35
    assert_eq!(sig.v, 41);
}

#[tokio::test]
async fn test_sign_eip155_v42() {
    let signer = MockSigner::new(false, 1);
    let mut request = base_request();
    request.nonce = Some(1);
    request.gas_price = Some(20_000_000_000);
    request.gas_limit = Some(21_000);
    request.to = Some(hex!("8ea7a3fccc211ed48b763b4164884ddbcf3b0a98"));
    request.value = 100_000_000_000_000_000;
    request.chain_id = Some(3);

    let mut approve = |_: &Prompt| Decision::Affirm;
    let sig = sign_transaction(&signer, &request, &PolicyContext::default(), &mut approve)
        .await
        .unwrap();

    assert_eq!(sig.v, 42);
}

// ============================================================================
// Data payload and advanced-mode policy
// ============================================================================

#[tokio::test]
async fn test_data_with_advanced_mode_off_cancels() {
    let signer = MockSigner::new(false, 0);
    let mut request = base_request();
    request.data = b"abcdefghijklmnop".repeat(64); // 1024 bytes, fully inline

    let mut seen = Vec::new();
    let mut decider = |p: &Prompt| {
        seen.push(*p);
        Decision::Affirm
    };

    let err = sign_transaction(
        &signer,
        &request,
        &PolicyContext {
            advanced_mode: false,
        },
        &mut decider,
    )
    .await
    .unwrap_err();

    // every prompt was acknowledged, the outcome is still cancellation
    assert!(matches!(
        err,
        SignError::Cancelled(CancelReason::PolicyWarning)
    ));
    assert_eq!(seen, vec![Prompt::ConfirmOutput, Prompt::Warning]);
}

#[tokio::test]
async fn test_data_with_advanced_mode_on_signs() {
    let signer = MockSigner::new(true, 1);
    let mut request = base_request();
    request.data = b"abcdefghijklmnop".repeat(16); // 256 bytes

    let mut seen = Vec::new();
    let mut decider = |p: &Prompt| {
        seen.push(*p);
        Decision::Affirm
    };

    let sig = sign_transaction(&signer, &request, &advanced(), &mut decider)
        .await
        .unwrap();

    assert_eq!(sig.v, 28);
    assert_eq!(seen, vec![Prompt::ConfirmOutput, Prompt::ConfirmData]);
    assert_eq!(signer.received_payload(), request.data);
}

#[tokio::test]
async fn test_large_payload_streams_in_order() {
    let signer = MockSigner::new(true, 0);
    let mut request = base_request();
    request.data = b"ABCDEFGHIJKLMNOP".repeat(256); // 4096 bytes
    request.data.extend_from_slice(b"!!!");

    let mut approve = |_: &Prompt| Decision::Affirm;
    sign_transaction(&signer, &request, &advanced(), &mut approve)
        .await
        .unwrap();

    // 1024 inline + three full chunks + a 3-byte tail
    assert_eq!(signer.received_payload(), request.data);
    // sign request, 4 chunk deliveries, 2 prompt acks
    assert_eq!(signer.total_exchanges(), 7);
}

// ============================================================================
// Local rejection: no session is opened for a malformed request
// ============================================================================

#[tokio::test]
async fn test_contract_creation_without_data_rejected_locally() {
    let signer = MockSigner::new(true, 0);
    let mut request = base_request();
    request.to = None;

    let mut approve = |_: &Prompt| Decision::Affirm;
    let err = sign_transaction(&signer, &request, &advanced(), &mut approve)
        .await
        .unwrap_err();

    assert!(matches!(err, SignError::InvalidContractCreation));
    assert_eq!(signer.total_exchanges(), 0);
}

#[tokio::test]
async fn test_missing_fields_rejected_locally() {
    let signer = MockSigner::new(true, 0);
    let mut approve = |_: &Prompt| Decision::Affirm;

    let strips: [fn(&mut TransactionRequest); 3] = [
        |r| r.nonce = None,
        |r| r.gas_price = None,
        |r| r.gas_limit = None,
    ];
    for strip in strips {
        let mut request = base_request();
        strip(&mut request);
        let err = sign_transaction(&signer, &request, &advanced(), &mut approve)
            .await
            .unwrap_err();
        assert!(matches!(err, SignError::MissingField(_)));
    }
    assert_eq!(signer.total_exchanges(), 0);
}

#[tokio::test]
async fn test_gas_overflow_rejected_locally() {
    let signer = MockSigner::new(true, 0);
    let mut request = base_request();
    request.gas_price = Some(0xffffffffffffffffffffffffffffffff);

    let mut approve = |_: &Prompt| Decision::Affirm;
    let err = sign_transaction(&signer, &request, &advanced(), &mut approve)
        .await
        .unwrap_err();

    assert!(matches!(err, SignError::FieldOverflow(_)));
    assert_eq!(signer.total_exchanges(), 0);
}

// ============================================================================
// Cancellation and failure paths
// ============================================================================

#[tokio::test]
async fn test_user_denial_cancels() {
    let signer = MockSigner::new(true, 0);

    let mut deny = |_: &Prompt| Decision::Deny;
    let err = sign_transaction(&signer, &base_request(), &advanced(), &mut deny)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SignError::Cancelled(CancelReason::UserDeclined)
    ));
}

#[tokio::test]
async fn test_signer_failure_propagated() {
    let mut signer = MockSigner::new(true, 0);
    signer.fail_with = Some(FailureCode::NotInitialized);

    let mut approve = |_: &Prompt| Decision::Affirm;
    let err = sign_transaction(&signer, &base_request(), &advanced(), &mut approve)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SignError::Signer(FailureCode::NotInitialized)
    ));
}

#[tokio::test]
async fn test_chunk_request_past_length_is_protocol_error() {
    let mut signer = MockSigner::new(true, 0);
    signer.greedy = true;
    let mut request = base_request();
    request.data = vec![0x42; 2048];

    let mut approve = |_: &Prompt| Decision::Affirm;
    let err = sign_transaction(&signer, &request, &advanced(), &mut approve)
        .await
        .unwrap_err();

    assert!(matches!(err, SignError::Protocol(_)));
}
