//! Demand-paced chunking of the transaction data payload.
//!
//! The signer's receive buffer is small, so a payload is sent as an
//! initial inline chunk plus a declared total length; the remainder is
//! served in fixed-size chunks, each only after the signer asks for it.
//! The cursor moves strictly forward: no chunk repeats or is skipped.

/// Maximum number of payload bytes carried inline in the sign request.
pub const INLINE_DATA_LIMIT: usize = 1024;
/// Size of each follow-up chunk; the last one may be short.
pub const DATA_CHUNK_SIZE: usize = 1024;

/// A data payload split into an inline part and a pull-based remainder.
#[derive(Debug)]
pub struct PreparedPayload {
    initial_chunk: Vec<u8>,
    stream: ChunkStream,
}

impl PreparedPayload {
    /// Splits `payload` for transmission. No chunk beyond the initial
    /// one is produced until [`ChunkStream::pull`] is called.
    pub fn prepare(payload: &[u8], inline_limit: usize, chunk_size: usize) -> Self {
        let inline_len = payload.len().min(inline_limit);
        Self {
            initial_chunk: payload[..inline_len].to_vec(),
            stream: ChunkStream {
                remainder: payload[inline_len..].to_vec(),
                total_length: payload.len(),
                cursor: 0,
                chunk_size,
            },
        }
    }

    /// The inline chunk sent with the sign request.
    pub fn initial_chunk(&self) -> &[u8] {
        &self.initial_chunk
    }

    /// Full payload length, regardless of chunking.
    pub fn total_length(&self) -> usize {
        self.stream.total_length
    }

    /// Consumes the prepared payload, yielding the follow-up stream.
    pub fn into_stream(self) -> ChunkStream {
        self.stream
    }
}

/// Forward-only cursor over the payload bytes that did not fit inline.
#[derive(Debug)]
pub struct ChunkStream {
    remainder: Vec<u8>,
    total_length: usize,
    cursor: usize,
    chunk_size: usize,
}

impl ChunkStream {
    /// Returns the next chunk, advancing the cursor, or `None` once
    /// every declared byte has been served.
    pub fn pull(&mut self) -> Option<Vec<u8>> {
        if self.cursor >= self.remainder.len() {
            return None;
        }
        let end = (self.cursor + self.chunk_size).min(self.remainder.len());
        let chunk = self.remainder[self.cursor..end].to_vec();
        self.cursor = end;
        Some(chunk)
    }

    /// True once all follow-up bytes have been pulled.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.remainder.len()
    }
}
