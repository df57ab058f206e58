//! Cache Wire Format
//!
//! Sequences are stored in the shared cache as JSON arrays of integers under `fib_seq_{n}`.

use crate::error::CodecError;
use crate::sequence::fib::{is_fibonacci_prefix, Sequence};

/// Prefix shared by every sequence key.
pub const KEY_PREFIX: &str = "fib_seq_";

/// Shared cache key for the sequence of length `n`.
pub fn cache_key(n: usize) -> String {
    format!("{}{}", KEY_PREFIX, n)
}

/// Serializes a sequence for the shared cache.
pub fn encode(seq: &[u64]) -> Vec<u8> {
    // A slice of u64 always serializes.
    serde_json::to_vec(seq).unwrap_or_default()
}

/// Parses a cached value, rejecting anything that is not the sequence of length `expected_len`.
pub fn decode(bytes: &[u8], expected_len: usize) -> Result<Sequence, CodecError> {
    let seq: Sequence = serde_json::from_slice(bytes)?;

    if seq.len() != expected_len {
        return Err(CodecError::LengthMismatch {
            expected: expected_len,
            actual: seq.len(),
        });
    }
    if !is_fibonacci_prefix(&seq) {
        return Err(CodecError::NotFibonacci);
    }
    Ok(seq)
}
