//! Fibonacci Arithmetic
//!
//! Pure, iterative sequence generation and prefix extension. No caching happens here.

/// The first `n` Fibonacci numbers, F(0)=0, F(1)=1.
pub type Sequence = Vec<u64>;

/// Longest sequence whose every element fits in `u64` (F(93) is the last one).
pub const MAX_SEQUENCE_LENGTH: usize = 94;

// == Base Case ==
/// Returns the sequence for lengths too short to be worth caching.
///
/// Length 2 is not one: it is generated and written back like any longer sequence.
pub fn base_case(n: usize) -> Option<Sequence> {
    match n {
        0 => Some(Vec::new()),
        1 => Some(vec![0]),
        _ => None,
    }
}

// == Generate ==
/// Computes the first `n` numbers from scratch in O(n).
///
/// `n` must not exceed [`MAX_SEQUENCE_LENGTH`].
pub fn generate(n: usize) -> Sequence {
    let mut seq = Vec::with_capacity(n);
    seq.extend([0u64, 1].iter().take(n));
    extend(seq, n)
}

// == Extend ==
/// Grows a known prefix to length `n`.
///
/// A prefix already at least `n` long is truncated instead. Prefixes shorter than two
/// elements carry no recurrence state, so those are regenerated.
pub fn extend(mut seq: Sequence, n: usize) -> Sequence {
    debug_assert!(n <= MAX_SEQUENCE_LENGTH);

    if seq.len() >= n {
        seq.truncate(n);
        return seq;
    }
    if seq.len() < 2 {
        return generate(n);
    }

    seq.reserve(n - seq.len());
    while seq.len() < n {
        let len = seq.len();
        seq.push(seq[len - 1] + seq[len - 2]);
    }
    seq
}

// == Validation ==
/// Checks that `seq` starts 0, 1 and follows the recurrence throughout.
pub fn is_fibonacci_prefix(seq: &[u64]) -> bool {
    if seq.first().is_some_and(|&v| v != 0) || seq.get(1).is_some_and(|&v| v != 1) {
        return false;
    }
    seq.windows(3)
        .all(|w| w[0].checked_add(w[1]) == Some(w[2]))
}
