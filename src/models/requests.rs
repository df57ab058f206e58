//! Request DTOs for the Fibonacci API
//!
//! Defines query parameters and their validation.

use serde::Deserialize;

use crate::error::AppError;
use crate::sequence::MAX_SEQUENCE_LENGTH;

/// Query string for `GET /fibonacci?n=<value>`.
///
/// `n` is kept as raw text so that missing, non-integer and out-of-range values each get
/// their own error message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FibonacciQuery {
    #[serde(default)]
    pub n: Option<String>,
}

impl FibonacciQuery {
    /// Validates `n` and returns it as a sequence length.
    ///
    /// - missing or non-integer: `InvalidRequest` (400)
    /// - negative or above [`MAX_SEQUENCE_LENGTH`]: `Unprocessable` (422)
    pub fn length(&self) -> Result<usize, AppError> {
        let raw = self
            .n
            .as_deref()
            .ok_or_else(|| AppError::InvalidRequest("Parameter 'n' is required".to_string()))?;

        match raw.trim().parse::<i128>() {
            Ok(n) if n < 0 => Err(AppError::Unprocessable(format!(
                "Negative value is not allowed: {}",
                n
            ))),
            Ok(n) if n > MAX_SEQUENCE_LENGTH as i128 => Err(AppError::Unprocessable(format!(
                "Value exceeds maximum supported length of {}: {}",
                MAX_SEQUENCE_LENGTH, n
            ))),
            Ok(n) => Ok(n as usize),
            Err(_) => Err(AppError::InvalidRequest(format!(
                "Invalid integer: {}",
                raw
            ))),
        }
    }
}
