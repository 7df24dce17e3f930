//! Generation of human-readable record codes (loan and member codes).
//!
//! Codes are a fixed prefix plus a zero-padded random number, retried until
//! one is free. The retry loop is bounded; exhaustion surfaces an error
//! instead of spinning forever.

use std::future::Future;

use rand::Rng;

use crate::error::{AppError, AppResult};

/// Loan codes look like LN0042
pub const LOAN_CODE_PREFIX: &str = "LN";
pub const LOAN_CODE_WIDTH: u32 = 4;

/// Member codes look like MBR042
pub const MEMBER_CODE_PREFIX: &str = "MBR";
pub const MEMBER_CODE_WIDTH: u32 = 3;

/// Upper bound on collision retries before giving up
pub const MAX_ATTEMPTS: u32 = 25;

/// Format a code: prefix plus zero-padded numeric suffix
pub fn format_code(prefix: &str, width: u32, n: u32) -> String {
    format!("{}{:0width$}", prefix, n, width = width as usize)
}

/// Draw a random code with a suffix in `1..10^width`
pub fn random_code(prefix: &str, width: u32) -> String {
    let max = 10u32.pow(width) - 1;
    let n = rand::thread_rng().gen_range(1..=max);
    format_code(prefix, width, n)
}

/// Generate a code that the `exists` probe does not know yet, retrying on
/// collisions up to [`MAX_ATTEMPTS`] times.
pub async fn generate_unique<F, Fut>(prefix: &str, width: u32, exists: F) -> AppResult<String>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = AppResult<bool>>,
{
    for _ in 0..MAX_ATTEMPTS {
        let code = random_code(prefix, width);
        if !exists(code.clone()).await? {
            return Ok(code);
        }
    }
    Err(AppError::Internal(format!(
        "Failed to generate a unique {} code after {} attempts",
        prefix, MAX_ATTEMPTS
    )))
}
