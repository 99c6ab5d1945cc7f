//! Immediate-retry policy for the fetch paths.
//!
//! There is no backoff and no jitter: a failed attempt is retried straight
//! away until the attempt ceiling is reached, and the last error is returned.

use std::fmt::Display;

/// Attempt ceiling used when nothing else is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Run `op` up to `max_attempts` times, returning the first success or the
/// error from the final attempt.
///
/// A ceiling of zero is treated as one: the operation always runs at least once.
///
/// # Examples
/// ```
/// use country_cidr_lookup::with_retry;
///
/// let mut calls = 0;
/// let value: Result<u32, String> = with_retry(3, || {
///     calls += 1;
///     if calls < 3 { Err(format!("attempt {calls}")) } else { Ok(42) }
/// });
/// assert_eq!(value, Ok(42));
/// assert_eq!(calls, 3);
/// ```
pub fn with_retry<T, E, F>(max_attempts: u32, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts => {
                log::warn!("attempt {attempt}/{max_attempts} failed, retrying: {e}");
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
