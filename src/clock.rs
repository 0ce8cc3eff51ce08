/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Wall-clock helpers.
//!
//! Deadlines throughout the core are absolute millisecond timestamps since
//! the Unix epoch. Expiry-driven operations come in pairs: a convenience
//! method that reads the wall clock and an `_at(now)` variant that takes an
//! explicit timestamp, which tests use to drive time forward.

/// Returns the current time in milliseconds since the Unix epoch.
#[inline]
#[must_use]
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
