/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Waitlist queue: fairness-ordered reallocation of freed capacity.
//!
//! Raw reservation is first-writer-wins; once a tier sells out, fairness
//! moves here. Buyers queue per `(event, tier-or-any)` bucket in strict
//! join order, and every unit freed by cancellation, refund, or expiry is
//! offered down the queue as a time-boxed hold. Unclaimed offers expire and
//! cascade to the next buyer in line.

pub mod entry;
pub mod queue;

#[cfg(test)]
mod tests;

pub use entry::{WaitlistEntry, WaitlistStatus};
pub use queue::WaitlistQueue;
