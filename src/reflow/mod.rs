/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Reflow: routing freed inventory back to the waitlist.
//!
//! Two pieces live here. [`ReflowCoordinator`] is stateless glue that turns
//! any inventory-freeing event into a waitlist offer pass. [`ExpirySweeper`]
//! is the background task that actively reclaims overdue holds, Pending
//! orders, and un-actioned waitlist offers — timely reclamation must not
//! depend on request traffic happening to touch the right tier.

pub mod coordinator;
pub mod sweeper;

#[cfg(test)]
mod tests;

pub use coordinator::{Freed, ReflowCoordinator};
pub use sweeper::{ExpirySweeper, SweepStats, SweeperHandle};
