/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Domain events emitted by the ticketing core.
//!
//! Every state change of interest to external collaborators (notification
//! senders, audit consumers, metrics) is published on the [`EventBus`] as a
//! [`DomainEvent`]. The core itself never formats or sends messages — it
//! only announces that something happened.

pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::DomainEvent;
