/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/2/26
******************************************************************************/

//! Process-wide configuration for the ticketing core.
//!
//! A single [`TicketingConfig`] is constructed at startup, immutable
//! thereafter, and passed explicitly to each component constructor. There is
//! no ambient global lookup.

use std::time::Duration;

/// Timing configuration shared by every component.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ticketing_rs::TicketingConfig;
///
/// let config = TicketingConfig {
///     hold_duration: Duration::from_secs(120),
///     ..TicketingConfig::default()
/// };
/// assert_eq!(config.hold_duration, Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketingConfig {
    /// How long a purchase hold (and its Pending order) lives before expiry.
    pub hold_duration: Duration,

    /// How long a notified waitlist buyer has to respond to an offer.
    pub notify_window: Duration,

    /// Cadence of the background expiry sweep.
    pub sweep_interval: Duration,
}

impl Default for TicketingConfig {
    fn default() -> Self {
        Self {
            hold_duration: Duration::from_secs(300),
            notify_window: Duration::from_secs(900),
            sweep_interval: Duration::from_secs(10),
        }
    }
}

impl TicketingConfig {
    /// Hold duration in milliseconds.
    #[inline]
    #[must_use]
    pub fn hold_duration_ms(&self) -> u64 {
        self.hold_duration.as_millis() as u64
    }

    /// Notification window in milliseconds.
    #[inline]
    #[must_use]
    pub fn notify_window_ms(&self) -> u64 {
        self.notify_window.as_millis() as u64
    }
}
