//! Duty-cycle gating of uplink attempts
//!
//! The MAC engine reports after every transmit attempt how long the node has
//! to stay silent. The gate keeps the uptime at which the next attempt is
//! allowed and compares it against the monotonic clock, which wraps after
//! roughly 49 days.

/// Next-transmission gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycleGate {
    next_tx_ms: u32,
}

impl DutyCycleGate {
    /// Gate opened at `now_ms`
    pub const fn new(now_ms: u32) -> Self {
        Self { next_tx_ms: now_ms }
    }

    /// Uptime at which the next uplink may be attempted
    pub const fn next_tx_ms(&self) -> u32 {
        self.next_tx_ms
    }

    /// Reopen the gate at `now_ms`
    pub fn reset(&mut self, now_ms: u32) {
        self.next_tx_ms = now_ms;
    }

    /// Check whether an uplink at `now_ms` is still restricted
    pub fn is_restricted(&self, now_ms: u32) -> bool {
        // Gate ahead of now by less than half the counter range
        (self.next_tx_ms.wrapping_sub(now_ms) as i32) > 0
    }

    /// Close the gate for `wait_ms` after a transmit attempt at `now_ms`
    pub fn advance(&mut self, now_ms: u32, wait_ms: u32) {
        self.next_tx_ms = now_ms.wrapping_add(wait_ms);
    }

    /// Milliseconds left before the gate opens
    pub fn remaining(&self, now_ms: u32) -> u32 {
        if self.is_restricted(now_ms) {
            self.next_tx_ms.wrapping_sub(now_ms)
        } else {
            0
        }
    }
}
