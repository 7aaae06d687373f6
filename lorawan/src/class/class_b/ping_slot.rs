//! LoRaWAN Class B Ping Slot periodicity
//!
//! The periodicity `k` (0-7) selects 2^(7-k) ping slots per 128 s beacon
//! period, i.e. one slot every 2^k seconds.

use crate::lorawan::mac::BEACON_PERIOD_S;

/// Ping slot periodicity (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PingPeriodicity(u8);

impl PingPeriodicity {
    /// Largest valid periodicity
    pub const MAX: u8 = 7;

    /// Validate a raw periodicity
    pub const fn new(periodicity: u8) -> Option<Self> {
        if periodicity <= Self::MAX {
            Some(Self(periodicity))
        } else {
            None
        }
    }

    /// Raw periodicity value
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Number of ping slots per beacon period
    pub const fn slots_per_beacon(self) -> u32 {
        128 >> self.0
    }

    /// Seconds between two ping slots
    pub const fn period_seconds(self) -> u32 {
        BEACON_PERIOD_S / self.slots_per_beacon()
    }
}

impl Default for PingPeriodicity {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<u8> for PingPeriodicity {
    type Error = u8;

    fn try_from(periodicity: u8) -> Result<Self, Self::Error> {
        Self::new(periodicity).ok_or(periodicity)
    }
}
