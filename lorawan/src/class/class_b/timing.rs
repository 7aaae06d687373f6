//! Time sources used by the coordinator
//!
//! Two clocks are involved:
//! - a monotonic uptime counter used for duty-cycle gating
//! - the system time, synchronised with the network through DeviceTimeReq
//!   or the Class B beacons

/// GPS epoch offset from Unix epoch (seconds)
const GPS_EPOCH_OFFSET: u32 = 315_964_800;

/// Network synchronised system time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SysTime {
    /// Seconds since the Unix epoch
    pub seconds: u32,
    /// Milliseconds within the current second
    pub subseconds: u16,
}

impl SysTime {
    /// Create a system time
    pub const fn new(seconds: u32, subseconds: u16) -> Self {
        Self {
            seconds,
            subseconds,
        }
    }

    /// Seconds since the GPS epoch (as carried by beacons)
    pub fn gps_seconds(&self) -> u32 {
        self.seconds.wrapping_sub(GPS_EPOCH_OFFSET)
    }

    /// Build a system time from GPS epoch seconds
    pub fn from_gps_seconds(gps_seconds: u32, subseconds: u16) -> Self {
        Self::new(gps_seconds.wrapping_add(GPS_EPOCH_OFFSET), subseconds)
    }
}

/// Real-time clock and timer service
pub trait Clock {
    /// Monotonic milliseconds since boot (wraps after ~49 days)
    fn uptime_ms(&self) -> u32;

    /// Current system time
    fn system_time(&self) -> SysTime;
}
