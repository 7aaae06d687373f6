//! LoRaWAN Class B beacon telemetry
//!
//! Beacons are acquired and tracked by the MAC engine. It reports each
//! received beacon and a loss of synchronisation to the coordinator, which
//! forwards them to the application as [`BeaconParams`].

use crate::lorawan::mac::EventStatus;

/// Gateway specific part of a beacon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GatewaySpecific {
    /// Info descriptor (differs per gateway)
    pub info_desc: u8,
    /// Info bytes (differ per gateway)
    pub info: [u8; 6],
}

/// Beacon as received by the MAC engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeaconInfo {
    /// Seconds since the GPS epoch, modulo 2^32
    pub time: u32,
    /// Beacon frequency in Hz
    pub frequency: u32,
    /// Beacon data rate
    pub data_rate: u8,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Signal to noise ratio in dB
    pub snr: i8,
    /// Gateway specific information
    pub gw_specific: GatewaySpecific,
}

/// Beacon synchronisation state as tracked by the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BeaconState {
    /// No Class B entry attempted yet
    #[default]
    Unknown,
    /// Device time or beacon acquisition in progress
    Acquisition,
    /// Beacon received, ping slots are scheduled from it
    Locked,
    /// Beacon synchronisation lost
    Lost,
}

/// Beacon status notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeaconParams {
    /// Outcome reported by the engine
    pub status: EventStatus,
    /// Beacon contents, zeroed when the beacon was lost
    pub info: BeaconInfo,
}

impl BeaconParams {
    /// Beacon synchronisation lost
    pub fn lost() -> Self {
        Self {
            status: EventStatus::BeaconLost,
            info: BeaconInfo::default(),
        }
    }

    /// Check whether this notification reports a loss of synchronisation
    pub fn is_lost(&self) -> bool {
        self.status == EventStatus::BeaconLost
    }
}
