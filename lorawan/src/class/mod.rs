//! LoRaWAN device classes
//!
//! This module holds the device class definitions shared by the coordinator
//! and the mailbox protocol:
//! - Class A: Uplink followed by two receive windows
//! - Class B: Beacon synchronised ping slots
//! - Class C: Continuous reception except while transmitting
//!
//! Only A→B, A→C, B→A and C→A are legal. A node in B or C has to fall back
//! to A before it can enter the other class.

/// Class B support types (beacons, ping slots, network time)
pub mod class_b;

/// LoRaWAN device class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum DeviceClass {
    /// Class A: Uplink followed by two receive windows
    A = 0x00,
    /// Class B: Scheduled receive slots (beaconing)
    B = 0x01,
    /// Class C: Continuously listening except when transmitting
    C = 0x02,
}

/// How a class change has to be carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClassTransition {
    /// Requested class is already active
    Unchanged,
    /// Switch with a single MIB write
    Immediate,
    /// Class B entry: device time, beacon acquisition and ping slot first
    BeaconAcquisition,
}

impl DeviceClass {
    /// Wire code of the class
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Decode a class from its wire code
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(DeviceClass::A),
            0x01 => Some(DeviceClass::B),
            0x02 => Some(DeviceClass::C),
            _ => None,
        }
    }

    /// Class letter, for logs
    pub const fn letter(self) -> char {
        match self {
            DeviceClass::A => 'A',
            DeviceClass::B => 'B',
            DeviceClass::C => 'C',
        }
    }

    /// Resolve the transition from `self` to `target`
    ///
    /// Returns `None` for B↔C, which must go through A.
    pub const fn transition_to(self, target: DeviceClass) -> Option<ClassTransition> {
        match (self, target) {
            (DeviceClass::A, DeviceClass::A)
            | (DeviceClass::B, DeviceClass::B)
            | (DeviceClass::C, DeviceClass::C) => Some(ClassTransition::Unchanged),
            (DeviceClass::A, DeviceClass::B) => Some(ClassTransition::BeaconAcquisition),
            (DeviceClass::A, DeviceClass::C)
            | (DeviceClass::B, DeviceClass::A)
            | (DeviceClass::C, DeviceClass::A) => Some(ClassTransition::Immediate),
            (DeviceClass::B, DeviceClass::C) | (DeviceClass::C, DeviceClass::B) => None,
        }
    }
}

impl TryFrom<u8> for DeviceClass {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        DeviceClass::from_code(code).ok_or(code)
    }
}
