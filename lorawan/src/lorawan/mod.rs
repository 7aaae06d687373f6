//! LoRaWAN MAC engine interface
//!
//! The coordinator does not implement the LoRaWAN protocol itself. It drives
//! an external, region-aware MAC engine through:
//! - MLME/MCPS requests and the events they produce
//! - MIB attribute access
//! - Regional parameters

/// MAC engine requests, events and the engine trait
pub mod mac;

/// Management information base attributes
pub mod mib;

/// Regional parameters and configurations
pub mod region;

pub use mac::{EventStatus, MacEngine, MacEvent, MacStatus};
pub use mib::{Mib, MibType};
pub use region::{Region, RegionSet};
