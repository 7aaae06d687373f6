//! LoRaWAN Class B support
//!
//! The coordinator does not track beacons itself, the MAC engine does. This
//! module holds the types exchanged around that process:
//! - Beacon telemetry and status reporting
//! - Ping slot periodicity
//! - Network synchronised system time

pub mod beacon;
pub mod ping_slot;
pub mod timing;

pub use beacon::{BeaconInfo, BeaconParams, BeaconState, GatewaySpecific};
pub use ping_slot::PingPeriodicity;
pub use timing::{Clock, SysTime};
