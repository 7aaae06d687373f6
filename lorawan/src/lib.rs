//! LoRaWAN end-device session coordinator
//!
//! This crate drives an external, region-aware LoRaWAN MAC engine through
//! join, class A/B/C transitions, duty-cycle gated uplinks and beacon
//! synchronised ping-slot scheduling. It also exposes the coordinator to a
//! second processor core through a small tagged command/report protocol
//! carried over a hardware mailbox.
//!
//! # Features
//! - OTAA and ABP activation
//! - Class A, B and C with the legal transitions only (A↔B, A↔C)
//! - Asynchronous Class B entry (device time, beacon, ping slot)
//! - Duty-cycle gating of every uplink attempt
//! - Interrupt-safe mailbox command intake over a SPSC queue
//! - No heap, no unsafe code
//!
//! # Example
//! ```ignore
//! use lorawan_node::{
//!     config::NodeConfig,
//!     device::{JoinMode, LoRaWanNode},
//!     lorawan::region::Region,
//! };
//!
//! let config = NodeConfig::new(Region::EU868).with_ping_periodicity(4);
//! let mut node = LoRaWanNode::new(mac, clock, events);
//! node.initialize(config)?;
//! node.join(JoinMode::Otaa)?;
//!
//! loop {
//!     node.process()?;
//! }
//! ```

#![warn(missing_docs)]
#![no_std]

mod logging;

/// Device class definitions and Class B support types
pub mod class;

/// Node configuration
pub mod config;

/// Session coordinator
pub mod device;

/// MAC engine interface, attributes and regions
pub mod lorawan;

/// Hardware mailbox transport abstraction
pub mod mailbox;

/// Mailbox command/report protocol
pub mod protocol;
