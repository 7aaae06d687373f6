//! Device and network configuration
//!
//! This module contains the immutable node configuration handed to the
//! coordinator at initialization. It includes:
//! - Region selection and the set of enabled band plans
//! - Network flags (public network, repeater support, ADR)
//! - ABP identifiers and the initial Class B ping periodicity

/// Node configuration and identity types
pub mod device;

pub use device::{Activation, DevAddr, Eui64, JoinMode, NodeConfig};
