//! Management information base
//!
//! Attributes are typed: [`MibType`] selects an attribute for reading and
//! [`Mib`] carries an attribute together with its value.

use crate::class::DeviceClass;
use crate::config::device::{Activation, Eui64};

/// Second receive window channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rx2Channel {
    /// Frequency in Hz
    pub frequency: u32,
    /// Data rate index
    pub data_rate: u8,
}

/// MIB attribute selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MibType {
    /// Current device class
    DeviceClass,
    /// Network activation state
    NetworkActivation,
    /// Device EUI
    DevEui,
    /// Join EUI
    JoinEui,
    /// Device address
    DevAddr,
    /// Network identifier
    NetId,
    /// Public or private network sync word
    PublicNetwork,
    /// Repeater compatible payload sizes
    RepeaterSupport,
    /// Adaptive data rate
    Adr,
    /// Maximum RX timing error in milliseconds
    SystemMaxRxError,
    /// LoRaWAN version used for ABP sessions
    AbpLorawanVersion,
    /// Current uplink data rate
    ChannelsDatarate,
    /// Current transmit power index
    ChannelsTxPower,
    /// First receive window delay in milliseconds
    ReceiveDelay1,
    /// Second receive window delay in milliseconds
    ReceiveDelay2,
    /// Second receive window parameters
    Rx2Channel,
    /// First join accept delay in milliseconds
    JoinAcceptDelay1,
    /// Second join accept delay in milliseconds
    JoinAcceptDelay2,
}

/// MIB attribute with its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Mib {
    DeviceClass(DeviceClass),
    NetworkActivation(Activation),
    DevEui(Eui64),
    JoinEui(Eui64),
    DevAddr(u32),
    NetId(u32),
    PublicNetwork(bool),
    RepeaterSupport(bool),
    Adr(bool),
    SystemMaxRxError(u32),
    AbpLorawanVersion(u32),
    ChannelsDatarate(u8),
    ChannelsTxPower(u8),
    ReceiveDelay1(u32),
    ReceiveDelay2(u32),
    Rx2Channel(Rx2Channel),
    JoinAcceptDelay1(u32),
    JoinAcceptDelay2(u32),
}

impl Mib {
    /// Attribute selector of this value
    pub fn kind(&self) -> MibType {
        match self {
            Mib::DeviceClass(_) => MibType::DeviceClass,
            Mib::NetworkActivation(_) => MibType::NetworkActivation,
            Mib::DevEui(_) => MibType::DevEui,
            Mib::JoinEui(_) => MibType::JoinEui,
            Mib::DevAddr(_) => MibType::DevAddr,
            Mib::NetId(_) => MibType::NetId,
            Mib::PublicNetwork(_) => MibType::PublicNetwork,
            Mib::RepeaterSupport(_) => MibType::RepeaterSupport,
            Mib::Adr(_) => MibType::Adr,
            Mib::SystemMaxRxError(_) => MibType::SystemMaxRxError,
            Mib::AbpLorawanVersion(_) => MibType::AbpLorawanVersion,
            Mib::ChannelsDatarate(_) => MibType::ChannelsDatarate,
            Mib::ChannelsTxPower(_) => MibType::ChannelsTxPower,
            Mib::ReceiveDelay1(_) => MibType::ReceiveDelay1,
            Mib::ReceiveDelay2(_) => MibType::ReceiveDelay2,
            Mib::Rx2Channel(_) => MibType::Rx2Channel,
            Mib::JoinAcceptDelay1(_) => MibType::JoinAcceptDelay1,
            Mib::JoinAcceptDelay2(_) => MibType::JoinAcceptDelay2,
        }
    }
}
