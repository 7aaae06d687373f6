//! Application notifications
//!
//! The coordinator reports asynchronous network outcomes through
//! [`NodeEvents`]. Every method is invoked synchronously from
//! `LoRaWanNode::process` or from the coordinator call that produced the
//! outcome, never from interrupt context.

use crate::class::{
    class_b::{BeaconParams, SysTime},
    DeviceClass,
};
use crate::config::device::JoinMode;
use crate::lorawan::mac::{EventStatus, McpsConfirm, McpsIndication};

/// Outcome of an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoinParams {
    /// Activation procedure
    pub mode: JoinMode,
    /// Outcome
    pub status: EventStatus,
    /// Data rate in use after the join
    pub data_rate: u8,
}

/// Outcome of an uplink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxParams {
    /// Outcome
    pub status: EventStatus,
    /// Data rate used
    pub data_rate: u8,
    /// Transmit power index used
    pub tx_power: u8,
    /// Channel index used
    pub channel: u8,
    /// Acknowledgement received
    pub ack_received: bool,
    /// Uplink frame counter
    pub uplink_counter: u32,
}

impl From<&McpsConfirm> for TxParams {
    fn from(confirm: &McpsConfirm) -> Self {
        Self {
            status: confirm.status,
            data_rate: confirm.data_rate,
            tx_power: confirm.tx_power,
            channel: confirm.channel,
            ack_received: confirm.ack_received,
            uplink_counter: confirm.uplink_counter,
        }
    }
}

/// Reception metadata of a downlink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxParams {
    /// Outcome
    pub status: EventStatus,
    /// Data rate of the downlink
    pub data_rate: u8,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Signal to noise ratio in dB
    pub snr: i8,
    /// Downlink frame counter
    pub downlink_counter: u32,
    /// Receive slot
    pub rx_slot: u8,
}

impl From<&McpsIndication> for RxParams {
    fn from(indication: &McpsIndication) -> Self {
        Self {
            status: indication.status,
            data_rate: indication.data_rate,
            rssi: indication.rssi,
            snr: indication.snr,
            downlink_counter: indication.downlink_counter,
            rx_slot: indication.rx_slot,
        }
    }
}

/// Application notification sink
///
/// All methods default to doing nothing so an application only implements
/// what it listens to.
pub trait NodeEvents {
    /// Activation finished
    fn join_request(&mut self, _params: &JoinParams) {}

    /// Uplink confirmed by the MAC engine
    fn data_sent(&mut self, _params: &TxParams) {}

    /// Application downlink received
    fn data_received(&mut self, _port: u8, _data: &[u8], _params: &RxParams) {}

    /// Device class switched
    fn class_changed(&mut self, _class: DeviceClass) {}

    /// Beacon received or lost
    fn beacon_status(&mut self, _params: &BeaconParams) {}

    /// Network time synchronised
    fn device_time(&mut self, _time: SysTime) {}
}

impl NodeEvents for () {}
