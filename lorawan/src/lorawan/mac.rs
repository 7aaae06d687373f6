use heapless::Vec;

use super::mib::{Mib, MibType};
use super::region::Region;
use crate::class::class_b::{BeaconParams, PingPeriodicity};

/// Maximum MAC payload size
pub const MAX_MAC_PAYLOAD_SIZE: usize = 242;

/// Class B beacon period in seconds
pub const BEACON_PERIOD_S: u32 = 128;

/// Status returned by a refused MAC engine request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacStatus {
    /// Engine is busy with another transaction
    Busy,
    /// Request or attribute is not known to the engine
    ServiceUnknown,
    /// A parameter is invalid
    ParameterInvalid,
    /// Frequency is invalid
    FrequencyInvalid,
    /// Data rate is invalid
    DatarateInvalid,
    /// Frequency and data rate are invalid
    FreqAndDrInvalid,
    /// No network has been joined
    NoNetworkJoined,
    /// Payload length is invalid
    LengthError,
    /// Region is not supported
    RegionNotSupported,
    /// Application data was skipped to flush MAC commands
    SkippedAppData,
    /// Duty cycle restricts the transmission
    DutyCycleRestricted,
    /// No channel is available
    NoChannelFound,
    /// No free channel is available
    NoFreeChannelFound,
    /// Beacon reserved time is active
    BusyBeaconReservedTime,
    /// A ping slot window is active
    BusyPingSlotWindowTime,
    /// Uplink collides with a Class B window
    BusyUplinkCollision,
    /// Crypto operation failed
    CryptoError,
    /// Frame counter handling failed
    FcntHandlerError,
    /// MAC command handling failed
    MacCommandError,
    /// Class B operation failed
    ClassBError,
    /// Confirm queue is full
    ConfirmQueueError,
    /// Multicast group is undefined
    McGroupUndefined,
    /// Unspecified error
    Error,
}

/// Outcome of an asynchronous MAC engine operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum EventStatus {
    /// Operation succeeded
    Ok = 0,
    /// Unspecified error
    Error,
    /// Transmission timed out
    TxTimeout,
    /// No frame in the first receive window
    Rx1Timeout,
    /// No frame in the second receive window
    Rx2Timeout,
    /// Reception failed in the first window
    Rx1Error,
    /// Reception failed in the second window
    Rx2Error,
    /// Join failed
    JoinFail,
    /// Downlink frame counter repeated
    DownlinkRepeated,
    /// Payload too large for the data rate
    TxDrPayloadSizeError,
    /// Address mismatch
    AddressFail,
    /// MIC check failed
    MicFail,
    /// Multicast frame rejected
    MulticastFail,
    /// Beacon locked
    BeaconLocked,
    /// Beacon lost
    BeaconLost,
    /// Beacon not found
    BeaconNotFound,
}

impl EventStatus {
    /// Check for success
    pub fn is_ok(self) -> bool {
        self == EventStatus::Ok
    }

    /// Wire code of this status
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a status from its wire code
    pub fn from_code(code: u8) -> Option<Self> {
        const ALL: [EventStatus; 16] = [
            EventStatus::Ok,
            EventStatus::Error,
            EventStatus::TxTimeout,
            EventStatus::Rx1Timeout,
            EventStatus::Rx2Timeout,
            EventStatus::Rx1Error,
            EventStatus::Rx2Error,
            EventStatus::JoinFail,
            EventStatus::DownlinkRepeated,
            EventStatus::TxDrPayloadSizeError,
            EventStatus::AddressFail,
            EventStatus::MicFail,
            EventStatus::MulticastFail,
            EventStatus::BeaconLocked,
            EventStatus::BeaconLost,
            EventStatus::BeaconNotFound,
        ];
        ALL.get(usize::from(code)).copied()
    }
}

/// MAC layer management request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MlmeRequest {
    /// Over-the-air join at the given data rate
    Join {
        /// Join request data rate
        data_rate: u8,
    },
    /// DeviceTimeReq MAC command
    DeviceTime,
    /// Start Class B beacon acquisition
    BeaconAcquisition,
    /// PingSlotInfoReq MAC command
    PingSlotInfo {
        /// Requested ping slot periodicity
        periodicity: PingPeriodicity,
    },
    /// LinkCheckReq MAC command
    LinkCheck,
}

/// Kind of management operation reported by a confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Mlme {
    Join,
    DeviceTime,
    BeaconAcquisition,
    PingSlotInfo,
    LinkCheck,
}

/// Uplink frame type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McpsKind {
    /// Unconfirmed uplink
    Unconfirmed,
    /// Confirmed uplink
    Confirmed {
        /// Maximum number of transmissions
        nb_trials: u8,
    },
}

/// Data uplink request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McpsRequest<'a> {
    /// Frame type
    pub kind: McpsKind,
    /// Application port
    pub port: u8,
    /// Application payload
    pub payload: &'a [u8],
    /// Data rate used when ADR is off
    pub data_rate: u8,
}

/// Result of a data uplink request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McpsReturn {
    /// Request status
    pub status: Result<(), MacStatus>,
    /// Time to wait before the next uplink is allowed
    pub duty_cycle_wait_ms: u32,
}

/// Payload sizes accepted by the next transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxInfo {
    /// Maximum application payload for the current data rate
    pub max_possible_payload: u8,
    /// Application payload left after pending MAC commands
    pub current_possible_payload: u8,
}

/// Uplink confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct McpsConfirm {
    /// Outcome of the uplink
    pub status: EventStatus,
    /// Whether the uplink was confirmed
    pub confirmed: bool,
    /// Data rate used
    pub data_rate: u8,
    /// Transmit power index used
    pub tx_power: u8,
    /// Channel index used
    pub channel: u8,
    /// Acknowledgement received for a confirmed uplink
    pub ack_received: bool,
    /// Uplink frame counter
    pub uplink_counter: u32,
}

/// Downlink indication
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct McpsIndication {
    /// Outcome of the reception
    pub status: EventStatus,
    /// Application port
    pub port: u8,
    /// Application payload
    pub payload: Vec<u8, MAX_MAC_PAYLOAD_SIZE>,
    /// Server has more downlink data pending
    pub frame_pending: bool,
    /// Frame acknowledges the last confirmed uplink
    pub ack_received: bool,
    /// Receive slot (0 = RX1, 1 = RX2, 2 = class C, 3 = ping slot)
    pub rx_slot: u8,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Signal to noise ratio in dB
    pub snr: i8,
    /// Data rate of the downlink
    pub data_rate: u8,
    /// Downlink frame counter
    pub downlink_counter: u32,
}

/// Management confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MlmeConfirm {
    /// Confirmed operation
    pub kind: Mlme,
    /// Outcome
    pub status: EventStatus,
}

/// Management indication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MlmeIndication {
    /// Beacon synchronisation lost
    BeaconLost,
    /// Beacon received or missed
    Beacon(BeaconParams),
}

/// Event produced by the MAC engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum MacEvent {
    McpsConfirm(McpsConfirm),
    McpsIndication(McpsIndication),
    MlmeConfirm(MlmeConfirm),
    MlmeIndication(MlmeIndication),
}

/// Region-aware LoRaWAN MAC engine
///
/// Events are buffered by the engine while it runs and drained by the
/// coordinator through [`MacEngine::poll_event`] after every
/// [`MacEngine::process`] call.
pub trait MacEngine {
    /// Initialize the engine for a region
    fn initialize(&mut self, region: Region) -> Result<(), MacStatus>;

    /// Release the engine
    fn deinitialize(&mut self) -> Result<(), MacStatus>;

    /// Start the engine
    fn start(&mut self) -> Result<(), MacStatus>;

    /// Check whether a transaction is in progress
    fn is_busy(&self) -> bool;

    /// Advance the radio and timer state machines
    fn process(&mut self);

    /// Take the next buffered event
    fn poll_event(&mut self) -> Option<MacEvent>;

    /// Read an attribute
    fn mib_get(&self, ty: MibType) -> Result<Mib, MacStatus>;

    /// Write an attribute
    fn mib_set(&mut self, mib: Mib) -> Result<(), MacStatus>;

    /// Issue a management request
    fn mlme_request(&mut self, request: MlmeRequest) -> Result<(), MacStatus>;

    /// Issue a data uplink
    fn mcps_request(&mut self, request: &McpsRequest<'_>, allow_delayed: bool) -> McpsReturn;

    /// Check whether `size` bytes fit in the next uplink
    fn query_tx_possible(&mut self, size: usize) -> Result<TxInfo, MacStatus>;

    /// Regional duty cycle attribute
    fn phy_duty_cycle(&self, region: Region) -> bool;

    /// Enable or disable duty cycle enforcement in the engine
    fn set_duty_cycle_on(&mut self, enable: bool);

    /// Restore the session from non-volatile storage
    fn restore_nvm_context(&mut self) -> bool {
        false
    }

    /// Persist the session to non-volatile storage
    fn store_nvm_context(&mut self) -> bool {
        false
    }
}
