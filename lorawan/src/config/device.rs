use crate::class::class_b::PingPeriodicity;
use crate::lorawan::region::{Region, RegionSet};

/// EUI-64 (8 bytes)
pub type Eui64 = [u8; 8];
/// Device Address
pub type DevAddr = u32;

/// LoRaWAN version announced for ABP sessions (1.0.3.0)
pub const ABP_LORAWAN_VERSION: u32 = 0x0100_0300;

/// Default maximum RX timing error in milliseconds
pub const DEFAULT_MAX_RX_ERROR_MS: u32 = 20;

/// Network activation state, as stored in the MIB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activation {
    /// Device is not activated
    #[default]
    None,
    /// Device is activated through ABP
    Abp,
    /// Device is activated through OTAA
    Otaa,
}

/// Activation procedure requested by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JoinMode {
    /// Over-the-air activation
    Otaa,
    /// Activation by personalization
    Abp,
}

/// Node configuration, fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeConfig {
    /// Region the session runs in
    pub active_region: Region,
    /// Regions the MAC engine was built with
    pub enabled_regions: RegionSet,
    /// Use the public network sync word
    pub public_network: bool,
    /// Restrict payload sizes for repeater compatibility
    pub repeater_support: bool,
    /// Adaptive data rate
    pub adr_enabled: bool,
    /// Data rate for join requests and uplinks when ADR is off
    pub tx_data_rate: u8,
    /// Network identifier (ABP)
    pub network_id: u32,
    /// Device address (ABP)
    pub device_address: DevAddr,
    /// Initial Class B ping slot periodicity (0-7)
    pub ping_periodicity: u8,
    /// Maximum RX timing error in milliseconds
    pub max_rx_error_ms: u32,
}

impl NodeConfig {
    /// Configuration for `region` with every region enabled
    pub fn new(active_region: Region) -> Self {
        Self {
            active_region,
            enabled_regions: RegionSet::all(),
            public_network: true,
            repeater_support: false,
            adr_enabled: true,
            tx_data_rate: 0,
            network_id: 0,
            device_address: 0,
            ping_periodicity: PingPeriodicity::MAX,
            max_rx_error_ms: DEFAULT_MAX_RX_ERROR_MS,
        }
    }

    /// Restrict the set of enabled regions
    pub fn with_enabled_regions(mut self, regions: RegionSet) -> Self {
        self.enabled_regions = regions;
        self
    }

    /// Select public or private network
    pub fn with_public_network(mut self, public: bool) -> Self {
        self.public_network = public;
        self
    }

    /// Enable repeater support
    pub fn with_repeater_support(mut self, enabled: bool) -> Self {
        self.repeater_support = enabled;
        self
    }

    /// Enable or disable ADR
    pub fn with_adr(mut self, enabled: bool) -> Self {
        self.adr_enabled = enabled;
        self
    }

    /// Set the default data rate
    pub fn with_tx_data_rate(mut self, data_rate: u8) -> Self {
        self.tx_data_rate = data_rate;
        self
    }

    /// Set the ABP network identifier and device address
    pub fn with_abp(mut self, network_id: u32, device_address: DevAddr) -> Self {
        self.network_id = network_id;
        self.device_address = device_address;
        self
    }

    /// Set the initial ping slot periodicity
    ///
    /// The value is validated by `LoRaWanNode::initialize`.
    pub fn with_ping_periodicity(mut self, periodicity: u8) -> Self {
        self.ping_periodicity = periodicity;
        self
    }

    /// Set the maximum RX timing error
    pub fn with_max_rx_error(mut self, max_rx_error_ms: u32) -> Self {
        self.max_rx_error_ms = max_rx_error_ms;
        self
    }
}
