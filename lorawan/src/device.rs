//! Session coordinator
//!
//! [`LoRaWanNode`] owns the MAC engine and the single [`Session`] of the node.
//! It handles activation, class transitions, duty-cycle gated uplinks and the
//! asynchronous Class B entry, and turns MAC engine events into
//! [`NodeEvents`] notifications.
//!
//! All state is mutated from one cooperative loop: either inside a
//! coordinator call or while draining engine events in
//! [`LoRaWanNode::process`].

/// Duty-cycle gate
pub mod duty_cycle;
/// Application notifications
pub mod events;

pub use crate::config::device::JoinMode;
pub use duty_cycle::DutyCycleGate;
pub use events::{JoinParams, NodeEvents, RxParams, TxParams};

use crate::{
    class::{
        class_b::{BeaconParams, BeaconState, Clock, PingPeriodicity, SysTime},
        ClassTransition, DeviceClass,
    },
    config::device::{Activation, DevAddr, Eui64, NodeConfig, ABP_LORAWAN_VERSION},
    logging::{debug, error, info, warn},
    lorawan::{
        mac::{
            EventStatus, MacEngine, MacEvent, MacStatus, McpsIndication, McpsKind, McpsRequest,
            Mlme, MlmeConfirm, MlmeIndication, MlmeRequest,
        },
        mib::{Mib, MibType, Rx2Channel},
        region::{Region, RegionSet},
    },
};

/// Number of transmissions of a confirmed uplink
pub const CONFIRMED_NB_TRIALS: u8 = 8;

/// Largest uplink payload accepted by [`LoRaWanNode::send`]
pub const MAX_UPLINK_SIZE: usize = u8::MAX as usize;

/// Coordinator error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// A session already exists
    AlreadyInitialized,
    /// No session exists
    NotInitialized,
    /// Active region is not enabled
    RegionNotSupported,
    /// Invalid parameter or illegal class transition
    InvalidParameter,
    /// MAC engine is busy or a class B entry is in flight
    Busy,
    /// Node has not joined a network
    NoNetworkJoined,
    /// Duty cycle gate is closed
    DutyCycleRestricted,
    /// Payload did not fit; an empty frame was sent to flush MAC commands
    SkippedAppData,
    /// MAC engine refused the request
    Mac(MacStatus),
    /// MIB attribute access failed; the session is inconsistent
    Attribute(MacStatus),
}

impl From<MacStatus> for SessionError {
    fn from(status: MacStatus) -> Self {
        SessionError::Mac(status)
    }
}

/// Read a MIB attribute and unwrap its value
macro_rules! read_mib {
    ($mac:expr, $attr:ident) => {
        match $mac.mib_get(MibType::$attr) {
            Ok(Mib::$attr(value)) => Ok(value),
            Ok(_) => Err(SessionError::Attribute(MacStatus::ServiceUnknown)),
            Err(status) => Err(SessionError::Attribute(status)),
        }
    };
}

/// State of the node's network membership
#[derive(Debug, Clone)]
pub struct Session {
    config: NodeConfig,
    dev_addr: DevAddr,
    dev_eui: Eui64,
    join_eui: Eui64,
    adr_enabled: bool,
    duty_cycle_enabled: bool,
    duty_cycle: DutyCycleGate,
    ping_periodicity: PingPeriodicity,
    class_b_pending: bool,
    beacon_state: BeaconState,
    context_restored: bool,
    beacon_attempts: u32,
}

impl Session {
    /// Configuration the session was created with
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Device address
    pub fn dev_addr(&self) -> DevAddr {
        self.dev_addr
    }

    /// Device EUI
    pub fn dev_eui(&self) -> &Eui64 {
        &self.dev_eui
    }

    /// Join EUI
    pub fn join_eui(&self) -> &Eui64 {
        &self.join_eui
    }

    /// Duty-cycle gate
    pub fn duty_cycle(&self) -> &DutyCycleGate {
        &self.duty_cycle
    }

    /// Class B ping slot periodicity
    pub fn ping_periodicity(&self) -> PingPeriodicity {
        self.ping_periodicity
    }

    /// Class B entry in flight
    pub fn class_b_pending(&self) -> bool {
        self.class_b_pending
    }

    /// Last known beacon synchronisation state
    pub fn beacon_state(&self) -> BeaconState {
        self.beacon_state
    }

    /// Session was recovered from non-volatile storage
    pub fn context_restored(&self) -> bool {
        self.context_restored
    }

    /// Failed beacon acquisitions since the last Class B entry request
    pub fn beacon_attempts(&self) -> u32 {
        self.beacon_attempts
    }
}

/// LoRaWAN end-device coordinator
pub struct LoRaWanNode<M: MacEngine, C: Clock, E: NodeEvents> {
    mac: M,
    clock: C,
    events: E,
    session: Option<Session>,
}

impl<M: MacEngine, C: Clock, E: NodeEvents> LoRaWanNode<M, C, E> {
    /// Create an uninitialized coordinator
    pub fn new(mac: M, clock: C, events: E) -> Self {
        Self {
            mac,
            clock,
            events,
            session: None,
        }
    }

    /// Create the session
    ///
    /// The session becomes visible only once every step succeeded.
    pub fn initialize(&mut self, config: NodeConfig) -> Result<(), SessionError> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyInitialized);
        }

        if config.enabled_regions.is_empty() || !config.enabled_regions.contains(config.active_region) {
            error!("region {:?} is not enabled", config.active_region);
            return Err(SessionError::RegionNotSupported);
        }

        let ping_periodicity =
            PingPeriodicity::new(config.ping_periodicity).ok_or(SessionError::InvalidParameter)?;

        self.mac
            .initialize(config.active_region)
            .map_err(SessionError::Mac)?;

        match self.configure(&config) {
            Ok((dev_addr, dev_eui, join_eui, context_restored)) => {
                let region = config.active_region;
                let duty_cycle_enabled = self.mac.phy_duty_cycle(region);
                self.mac.set_duty_cycle_on(duty_cycle_enabled);

                self.session = Some(Session {
                    config,
                    dev_addr,
                    dev_eui,
                    join_eui,
                    adr_enabled: config.adr_enabled,
                    duty_cycle_enabled,
                    duty_cycle: DutyCycleGate::new(self.clock.uptime_ms()),
                    ping_periodicity,
                    class_b_pending: false,
                    beacon_state: BeaconState::Unknown,
                    context_restored,
                    beacon_attempts: 0,
                });
                info!(
                    "session initialized, region {:?}, duty cycle {}",
                    region, duty_cycle_enabled
                );
                Ok(())
            }
            Err(err) => {
                error!("session configuration failed: {:?}", err);
                if let Err(status) = self.mac.deinitialize() {
                    warn!("engine release failed: {:?}", status);
                }
                Err(err)
            }
        }
    }

    fn configure(&mut self, config: &NodeConfig) -> Result<(DevAddr, Eui64, Eui64, bool), SessionError> {
        let context_restored = self.mac.restore_nvm_context();
        let dev_addr = if context_restored {
            read_mib!(self.mac, DevAddr)?
        } else {
            config.device_address
        };
        let dev_eui = read_mib!(self.mac, DevEui)?;
        let join_eui = read_mib!(self.mac, JoinEui)?;

        for mib in [
            Mib::PublicNetwork(config.public_network),
            Mib::RepeaterSupport(config.repeater_support),
            Mib::Adr(config.adr_enabled),
            Mib::SystemMaxRxError(config.max_rx_error_ms),
        ] {
            self.mac.mib_set(mib).map_err(SessionError::Attribute)?;
        }

        Ok((dev_addr, dev_eui, join_eui, context_restored))
    }

    /// Release the MAC engine and drop the session
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.active()?;
        self.mac.deinitialize()?;
        self.session = None;
        info!("session stopped");
        Ok(())
    }

    /// Start an activation
    ///
    /// An OTAA outcome is reported later through
    /// [`NodeEvents::join_request`]. ABP completes synchronously.
    pub fn join(&mut self, mode: JoinMode) -> Result<(), SessionError> {
        let session = self.active()?;
        let context_restored = session.context_restored;
        let data_rate = session.config.tx_data_rate;
        let network_id = session.config.network_id;
        let dev_addr = session.dev_addr;

        match mode {
            JoinMode::Otaa => {
                self.start_engine()?;
                self.mac.mlme_request(MlmeRequest::Join { data_rate })?;
                info!("OTAA join requested at DR{}", data_rate);
            }
            JoinMode::Abp => {
                if !context_restored {
                    if let Err(status) = self.mac.mib_set(Mib::AbpLorawanVersion(ABP_LORAWAN_VERSION)) {
                        warn!("ABP version not accepted: {:?}", status);
                    }
                    self.mac
                        .mib_set(Mib::NetId(network_id))
                        .map_err(SessionError::Attribute)?;
                    self.mac
                        .mib_set(Mib::DevAddr(dev_addr))
                        .map_err(SessionError::Attribute)?;
                }

                self.start_engine()?;
                self.mac
                    .mib_set(Mib::NetworkActivation(Activation::Abp))
                    .map_err(SessionError::Attribute)?;

                info!("ABP activated, DevAddr {:x}", dev_addr);
                self.events.join_request(&JoinParams {
                    mode: JoinMode::Abp,
                    status: EventStatus::Ok,
                    data_rate: 0,
                });
            }
        }
        Ok(())
    }

    fn start_engine(&mut self) -> Result<(), SessionError> {
        self.mac.start().map_err(|status| {
            warn!("engine start failed: {:?}", status);
            SessionError::Busy
        })
    }

    /// Submit an uplink
    ///
    /// When the payload does not fit in the next transmission an empty frame
    /// is sent instead to flush pending MAC commands and
    /// [`SessionError::SkippedAppData`] is returned. Every transmit attempt
    /// closes the duty-cycle gate for the time reported by the engine.
    pub fn send(
        &mut self,
        port: u8,
        payload: &[u8],
        confirmed: bool,
        allow_delay: bool,
    ) -> Result<(), SessionError> {
        self.active()?;
        if !self.is_joined()? {
            return Err(SessionError::NoNetworkJoined);
        }
        if self.mac.is_busy() {
            return Err(SessionError::Busy);
        }

        let now = self.clock.uptime_ms();
        let session = self.session.as_mut().ok_or(SessionError::NotInitialized)?;
        if session.duty_cycle.is_restricted(now) {
            debug!(
                "uplink restricted for {} ms",
                session.duty_cycle.remaining(now)
            );
            return Err(SessionError::DutyCycleRestricted);
        }
        if payload.len() > MAX_UPLINK_SIZE {
            return Err(SessionError::InvalidParameter);
        }

        let data_rate = session.config.tx_data_rate;
        if self.mac.query_tx_possible(payload.len()).is_err() {
            let flush = McpsRequest {
                kind: McpsKind::Unconfirmed,
                port: 0,
                payload: &[],
                data_rate,
            };
            let ret = self.mac.mcps_request(&flush, allow_delay);
            session
                .duty_cycle
                .advance(self.clock.uptime_ms(), ret.duty_cycle_wait_ms);
            warn!("{} byte payload skipped, flushing MAC commands", payload.len());
            return Err(SessionError::SkippedAppData);
        }

        let kind = if confirmed {
            McpsKind::Confirmed {
                nb_trials: CONFIRMED_NB_TRIALS,
            }
        } else {
            McpsKind::Unconfirmed
        };
        let request = McpsRequest {
            kind,
            port,
            payload,
            data_rate,
        };
        let ret = self.mac.mcps_request(&request, allow_delay);
        session
            .duty_cycle
            .advance(self.clock.uptime_ms(), ret.duty_cycle_wait_ms);
        ret.status.map_err(SessionError::Mac)
    }

    /// Switch the device class
    ///
    /// Class B is entered asynchronously: the call only starts the device
    /// time, beacon acquisition and ping slot sequence. The switch is
    /// reported through [`NodeEvents::class_changed`].
    pub fn request_class(&mut self, target: DeviceClass) -> Result<(), SessionError> {
        let class_b_pending = self.active()?.class_b_pending;
        if !self.is_joined()? {
            return Err(SessionError::NoNetworkJoined);
        }
        if class_b_pending {
            return Err(SessionError::Busy);
        }

        let current = self.current_class()?;
        match current.transition_to(target) {
            Some(ClassTransition::Unchanged) => Ok(()),
            Some(ClassTransition::Immediate) => {
                self.mac.mib_set(Mib::DeviceClass(target))?;
                info!("class {} -> {}", current.letter(), target.letter());
                self.events.class_changed(target);
                Ok(())
            }
            Some(ClassTransition::BeaconAcquisition) => {
                self.mac.mlme_request(MlmeRequest::DeviceTime)?;
                if let Some(session) = self.session.as_mut() {
                    session.class_b_pending = true;
                    session.beacon_attempts = 0;
                    session.beacon_state = BeaconState::Acquisition;
                }
                info!("class B entry started");
                self.flush_uplink(false);
                Ok(())
            }
            None => {
                warn!("class {} -> {} is not allowed", current.letter(), target.letter());
                Err(SessionError::InvalidParameter)
            }
        }
    }

    /// Request the network time
    ///
    /// The answer arrives through [`NodeEvents::device_time`], or starts
    /// beacon acquisition while a Class B entry is in flight.
    pub fn device_time_request(&mut self) -> Result<(), SessionError> {
        self.active()?;
        self.mac.mlme_request(MlmeRequest::DeviceTime)?;
        self.flush_uplink(false);
        Ok(())
    }

    fn ping_slot_request(&mut self, periodicity: PingPeriodicity) -> Result<(), SessionError> {
        self.mac.mlme_request(MlmeRequest::PingSlotInfo { periodicity })?;
        if let Some(session) = self.session.as_mut() {
            session.ping_periodicity = periodicity;
        }
        self.flush_uplink(false);
        Ok(())
    }

    /// Send an empty unconfirmed frame carrying pending MAC commands
    fn flush_uplink(&mut self, allow_delay: bool) {
        match self.send(0, &[], false, allow_delay) {
            Ok(()) | Err(SessionError::SkippedAppData) => {}
            Err(err) => warn!("empty uplink not sent: {:?}", err),
        }
    }

    /// Run one pass of the MAC engine and dispatch its events
    pub fn process(&mut self) -> Result<(), SessionError> {
        self.active()?;
        self.mac.process();
        while let Some(event) = self.mac.poll_event() {
            self.handle_event(event)?;
        }
        self.mac.store_nvm_context();
        Ok(())
    }

    fn handle_event(&mut self, event: MacEvent) -> Result<(), SessionError> {
        match event {
            MacEvent::McpsConfirm(confirm) => {
                self.events.data_sent(&TxParams::from(&confirm));
                Ok(())
            }
            MacEvent::McpsIndication(indication) => self.on_downlink(indication),
            MacEvent::MlmeConfirm(confirm) => self.on_mlme_confirm(confirm),
            MacEvent::MlmeIndication(indication) => self.on_mlme_indication(indication),
        }
    }

    fn on_downlink(&mut self, indication: McpsIndication) -> Result<(), SessionError> {
        if !indication.status.is_ok() {
            debug!("downlink dropped: {:?}", indication.status);
            return Ok(());
        }

        if !indication.payload.is_empty() {
            self.events.data_received(
                indication.port,
                &indication.payload,
                &RxParams::from(&indication),
            );
        }

        if indication.frame_pending && self.current_class()? == DeviceClass::A {
            debug!("server has pending data, flushing");
            self.flush_uplink(true);
        }
        Ok(())
    }

    fn on_mlme_confirm(&mut self, confirm: MlmeConfirm) -> Result<(), SessionError> {
        match confirm.kind {
            Mlme::Join => {
                if confirm.status.is_ok() {
                    let dev_addr = read_mib!(self.mac, DevAddr)?;
                    if let Some(session) = self.session.as_mut() {
                        session.dev_addr = dev_addr;
                    }
                    info!("joined, DevAddr {:x}", dev_addr);
                } else {
                    warn!("join failed: {:?}", confirm.status);
                }
                let data_rate = read_mib!(self.mac, ChannelsDatarate)?;
                self.events.join_request(&JoinParams {
                    mode: JoinMode::Otaa,
                    status: confirm.status,
                    data_rate,
                });
            }
            Mlme::LinkCheck => {}
            Mlme::DeviceTime => {
                if self.class_b_pending() {
                    if let Err(status) = self.mac.mlme_request(MlmeRequest::BeaconAcquisition) {
                        warn!("beacon acquisition not started: {:?}", status);
                    }
                } else {
                    let time = self.clock.system_time();
                    self.events.device_time(time);
                }
            }
            Mlme::BeaconAcquisition => {
                let periodicity = self.active()?.ping_periodicity;
                if confirm.status.is_ok() {
                    if let Some(session) = self.session.as_mut() {
                        session.beacon_state = BeaconState::Locked;
                    }
                    info!("beacon acquired, requesting ping slot {}", periodicity.value());
                    if let Err(err) = self.ping_slot_request(periodicity) {
                        warn!("ping slot request failed: {:?}", err);
                    }
                } else {
                    // Restart from device time, no attempt cap
                    if let Some(session) = self.session.as_mut() {
                        session.beacon_attempts = session.beacon_attempts.saturating_add(1);
                        warn!(
                            "beacon not acquired ({:?}), attempt {}",
                            confirm.status, session.beacon_attempts
                        );
                    }
                    if let Err(err) = self.device_time_request() {
                        warn!("device time request failed: {:?}", err);
                    }
                }
            }
            Mlme::PingSlotInfo => {
                if confirm.status.is_ok() {
                    self.mac
                        .mib_set(Mib::DeviceClass(DeviceClass::B))
                        .map_err(SessionError::Attribute)?;
                    let periodicity = self.active()?.ping_periodicity;
                    info!(
                        "class B active, {} ping slots per beacon, every {} s",
                        periodicity.slots_per_beacon(),
                        periodicity.period_seconds()
                    );
                    self.events.class_changed(DeviceClass::B);
                    if let Some(session) = self.session.as_mut() {
                        session.class_b_pending = false;
                        session.beacon_attempts = 0;
                    }
                } else {
                    let periodicity = self.active()?.ping_periodicity;
                    if let Err(err) = self.ping_slot_request(periodicity) {
                        warn!("ping slot request failed: {:?}", err);
                    }
                }
            }
        }
        Ok(())
    }

    fn on_mlme_indication(&mut self, indication: MlmeIndication) -> Result<(), SessionError> {
        match indication {
            MlmeIndication::BeaconLost => {
                self.mac
                    .mib_set(Mib::DeviceClass(DeviceClass::A))
                    .map_err(SessionError::Attribute)?;
                warn!("beacon lost, back to class A");
                self.events.beacon_status(&BeaconParams::lost());
                self.events.class_changed(DeviceClass::A);
                if let Some(session) = self.session.as_mut() {
                    session.class_b_pending = false;
                    session.beacon_state = BeaconState::Lost;
                }
                if let Err(err) = self.device_time_request() {
                    warn!("device time request failed: {:?}", err);
                }
            }
            MlmeIndication::Beacon(params) => {
                if matches!(params.status, EventStatus::Ok | EventStatus::BeaconLocked) {
                    let time = SysTime::from_gps_seconds(params.info.time, 0);
                    debug!(
                        "beacon at {} Hz, network time {}",
                        params.info.frequency, time.seconds
                    );
                    if let Some(session) = self.session.as_mut() {
                        session.beacon_state = BeaconState::Locked;
                    }
                } else {
                    debug!("beacon missed: {:?}", params.status);
                }
                self.events.beacon_status(&params);
            }
        }
        Ok(())
    }

    fn active(&self) -> Result<&Session, SessionError> {
        self.session.as_ref().ok_or(SessionError::NotInitialized)
    }

    fn active_mut(&mut self) -> Result<&mut Session, SessionError> {
        self.session.as_mut().ok_or(SessionError::NotInitialized)
    }

    /// Set the Class B ping slot periodicity
    ///
    /// Allowed before the join, and afterwards only in class A with no
    /// Class B entry in flight.
    pub fn set_ping_periodicity(&mut self, periodicity: u8) -> bool {
        let Some(periodicity) = PingPeriodicity::new(periodicity) else {
            return false;
        };
        let allowed = match self.is_joined() {
            Ok(false) => true,
            Ok(true) => {
                !self.class_b_pending() && self.current_class() == Ok(DeviceClass::A)
            }
            Err(_) => false,
        };
        match self.session.as_mut() {
            Some(session) if allowed => {
                session.ping_periodicity = periodicity;
                true
            }
            _ => false,
        }
    }

    /// Check whether a session exists
    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Check whether the node is activated
    pub fn is_joined(&self) -> Result<bool, SessionError> {
        self.active()?;
        let activation = read_mib!(self.mac, NetworkActivation)?;
        Ok(activation != Activation::None)
    }

    /// Check whether an uplink would be refused right now
    pub fn is_busy(&self) -> Result<bool, SessionError> {
        Ok(!self.is_joined()? || self.mac.is_busy())
    }

    /// Device class as reported by the MAC engine
    pub fn current_class(&self) -> Result<DeviceClass, SessionError> {
        self.active()?;
        read_mib!(self.mac, DeviceClass)
    }

    /// Check whether a Class B entry is in flight
    pub fn class_b_pending(&self) -> bool {
        self.session.as_ref().map_or(false, |s| s.class_b_pending)
    }

    /// Last known beacon synchronisation state
    pub fn beacon_state(&self) -> Result<BeaconState, SessionError> {
        Ok(self.active()?.beacon_state)
    }

    /// Uptime at which the next uplink may be attempted
    pub fn duty_cycle_gate(&self) -> Result<u32, SessionError> {
        Ok(self.active()?.duty_cycle.next_tx_ms())
    }

    /// Regions the session accepts
    pub fn supported_regions(&self) -> Result<RegionSet, SessionError> {
        Ok(self.active()?.config.enabled_regions)
    }

    /// Region of the session
    pub fn active_region(&self) -> Result<Region, SessionError> {
        Ok(self.active()?.config.active_region)
    }

    /// Class B ping slot periodicity
    pub fn ping_periodicity(&self) -> Result<PingPeriodicity, SessionError> {
        Ok(self.active()?.ping_periodicity)
    }

    /// Device EUI
    pub fn dev_eui(&self) -> Result<Eui64, SessionError> {
        Ok(self.active()?.dev_eui)
    }

    /// Join EUI
    pub fn join_eui(&self) -> Result<Eui64, SessionError> {
        Ok(self.active()?.join_eui)
    }

    /// Network identifier
    pub fn network_id(&self) -> Result<u32, SessionError> {
        Ok(self.active()?.config.network_id)
    }

    /// Device address
    pub fn dev_addr(&self) -> Result<DevAddr, SessionError> {
        Ok(self.active()?.dev_addr)
    }

    /// Set the ABP device address, refused once joined
    pub fn set_dev_addr(&mut self, dev_addr: DevAddr) -> Result<(), SessionError> {
        if self.is_joined()? {
            return Err(SessionError::InvalidParameter);
        }
        self.active_mut()?.dev_addr = dev_addr;
        Ok(())
    }

    /// Network synchronised system time
    pub fn current_time(&self) -> SysTime {
        self.clock.system_time()
    }

    /// ADR setting of the session
    pub fn is_adr_enabled(&self) -> Result<bool, SessionError> {
        Ok(self.active()?.adr_enabled)
    }

    /// Enable or disable ADR in the engine
    pub fn enable_adr(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.active()?;
        self.mac
            .mib_set(Mib::Adr(enabled))
            .map_err(SessionError::Attribute)?;
        self.active_mut()?.adr_enabled = enabled;
        Ok(())
    }

    /// Duty cycle enforcement state
    pub fn is_duty_cycle_enabled(&self) -> Result<bool, SessionError> {
        Ok(self.active()?.duty_cycle_enabled)
    }

    /// Enable or disable duty cycle enforcement
    pub fn enable_duty_cycle(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.active_mut()?.duty_cycle_enabled = enabled;
        self.mac.set_duty_cycle_on(enabled);
        Ok(())
    }

    /// Current uplink data rate
    pub fn tx_data_rate(&self) -> Result<u8, SessionError> {
        self.active()?;
        read_mib!(self.mac, ChannelsDatarate)
    }

    /// Set the uplink data rate, refused while ADR is enabled
    pub fn set_tx_data_rate(&mut self, data_rate: u8) -> Result<bool, SessionError> {
        if self.active()?.adr_enabled {
            return Ok(false);
        }
        self.mac
            .mib_set(Mib::ChannelsDatarate(data_rate))
            .map_err(SessionError::Attribute)?;
        Ok(true)
    }

    /// Current transmit power index
    pub fn tx_power(&self) -> Result<u8, SessionError> {
        self.active()?;
        read_mib!(self.mac, ChannelsTxPower)
    }

    /// Set the transmit power index
    pub fn set_tx_power(&mut self, tx_power: u8) -> Result<(), SessionError> {
        self.active()?;
        self.mac
            .mib_set(Mib::ChannelsTxPower(tx_power))
            .map_err(SessionError::Attribute)
    }

    /// First receive window delay in milliseconds
    pub fn rx1_delay(&self) -> Result<u32, SessionError> {
        self.active()?;
        read_mib!(self.mac, ReceiveDelay1)
    }

    /// Second receive window delay in milliseconds
    pub fn rx2_delay(&self) -> Result<u32, SessionError> {
        self.active()?;
        read_mib!(self.mac, ReceiveDelay2)
    }

    fn rx2_channel(&self) -> Result<Rx2Channel, SessionError> {
        self.active()?;
        read_mib!(self.mac, Rx2Channel)
    }

    /// Second receive window frequency in Hz
    pub fn rx2_frequency(&self) -> Result<u32, SessionError> {
        Ok(self.rx2_channel()?.frequency)
    }

    /// Second receive window data rate
    pub fn rx2_data_rate(&self) -> Result<u8, SessionError> {
        Ok(self.rx2_channel()?.data_rate)
    }

    /// First join accept delay in milliseconds
    pub fn join_accept_delay1(&self) -> Result<u32, SessionError> {
        self.active()?;
        read_mib!(self.mac, JoinAcceptDelay1)
    }

    /// Second join accept delay in milliseconds
    pub fn join_accept_delay2(&self) -> Result<u32, SessionError> {
        self.active()?;
        read_mib!(self.mac, JoinAcceptDelay2)
    }

    /// Current session, if any
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// MAC engine
    pub fn mac(&self) -> &M {
        &self.mac
    }

    /// MAC engine, mutably
    pub fn mac_mut(&mut self) -> &mut M {
        &mut self.mac
    }

    /// Clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Clock, mutably
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Notification sink
    pub fn events(&self) -> &E {
        &self.events
    }

    /// Notification sink, mutably
    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }
}
