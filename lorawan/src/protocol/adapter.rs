//! Mailbox adapter
//!
//! The adapter is split along the two execution contexts of the node:
//! - [`CommandReceiver`] runs in the mailbox interrupt. It decodes frames and
//!   hands them to the loop through a SPSC queue, then raises the wake flag.
//!   It never touches the coordinator.
//! - [`CommandProcessor`] runs in the cooperative loop. It owns the
//!   coordinator, folds queued commands into one pending slot per command
//!   kind (a newer command of the same kind replaces the older one) and
//!   attempts each pending slot once per pass. Slots that cannot be served
//!   yet stay pending for the next pass.
//!
//! Reports are produced by [`ReportSink`], the coordinator's notification
//! sink, and by the processor for direct answers.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::blocking::delay::DelayUs;
use heapless::spsc::{Consumer, Producer};

use super::{
    command::{Command, UplinkMessage},
    report::{ClassReport, Report},
    ProtocolError, MAILBOX_CHANNEL,
};
use crate::{
    class::{class_b::{BeaconParams, Clock, SysTime}, DeviceClass},
    config::device::NodeConfig,
    device::{JoinParams, LoRaWanNode, NodeEvents, RxParams, SessionError, TxParams},
    logging::{debug, info, trace, warn},
    lorawan::mac::MacEngine,
    mailbox::{send_with_timeout, Mailbox, MailboxError, SendPolicy},
};

/// Flags shared between the mailbox interrupt and the loop
///
/// Only plain loads and stores are used so the flags also work on cores
/// without atomic read-modify-write instructions.
#[derive(Debug, Default)]
pub struct CommandSignal {
    wake: AtomicBool,
    accepting: AtomicBool,
}

impl CommandSignal {
    /// Both flags cleared
    pub const fn new() -> Self {
        Self {
            wake: AtomicBool::new(false),
            accepting: AtomicBool::new(false),
        }
    }

    /// Ask the loop to run
    pub fn notify(&self) {
        self.wake.store(true, Ordering::Release);
    }

    /// Check whether the loop has been asked to run
    pub fn is_woken(&self) -> bool {
        self.wake.load(Ordering::Acquire)
    }

    fn clear(&self) {
        self.wake.store(false, Ordering::Release);
    }

    /// Check whether commands are accepted (coordinator initialized)
    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::Release);
    }
}

/// Interrupt side of the adapter
pub struct CommandReceiver<'a, const N: usize> {
    producer: Producer<'a, Command, N>,
    signal: &'a CommandSignal,
}

impl<'a, const N: usize> CommandReceiver<'a, N> {
    /// Create the receiver from the producer half of the command queue
    pub fn new(producer: Producer<'a, Command, N>, signal: &'a CommandSignal) -> Self {
        Self { producer, signal }
    }

    /// Mailbox receive handler
    ///
    /// Frames on other channels, frames received before the coordinator is
    /// initialized and malformed frames are dropped.
    pub fn on_mailbox(&mut self, channel: u8, frame: &[u8]) {
        if channel != MAILBOX_CHANNEL || !self.signal.is_accepting() {
            return;
        }

        let command = match Command::decode(frame) {
            Ok(command) => command,
            Err(err) => {
                warn!("invalid mailbox command: {:?}", err);
                return;
            }
        };

        if let Err(command) = self.producer.enqueue(command) {
            warn!("command queue full, {:?} dropped", command.tag());
            return;
        }
        self.signal.notify();
    }
}

/// Notification sink turning coordinator events into mailbox reports
pub struct ReportSink<T: Mailbox, D: DelayUs<u32>> {
    mailbox: T,
    delay: D,
    policy: SendPolicy,
    awaiting_device_time: bool,
    dropped: u32,
}

impl<T: Mailbox, D: DelayUs<u32>> ReportSink<T, D> {
    /// Create a sink with the default send policy
    pub fn new(mailbox: T, delay: D) -> Self {
        Self::with_policy(mailbox, delay, SendPolicy::default())
    }

    /// Create a sink with a custom send policy
    pub fn with_policy(mailbox: T, delay: D, policy: SendPolicy) -> Self {
        Self {
            mailbox,
            delay,
            policy,
            awaiting_device_time: false,
            dropped: 0,
        }
    }

    /// Encode and send a report
    pub fn send_report(&mut self, report: &Report) -> Result<(), ProtocolError> {
        let frame = report.encode()?;
        send_with_timeout(
            &mut self.mailbox,
            &mut self.delay,
            self.policy,
            MAILBOX_CHANNEL,
            &frame,
        )
        .map_err(|err| match err {
            MailboxError::Oversized => ProtocolError::PayloadTooLarge,
            MailboxError::Timeout => ProtocolError::Timeout,
            MailboxError::Transport(_) => ProtocolError::Transport,
        })
    }

    fn report(&mut self, report: Report) {
        trace!("report {:?}", report.tag());
        if let Err(err) = self.send_report(&report) {
            self.dropped = self.dropped.wrapping_add(1);
            warn!("report {:?} dropped: {:?}", report.tag(), err);
        }
    }

    /// Forward the next network time as a `get_datetime` report
    pub fn expect_device_time(&mut self) {
        self.awaiting_device_time = true;
    }

    /// Stop waiting for the network time
    pub fn cancel_device_time(&mut self) {
        self.awaiting_device_time = false;
    }

    /// Check whether a `get_datetime` answer is outstanding
    pub fn awaiting_device_time(&self) -> bool {
        self.awaiting_device_time
    }

    /// Reports lost to transport errors
    pub fn dropped_reports(&self) -> u32 {
        self.dropped
    }

    /// Mailbox transport
    pub fn mailbox(&self) -> &T {
        &self.mailbox
    }

    /// Mailbox transport, mutably
    pub fn mailbox_mut(&mut self) -> &mut T {
        &mut self.mailbox
    }
}

impl<T: Mailbox, D: DelayUs<u32>> NodeEvents for ReportSink<T, D> {
    fn join_request(&mut self, params: &JoinParams) {
        self.report(Report::JoinRequest {
            ok: params.status.is_ok(),
        });
    }

    fn data_sent(&mut self, params: &TxParams) {
        self.report(Report::DataSent {
            status: params.status,
        });
        if params.ack_received {
            self.report(Report::SentAcked);
        }
    }

    fn data_received(&mut self, port: u8, data: &[u8], params: &RxParams) {
        if !params.status.is_ok() {
            return;
        }
        match Report::data_received(port, data) {
            Ok(report) => self.report(report),
            Err(err) => warn!("downlink on port {} not reported: {:?}", port, err),
        }
    }

    fn class_changed(&mut self, class: DeviceClass) {
        self.report(Report::ClassChanged(class));
    }

    fn beacon_status(&mut self, params: &BeaconParams) {
        debug!(
            "beacon {:?}, time {}, rssi {}",
            params.status, params.info.time, params.info.rssi
        );
    }

    fn device_time(&mut self, time: SysTime) {
        if self.awaiting_device_time {
            self.awaiting_device_time = false;
            self.report(Report::GetDatetime(time));
        }
    }
}

/// Progress of a `get_datetime` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DatetimeSlot {
    Idle,
    Pending,
    Requested,
}

/// One pending record per command kind
#[derive(Debug)]
struct PendingCommands {
    get_datetime: DatetimeSlot,
    send_message: Option<UplinkMessage>,
    change_class: Option<DeviceClass>,
    current_class: bool,
}

impl PendingCommands {
    const fn new() -> Self {
        Self {
            get_datetime: DatetimeSlot::Idle,
            send_message: None,
            change_class: None,
            current_class: false,
        }
    }

    fn store(&mut self, command: Command) {
        match command {
            Command::GetDatetime => {
                if self.get_datetime == DatetimeSlot::Idle {
                    self.get_datetime = DatetimeSlot::Pending;
                }
            }
            Command::SendMessage(message) => self.send_message = Some(message),
            Command::ChangeClass(class) => self.change_class = Some(class),
            Command::CurrentClass => self.current_class = true,
        }
    }

    fn is_empty(&self) -> bool {
        self.get_datetime == DatetimeSlot::Idle
            && self.send_message.is_none()
            && self.change_class.is_none()
            && !self.current_class
    }
}

/// Loop side of the adapter
pub struct CommandProcessor<'a, M, C, T, D, const N: usize>
where
    M: MacEngine,
    C: Clock,
    T: Mailbox,
    D: DelayUs<u32>,
{
    node: LoRaWanNode<M, C, ReportSink<T, D>>,
    consumer: Consumer<'a, Command, N>,
    signal: &'a CommandSignal,
    pending: PendingCommands,
}

impl<'a, M, C, T, D, const N: usize> CommandProcessor<'a, M, C, T, D, N>
where
    M: MacEngine,
    C: Clock,
    T: Mailbox,
    D: DelayUs<u32>,
{
    /// Create the processor from the consumer half of the command queue
    pub fn new(
        node: LoRaWanNode<M, C, ReportSink<T, D>>,
        consumer: Consumer<'a, Command, N>,
        signal: &'a CommandSignal,
    ) -> Self {
        Self {
            node,
            consumer,
            signal,
            pending: PendingCommands::new(),
        }
    }

    /// Initialize the coordinator, open the command intake and announce it
    pub fn start(&mut self, config: NodeConfig) -> Result<(), SessionError> {
        self.node.initialize(config)?;
        self.signal.set_accepting(true);
        self.report(Report::CoreStarted);
        info!("command processor started");
        Ok(())
    }

    /// Stop the coordinator and close the command intake
    ///
    /// The intake stays open if the engine cannot be released.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.node.stop()?;
        self.signal.set_accepting(false);
        self.pending = PendingCommands::new();
        self.node.events_mut().cancel_device_time();
        info!("command processor stopped");
        Ok(())
    }

    /// Check whether commands are waiting to be served
    pub fn has_pending(&self) -> bool {
        self.signal.is_woken() || !self.pending.is_empty()
    }

    /// Run one loop pass
    ///
    /// Drains the command queue, lets the coordinator process MAC events and
    /// then attempts every pending command once.
    pub fn run_once(&mut self) -> Result<(), SessionError> {
        self.signal.clear();
        while let Some(command) = self.consumer.dequeue() {
            debug!("command {:?}", command.tag());
            self.pending.store(command);
        }

        if !self.node.is_initialized() {
            return Ok(());
        }
        self.node.process()?;

        if self.pending.get_datetime == DatetimeSlot::Requested
            && !self.node.events().awaiting_device_time()
        {
            self.pending.get_datetime = DatetimeSlot::Idle;
        }

        self.serve_get_datetime()?;
        self.serve_send_message()?;
        self.serve_change_class()?;
        self.serve_current_class()?;
        Ok(())
    }

    fn busy(&self) -> Result<bool, SessionError> {
        Ok(self.node.is_busy()? || self.node.class_b_pending())
    }

    fn serve_get_datetime(&mut self) -> Result<(), SessionError> {
        if self.pending.get_datetime == DatetimeSlot::Idle {
            return Ok(());
        }

        // Beacons keep the clock synchronised in class B
        if self.node.current_class()? == DeviceClass::B {
            self.node.events_mut().cancel_device_time();
            let time = self.node.current_time();
            self.report(Report::GetDatetime(time));
            self.pending.get_datetime = DatetimeSlot::Idle;
            return Ok(());
        }

        if self.pending.get_datetime == DatetimeSlot::Requested || self.busy()? {
            return Ok(());
        }

        self.node.events_mut().expect_device_time();
        match self.node.device_time_request() {
            Ok(()) => self.pending.get_datetime = DatetimeSlot::Requested,
            Err(err) => {
                self.node.events_mut().cancel_device_time();
                warn!("device time request failed: {:?}", err);
            }
        }
        Ok(())
    }

    fn serve_send_message(&mut self) -> Result<(), SessionError> {
        if self.pending.send_message.is_none() || self.busy()? {
            return Ok(());
        }

        if let Some(message) = self.pending.send_message.take() {
            if let Err(err) = self
                .node
                .send(message.port, &message.data, message.confirmed, true)
            {
                warn!("uplink on port {} failed: {:?}", message.port, err);
            }
        }
        Ok(())
    }

    fn serve_change_class(&mut self) -> Result<(), SessionError> {
        let Some(target) = self.pending.change_class else {
            return Ok(());
        };

        let current = self.node.current_class()?;
        if current == target {
            self.pending.change_class = None;
            return Ok(());
        }
        if self.busy()? {
            return Ok(());
        }

        // B and C are only reachable from A
        if current != DeviceClass::A {
            if let Err(err) = self.node.request_class(DeviceClass::A) {
                warn!("class A fallback failed: {:?}", err);
            }
        }
        if let Err(err) = self.node.request_class(target) {
            warn!("class {} request failed: {:?}", target.letter(), err);
        }
        self.pending.change_class = None;
        Ok(())
    }

    fn serve_current_class(&mut self) -> Result<(), SessionError> {
        if !self.pending.current_class {
            return Ok(());
        }

        let answer = if self.node.is_busy()? {
            ClassReport::Busy
        } else if self.node.class_b_pending() {
            ClassReport::ClassBPending
        } else {
            ClassReport::Class(self.node.current_class()?)
        };
        self.report(Report::CurrentClass(answer));
        self.pending.current_class = false;
        Ok(())
    }

    fn report(&mut self, report: Report) {
        self.node.events_mut().report(report);
    }

    /// Coordinator
    pub fn node(&self) -> &LoRaWanNode<M, C, ReportSink<T, D>> {
        &self.node
    }

    /// Coordinator, mutably
    pub fn node_mut(&mut self) -> &mut LoRaWanNode<M, C, ReportSink<T, D>> {
        &mut self.node
    }
}
