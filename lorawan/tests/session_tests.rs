use lorawan_node::{
    class::{
        class_b::{BeaconState, PingPeriodicity},
        DeviceClass,
    },
    config::device::{Activation, NodeConfig},
    device::{JoinMode, JoinParams, LoRaWanNode, SessionError},
    lorawan::{
        mac::{EventStatus, MacStatus, McpsKind, Mlme, MlmeRequest},
        mib::{Mib, MibType},
        region::{Region, RegionSet},
    },
};

use mock::{Event, MockClock, MockMac, RecordingEvents, DEV_EUI, JOIN_EUI};

type TestNode = LoRaWanNode<MockMac, MockClock, RecordingEvents>;

fn create_test_node() -> TestNode {
    LoRaWanNode::new(MockMac::new(), MockClock::new(), RecordingEvents::new())
}

fn initialized_node() -> TestNode {
    let mut node = create_test_node();
    node.initialize(NodeConfig::new(Region::EU868).with_abp(0x13, 0x2601_1F2A))
        .unwrap();
    node
}

fn joined_node() -> TestNode {
    let mut node = initialized_node();
    node.join(JoinMode::Abp).unwrap();
    node.events_mut().events.clear();
    node
}

#[test]
fn test_initialize_reports_unjoined_class_a() {
    for region in [Region::EU868, Region::US915, Region::AS923] {
        for periodicity in 0..=PingPeriodicity::MAX {
            let mut node = create_test_node();
            let config = NodeConfig::new(region).with_ping_periodicity(periodicity);

            node.initialize(config).unwrap();

            assert!(node.is_initialized());
            assert_eq!(node.is_joined(), Ok(false));
            assert_eq!(node.current_class(), Ok(DeviceClass::A));
            assert_eq!(node.ping_periodicity().map(|p| p.value()), Ok(periodicity));
            assert_eq!(node.active_region(), Ok(region));
        }
    }
}

#[test]
fn test_initialize_configures_engine() {
    let mut node = create_test_node();
    node.mac_mut().phy_duty_cycle = true;
    node.initialize(NodeConfig::new(Region::EU868).with_max_rx_error(30))
        .unwrap();

    let mac = node.mac();
    assert_eq!(mac.region, Some(Region::EU868));
    assert_eq!(mac.duty_cycle_on, Some(true));
    assert!(mac.mib_writes.contains(&Mib::PublicNetwork(true)));
    assert!(mac.mib_writes.contains(&Mib::RepeaterSupport(false)));
    assert!(mac.mib_writes.contains(&Mib::Adr(true)));
    assert!(mac.mib_writes.contains(&Mib::SystemMaxRxError(30)));

    assert_eq!(node.dev_eui(), Ok(DEV_EUI));
    assert_eq!(node.join_eui(), Ok(JOIN_EUI));
    assert_eq!(node.is_duty_cycle_enabled(), Ok(true));
    assert_eq!(node.duty_cycle_gate(), Ok(10_000));
}

#[test]
fn test_initialize_twice_fails() {
    let mut node = initialized_node();

    assert_eq!(
        node.initialize(NodeConfig::new(Region::EU868)),
        Err(SessionError::AlreadyInitialized)
    );

    node.stop().unwrap();
    assert!(!node.is_initialized());
    assert_eq!(node.mac().deinit_calls, 1);

    node.initialize(NodeConfig::new(Region::US915)).unwrap();
    assert_eq!(node.active_region(), Ok(Region::US915));
}

#[test]
fn test_initialize_rejects_invalid_config() {
    let mut node = create_test_node();

    let disabled = NodeConfig::new(Region::EU868)
        .with_enabled_regions(RegionSet::from_regions(&[Region::US915]));
    assert_eq!(node.initialize(disabled), Err(SessionError::RegionNotSupported));

    let empty = NodeConfig::new(Region::EU868).with_enabled_regions(RegionSet::empty());
    assert_eq!(node.initialize(empty), Err(SessionError::RegionNotSupported));

    let periodicity = NodeConfig::new(Region::EU868).with_ping_periodicity(8);
    assert_eq!(node.initialize(periodicity), Err(SessionError::InvalidParameter));

    assert!(!node.is_initialized());
    assert_eq!(node.mac().region, None);
}

#[test]
fn test_initialize_attribute_failure_is_fatal() {
    let mut node = create_test_node();
    node.mac_mut().failing_mib = Some(MibType::RepeaterSupport);

    assert_eq!(
        node.initialize(NodeConfig::new(Region::EU868)),
        Err(SessionError::Attribute(MacStatus::ParameterInvalid))
    );
    assert!(!node.is_initialized());
    assert_eq!(node.mac().deinit_calls, 1);
}

#[test]
fn test_operations_require_session() {
    let mut node = create_test_node();

    assert_eq!(node.join(JoinMode::Otaa), Err(SessionError::NotInitialized));
    assert_eq!(node.send(1, &[1], false, false), Err(SessionError::NotInitialized));
    assert_eq!(
        node.request_class(DeviceClass::C),
        Err(SessionError::NotInitialized)
    );
    assert_eq!(node.process(), Err(SessionError::NotInitialized));
    assert_eq!(node.stop(), Err(SessionError::NotInitialized));
    assert_eq!(node.is_joined(), Err(SessionError::NotInitialized));
    assert!(!node.set_ping_periodicity(3));
    assert!(!node.class_b_pending());
}

#[test]
fn test_otaa_join() {
    let mut node = initialized_node();

    node.join(JoinMode::Otaa).unwrap();
    assert!(node.mac().started);
    assert_eq!(node.mac().mlme_requests, vec![MlmeRequest::Join { data_rate: 0 }]);
    assert_eq!(node.is_joined(), Ok(false));
    assert_eq!(node.is_busy(), Ok(true));

    node.mac_mut().accept_join(0x2601_ABCD);
    node.process().unwrap();

    assert_eq!(node.is_joined(), Ok(true));
    assert_eq!(node.dev_addr(), Ok(0x2601_ABCD));
    assert_eq!(
        node.events().events,
        vec![Event::Join(JoinParams {
            mode: JoinMode::Otaa,
            status: EventStatus::Ok,
            data_rate: 5,
        })]
    );
}

#[test]
fn test_otaa_join_failure_is_reported() {
    let mut node = initialized_node();
    node.join(JoinMode::Otaa).unwrap();

    node.mac_mut().confirm(Mlme::Join, EventStatus::JoinFail);
    node.process().unwrap();

    assert_eq!(node.is_joined(), Ok(false));
    assert_eq!(node.dev_addr(), Ok(0x2601_1F2A));
    match &node.events().events[..] {
        [Event::Join(params)] => assert_eq!(params.status, EventStatus::JoinFail),
        other => panic!("unexpected events {:?}", other),
    }
}

#[test]
fn test_join_start_failure_is_busy() {
    let mut node = initialized_node();
    node.mac_mut().start_status = Err(MacStatus::Busy);

    assert_eq!(node.join(JoinMode::Otaa), Err(SessionError::Busy));
    assert_eq!(node.join(JoinMode::Abp), Err(SessionError::Busy));
    assert!(node.mac().mlme_requests.is_empty());
    assert!(node.events().events.is_empty());
}

#[test]
fn test_abp_join() {
    let mut node = initialized_node();

    node.join(JoinMode::Abp).unwrap();

    let mac = node.mac();
    assert!(mac.mib_writes.contains(&Mib::AbpLorawanVersion(0x0100_0300)));
    assert!(mac.mib_writes.contains(&Mib::NetId(0x13)));
    assert!(mac.mib_writes.contains(&Mib::DevAddr(0x2601_1F2A)));
    assert_eq!(mac.activation, Activation::Abp);
    assert_eq!(node.is_joined(), Ok(true));
    assert_eq!(
        node.events().events,
        vec![Event::Join(JoinParams {
            mode: JoinMode::Abp,
            status: EventStatus::Ok,
            data_rate: 0,
        })]
    );
}

#[test]
fn test_abp_join_with_restored_context() {
    let mut node = create_test_node();
    node.mac_mut().restored = true;
    node.mac_mut().dev_addr = 0x0042_0042;
    node.initialize(NodeConfig::new(Region::EU868)).unwrap();

    assert_eq!(node.dev_addr(), Ok(0x0042_0042));

    node.join(JoinMode::Abp).unwrap();
    assert!(!node
        .mac()
        .mib_writes
        .iter()
        .any(|mib| matches!(mib, Mib::NetId(_) | Mib::DevAddr(_))));
    assert_eq!(node.is_joined(), Ok(true));
}

#[test]
fn test_send_requires_join_and_idle_engine() {
    let mut node = initialized_node();
    assert_eq!(
        node.send(2, &[1, 2], false, false),
        Err(SessionError::NoNetworkJoined)
    );

    node.join(JoinMode::Abp).unwrap();
    node.mac_mut().busy = true;
    assert_eq!(node.send(2, &[1, 2], false, false), Err(SessionError::Busy));
    assert!(node.mac().uplinks.is_empty());
}

#[test]
fn test_send_enforces_duty_cycle() {
    let mut node = joined_node();
    node.mac_mut().duty_cycle_wait_ms = 1_000;

    node.send(2, &[1, 2, 3], false, false).unwrap();
    assert_eq!(node.mac().uplinks.len(), 1);
    assert_eq!(node.duty_cycle_gate(), Ok(11_000));

    node.clock_mut().advance(999);
    assert_eq!(
        node.send(2, &[4], false, false),
        Err(SessionError::DutyCycleRestricted)
    );
    assert_eq!(node.mac().uplinks.len(), 1);

    node.clock_mut().advance(1);
    node.send(2, &[4], false, false).unwrap();
    assert_eq!(node.mac().uplinks.len(), 2);
}

#[test]
fn test_send_skips_oversized_payload() {
    let mut node = joined_node();
    node.mac_mut().max_payload = 4;
    node.mac_mut().duty_cycle_wait_ms = 500;

    assert_eq!(
        node.send(7, &[0; 10], true, true),
        Err(SessionError::SkippedAppData)
    );

    let uplink = &node.mac().uplinks[0];
    assert_eq!(uplink.kind, McpsKind::Unconfirmed);
    assert_eq!(uplink.port, 0);
    assert!(uplink.payload.is_empty());
    assert!(uplink.allow_delayed);
    assert_eq!(node.duty_cycle_gate(), Ok(10_500));
}

#[test]
fn test_send_confirmed_uplink() {
    let mut node = joined_node();

    node.send(9, &[0xCA, 0xFE], true, false).unwrap();

    let uplink = &node.mac().uplinks[0];
    assert_eq!(uplink.kind, McpsKind::Confirmed { nb_trials: 8 });
    assert_eq!(uplink.port, 9);
    assert_eq!(uplink.payload, vec![0xCA, 0xFE]);
    assert!(!uplink.allow_delayed);
}

#[test]
fn test_class_b_request_starts_with_device_time() {
    let mut node = joined_node();

    node.request_class(DeviceClass::B).unwrap();

    assert!(node.class_b_pending());
    assert_eq!(node.mac().count_mlme(MlmeRequest::DeviceTime), 1);
    assert_eq!(node.mac().mlme_requests.len(), 1);
    assert_eq!(node.current_class(), Ok(DeviceClass::A));
    assert!(node.mac().class_writes().is_empty());

    // The carrier uplink flushes the MAC command
    assert_eq!(node.mac().uplinks.len(), 1);
    assert!(node.mac().uplinks[0].payload.is_empty());
}

#[test]
fn test_beacon_loss_restores_class_a() {
    let mut node = joined_node();
    node.request_class(DeviceClass::B).unwrap();

    node.mac_mut().lose_beacon();
    node.process().unwrap();

    assert!(!node.class_b_pending());
    assert_eq!(node.current_class(), Ok(DeviceClass::A));
    assert_eq!(node.mac().class_writes(), vec![DeviceClass::A]);

    let events = &node.events().events;
    assert!(matches!(&events[0], Event::Beacon(params) if params.is_lost()));
    assert_eq!(events[1], Event::ClassChanged(DeviceClass::A));

    // Time resynchronisation restarts
    assert_eq!(node.mac().count_mlme(MlmeRequest::DeviceTime), 2);
}

#[test]
fn test_class_b_entry_sequence() {
    let mut node = joined_node();
    assert!(node.set_ping_periodicity(4));
    node.request_class(DeviceClass::B).unwrap();

    node.mac_mut().confirm(Mlme::DeviceTime, EventStatus::Ok);
    node.process().unwrap();
    assert_eq!(node.mac().count_mlme(MlmeRequest::BeaconAcquisition), 1);

    node.mac_mut().confirm(Mlme::BeaconAcquisition, EventStatus::Ok);
    node.process().unwrap();
    let periodicity = PingPeriodicity::new(4).unwrap();
    assert_eq!(
        node.mac().count_mlme(MlmeRequest::PingSlotInfo { periodicity }),
        1
    );
    assert!(node.class_b_pending());

    // Rejected ping slot is retried at the same periodicity
    node.mac_mut().confirm(Mlme::PingSlotInfo, EventStatus::Rx2Timeout);
    node.process().unwrap();
    assert_eq!(
        node.mac().count_mlme(MlmeRequest::PingSlotInfo { periodicity }),
        2
    );

    node.mac_mut().confirm(Mlme::PingSlotInfo, EventStatus::Ok);
    node.process().unwrap();

    assert!(!node.class_b_pending());
    assert_eq!(node.current_class(), Ok(DeviceClass::B));
    assert_eq!(
        node.events().events,
        vec![Event::ClassChanged(DeviceClass::B)]
    );
}

#[test]
fn test_beacon_acquisition_failure_restarts_device_time() {
    let mut node = joined_node();
    node.request_class(DeviceClass::B).unwrap();

    for attempt in 1..=3 {
        node.mac_mut().confirm(Mlme::DeviceTime, EventStatus::Ok);
        node.mac_mut()
            .confirm(Mlme::BeaconAcquisition, EventStatus::BeaconNotFound);
        node.process().unwrap();

        assert!(node.class_b_pending());
        assert_eq!(
            node.mac().count_mlme(MlmeRequest::DeviceTime),
            1 + attempt as usize
        );
        assert_eq!(node.session().unwrap().beacon_attempts(), attempt);
    }
    assert!(node.events().events.is_empty());
}

#[test]
fn test_class_transitions() {
    let mut node = joined_node();

    node.request_class(DeviceClass::C).unwrap();
    assert_eq!(node.current_class(), Ok(DeviceClass::C));

    assert_eq!(
        node.request_class(DeviceClass::B),
        Err(SessionError::InvalidParameter)
    );
    assert_eq!(node.current_class(), Ok(DeviceClass::C));

    node.request_class(DeviceClass::C).unwrap();
    node.request_class(DeviceClass::A).unwrap();
    assert_eq!(
        node.events().events,
        vec![
            Event::ClassChanged(DeviceClass::C),
            Event::ClassChanged(DeviceClass::A)
        ]
    );
}

#[test]
fn test_class_b_to_c_is_rejected() {
    let mut node = joined_node();
    node.mac_mut().class = DeviceClass::B;

    assert_eq!(
        node.request_class(DeviceClass::C),
        Err(SessionError::InvalidParameter)
    );
    assert!(node.mac().class_writes().is_empty());
}

#[test]
fn test_class_request_while_b_pending_is_busy() {
    let mut node = joined_node();
    node.request_class(DeviceClass::B).unwrap();

    assert_eq!(node.request_class(DeviceClass::C), Err(SessionError::Busy));
    assert_eq!(node.request_class(DeviceClass::A), Err(SessionError::Busy));
}

#[test]
fn test_class_request_requires_join() {
    let mut node = initialized_node();
    assert_eq!(
        node.request_class(DeviceClass::C),
        Err(SessionError::NoNetworkJoined)
    );
}

#[test]
fn test_downlink_handling() {
    let mut node = joined_node();

    node.mac_mut().downlink(EventStatus::MicFail, 3, &[1, 2], false);
    node.mac_mut().downlink(EventStatus::Ok, 3, &[], false);
    node.mac_mut().downlink(EventStatus::Ok, 4, &[7, 8, 9], false);
    node.process().unwrap();

    assert_eq!(node.events().events, vec![Event::Received(4, vec![7, 8, 9])]);
    assert!(node.mac().uplinks.is_empty());
}

#[test]
fn test_frame_pending_flushes_in_class_a_only() {
    let mut node = joined_node();

    node.mac_mut().downlink(EventStatus::Ok, 1, &[], true);
    node.process().unwrap();
    assert_eq!(node.mac().uplinks.len(), 1);
    assert!(node.mac().uplinks[0].allow_delayed);
    assert_eq!(node.mac().uplinks[0].port, 0);

    node.request_class(DeviceClass::C).unwrap();
    node.mac_mut().downlink(EventStatus::Ok, 1, &[], true);
    node.process().unwrap();
    assert_eq!(node.mac().uplinks.len(), 1);
}

#[test]
fn test_device_time_without_class_b() {
    let mut node = joined_node();

    node.device_time_request().unwrap();
    node.mac_mut().confirm(Mlme::DeviceTime, EventStatus::Ok);
    node.process().unwrap();

    let time = node.current_time();
    assert_eq!(node.events().events, vec![Event::Time(time)]);
    assert_eq!(node.mac().count_mlme(MlmeRequest::BeaconAcquisition), 0);
}

#[test]
fn test_device_time_request_failure() {
    let mut node = joined_node();
    node.mac_mut().failing_mlme = Some(MacStatus::Busy);

    assert_eq!(
        node.device_time_request(),
        Err(SessionError::Mac(MacStatus::Busy))
    );
    assert_eq!(
        node.request_class(DeviceClass::B),
        Err(SessionError::Mac(MacStatus::Busy))
    );
    assert!(!node.class_b_pending());
}

#[test]
fn test_ping_periodicity_rules() {
    let mut node = initialized_node();
    assert!(node.set_ping_periodicity(0));
    assert!(!node.set_ping_periodicity(8));

    node.join(JoinMode::Abp).unwrap();
    assert!(node.set_ping_periodicity(5));
    assert_eq!(node.ping_periodicity().map(|p| p.value()), Ok(5));

    node.request_class(DeviceClass::C).unwrap();
    assert!(!node.set_ping_periodicity(2));
    assert_eq!(node.ping_periodicity().map(|p| p.value()), Ok(5));
}

#[test]
fn test_process_persists_context() {
    let mut node = initialized_node();

    node.process().unwrap();
    node.process().unwrap();

    assert_eq!(node.mac().process_calls, 2);
    assert_eq!(node.mac().store_calls, 2);
}

#[test]
fn test_attribute_accessors() {
    let mut node = initialized_node();

    assert_eq!(node.rx1_delay(), Ok(1_000));
    assert_eq!(node.rx2_delay(), Ok(2_000));
    assert_eq!(node.rx2_frequency(), Ok(869_525_000));
    assert_eq!(node.rx2_data_rate(), Ok(0));
    assert_eq!(node.join_accept_delay1(), Ok(5_000));
    assert_eq!(node.join_accept_delay2(), Ok(6_000));
    assert_eq!(node.network_id(), Ok(0x13));
    assert!(node.supported_regions().unwrap().contains(Region::EU868));

    node.set_tx_power(3).unwrap();
    assert_eq!(node.tx_power(), Ok(3));

    // ADR owns the data rate
    assert_eq!(node.is_adr_enabled(), Ok(true));
    assert_eq!(node.set_tx_data_rate(4), Ok(false));

    node.enable_duty_cycle(false).unwrap();
    assert_eq!(node.is_duty_cycle_enabled(), Ok(false));
    assert_eq!(node.mac().duty_cycle_on, Some(false));
}

#[test]
fn test_set_tx_data_rate_without_adr() {
    let mut node = create_test_node();
    node.initialize(NodeConfig::new(Region::EU868).with_adr(false))
        .unwrap();

    assert_eq!(node.set_tx_data_rate(4), Ok(true));
    assert_eq!(node.tx_data_rate(), Ok(4));
}

#[test]
fn test_disabling_adr_unlocks_data_rate() {
    let mut node = initialized_node();
    assert_eq!(node.is_adr_enabled(), Ok(true));
    assert_eq!(node.set_tx_data_rate(4), Ok(false));

    node.enable_adr(false).unwrap();

    assert!(!node.mac().adr);
    assert_eq!(node.is_adr_enabled(), Ok(false));
    assert_eq!(node.set_tx_data_rate(4), Ok(true));
    assert_eq!(node.tx_data_rate(), Ok(4));

    node.enable_adr(true).unwrap();
    assert_eq!(node.is_adr_enabled(), Ok(true));
    assert_eq!(node.set_tx_data_rate(2), Ok(false));
}

#[test]
fn test_failed_adr_write_keeps_setting() {
    let mut node = initialized_node();
    node.mac_mut().failing_mib = Some(MibType::Adr);

    assert_eq!(
        node.enable_adr(false),
        Err(SessionError::Attribute(MacStatus::ParameterInvalid))
    );
    assert_eq!(node.is_adr_enabled(), Ok(true));
}

#[test]
fn test_dev_addr_is_fixed_once_joined() {
    let mut node = initialized_node();

    node.set_dev_addr(0x1111_2222).unwrap();
    node.join(JoinMode::Abp).unwrap();
    assert!(node.mac().mib_writes.contains(&Mib::DevAddr(0x1111_2222)));

    assert_eq!(
        node.set_dev_addr(0x3333_4444),
        Err(SessionError::InvalidParameter)
    );
    assert_eq!(node.dev_addr(), Ok(0x1111_2222));
}

#[test]
fn test_beacon_state_tracking() {
    let mut node = joined_node();
    assert_eq!(node.beacon_state(), Ok(BeaconState::Unknown));

    node.request_class(DeviceClass::B).unwrap();
    assert_eq!(node.beacon_state(), Ok(BeaconState::Acquisition));

    node.mac_mut().confirm(Mlme::DeviceTime, EventStatus::Ok);
    node.mac_mut().confirm(Mlme::BeaconAcquisition, EventStatus::Ok);
    node.process().unwrap();
    assert_eq!(node.beacon_state(), Ok(BeaconState::Locked));

    node.mac_mut().confirm(Mlme::PingSlotInfo, EventStatus::Ok);
    node.mac_mut().beacon(EventStatus::Ok, 1_300_000_000);
    node.process().unwrap();
    assert_eq!(node.beacon_state(), Ok(BeaconState::Locked));
    assert!(matches!(
        node.events().events.last(),
        Some(Event::Beacon(params)) if params.status == EventStatus::Ok
    ));

    // A missed beacon does not drop the lock
    node.mac_mut().beacon(EventStatus::BeaconNotFound, 0);
    node.process().unwrap();
    assert_eq!(node.beacon_state(), Ok(BeaconState::Locked));

    node.mac_mut().lose_beacon();
    node.process().unwrap();
    assert_eq!(node.beacon_state(), Ok(BeaconState::Lost));
    assert_eq!(node.current_class(), Ok(DeviceClass::A));
    assert_eq!(
        node.session().map(|session| session.beacon_state()),
        Some(BeaconState::Lost)
    );
}

#[test]
fn test_ping_periodicity_locked_during_class_b_entry() {
    let mut node = joined_node();
    assert!(node.set_ping_periodicity(3));
    node.request_class(DeviceClass::B).unwrap();

    assert!(!node.set_ping_periodicity(6));
    assert_eq!(node.ping_periodicity().map(|p| p.value()), Ok(3));

    node.mac_mut().confirm(Mlme::DeviceTime, EventStatus::Ok);
    node.mac_mut().confirm(Mlme::BeaconAcquisition, EventStatus::Ok);
    node.process().unwrap();
    let periodicity = PingPeriodicity::new(3).unwrap();
    assert_eq!(
        node.mac().count_mlme(MlmeRequest::PingSlotInfo { periodicity }),
        1
    );

    // Allowed again once the entry is abandoned
    node.mac_mut().lose_beacon();
    node.process().unwrap();
    assert!(node.set_ping_periodicity(6));
}
