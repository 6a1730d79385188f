//! Control loop behaviour while the network is down: WiFi and MQTT are
//! polled every iteration the way `main` does, and the alarm, sampler and
//! display keep running regardless.

use super::mock_hw::{Rig, TICK_MS};

use medibox::adapters::mqtt::{LinkState, MqttLink};
use medibox::adapters::wifi::{CONNECT_TIMEOUT_MS, WifiLink, WifiState};
use medibox::app::commands::AppCommand;
use medibox::app::events::AppEvent;
use medibox::app::ports::PublishPort;
use medibox::drivers::button::Button;
use medibox::fsm::StateId;

struct Links {
    wifi: WifiLink,
    mqtt: MqttLink,
}

impl Links {
    fn new() -> Self {
        Self {
            wifi: WifiLink::new("MediNet", "password1", 5).unwrap(),
            mqtt: MqttLink::new("mqtt://broker.test:1883", "medibox_220146A", 5),
        }
    }
}

/// One pass of the device loop: links first, then the service tick.
fn iterate(rig: &mut Rig, links: &mut Links) {
    let network_up = links.wifi.poll(rig.now_ms);
    links.mqtt.poll(rig.now_ms, network_up);
    rig.link.connected = links.mqtt.is_connected();
    rig.tick();
}

fn run_loop(rig: &mut Rig, links: &mut Links, ms: u64) {
    let end = rig.now_ms + ms;
    while rig.now_ms < end {
        iterate(rig, links);
    }
}

#[test]
fn alarm_rings_and_cancels_with_access_point_down() {
    let mut rig = Rig::new();
    let mut links = Links::new();
    links.wifi.set_sim_ap(false);
    rig.app
        .handle_command(AppCommand::ConfigureAlarm { index: 0, hour: 6, minute: 30 }, &mut rig.time, &mut rig.sink);
    rig.set_wall_clock(6, 29, 58);

    let ticks_before = rig.app.tick_count();
    run_loop(&mut rig, &mut links, 3_000);
    assert_eq!(rig.app.tick_count() - ticks_before, 3_000 / TICK_MS);
    assert_eq!(rig.app.ringer_state(), StateId::Ringing);
    assert_eq!(links.wifi.state(), WifiState::Connecting);

    // Long enough for several abandoned associations.
    run_loop(&mut rig, &mut links, 2 * CONNECT_TIMEOUT_MS + 10_000);
    assert!(links.wifi.attempts() >= 2);
    assert!(!links.wifi.is_connected());
    assert_eq!(links.mqtt.state(), LinkState::Offline);
    assert_eq!(rig.app.ringer_state(), StateId::Ringing);
    assert!(rig.hw.tone_sequence().len() > 8, "melody kept stepping");

    rig.hw.held[Button::Cancel as usize] = true;
    iterate(&mut rig, &mut links);
    rig.hw.held[Button::Cancel as usize] = false;
    run_loop(&mut rig, &mut links, 250);
    assert!(rig.sink.has(|e| *e == AppEvent::AlarmCancelled { index: 0 }));
    assert_eq!(rig.app.ringer_state(), StateId::Idle);
}

#[test]
fn outage_skips_publishes_then_recovers() {
    let mut rig = Rig::new();
    let mut links = Links::new();
    links.wifi.set_sim_ap(false);
    rig.set_wall_clock(12, 0, 0);

    // First send window closes at 120 s with the network down.
    run_loop(&mut rig, &mut links, 121_000);
    assert!(rig.sink.has(|e| matches!(e, AppEvent::PublishFailed(_))));
    assert!(rig.link.published.is_empty());
    assert!(rig.screen().contains("12:2:1"));

    links.wifi.set_sim_ap(true);
    run_loop(&mut rig, &mut links, CONNECT_TIMEOUT_MS + 5_000);
    assert!(links.wifi.is_connected());
    assert_eq!(links.mqtt.state(), LinkState::Online);
    assert!(links.mqtt.is_connected());
    assert_eq!(links.mqtt.sim_subscriptions().len(), 5);

    run_loop(&mut rig, &mut links, 120_000);
    assert!(rig.link.published.iter().any(|(t, _)| t == "medibox_220146A/intensity"));
}
