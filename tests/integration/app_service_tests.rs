//! Integration tests for the AppService pipeline outside the ringer:
//! clock screen, light publishing, vent control, environment alerts,
//! telemetry and display handling.

use super::mock_hw::{Rig, TICK_MS};

use medibox::app::events::AppEvent;
use medibox::error::CommsError;
use medibox::fsm::StateId;
use medibox::sensors::climate::ClimateReading;

/// Default sending interval (120 s) plus one tick.
const FIRST_WINDOW_MS: u64 = 120_000 + TICK_MS;

#[test]
fn start_emits_event_and_idles() {
    let rig = Rig::new();
    assert_eq!(rig.app.ringer_state(), StateId::Idle);
    assert_eq!(rig.sink.events[0], AppEvent::Started { ringer: StateId::Idle, synced: false });
}

#[test]
fn clock_screen_shows_local_date_and_time() {
    let mut rig = Rig::new();
    rig.set_wall_clock(7, 3, 9);
    rig.tick();
    let s = rig.screen();
    assert_eq!(s.lines()[0].text.as_str(), "5/1/2025");
    assert_eq!(s.lines()[1].text.as_str(), "7:3:9");
}

#[test]
fn utc_offset_shifts_displayed_time() {
    // Default config: UTC+05:30.
    let mut rig = Rig::with_config(medibox::config::SystemConfig::default());
    rig.set_wall_clock(22, 0, 0);
    rig.tick();
    assert_eq!(rig.app.clock().hour, 3);
    assert_eq!(rig.app.clock().minute, 30);
    assert_eq!(rig.app.clock().day, 6);
}

#[test]
fn screen_pushed_only_on_change() {
    let mut rig = Rig::new();
    rig.set_wall_clock(12, 0, 0);
    rig.run_for(2_000);
    // One push per displayed second, not one per tick.
    assert!(rig.display.shown.len() <= 4, "pushed {} screens", rig.display.shown.len());
}

#[test]
fn display_failure_is_retried() {
    let mut rig = Rig::new();
    rig.display.fail = true;
    rig.run_for(500);
    assert!(rig.app.screen().is_none());
    rig.display.fail = false;
    rig.tick();
    assert!(rig.app.screen().is_some());
}

#[test]
fn publishes_mean_intensity_with_two_decimals() {
    let mut rig = Rig::new();
    rig.hw.light = 0.5;
    rig.run_for(FIRST_WINDOW_MS);

    assert_eq!(rig.link.published.len(), 1);
    let (topic, payload) = &rig.link.published[0];
    assert_eq!(topic, "medibox_220146A/intensity");
    assert_eq!(payload, "0.50");
    assert!(rig.sink.has(|e| matches!(e, AppEvent::IntensityPublished(_))));
    assert!((rig.app.last_intensity() - 0.5).abs() < 1e-6);
    // 120 s window sampled every 5 s.
    assert_eq!(rig.hw.light_reads, 24);
}

#[test]
fn publish_failure_is_reported_not_retried() {
    let mut rig = Rig::new();
    rig.link.connected = false;
    rig.run_for(FIRST_WINDOW_MS);
    assert!(rig.link.published.is_empty());
    assert!(rig.sink.has(|e| *e == AppEvent::PublishFailed(CommsError::MqttPublishFailed)));

    rig.link.connected = true;
    rig.run_for(10_000);
    assert!(rig.link.published.is_empty(), "the dropped window is not replayed");
}

#[test]
fn vent_follows_formula_each_window() {
    let mut rig = Rig::new();
    rig.hw.light = 0.5;
    rig.hw.climate = Some(ClimateReading { temperature_c: 30.0, humidity_pct: 70.0 });
    rig.run_for(FIRST_WINDOW_MS);
    // θ ≈ −148.8° clamps to the closed end.
    assert_eq!(rig.hw.servo_moves(), vec![0]);
    assert_eq!(rig.app.vent_angle(), Some(0));

    rig.hw.light = 0.0;
    rig.run_for(120_000);
    assert_eq!(rig.hw.servo_moves(), vec![0, 30]);
    assert!(rig.sink.has(|e| *e == AppEvent::VentMoved(30)));
}

#[test]
fn vent_holds_without_temperature() {
    let mut rig = Rig::new();
    rig.hw.climate = None;
    rig.run_for(FIRST_WINDOW_MS);
    assert!(rig.hw.servo_moves().is_empty());
    assert!(rig.sink.has(|e| matches!(e, AppEvent::VentHeld(_))));
    assert_eq!(rig.app.vent_angle(), None);
}

#[test]
fn environment_alerts_drive_warning_led_and_screen() {
    let mut rig = Rig::new();
    rig.set_wall_clock(10, 0, 0);
    rig.tick();
    assert!(!rig.hw.warning_led());
    assert!(!rig.app.env_status().warning_on());

    rig.hw.climate = Some(ClimateReading { temperature_c: 35.0, humidity_pct: 70.0 });
    rig.tick();
    assert!(rig.hw.warning_led());
    assert!(rig.app.env_status().temperature_alert());
    assert!(rig.screen().contains("Temp Alert!"));
    assert!(!rig.screen().contains("Humidity Alert!"));

    rig.hw.climate = Some(ClimateReading { temperature_c: 28.0, humidity_pct: 90.0 });
    rig.tick();
    assert!(rig.hw.warning_led());
    assert!(rig.screen().contains("Humidity Alert!"));
    assert!(!rig.screen().contains("Temp Alert!"));

    rig.hw.climate = Some(ClimateReading { temperature_c: 28.0, humidity_pct: 70.0 });
    rig.tick();
    assert!(!rig.hw.warning_led());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::EnvAlertChanged(_))), 3);
}

#[test]
fn telemetry_is_periodic() {
    let mut rig = Rig::new();
    rig.set_wall_clock(10, 0, 0);
    rig.run_for(60_000);
    let telemetry: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(telemetry.len(), 1);
    assert!(telemetry[0].synced);
    assert!(telemetry[0].mqtt_connected);
    assert_eq!(telemetry[0].ringer, StateId::Idle);
    assert_eq!(telemetry[0].climate.map(|c| c.temperature_c), Some(28.0));
}

#[test]
fn tick_count_advances() {
    let mut rig = Rig::new();
    rig.run_for(1_000);
    assert_eq!(rig.app.tick_count(), 1_000 / TICK_MS);
}
