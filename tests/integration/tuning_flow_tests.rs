//! Remote tuning over MQTT: inbound queue → AppService → parameters.

use super::mock_hw::Rig;

use medibox::app::commands::AppCommand;
use medibox::app::events::AppEvent;
use medibox::messaging::{self, InboundMessage};
use medibox::tuning::{TuningError, TuningParameters, TuningUpdate};

fn send(rig: &mut Rig, suffix: &str, payload: &str) {
    let topic = messaging::topic("medibox_220146A", suffix);
    let msg = InboundMessage::new(&topic, payload.as_bytes()).expect("fits");
    rig.app.handle_command(AppCommand::Tuning(msg), &mut rig.time, &mut rig.sink);
}

#[test]
fn every_topic_updates_its_parameter() {
    let mut rig = Rig::new();
    send(&mut rig, "/Sampling", "10");
    send(&mut rig, "/Sending", "3");
    send(&mut rig, "/offset", "45.5");
    send(&mut rig, "/control", "0.5");
    send(&mut rig, "/temp", "28");

    let t = rig.app.tuning();
    assert_eq!(t.sampling_interval_s, 10);
    assert_eq!(t.sending_interval_s, 180, "minutes are stored as seconds");
    assert!((t.angle_offset_deg - 45.5).abs() < 1e-6);
    assert!((t.gain_factor - 0.5).abs() < 1e-6);
    assert!((t.target_temperature_c - 28.0).abs() < 1e-6);
    assert!(rig.sink.has(|e| *e == AppEvent::TuningApplied(TuningUpdate::SendingInterval(180))));
}

#[test]
fn malformed_payload_is_rejected_and_ignored() {
    let mut rig = Rig::new();
    send(&mut rig, "/Sampling", "fast");
    send(&mut rig, "/temp", "");
    assert_eq!(*rig.app.tuning(), TuningParameters::default());
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::TuningRejected(TuningError::Malformed)),
        2
    );
}

#[test]
fn out_of_range_payload_is_rejected() {
    let mut rig = Rig::new();
    send(&mut rig, "/Sampling", "0");
    send(&mut rig, "/offset", "200");
    assert_eq!(*rig.app.tuning(), TuningParameters::default());
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::TuningRejected(TuningError::OutOfRange(_)))),
        2
    );
}

#[test]
fn foreign_topic_is_rejected() {
    let mut rig = Rig::new();
    let msg = InboundMessage::new("other_box/Sampling", b"10").unwrap();
    rig.app.handle_command(AppCommand::Tuning(msg), &mut rig.time, &mut rig.sink);
    assert!(rig.sink.has(|e| *e == AppEvent::TuningRejected(TuningError::UnknownTopic)));
}

#[test]
fn new_intervals_drive_sampling_and_publishing() {
    let mut rig = Rig::new();
    send(&mut rig, "/Sampling", "1");
    send(&mut rig, "/Sending", "1");
    rig.run_for(60_000);
    assert_eq!(rig.hw.light_reads, 60);
    assert_eq!(rig.link.published.len(), 1);
}

#[test]
fn empty_window_publishes_nothing() {
    let mut rig = Rig::new();
    send(&mut rig, "/Sampling", "3600");
    send(&mut rig, "/Sending", "1");
    rig.run_for(60_000);
    assert!(rig.link.published.is_empty());
    assert!(rig.sink.has(|e| *e == AppEvent::PublishSkipped));
}

#[test]
fn queued_messages_reach_the_service() {
    let mut rig = Rig::new();
    assert!(messaging::enqueue("medibox_220146A/control", b"1.25"));
    while let Some(msg) = messaging::try_next() {
        rig.app.handle_command(AppCommand::Tuning(msg), &mut rig.time, &mut rig.sink);
    }
    assert!((rig.app.tuning().gain_factor - 1.25).abs() < 1e-6);
}
