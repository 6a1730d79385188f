//! Alarm ringing, snoozing and cancelling through the full AppService
//! pipeline: clock → registry → ringer FSM → buzzer/LED/screen.

use super::mock_hw::Rig;

use medibox::app::commands::AppCommand;
use medibox::app::events::AppEvent;
use medibox::drivers::button::Button;
use medibox::fsm::StateId;

fn set_alarm(rig: &mut Rig, index: usize, hour: u8, minute: u8) {
    rig.app
        .handle_command(AppCommand::ConfigureAlarm { index, hour, minute }, &mut rig.time, &mut rig.sink);
}

/// Alarm 0 at 06:30, clock just before it, run into the minute.
fn ringing_rig() -> Rig {
    let mut rig = Rig::new();
    set_alarm(&mut rig, 0, 6, 30);
    rig.set_wall_clock(6, 29, 58);
    rig.run_for(2_500);
    assert_eq!(rig.app.ringer_state(), StateId::Ringing);
    rig
}

#[test]
fn alarm_rings_at_matching_minute() {
    let mut rig = Rig::new();
    set_alarm(&mut rig, 0, 6, 30);
    rig.set_wall_clock(6, 29, 58);
    rig.run_for(1_000);
    assert_eq!(rig.app.ringer_state(), StateId::Idle);
    assert!(!rig.hw.alarm_led());

    rig.run_for(1_100);
    assert_eq!(rig.app.ringer_state(), StateId::Ringing);
    assert!(rig.sink.has(|e| *e == AppEvent::AlarmRinging { index: 0 }));
    assert!(rig.hw.alarm_led());
    assert_eq!(rig.hw.tone(), Some(220));
    assert!(rig.screen().contains("Medicine Time!"));
}

#[test]
fn melody_cycles_through_all_notes() {
    let mut rig = ringing_rig();
    rig.run_for(5_000);
    let seq = rig.hw.tone_sequence();
    assert!(seq.len() >= 9, "got {seq:?}");
    assert_eq!(&seq[..9], &[220, 294, 330, 349, 494, 440, 450, 523, 220]);
    assert_eq!(rig.app.ringer_state(), StateId::Ringing, "rings until a button is pressed");
}

#[test]
fn alarm_fires_once_per_minute_match() {
    let mut rig = ringing_rig();
    rig.press(Button::Cancel);
    rig.run_for(20_000);
    assert_eq!(rig.app.ringer_state(), StateId::Idle);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmRinging { .. })), 1);
}

#[test]
fn cancel_silences_and_deactivates() {
    let mut rig = ringing_rig();
    rig.press(Button::Cancel);

    assert!(rig.sink.has(|e| *e == AppEvent::AlarmCancelled { index: 0 }));
    assert_eq!(rig.app.ringer_state(), StateId::Idle);
    assert_eq!(rig.hw.tone(), None);
    assert!(!rig.hw.alarm_led());
    assert!(!rig.app.alarms().get(0).unwrap().active);
    assert!(!rig.screen().contains("Medicine Time!"));
}

#[test]
fn ok_snoozes_five_minutes_and_rings_again() {
    let mut rig = ringing_rig();
    rig.press(Button::Ok);

    assert!(rig.sink.has(|e| *e == AppEvent::AlarmSnoozed { index: 0, hour: 6, minute: 35 }));
    assert_eq!(rig.app.ringer_state(), StateId::Snoozed);
    assert!(rig.screen().contains("Snoozed to:"));
    assert!(rig.screen().contains("6:35"));
    assert_eq!(rig.hw.tone(), None);

    rig.run_for(1_000);
    assert_eq!(rig.app.ringer_state(), StateId::Idle);
    assert!(rig.app.alarms().get(0).unwrap().active);

    rig.set_wall_clock(6, 34, 59);
    rig.run_for(1_500);
    assert_eq!(rig.app.ringer_state(), StateId::Ringing);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmRinging { index: 0 })), 2);
}

#[test]
fn snooze_wraps_past_midnight() {
    let mut rig = Rig::new();
    set_alarm(&mut rig, 1, 23, 58);
    rig.set_wall_clock(23, 57, 59);
    rig.run_for(1_500);
    assert_eq!(rig.app.ringer_state(), StateId::Ringing);

    rig.press(Button::Ok);
    assert!(rig.sink.has(|e| *e == AppEvent::AlarmSnoozed { index: 1, hour: 0, minute: 3 }));
}

#[test]
fn cancel_wins_over_ok_in_same_tick() {
    let mut rig = ringing_rig();
    rig.hw.held[Button::Ok as usize] = true;
    rig.hw.held[Button::Cancel as usize] = true;
    rig.tick();
    assert_eq!(rig.app.ringer_state(), StateId::Cancelled);
}

#[test]
fn simultaneous_alarms_ring_lowest_index_first() {
    let mut rig = Rig::new();
    set_alarm(&mut rig, 1, 8, 0);
    set_alarm(&mut rig, 0, 8, 0);
    rig.set_wall_clock(7, 59, 59);
    rig.run_for(1_500);
    assert!(rig.sink.has(|e| *e == AppEvent::AlarmRinging { index: 0 }));

    rig.press(Button::Cancel);
    rig.run_for(100);
    assert_eq!(rig.app.ringer_state(), StateId::Ringing);
    assert!(rig.sink.has(|e| *e == AppEvent::AlarmRinging { index: 1 }));
}

#[test]
fn deleted_alarm_never_fires() {
    let mut rig = Rig::new();
    set_alarm(&mut rig, 0, 9, 15);
    rig.app.handle_command(AppCommand::DeleteAlarm(0), &mut rig.time, &mut rig.sink);
    rig.set_wall_clock(9, 14, 58);
    rig.run_for(65_000);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlarmRinging { .. })), 0);
    assert!(rig.sink.has(|e| *e == AppEvent::AlarmDeleted { index: 0 }));
}

#[test]
fn nothing_rings_before_time_sync() {
    // An unsynced clock reads 00:00; a midnight alarm must not fire.
    let mut rig = Rig::new();
    set_alarm(&mut rig, 0, 0, 0);
    rig.run_for(3_000);
    assert_eq!(rig.app.ringer_state(), StateId::Idle);
}

#[test]
fn ringing_preempts_open_menu() {
    let mut rig = Rig::new();
    set_alarm(&mut rig, 0, 6, 30);
    rig.set_wall_clock(6, 29, 57);
    rig.press(Button::Ok);
    rig.press(Button::Up);
    let mode = rig.app.menu_page();
    assert!(rig.screen().contains("Set Alarms"));

    rig.run_for(3_000);
    assert_eq!(rig.app.ringer_state(), StateId::Ringing);
    assert!(rig.screen().contains("Medicine Time!"));

    rig.press(Button::Cancel);
    assert_eq!(rig.app.ringer_state(), StateId::Idle);
    assert_eq!(rig.app.menu_page(), mode, "menu resumes where it was");
    assert!(rig.screen().contains("Set Alarms"));
}
