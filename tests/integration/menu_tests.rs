//! Menu navigation driven by button presses through the AppService.

use super::mock_hw::Rig;

use medibox::app::events::AppEvent;
use medibox::drivers::button::Button;
use medibox::menu::Page;

#[test]
fn ok_opens_menu_and_cancel_returns_to_clock() {
    let mut rig = Rig::new();
    rig.set_wall_clock(9, 0, 0);
    rig.press(Button::Ok);
    assert_eq!(rig.app.menu_page(), Page::Browse);
    assert!(rig.screen().contains("Set Time Zone"));

    rig.press(Button::Down);
    assert!(rig.screen().contains("Delete Alarm"));

    rig.press(Button::Cancel);
    assert_eq!(rig.app.menu_page(), Page::Closed);
    assert!(rig.screen().contains("5/1/2025"));
}

#[test]
fn set_time_zone_applies_offset_and_resyncs() {
    let mut rig = Rig::new();
    rig.set_wall_clock(9, 0, 0);
    rig.press(Button::Ok);
    rig.press(Button::Ok);
    for _ in 0..5 {
        rig.press(Button::Up);
    }
    rig.press(Button::Ok);
    rig.press(Button::Up);
    rig.press(Button::Up);
    assert!(rig.screen().contains("5h 30m"));
    rig.press(Button::Ok);

    assert!(rig.sink.has(|e| *e == AppEvent::UtcOffsetChanged(19_800)));
    assert_eq!(rig.app.utc_offset_secs(), 19_800);
    assert_eq!(rig.time.resyncs, 1);
    assert_eq!(rig.app.clock().hour, 14);
    assert_eq!(rig.app.menu_page(), Page::Browse);
}

#[test]
fn set_alarms_walks_both_slots() {
    let mut rig = Rig::new();
    rig.press(Button::Ok);
    rig.press(Button::Up);
    rig.press(Button::Ok);
    assert!(rig.screen().contains("Set Alarm 1"));

    // Alarm 1: 02:58, minutes wrap downwards from 00.
    rig.press(Button::Up);
    rig.press(Button::Up);
    rig.press(Button::Ok);
    rig.press(Button::Down);
    rig.press(Button::Down);
    assert!(rig.screen().contains("Min: 58"));
    rig.press(Button::Ok);
    assert!(rig.sink.has(|e| *e == AppEvent::AlarmConfigured { index: 0, hour: 2, minute: 58 }));

    // Alarm 2 skipped.
    assert!(rig.screen().contains("Set Alarm 2"));
    rig.press(Button::Cancel);
    assert_eq!(rig.app.menu_page(), Page::Browse);

    let a0 = rig.app.alarms().get(0).unwrap();
    assert!(a0.active && a0.hour == 2 && a0.minute == 58);
    assert!(!rig.app.alarms().get(1).unwrap().active);
}

#[test]
fn view_alarms_lists_active_then_times_out() {
    let mut rig = Rig::new();
    rig.app.handle_command(
        medibox::app::commands::AppCommand::ConfigureAlarm { index: 1, hour: 7, minute: 5 },
        &mut rig.time,
        &mut rig.sink,
    );
    rig.press(Button::Ok);
    rig.press(Button::Up);
    rig.press(Button::Up);
    rig.press(Button::Ok);
    assert!(rig.screen().contains("Active Alarms:"));
    assert!(rig.screen().contains("2: 7:5"));
    assert!(!rig.screen().lines().iter().any(|l| l.text.starts_with("1:")));

    // Buttons are ignored while the list is shown.
    rig.press(Button::Cancel);
    assert!(matches!(rig.app.menu_page(), Page::ViewAlarms { .. }));

    rig.run_for(3_000);
    assert_eq!(rig.app.menu_page(), Page::Browse);
}

#[test]
fn delete_alarm_deactivates_selected_slot() {
    let mut rig = Rig::new();
    for index in 0..2 {
        rig.app.handle_command(
            medibox::app::commands::AppCommand::ConfigureAlarm { index, hour: 8, minute: 0 },
            &mut rig.time,
            &mut rig.sink,
        );
    }
    rig.press(Button::Ok);
    rig.press(Button::Down);
    rig.press(Button::Ok);
    rig.press(Button::Up);
    assert!(rig.screen().contains("Alarm 2"));
    rig.press(Button::Ok);

    assert!(rig.app.alarms().get(0).unwrap().active);
    assert!(!rig.app.alarms().get(1).unwrap().active);
    assert!(rig.sink.has(|e| *e == AppEvent::AlarmDeleted { index: 1 }));
}
