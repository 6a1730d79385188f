//! Four-mode button menu.
//!
//! ```text
//!  Closed ──OK──▶ Browse ──OK──▶ TimeZone | SetAlarm | ViewAlarms | DeleteAlarm
//!    ▲              │  ▲                         │
//!    └───CANCEL─────┘  └──────── done / CANCEL ──┘
//! ```
//!
//! The menu is a plain state machine advanced by at most one button press
//! per tick; nothing in here waits.  Editors work on local copies and only
//! produce an [`AppCommand`] when the user confirms, so cancelling an edit
//! leaves the alarms and the clock untouched.
//!
//! UP/DOWN wrap in every editor: hours mod 24, alarm minutes mod 60, time
//! zone minutes in 15 minute steps.

use crate::alarm::AlarmRegistry;
use crate::app::commands::AppCommand;
use crate::config::ALARM_COUNT;
use crate::drivers::button::{Button, Presses};
use crate::screen::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    SetTimeZone = 0,
    SetAlarms = 1,
    ViewAlarms = 2,
    DeleteAlarm = 3,
}

impl Mode {
    pub const COUNT: u8 = 4;

    pub fn from_index(i: u8) -> Self {
        match i % Self::COUNT {
            0 => Self::SetTimeZone,
            1 => Self::SetAlarms,
            2 => Self::ViewAlarms,
            _ => Self::DeleteAlarm,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SetTimeZone => "Set Time Zone",
            Self::SetAlarms => "Set Alarms",
            Self::ViewAlarms => "View Alarms",
            Self::DeleteAlarm => "Delete Alarm",
        }
    }

    fn next(self) -> Self {
        Self::from_index(self as u8 + 1)
    }

    fn prev(self) -> Self {
        Self::from_index(self as u8 + Self::COUNT - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Closed,
    Browse,
    TimeZone { hour: u8, minute: u8, editing_minute: bool },
    SetAlarm { index: usize, hour: u8, minute: u8, editing_minute: bool },
    ViewAlarms { until_ms: u64 },
    DeleteAlarm { selected: usize },
}

pub struct Menu {
    page: Page,
    /// Highlighted mode; kept across opens.
    mode: Mode,
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

impl Menu {
    pub fn new() -> Self {
        Self {
            page: Page::Closed,
            mode: Mode::SetTimeZone,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.page != Page::Closed
    }

    /// Advance the menu by one tick.  Only the highest-priority press is
    /// acted on.  Returns a command when an edit is confirmed.
    pub fn handle(
        &mut self,
        presses: Presses,
        now_ms: u64,
        alarms: &AlarmRegistry<ALARM_COUNT>,
        view_ms: u32,
    ) -> Option<AppCommand> {
        if let Page::ViewAlarms { until_ms } = self.page {
            if now_ms >= until_ms {
                self.page = Page::Browse;
            }
            return None;
        }

        let button = presses.primary()?;
        let (page, command) = match self.page {
            Page::Closed => (if button == Button::Ok { Page::Browse } else { Page::Closed }, None),
            Page::Browse => (self.browse(button, now_ms, alarms, view_ms), None),
            Page::TimeZone { hour, minute, editing_minute } => time_zone(button, hour, minute, editing_minute),
            Page::SetAlarm { index, hour, minute, editing_minute } => {
                set_alarm(button, index, hour, minute, editing_minute, alarms)
            }
            Page::DeleteAlarm { selected } => delete_alarm(button, selected),
            Page::ViewAlarms { .. } => (self.page, None),
        };
        self.page = page;
        command
    }

    fn browse(&mut self, button: Button, now_ms: u64, alarms: &AlarmRegistry<ALARM_COUNT>, view_ms: u32) -> Page {
        match button {
            Button::Cancel => Page::Closed,
            Button::Up => {
                self.mode = self.mode.next();
                Page::Browse
            }
            Button::Down => {
                self.mode = self.mode.prev();
                Page::Browse
            }
            Button::Ok => match self.mode {
                Mode::SetTimeZone => Page::TimeZone { hour: 0, minute: 0, editing_minute: false },
                Mode::SetAlarms => alarm_editor(0, alarms),
                Mode::ViewAlarms => Page::ViewAlarms { until_ms: now_ms + u64::from(view_ms) },
                Mode::DeleteAlarm => Page::DeleteAlarm { selected: 0 },
            },
        }
    }

    /// Screen for the current page, or `None` when closed.
    pub fn render(&self, alarms: &AlarmRegistry<ALARM_COUNT>) -> Option<Screen> {
        let mut s = Screen::new();
        match self.page {
            Page::Closed => return None,
            Page::Browse => {
                s.push(self.mode.label(), 2, 0, 0);
            }
            Page::TimeZone { hour, minute, .. } => {
                s.push("Set UTC Offset:", 1, 0, 0);
                s.push_fmt(format_args!("{}h {}m", hour, minute), 2, 20, 0);
            }
            Page::SetAlarm { index, hour, minute, editing_minute } => {
                s.push_fmt(format_args!("Set Alarm {}", index + 1), 1, 0, 0);
                if editing_minute {
                    s.push_fmt(format_args!("Min: {}", minute), 2, 20, 0);
                } else {
                    s.push_fmt(format_args!("Hour: {}", hour), 2, 20, 0);
                }
            }
            Page::ViewAlarms { .. } => {
                s.push("Active Alarms:", 1, 0, 0);
                for (i, a) in alarms.iter().filter(|(_, a)| a.active) {
                    s.push_fmt(format_args!("{}: {}:{}", i + 1, a.hour, a.minute), 1, 10 + (i as u8) * 10, 0);
                }
            }
            Page::DeleteAlarm { selected } => {
                s.push("Delete Alarm:", 1, 0, 0);
                s.push_fmt(format_args!("Alarm {}", selected + 1), 2, 20, 0);
            }
        }
        Some(s)
    }
}

// ── Editors ───────────────────────────────────────────────────

fn wrap_add(value: u8, step: u8, modulus: u8) -> u8 {
    ((u16::from(value) + u16::from(step)) % u16::from(modulus)) as u8
}

fn wrap_sub(value: u8, step: u8, modulus: u8) -> u8 {
    ((u16::from(value) + u16::from(modulus) - u16::from(step)) % u16::from(modulus)) as u8
}

fn time_zone(button: Button, hour: u8, minute: u8, editing_minute: bool) -> (Page, Option<AppCommand>) {
    let page = |hour, minute, editing_minute| Page::TimeZone { hour, minute, editing_minute };
    match (button, editing_minute) {
        (Button::Cancel, _) => (Page::Browse, None),
        (Button::Up, false) => (page(wrap_add(hour, 1, 24), minute, false), None),
        (Button::Down, false) => (page(wrap_sub(hour, 1, 24), minute, false), None),
        (Button::Ok, false) => (page(hour, minute, true), None),
        (Button::Up, true) => (page(hour, wrap_add(minute, 15, 60), true), None),
        (Button::Down, true) => (page(hour, wrap_sub(minute, 15, 60), true), None),
        (Button::Ok, true) => {
            let offset = i32::from(hour) * 3600 + i32::from(minute) * 60;
            (Page::Browse, Some(AppCommand::SetUtcOffset(offset)))
        }
    }
}

/// Editor for alarm `index`, seeded with its current time.
fn alarm_editor(index: usize, alarms: &AlarmRegistry<ALARM_COUNT>) -> Page {
    let (hour, minute) = alarms.get(index).map_or((0, 0), |a| (a.hour, a.minute));
    Page::SetAlarm { index, hour, minute, editing_minute: false }
}

/// Alarms are edited one after another; CANCEL skips the current one.
fn set_alarm(
    button: Button,
    index: usize,
    hour: u8,
    minute: u8,
    editing_minute: bool,
    alarms: &AlarmRegistry<ALARM_COUNT>,
) -> (Page, Option<AppCommand>) {
    let next = || if index + 1 < ALARM_COUNT { alarm_editor(index + 1, alarms) } else { Page::Browse };
    let page = |hour, minute, editing_minute| Page::SetAlarm { index, hour, minute, editing_minute };
    match (button, editing_minute) {
        (Button::Cancel, _) => (next(), None),
        (Button::Up, false) => (page(wrap_add(hour, 1, 24), minute, false), None),
        (Button::Down, false) => (page(wrap_sub(hour, 1, 24), minute, false), None),
        (Button::Ok, false) => (page(hour, minute, true), None),
        (Button::Up, true) => (page(hour, wrap_add(minute, 1, 60), true), None),
        (Button::Down, true) => (page(hour, wrap_sub(minute, 1, 60), true), None),
        (Button::Ok, true) => (next(), Some(AppCommand::ConfigureAlarm { index, hour, minute })),
    }
}

fn delete_alarm(button: Button, selected: usize) -> (Page, Option<AppCommand>) {
    match button {
        Button::Cancel => (Page::Browse, None),
        Button::Up => (Page::DeleteAlarm { selected: (selected + 1) % ALARM_COUNT }, None),
        Button::Down => (Page::DeleteAlarm { selected: (selected + ALARM_COUNT - 1) % ALARM_COUNT }, None),
        Button::Ok => (Page::Browse, Some(AppCommand::DeleteAlarm(selected))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(menu: &mut Menu, b: Button, alarms: &AlarmRegistry<ALARM_COUNT>) -> Option<AppCommand> {
        menu.handle(Presses::single(b), 0, alarms, 3000)
    }

    #[test]
    fn ok_opens_and_cancel_closes() {
        let alarms = AlarmRegistry::new();
        let mut m = Menu::new();
        assert!(press(&mut m, Button::Up, &alarms).is_none());
        assert!(!m.is_open());
        press(&mut m, Button::Ok, &alarms);
        assert_eq!(m.page(), Page::Browse);
        assert!(m.render(&alarms).unwrap().contains("Set Time Zone"));
        press(&mut m, Button::Cancel, &alarms);
        assert!(!m.is_open());
        assert!(m.render(&alarms).is_none());
    }

    #[test]
    fn mode_wraps_both_ways_and_persists() {
        let alarms = AlarmRegistry::new();
        let mut m = Menu::new();
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Down, &alarms);
        assert_eq!(m.mode(), Mode::DeleteAlarm);
        press(&mut m, Button::Up, &alarms);
        press(&mut m, Button::Up, &alarms);
        assert_eq!(m.mode(), Mode::SetAlarms);
        press(&mut m, Button::Cancel, &alarms);
        press(&mut m, Button::Ok, &alarms);
        assert_eq!(m.mode(), Mode::SetAlarms);
    }

    #[test]
    fn time_zone_editor_emits_offset() {
        let alarms = AlarmRegistry::new();
        let mut m = Menu::new();
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Ok, &alarms);
        for _ in 0..5 {
            press(&mut m, Button::Up, &alarms);
        }
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Down, &alarms);
        press(&mut m, Button::Down, &alarms);
        let screen = m.render(&alarms).unwrap();
        assert!(screen.contains("5h 30m"));
        let cmd = press(&mut m, Button::Ok, &alarms);
        assert!(matches!(cmd, Some(AppCommand::SetUtcOffset(19_800))));
        assert_eq!(m.page(), Page::Browse);
    }

    #[test]
    fn time_zone_hour_wraps_down() {
        let alarms = AlarmRegistry::new();
        let mut m = Menu::new();
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Down, &alarms);
        assert!(m.render(&alarms).unwrap().contains("23h 0m"));
    }

    #[test]
    fn set_alarms_walks_every_slot() {
        let alarms = AlarmRegistry::new();
        let mut m = Menu::new();
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Up, &alarms);
        press(&mut m, Button::Ok, &alarms);
        assert!(m.render(&alarms).unwrap().contains("Set Alarm 1"));

        press(&mut m, Button::Down, &alarms); // 23
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Down, &alarms); // 59
        assert!(m.render(&alarms).unwrap().contains("Min: 59"));
        let cmd = press(&mut m, Button::Ok, &alarms);
        assert!(matches!(cmd, Some(AppCommand::ConfigureAlarm { index: 0, hour: 23, minute: 59 })));
        assert!(m.render(&alarms).unwrap().contains("Set Alarm 2"));

        assert!(press(&mut m, Button::Cancel, &alarms).is_none());
        assert_eq!(m.page(), Page::Browse);
    }

    #[test]
    fn alarm_editor_starts_from_current_time() {
        let mut alarms = AlarmRegistry::new();
        alarms.configure(0, 7, 45);
        let mut m = Menu::new();
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Up, &alarms);
        press(&mut m, Button::Ok, &alarms);
        assert!(m.render(&alarms).unwrap().contains("Hour: 7"));
    }

    #[test]
    fn view_alarms_times_out() {
        let mut alarms = AlarmRegistry::new();
        alarms.configure(1, 9, 5);
        let mut m = Menu::new();
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Down, &alarms);
        press(&mut m, Button::Down, &alarms);
        m.handle(Presses::single(Button::Ok), 1_000, &alarms, 3000);
        let screen = m.render(&alarms).unwrap();
        assert!(screen.contains("Active Alarms:"));
        assert!(screen.contains("2: 9:5"));
        assert_eq!(screen.lines()[1].row, 20);

        m.handle(Presses::single(Button::Cancel), 3_999, &alarms, 3000);
        assert!(matches!(m.page(), Page::ViewAlarms { .. }));
        m.handle(Presses::NONE, 4_000, &alarms, 3000);
        assert_eq!(m.page(), Page::Browse);
    }

    #[test]
    fn delete_selects_and_emits() {
        let alarms = AlarmRegistry::new();
        let mut m = Menu::new();
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Down, &alarms);
        press(&mut m, Button::Ok, &alarms);
        press(&mut m, Button::Down, &alarms);
        assert!(m.render(&alarms).unwrap().contains("Alarm 2"));
        let cmd = press(&mut m, Button::Ok, &alarms);
        assert!(matches!(cmd, Some(AppCommand::DeleteAlarm(1))));
    }
}
