//! Alarm registry.
//!
//! A fixed array of alarm slots; the index is the alarm's identity.  Slots
//! are never removed, only deactivated.
//!
//! ```text
//!   configure ──▶ active, !triggered ──[minute match]──▶ triggered (ringing)
//!                       ▲                                   │
//!                       └──────────── snooze (+N min) ──────┤
//!                                                           └── cancel ──▶ inactive
//! ```

use crate::clock::ClockReading;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Alarm {
    pub hour: u8,
    pub minute: u8,
    pub active: bool,
    /// Set once the alarm has started ringing; cleared by snooze or
    /// reconfiguration.  Stops a single minute-match from re-firing on
    /// every clock poll.
    pub triggered: bool,
}

pub struct AlarmRegistry<const N: usize> {
    alarms: [Alarm; N],
}

impl<const N: usize> Default for AlarmRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AlarmRegistry<N> {
    pub fn new() -> Self {
        Self {
            alarms: [Alarm::default(); N],
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn get(&self, index: usize) -> Option<&Alarm> {
        self.alarms.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Alarm)> {
        self.alarms.iter().enumerate()
    }

    pub fn active_count(&self) -> usize {
        self.alarms.iter().filter(|a| a.active).count()
    }

    /// Arm slot `index` for `hour:minute`.
    ///
    /// Panics on an out-of-range index or time; callers only ever pass
    /// values produced by the menu's wrapping editors.
    pub fn configure(&mut self, index: usize, hour: u8, minute: u8) {
        assert!(index < N, "alarm index {index} out of range");
        assert!(hour < 24 && minute < 60, "invalid alarm time {hour}:{minute}");
        self.alarms[index] = Alarm {
            hour,
            minute,
            active: true,
            triggered: false,
        };
    }

    pub fn deactivate(&mut self, index: usize) {
        self.alarms[index].active = false;
    }

    /// Lowest-index alarm that is armed and matches the current hour and
    /// minute.  Seconds are ignored.
    pub fn evaluate(&self, now: &ClockReading) -> Option<usize> {
        self.alarms
            .iter()
            .position(|a| a.active && !a.triggered && a.hour == now.hour && a.minute == now.minute)
    }

    /// The alarm started ringing.
    pub fn mark_fired(&mut self, index: usize) {
        self.alarms[index].triggered = true;
    }

    /// The user dismissed the alarm.
    pub fn cancel(&mut self, index: usize) {
        let a = &mut self.alarms[index];
        a.triggered = true;
        a.active = false;
    }

    /// Push the alarm `minutes` later and re-arm it.  Returns the new time.
    pub fn snooze(&mut self, index: usize, minutes: u32) -> (u8, u8) {
        let a = &mut self.alarms[index];
        let (h, m) = advance_time(a.hour, a.minute, minutes);
        a.hour = h;
        a.minute = m;
        a.triggered = false;
        (h, m)
    }
}

/// Add `minutes` to `hour:minute`, wrapping at midnight.
pub fn advance_time(hour: u8, minute: u8, minutes: u32) -> (u8, u8) {
    let total = (u32::from(hour) * 60 + u32::from(minute) + minutes) % (24 * 60);
    ((total / 60) as u8, (total % 60) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u8, minute: u8, second: u8) -> ClockReading {
        ClockReading { hour, minute, second, ..ClockReading::default() }
    }

    #[test]
    fn fresh_registry_is_inactive() {
        let r = AlarmRegistry::<2>::new();
        assert_eq!(r.active_count(), 0);
        assert_eq!(r.evaluate(&at(0, 0, 0)), None);
    }

    #[test]
    fn fires_once_per_minute_match() {
        let mut r = AlarmRegistry::<2>::new();
        r.configure(0, 8, 30);
        assert_eq!(r.evaluate(&at(8, 30, 0)), Some(0));
        r.mark_fired(0);
        for s in 0..60 {
            assert_eq!(r.evaluate(&at(8, 30, s)), None);
        }
    }

    #[test]
    fn seconds_are_ignored() {
        let mut r = AlarmRegistry::<2>::new();
        r.configure(1, 12, 0);
        assert_eq!(r.evaluate(&at(12, 0, 59)), Some(1));
        assert_eq!(r.evaluate(&at(12, 1, 0)), None);
    }

    #[test]
    fn lowest_index_wins_on_tie() {
        let mut r = AlarmRegistry::<2>::new();
        r.configure(1, 9, 0);
        r.configure(0, 9, 0);
        assert_eq!(r.evaluate(&at(9, 0, 0)), Some(0));
        r.cancel(0);
        assert_eq!(r.evaluate(&at(9, 0, 10)), Some(1));
    }

    #[test]
    fn deactivated_alarm_never_fires_until_reconfigured() {
        let mut r = AlarmRegistry::<2>::new();
        r.configure(0, 7, 15);
        r.deactivate(0);
        assert_eq!(r.evaluate(&at(7, 15, 0)), None);
        assert_eq!(r.get(0).map(|a| (a.hour, a.minute)), Some((7, 15)));
        r.configure(0, 7, 15);
        assert_eq!(r.evaluate(&at(7, 15, 0)), Some(0));
    }

    #[test]
    fn cancel_disarms() {
        let mut r = AlarmRegistry::<2>::new();
        r.configure(0, 6, 0);
        r.mark_fired(0);
        r.cancel(0);
        let a = r.get(0).copied().unwrap();
        assert!(!a.active);
        assert!(a.triggered);
    }

    #[test]
    fn snooze_rearms_five_minutes_later() {
        let mut r = AlarmRegistry::<2>::new();
        r.configure(0, 10, 0);
        r.mark_fired(0);
        assert_eq!(r.snooze(0, 5), (10, 5));
        assert_eq!(r.evaluate(&at(10, 0, 30)), None);
        assert_eq!(r.evaluate(&at(10, 5, 0)), Some(0));
    }

    #[test]
    fn snooze_wraps_midnight() {
        let mut r = AlarmRegistry::<2>::new();
        r.configure(0, 23, 58);
        assert_eq!(r.snooze(0, 5), (0, 3));
    }

    #[test]
    fn advance_crosses_hour() {
        assert_eq!(advance_time(8, 57, 5), (9, 2));
        assert_eq!(advance_time(0, 0, 24 * 60), (0, 0));
    }

    #[test]
    #[should_panic]
    fn configure_rejects_bad_index() {
        let mut r = AlarmRegistry::<2>::new();
        r.configure(2, 0, 0);
    }

    #[test]
    #[should_panic]
    fn configure_rejects_bad_minute() {
        let mut r = AlarmRegistry::<2>::new();
        r.configure(0, 0, 60);
    }
}
