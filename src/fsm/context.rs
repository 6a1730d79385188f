//! Shared mutable context threaded through every ringer handler.
//!
//! `RingerContext` is the single struct that state handlers read from and
//! write to: the alarm registry, the presses accepted this tick, the
//! buzzer/indicator outputs and the tone sequencer position.  Think of it
//! as the "blackboard" in a blackboard architecture.

use crate::alarm::AlarmRegistry;
use crate::config::{ALARM_COUNT, SystemConfig};
use crate::drivers::button::Presses;

// ---------------------------------------------------------------------------
// Outputs (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingerOutputs {
    /// Alarm LED.
    pub indicator: bool,
    /// Buzzer frequency, `None` = silent.
    pub tone_hz: Option<u16>,
}

impl RingerOutputs {
    pub fn all_off() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct RingerTiming {
    pub tone_step_ms: u32,
    pub tone_gap_ms: u32,
    pub snooze_display_ms: u32,
    pub snooze_minutes: u8,
}

impl RingerTiming {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            tone_step_ms: config.tone_step_ms,
            tone_gap_ms: config.tone_gap_ms,
            snooze_display_ms: config.snooze_display_ms,
            snooze_minutes: config.snooze_minutes,
        }
    }

    /// One note plus the silence after it.
    pub fn step_period_ms(&self) -> u64 {
        u64::from(self.tone_step_ms) + u64::from(self.tone_gap_ms)
    }
}

// ---------------------------------------------------------------------------
// RingerContext
// ---------------------------------------------------------------------------

pub struct RingerContext {
    // -- Timing --
    /// Monotonic milliseconds, set by the caller before each tick.
    pub now_ms: u64,
    /// `now_ms` at the moment the current state was entered.
    pub state_entered_ms: u64,
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,
    pub timing: RingerTiming,

    // -- Alarms --
    pub alarms: AlarmRegistry<ALARM_COUNT>,
    /// Matched alarm waiting to ring.  Set by the service, consumed on
    /// entering `Ringing`.
    pub pending: Option<usize>,
    /// Alarm currently being handled (ringing, snoozed or cancelled).
    pub ringing: Option<usize>,
    /// New alarm time after a snooze, for the banner.
    pub snoozed_to: Option<(u8, u8)>,

    // -- Inputs --
    /// Presses accepted this tick and routed to the ringer.
    pub presses: Presses,

    // -- Outputs --
    pub outputs: RingerOutputs,
    /// Index into the note sequence.
    pub tone_step: usize,
    pub tone_step_started_ms: u64,
}

impl RingerContext {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            now_ms: 0,
            state_entered_ms: 0,
            ticks_in_state: 0,
            total_ticks: 0,
            timing: RingerTiming::from_config(config),
            alarms: AlarmRegistry::new(),
            pending: None,
            ringing: None,
            snoozed_to: None,
            presses: Presses::NONE,
            outputs: RingerOutputs::all_off(),
            tone_step: 0,
            tone_step_started_ms: 0,
        }
    }

    /// Milliseconds since the current state was entered.
    pub fn ms_in_state(&self) -> u64 {
        self.now_ms.saturating_sub(self.state_entered_ms)
    }
}
