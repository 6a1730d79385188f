//! Concrete ringer state handlers and table builder.
//!
//! Each state is defined by three plain `fn` pointers, with no closures,
//! dynamic dispatch or heap.
//!
//! ```text
//!  IDLE ──[alarm pending]──▶ RINGING ──[CANCEL]──▶ CANCELLED ──[next tick]──▶ IDLE
//!    ▲                          │
//!    │                        [OK]
//!    │                          ▼
//!    └──[banner shown]───── SNOOZED
//! ```
//!
//! CANCEL is checked before OK, so pressing both cancels.

use super::context::{RingerContext, RingerOutputs};
use super::{StateDescriptor, StateId};
use crate::drivers::button::Button;
use log::{info, warn};

/// Buzzer melody, one note per step, repeated while ringing.
pub const NOTES: [u16; 8] = [220, 294, 330, 349, 494, 440, 450, 523];

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: StateId::Ringing,
            name: "Ringing",
            on_enter: Some(ringing_enter),
            on_exit: Some(ringing_exit),
            on_update: ringing_update,
        },
        StateDescriptor {
            id: StateId::Snoozed,
            name: "Snoozed",
            on_enter: Some(snoozed_enter),
            on_exit: None,
            on_update: snoozed_update,
        },
        StateDescriptor {
            id: StateId::Cancelled,
            name: "Cancelled",
            on_enter: Some(cancelled_enter),
            on_exit: None,
            on_update: cancelled_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut RingerContext) {
    ctx.outputs = RingerOutputs::all_off();
    ctx.ringing = None;
    ctx.snoozed_to = None;
}

fn idle_update(ctx: &mut RingerContext) -> Option<StateId> {
    ctx.pending.map(|_| StateId::Ringing)
}

// ═══════════════════════════════════════════════════════════════════════════
//  RINGING: melody plays, indicator lit, waiting for CANCEL or OK
// ═══════════════════════════════════════════════════════════════════════════

fn ringing_enter(ctx: &mut RingerContext) {
    ctx.ringing = ctx.pending.take();
    ctx.snoozed_to = None;
    let Some(index) = ctx.ringing else {
        warn!("RINGING: entered with no alarm pending");
        return;
    };

    ctx.alarms.mark_fired(index);
    ctx.tone_step = 0;
    ctx.tone_step_started_ms = ctx.now_ms;
    ctx.outputs = RingerOutputs {
        indicator: true,
        tone_hz: Some(NOTES[0]),
    };
    info!("RINGING: alarm {} - Medicine Time!", index + 1);
}

fn ringing_exit(ctx: &mut RingerContext) {
    ctx.outputs = RingerOutputs::all_off();
}

fn ringing_update(ctx: &mut RingerContext) -> Option<StateId> {
    if ctx.ringing.is_none() {
        return Some(StateId::Idle);
    }

    if ctx.presses.contains(Button::Cancel) {
        return Some(StateId::Cancelled);
    }
    if ctx.presses.contains(Button::Ok) {
        return Some(StateId::Snoozed);
    }

    advance_tone(ctx);
    None
}

/// Step through the melody: each note sounds for `tone_step_ms`, then the
/// buzzer is silent for `tone_gap_ms` before the next note.
fn advance_tone(ctx: &mut RingerContext) {
    let period = ctx.timing.step_period_ms();
    if ctx.now_ms.saturating_sub(ctx.tone_step_started_ms) >= period {
        ctx.tone_step = (ctx.tone_step + 1) % NOTES.len();
        ctx.tone_step_started_ms += period;
        // Fell more than a step behind; restart the step now.
        if ctx.now_ms.saturating_sub(ctx.tone_step_started_ms) >= period {
            ctx.tone_step_started_ms = ctx.now_ms;
        }
    }

    let into_step = ctx.now_ms.saturating_sub(ctx.tone_step_started_ms);
    ctx.outputs.tone_hz = if into_step < u64::from(ctx.timing.tone_step_ms) {
        Some(NOTES[ctx.tone_step])
    } else {
        None
    };
}

// ═══════════════════════════════════════════════════════════════════════════
//  SNOOZED: alarm pushed back, new time on screen for a moment
// ═══════════════════════════════════════════════════════════════════════════

fn snoozed_enter(ctx: &mut RingerContext) {
    if let Some(index) = ctx.ringing {
        let (h, m) = ctx.alarms.snooze(index, u32::from(ctx.timing.snooze_minutes));
        ctx.snoozed_to = Some((h, m));
        info!("SNOOZED: alarm {} moved to {}:{:02}", index + 1, h, m);
    }
}

fn snoozed_update(ctx: &mut RingerContext) -> Option<StateId> {
    if ctx.ms_in_state() >= u64::from(ctx.timing.snooze_display_ms) {
        return Some(StateId::Idle);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CANCELLED: alarm dismissed and disarmed
// ═══════════════════════════════════════════════════════════════════════════

fn cancelled_enter(ctx: &mut RingerContext) {
    if let Some(index) = ctx.ringing {
        ctx.alarms.cancel(index);
        info!("CANCELLED: alarm {} dismissed", index + 1);
    }
}

fn cancelled_update(_ctx: &mut RingerContext) -> Option<StateId> {
    Some(StateId::Idle)
}
