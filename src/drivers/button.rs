//! Four-button front panel with edge detection and debounce lockout.
//!
//! ## Hardware
//!
//! Active-low momentary switches with external pull-ups on GPIO 32–35.
//! The panel itself is pure logic: raw levels come in through
//! [`InputPort`], and `poll()` (called once per control tick) turns them
//! into accepted presses.
//!
//! ## Debounce
//!
//! A press is accepted on the released → pressed edge, and only if at
//! least `debounce_ms` have passed since the last accepted press of the
//! same button.  Contact bounce inside that window is swallowed; holding
//! a button does not repeat.

use crate::app::ports::InputPort;
use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Button {
    Cancel = 0,
    Up = 1,
    Ok = 2,
    Down = 3,
}

impl Button {
    pub const ALL: [Self; 4] = [Self::Cancel, Self::Up, Self::Ok, Self::Down];

    pub const fn gpio(self) -> i32 {
        match self {
            Self::Cancel => pins::CANCEL_GPIO,
            Self::Up => pins::UP_GPIO,
            Self::Ok => pins::OK_GPIO,
            Self::Down => pins::DOWN_GPIO,
        }
    }

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of buttons accepted during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presses(u8);

impl Presses {
    pub const NONE: Self = Self(0);

    pub const fn single(button: Button) -> Self {
        Self(button.bit())
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    pub fn contains(&self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// The one press that wins when several land in the same tick.
    /// CANCEL beats OK beats UP beats DOWN.
    pub fn primary(&self) -> Option<Button> {
        [Button::Cancel, Button::Ok, Button::Up, Button::Down]
            .into_iter()
            .find(|b| self.contains(*b))
    }
}

pub struct ButtonPanel {
    debounce_ms: u32,
    was_down: [bool; 4],
    last_accept_ms: [Option<u64>; 4],
}

impl ButtonPanel {
    pub fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms,
            was_down: [false; 4],
            last_accept_ms: [None; 4],
        }
    }

    /// Sample every button through `input` and return accepted presses.
    pub fn poll(&mut self, now_ms: u64, input: &mut impl InputPort) -> Presses {
        let mut levels = [false; 4];
        for b in Button::ALL {
            levels[b as usize] = input.is_pressed(b);
        }
        self.feed(now_ms, levels)
    }

    /// Run the edge + lockout filter over one sample of raw levels,
    /// indexed by `Button as usize`.
    pub fn feed(&mut self, now_ms: u64, levels: [bool; 4]) -> Presses {
        let mut out = Presses::NONE;
        for b in Button::ALL {
            let i = b as usize;
            let down = levels[i];
            if down && !self.was_down[i] {
                let clear = self.last_accept_ms[i]
                    .is_none_or(|t| now_ms.saturating_sub(t) >= u64::from(self.debounce_ms));
                if clear {
                    self.last_accept_ms[i] = Some(now_ms);
                    out.insert(b);
                }
            }
            self.was_down[i] = down;
        }
        out
    }
}
