//! Piezo buzzer on an LEDC channel.
//!
//! A note is a 50 % duty square wave at the note's frequency; silence is
//! duty 0.  The timer is only retuned when the frequency changes.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives LEDC timer 1 / channel 1 via hw_init helpers.
//! On host/test: tracks state in-memory only.

use log::warn;

use crate::drivers::hw_init;
use crate::pins;

const HALF_DUTY: u32 = 1 << (pins::BUZZER_PWM_RESOLUTION_BITS - 1);

pub struct Buzzer {
    tone_hz: Option<u16>,
    timer_hz: Option<u16>,
}

impl Default for Buzzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Buzzer {
    pub fn new() -> Self {
        Self { tone_hz: None, timer_hz: None }
    }

    /// Play `hz`, or go silent with `None`.  Repeating the current tone
    /// is a no-op.
    pub fn set_tone(&mut self, hz: Option<u16>) {
        if hz == self.tone_hz {
            return;
        }
        match hz {
            Some(f) if f > 0 => {
                if self.timer_hz != Some(f) {
                    if !hw_init::ledc_set_freq(hw_init::LEDC_TIMER_BUZZER, u32::from(f)) {
                        warn!("BUZZER: {} Hz rejected by LEDC", f);
                        self.silence();
                        return;
                    }
                    self.timer_hz = Some(f);
                }
                hw_init::ledc_set(hw_init::LEDC_CH_BUZZER, HALF_DUTY);
                self.tone_hz = Some(f);
            }
            _ => self.silence(),
        }
    }

    pub fn silence(&mut self) {
        hw_init::ledc_set(hw_init::LEDC_CH_BUZZER, 0);
        self.tone_hz = None;
    }

    pub fn tone(&self) -> Option<u16> {
        self.tone_hz
    }
}
