//! Single-colour indicator LEDs (alarm and environment warning).
//!
//! On ESP-IDF: plain GPIO outputs via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;

pub struct Indicator {
    gpio: i32,
    on: bool,
}

impl Indicator {
    pub fn new(gpio: i32) -> Self {
        Self { gpio, on: false }
    }

    pub fn set(&mut self, on: bool) {
        if on != self.on {
            hw_init::gpio_write(self.gpio, on);
            self.on = on;
        }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
