//! Actuator drivers, front-panel input, display, and hardware init.

pub mod button;
pub mod buzzer;
pub mod hw_init;
pub mod indicator;
pub mod oled;
pub mod servo;
pub mod watchdog;
