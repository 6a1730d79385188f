//! MediBox firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod alarm;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod fsm;
pub mod menu;
pub mod messaging;
pub mod monitor;
pub mod pins;
pub mod screen;
pub mod tuning;

// Hardware-facing modules carry host simulation stubs so the crate
// builds and tests off-target.
pub mod adapters;
pub mod control;
pub mod drivers;
pub mod sensors;
