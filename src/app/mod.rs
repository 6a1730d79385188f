//! Application core: pure domain logic, zero I/O.
//!
//! Business rules for the medicine box: alarm ringer orchestration, menu
//! commands, environment checks, light sampling and vent control.  All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
