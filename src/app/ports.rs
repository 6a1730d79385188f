//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, buttons, display, time sync, MQTT,
//! event sinks) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.

use crate::drivers::button::Button;
use crate::error::{ActuatorError, CommsError};
use crate::screen::Screen;
use crate::sensors::climate::ClimateReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Ambient light intensity normalised to `[0, 1]`.
    fn read_light(&mut self) -> f32;

    /// Latest good temperature/humidity reading.  `None` until the first
    /// successful read; afterwards a failed read returns the cached value.
    /// `now_ms` lets the adapter rate-limit slow sensors.
    fn read_climate(&mut self, now_ms: u64) -> Option<ClimateReading>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Drive the buzzer at `hz`, or silence it with `None`.
    fn set_tone(&mut self, hz: Option<u16>);

    /// Alarm indicator LED.
    fn set_alarm_indicator(&mut self, on: bool);

    /// Environment warning LED.
    fn set_warning_indicator(&mut self, on: bool);

    /// Move the vent servo to a whole-degree angle (0–180).
    fn set_servo_angle(&mut self, degrees: u8) -> Result<(), ActuatorError>;

    /// Silence the buzzer and switch both indicators off.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: buttons → domain)
// ───────────────────────────────────────────────────────────────

/// Raw button levels.  Debouncing happens in the domain
/// ([`ButtonPanel`](crate::drivers::button::ButtonPanel)).
pub trait InputPort {
    /// `true` while the button is held down.
    fn is_pressed(&mut self, button: Button) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → OLED)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    /// Replace the whole screen with `screen`.
    fn show(&mut self, screen: &Screen) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Time sync port (driven adapter: SNTP → domain)
// ───────────────────────────────────────────────────────────────

pub trait TimeSyncPort {
    /// UTC seconds since the Unix epoch, or `None` while not synchronised.
    fn utc_epoch_secs(&self) -> Option<i64>;

    /// Ask the time source to resynchronise.
    fn request_resync(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Publish port (driven adapter: domain → MQTT)
// ───────────────────────────────────────────────────────────────

pub trait PublishPort {
    /// Fire-and-forget publish (QoS 0).
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError>;

    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::error::Error for ConfigError {}
