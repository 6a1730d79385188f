//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, count them in a
//! test, etc.

use crate::clock::ClockReading;
use crate::error::CommsError;
use crate::fsm::StateId;
use crate::monitor::EnvironmentStatus;
use crate::sensors::climate::ClimateReading;
use crate::tuning::{TuningError, TuningUpdate};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started.
    Started { ringer: StateId, synced: bool },

    /// The ringer FSM transitioned between states.
    RingerChanged { from: StateId, to: StateId },

    AlarmRinging { index: usize },
    AlarmSnoozed { index: usize, hour: u8, minute: u8 },
    AlarmCancelled { index: usize },
    AlarmConfigured { index: usize, hour: u8, minute: u8 },
    AlarmDeleted { index: usize },

    UtcOffsetChanged(i32),

    /// A sending window closed with samples; carries the mean.
    IntensityPublished(f32),
    /// A sending window closed with no samples.
    PublishSkipped,
    /// The broker was unreachable when a window closed.
    PublishFailed(CommsError),

    /// Vent servo commanded to a new angle.
    VentMoved(u8),
    /// Vent update skipped; the servo keeps its position.
    VentHeld(&'static str),

    /// Temperature/humidity alert set changed.
    EnvAlertChanged(EnvironmentStatus),

    TuningApplied(TuningUpdate),
    TuningRejected(TuningError),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub clock: ClockReading,
    pub synced: bool,
    pub climate: Option<ClimateReading>,
    pub alerts: u8,
    pub last_intensity: f32,
    pub vent_angle: Option<u8>,
    pub ringer: StateId,
    pub active_alarms: usize,
    pub mqtt_connected: bool,
}
