//! Remote tuning parameters for the light/vent control loop.
//!
//! Inbound MQTT messages on `<device_id>/<suffix>` are parsed here into a
//! typed [`TuningUpdate`].  Parsing is strict: a payload that is not a
//! number, or a number outside the accepted range, is rejected with a
//! [`TuningError`] instead of being coerced to zero.
//!
//! | Topic suffix | Payload     | Accepted range        | Field                  |
//! |--------------|-------------|-----------------------|------------------------|
//! | `/Sampling`  | integer s   | 1 – 3600              | `sampling_interval_s`  |
//! | `/Sending`   | integer min | 1 – 1440 (×60 → s)    | `sending_interval_s`   |
//! | `/offset`    | float °     | 0 – 180               | `angle_offset_deg`     |
//! | `/control`   | float       | finite, \|γ\| ≤ 100   | `gain_factor`          |
//! | `/temp`      | float °C    | (0, 100]              | `target_temperature_c` |

use core::fmt;

use serde::{Deserialize, Serialize};

// ───────────────────────────────────────────────────────────────
// Parameters
// ───────────────────────────────────────────────────────────────

pub const SAMPLING_RANGE_S: (u32, u32) = (1, 3600);
pub const SENDING_RANGE_MIN: (u32, u32) = (1, 1440);
pub const OFFSET_RANGE_DEG: (f32, f32) = (0.0, 180.0);
pub const GAIN_LIMIT: f32 = 100.0;
pub const TARGET_TEMP_MAX_C: f32 = 100.0;

/// Live control-loop parameters.  Owned by the application service and
/// only ever mutated between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuningParameters {
    /// Light sampling period (seconds).
    pub sampling_interval_s: u32,
    /// Publish / vent update period (seconds).
    pub sending_interval_s: u32,
    /// Minimum vent angle θ0 (degrees).
    pub angle_offset_deg: f32,
    /// Controlling factor γ.
    pub gain_factor: f32,
    /// Ideal storage temperature Tmed (°C).
    pub target_temperature_c: f32,
}

impl Default for TuningParameters {
    fn default() -> Self {
        Self {
            sampling_interval_s: 5,
            sending_interval_s: 120,
            angle_offset_deg: 30.0,
            gain_factor: 0.75,
            target_temperature_c: 30.0,
        }
    }
}

impl TuningParameters {
    /// Apply an already-validated update.
    pub fn apply(&mut self, update: TuningUpdate) {
        match update {
            TuningUpdate::SamplingInterval(s) => self.sampling_interval_s = s,
            TuningUpdate::SendingInterval(s) => self.sending_interval_s = s,
            TuningUpdate::AngleOffset(deg) => self.angle_offset_deg = deg,
            TuningUpdate::GainFactor(g) => self.gain_factor = g,
            TuningUpdate::TargetTemperature(t) => self.target_temperature_c = t,
        }
    }

    /// Range-check every field with the same bounds the parser enforces.
    pub fn validate(&self) -> Result<(), TuningError> {
        check_u32(self.sampling_interval_s, SAMPLING_RANGE_S, "sampling interval")?;
        let (lo, hi) = SENDING_RANGE_MIN;
        check_u32(self.sending_interval_s, (lo * 60, hi * 60), "sending interval")?;
        check_offset(self.angle_offset_deg)?;
        check_gain(self.gain_factor)?;
        check_target_temp(self.target_temperature_c)?;
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Topics and updates
// ───────────────────────────────────────────────────────────────

/// One subscribed tuning topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningTopic {
    Sampling,
    Sending,
    Offset,
    Control,
    Temp,
}

impl TuningTopic {
    pub const ALL: [Self; 5] = [
        Self::Sampling,
        Self::Sending,
        Self::Offset,
        Self::Control,
        Self::Temp,
    ];

    /// Topic suffix appended to the device id.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Sampling => "/Sampling",
            Self::Sending => "/Sending",
            Self::Offset => "/offset",
            Self::Control => "/control",
            Self::Temp => "/temp",
        }
    }

    /// Resolve a full topic string (`<device_id><suffix>`).
    pub fn from_topic(device_id: &str, topic: &str) -> Option<Self> {
        let suffix = topic.strip_prefix(device_id)?;
        Self::ALL.into_iter().find(|t| t.suffix() == suffix)
    }
}

/// A validated change to one tuning parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TuningUpdate {
    /// Seconds.
    SamplingInterval(u32),
    /// Seconds (already converted from minutes).
    SendingInterval(u32),
    AngleOffset(f32),
    GainFactor(f32),
    TargetTemperature(f32),
}

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningError {
    /// Topic is not one of the tuning topics for this device.
    UnknownTopic,
    /// Payload is not valid UTF-8 or not a number of the expected kind.
    Malformed,
    /// Payload parsed but lies outside the accepted range.
    OutOfRange(&'static str),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTopic => write!(f, "unknown tuning topic"),
            Self::Malformed => write!(f, "malformed payload"),
            Self::OutOfRange(field) => write!(f, "{field} out of range"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Parsing
// ───────────────────────────────────────────────────────────────

/// Parse a full MQTT message into an update.
pub fn parse_message(device_id: &str, topic: &str, payload: &[u8]) -> Result<TuningUpdate, TuningError> {
    let topic = TuningTopic::from_topic(device_id, topic).ok_or(TuningError::UnknownTopic)?;
    parse_update(topic, payload)
}

/// Parse and range-check a payload for a known topic.
pub fn parse_update(topic: TuningTopic, payload: &[u8]) -> Result<TuningUpdate, TuningError> {
    let text = core::str::from_utf8(payload)
        .map_err(|_| TuningError::Malformed)?
        .trim();

    match topic {
        TuningTopic::Sampling => {
            let secs = parse_u32(text)?;
            check_u32(secs, SAMPLING_RANGE_S, "sampling interval")?;
            Ok(TuningUpdate::SamplingInterval(secs))
        }
        TuningTopic::Sending => {
            let minutes = parse_u32(text)?;
            check_u32(minutes, SENDING_RANGE_MIN, "sending interval")?;
            Ok(TuningUpdate::SendingInterval(minutes * 60))
        }
        TuningTopic::Offset => {
            let deg = parse_f32(text)?;
            check_offset(deg)?;
            Ok(TuningUpdate::AngleOffset(deg))
        }
        TuningTopic::Control => {
            let gain = parse_f32(text)?;
            check_gain(gain)?;
            Ok(TuningUpdate::GainFactor(gain))
        }
        TuningTopic::Temp => {
            let t = parse_f32(text)?;
            check_target_temp(t)?;
            Ok(TuningUpdate::TargetTemperature(t))
        }
    }
}

fn parse_u32(text: &str) -> Result<u32, TuningError> {
    text.parse::<u32>().map_err(|_| TuningError::Malformed)
}

fn parse_f32(text: &str) -> Result<f32, TuningError> {
    let v = text.parse::<f32>().map_err(|_| TuningError::Malformed)?;
    if v.is_finite() { Ok(v) } else { Err(TuningError::Malformed) }
}

fn check_u32(v: u32, (lo, hi): (u32, u32), field: &'static str) -> Result<(), TuningError> {
    if (lo..=hi).contains(&v) { Ok(()) } else { Err(TuningError::OutOfRange(field)) }
}

fn check_offset(deg: f32) -> Result<(), TuningError> {
    let (lo, hi) = OFFSET_RANGE_DEG;
    if deg.is_finite() && (lo..=hi).contains(&deg) {
        Ok(())
    } else {
        Err(TuningError::OutOfRange("angle offset"))
    }
}

fn check_gain(gain: f32) -> Result<(), TuningError> {
    if gain.is_finite() && gain.abs() <= GAIN_LIMIT {
        Ok(())
    } else {
        Err(TuningError::OutOfRange("gain factor"))
    }
}

fn check_target_temp(t: f32) -> Result<(), TuningError> {
    if t.is_finite() && t > 0.0 && t <= TARGET_TEMP_MAX_C {
        Ok(())
    } else {
        Err(TuningError::OutOfRange("target temperature"))
    }
}
