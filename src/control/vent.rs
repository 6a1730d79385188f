//! Vent shutter angle from light intensity and temperature.
//!
//! ```text
//! θ = θ0 + (180 − θ0) · I · γ · ln(Ts / Tsend) · (T / Tmed)
//! ```
//!
//! With the usual `Ts < Tsend` the log term is negative, so brighter and
//! warmer conditions close the vent towards 0°.  The result is clamped to
//! the servo's 0–180° travel and truncated to whole degrees.

use core::fmt;

use crate::tuning::TuningParameters;

pub const SERVO_MIN_DEG: f32 = 0.0;
pub const SERVO_MAX_DEG: f32 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentError {
    /// The formula produced NaN or ±∞ (zero interval or zero target
    /// temperature).  The servo should hold its current position.
    NonFinite,
}

impl fmt::Display for VentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite => write!(f, "vent angle is not finite"),
        }
    }
}

/// Unclamped θ.
pub fn raw_angle(params: &TuningParameters, intensity: f32, temperature_c: f32) -> f32 {
    let theta0 = params.angle_offset_deg;
    let ratio = params.sampling_interval_s as f32 / params.sending_interval_s as f32;
    theta0
        + (SERVO_MAX_DEG - theta0)
            * intensity
            * params.gain_factor
            * ratio.ln()
            * (temperature_c / params.target_temperature_c)
}

/// θ clamped to the servo range.
pub fn vent_angle(params: &TuningParameters, intensity: f32, temperature_c: f32) -> Result<f32, VentError> {
    let theta = raw_angle(params, intensity, temperature_c);
    if !theta.is_finite() {
        return Err(VentError::NonFinite);
    }
    Ok(theta.clamp(SERVO_MIN_DEG, SERVO_MAX_DEG))
}

/// Whole degrees written to the servo (truncated, not rounded).
pub fn vent_degrees(params: &TuningParameters, intensity: f32, temperature_c: f32) -> Result<u8, VentError> {
    vent_angle(params, intensity, temperature_c).map(|a| a as u8)
}
