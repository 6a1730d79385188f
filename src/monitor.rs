//! Environment monitor.
//!
//! Runs every tick after the climate sensor has been read and keeps an
//! alert bitmask for the storage climate.  The warning LED is lit while
//! **any** alert bit is set; each bit is raised and cleared independently
//! so a temperature excursion and a humidity excursion are tracked
//! separately.
//!
//! | Alert         | Raised when                        |
//! |---------------|------------------------------------|
//! | `Temperature` | T < 24 °C or T > 32 °C             |
//! | `Humidity`    | RH < 65 % or RH > 80 %             |
//!
//! Bounds are inclusive: exactly 24.0 °C or 80.0 % is healthy.

use core::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::sensors::climate::ClimateReading;

/// Healthy storage band for medicine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentLimits {
    pub temp_min_c: f32,
    pub temp_max_c: f32,
    pub humidity_min_pct: f32,
    pub humidity_max_pct: f32,
}

impl Default for EnvironmentLimits {
    fn default() -> Self {
        Self {
            temp_min_c: 24.0,
            temp_max_c: 32.0,
            humidity_min_pct: 65.0,
            humidity_max_pct: 80.0,
        }
    }
}

/// One out-of-band condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EnvAlert {
    Temperature = 0b0000_0001,
    Humidity = 0b0000_0010,
}

impl EnvAlert {
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for EnvAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature out of range"),
            Self::Humidity => write!(f, "humidity out of range"),
        }
    }
}

/// Result of one check: a copy of the alert bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvironmentStatus {
    pub alerts: u8,
}

impl EnvironmentStatus {
    pub fn has(&self, alert: EnvAlert) -> bool {
        self.alerts & alert.mask() != 0
    }

    pub fn temperature_alert(&self) -> bool {
        self.has(EnvAlert::Temperature)
    }

    pub fn humidity_alert(&self) -> bool {
        self.has(EnvAlert::Humidity)
    }

    /// The warning indicator is on iff any alert is active.
    pub fn warning_on(&self) -> bool {
        self.alerts != 0
    }
}

pub struct EnvironmentMonitor {
    limits: EnvironmentLimits,
    alerts: u8,
}

impl EnvironmentMonitor {
    pub fn new(limits: EnvironmentLimits) -> Self {
        Self { limits, alerts: 0 }
    }

    /// Evaluate a reading and return the updated alert set.
    pub fn check(&mut self, reading: &ClimateReading) -> EnvironmentStatus {
        let l = &self.limits;
        let temp_bad = reading.temperature_c < l.temp_min_c || reading.temperature_c > l.temp_max_c;
        let hum_bad =
            reading.humidity_pct < l.humidity_min_pct || reading.humidity_pct > l.humidity_max_pct;

        self.eval_alert(EnvAlert::Temperature, temp_bad, reading.temperature_c, "\u{00b0}C");
        self.eval_alert(EnvAlert::Humidity, hum_bad, reading.humidity_pct, "%");

        self.status()
    }

    pub fn status(&self) -> EnvironmentStatus {
        EnvironmentStatus { alerts: self.alerts }
    }

    // ── Internal ──────────────────────────────────────────────────

    fn eval_alert(&mut self, alert: EnvAlert, condition: bool, value: f32, unit: &str) {
        if condition {
            if self.alerts & alert.mask() == 0 {
                warn!("ENV ALERT SET: {alert} ({value:.1}{unit})");
            }
            self.alerts |= alert.mask();
        } else {
            if self.alerts & alert.mask() != 0 {
                info!("ENV ALERT CLEARED: {alert} ({value:.1}{unit})");
            }
            self.alerts &= !alert.mask();
        }
    }
}
