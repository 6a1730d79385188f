//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the light and climate drivers.  The DHT22 may only be
//! polled every couple of seconds, so climate reads are rate-limited and
//! the last good reading is cached; a failed read keeps the cache.

pub mod climate;
pub mod light;

use log::{info, warn};

use climate::{ClimateReading, ClimateSensor};
use light::LightSensor;

pub struct SensorHub<C> {
    pub light: LightSensor,
    climate: C,
    read_interval_ms: u32,
    last_attempt_ms: Option<u64>,
    last_good: Option<ClimateReading>,
    consecutive_failures: u32,
}

impl<C: ClimateSensor> SensorHub<C> {
    /// Pass in pre-built drivers (built in main where peripheral
    /// ownership is established).
    pub fn new(light: LightSensor, climate: C, read_interval_ms: u32) -> Self {
        Self {
            light,
            climate,
            read_interval_ms,
            last_attempt_ms: None,
            last_good: None,
            consecutive_failures: 0,
        }
    }

    pub fn read_light(&self) -> f32 {
        self.light.read()
    }

    /// Refresh the climate cache if the read interval has elapsed and
    /// return the latest good reading.
    pub fn read_climate(&mut self, now_ms: u64) -> Option<ClimateReading> {
        let due = self
            .last_attempt_ms
            .is_none_or(|t| now_ms.saturating_sub(t) >= u64::from(self.read_interval_ms));
        if due {
            self.last_attempt_ms = Some(now_ms);
            match self.climate.read() {
                Ok(reading) => {
                    if self.consecutive_failures > 0 {
                        info!("DHT22 recovered after {} failed reads", self.consecutive_failures);
                    }
                    self.consecutive_failures = 0;
                    self.last_good = Some(reading);
                }
                Err(e) => {
                    self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                    warn!("DHT22 read failed ({}), keeping last reading", e);
                }
            }
        }
        self.last_good
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}
