//! Wall-clock source.
//!
//! Turns the synchronised UTC epoch from a [`TimeSyncPort`] into local
//! calendar fields by adding the configured UTC offset.  Until the port
//! reports a valid time the reading stays at all zeros; a later failed
//! refresh leaves the previous reading untouched.

use chrono::{DateTime, Datelike, Timelike};
use log::{debug, info};

use crate::app::ports::TimeSyncPort;

/// Local calendar time as shown on the display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockReading {
    pub day: u8,
    pub month: u8,
    pub year: u16,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl ClockReading {
    /// Decode local epoch seconds (UTC epoch already shifted by the offset).
    pub fn from_local_epoch(secs: i64) -> Option<Self> {
        let dt = DateTime::from_timestamp(secs, 0)?;
        let year = u16::try_from(dt.year()).ok()?;
        Some(Self {
            day: dt.day() as u8,
            month: dt.month() as u8,
            year,
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
            second: dt.second() as u8,
        })
    }
}

pub struct ClockSource {
    reading: ClockReading,
    utc_offset_secs: i32,
    synced: bool,
}

impl ClockSource {
    pub fn new(utc_offset_secs: i32) -> Self {
        Self {
            reading: ClockReading::default(),
            utc_offset_secs,
            synced: false,
        }
    }

    /// Pull the current time from `sync`.  Returns `false` (reading
    /// unchanged) while the source is not synchronised.
    pub fn refresh(&mut self, sync: &impl TimeSyncPort) -> bool {
        let Some(utc) = sync.utc_epoch_secs() else {
            return false;
        };
        let local = utc.saturating_add(i64::from(self.utc_offset_secs));
        match ClockReading::from_local_epoch(local) {
            Some(reading) => {
                if !self.synced {
                    info!(
                        "CLOCK: synchronised {}/{}/{} {}:{}:{}",
                        reading.day, reading.month, reading.year,
                        reading.hour, reading.minute, reading.second
                    );
                }
                self.reading = reading;
                self.synced = true;
                true
            }
            None => {
                debug!("CLOCK: epoch {local} outside calendar range");
                false
            }
        }
    }

    /// Store a new UTC offset and ask the source to resynchronise.
    pub fn set_offset(&mut self, seconds: i32, sync: &mut impl TimeSyncPort) {
        self.utc_offset_secs = seconds;
        sync.request_resync();
        info!("CLOCK: UTC offset set to {}s", seconds);
    }

    pub fn reading(&self) -> &ClockReading {
        &self.reading
    }

    pub fn utc_offset_secs(&self) -> i32 {
        self.utc_offset_secs
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }
}
