//! DHT22 temperature / humidity sensor on a single open-drain line.
//!
//! ## Protocol
//!
//! ```text
//!  host:   ‾‾‾\___________/‾‾‾‾ (release)
//!               ≥1 ms low
//!  sensor:                  \__80µs__/‾‾80µs‾‾\  40 × [ \_50µs_/‾‾26µs or 70µs‾‾\ ]
//! ```
//!
//! Each bit is a ~50 µs low followed by a high pulse whose length encodes
//! the value (≈27 µs → 0, ≈70 µs → 1).  The reader does not trust its
//! polling loop to run at a known rate: a bit is 1 when its high pulse
//! outlasts the low pulse just before it, both measured in the same loop
//! iterations.  The 40 bits form five bytes:
//! humidity (u16, tenths of %RH), temperature (sign bit + 15-bit magnitude,
//! tenths of °C), and an 8-bit additive checksum.
//!
//! The bit-bang reader is generic over `embedded-hal` pins and delays so
//! it runs against the ESP-IDF `PinDriver` on target and against a
//! scripted pin in tests.  Frame decoding is a pure function.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use serde::{Deserialize, Serialize};

use crate::error::SensorError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Anything that can produce a fresh climate reading.
pub trait ClimateSensor {
    fn read(&mut self) -> Result<ClimateReading, SensorError>;
}

// ── Frame decoding ────────────────────────────────────────────

const TEMP_MIN_C: f32 = -40.0;
const TEMP_MAX_C: f32 = 80.0;

/// Validate and decode one 5-byte DHT22 frame.
pub fn decode_frame(frame: [u8; 5]) -> Result<ClimateReading, SensorError> {
    // A stuck or misread line yields zeros, which would pass the checksum.
    if frame == [0; 5] {
        return Err(SensorError::EmptyFrame);
    }
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }

    let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7F, frame[3]])) / 10.0;
    let temperature = if frame[2] & 0x80 != 0 { -magnitude } else { magnitude };

    if !(0.0..=100.0).contains(&humidity) || !(TEMP_MIN_C..=TEMP_MAX_C).contains(&temperature) {
        return Err(SensorError::OutOfRange);
    }

    Ok(ClimateReading {
        temperature_c: temperature,
        humidity_pct: humidity,
    })
}

// ── Bit-bang reader ───────────────────────────────────────────

const START_LOW_US: u32 = 1_100;
/// Polls of one level before the read is abandoned.  Each poll takes at
/// least 1 µs, so this is never shorter than the 80 µs response phases.
const EDGE_TIMEOUT_POLLS: u32 = 100;

pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// `pin` must be configured open-drain with a pull-up.
    pub fn new(pin: P, delay: D) -> Self {
        Self { pin, delay }
    }

    pub fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::NoResponse)?;
        self.delay.delay_us(START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::NoResponse)?;

        // Response: sensor pulls low, then high, then low for the first bit.
        self.wait_while(true).map_err(|_| SensorError::NoResponse)?;
        self.wait_while(false)?;
        self.wait_while(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            let low_polls = self.wait_while(false)?;
            let high_polls = self.wait_while(true)?;
            if high_polls > low_polls {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Poll in ~1 µs steps while the line reads `level`; returns the number
    /// of polls.  Only comparable with other counts from the same read.
    fn wait_while(&mut self, level: bool) -> Result<u32, SensorError> {
        let mut polls = 0;
        while self.pin.is_high().map_err(|_| SensorError::NoResponse)? == level {
            if polls >= EDGE_TIMEOUT_POLLS {
                return Err(SensorError::Timeout);
            }
            self.delay.delay_us(1);
            polls += 1;
        }
        Ok(polls)
    }
}

impl<P, D> ClimateSensor for Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn read(&mut self) -> Result<ClimateReading, SensorError> {
        decode_frame(self.read_frame()?)
    }
}

// ── Simulated sensor (host builds) ────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use super::{ClimateReading, ClimateSensor};
    use crate::error::SensorError;

    static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41F0_0000); // 30.0
    static SIM_HUMIDITY_BITS: AtomicU32 = AtomicU32::new(0x428C_0000); // 70.0
    static SIM_FAIL: AtomicBool = AtomicBool::new(false);

    pub fn sim_set_climate(temperature_c: f32, humidity_pct: f32) {
        SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
        SIM_HUMIDITY_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
    }

    /// Make subsequent reads fail with `NoResponse`.
    pub fn sim_set_climate_fault(fail: bool) {
        SIM_FAIL.store(fail, Ordering::Relaxed);
    }

    #[derive(Debug, Default)]
    pub struct SimClimate;

    impl ClimateSensor for SimClimate {
        fn read(&mut self) -> Result<ClimateReading, SensorError> {
            if SIM_FAIL.load(Ordering::Relaxed) {
                return Err(SensorError::NoResponse);
            }
            Ok(ClimateReading {
                temperature_c: f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
                humidity_pct: f32::from_bits(SIM_HUMIDITY_BITS.load(Ordering::Relaxed)),
            })
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::{SimClimate, sim_set_climate, sim_set_climate_fault};
