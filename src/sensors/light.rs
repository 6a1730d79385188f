//! LDR light sensor on ADC1.
//!
//! The photoresistor module drives the ADC pin up as light increases, so
//! intensity is simply the raw reading over the 12-bit range.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 through the oneshot unit set up by `hw_init`.
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_LDR_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_ldr_adc(raw: u16) {
    SIM_LDR_ADC.store(raw, Ordering::Relaxed);
}

pub const ADC_MAX: u16 = 4095;

/// Map a raw 12-bit reading to `[0, 1]`.
pub fn normalize(raw: u16) -> f32 {
    f32::from(raw.min(ADC_MAX)) / f32::from(ADC_MAX)
}

pub struct LightSensor {
    channel: u32,
}

impl LightSensor {
    pub fn new(adc_channel: u32) -> Self {
        Self { channel: adc_channel }
    }

    pub fn read(&self) -> f32 {
        normalize(self.read_adc())
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        let _ = self.channel;
        SIM_LDR_ADC.load(Ordering::Relaxed)
    }
}
