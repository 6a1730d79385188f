//! Hobby servo on the vent shutter.
//!
//! 50 Hz frame; the pulse width maps linearly from
//! `SERVO_MIN_PULSE_US` at 0° to `SERVO_MAX_PULSE_US` at 180°.

use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
const DUTY_MAX: u32 = (1 << pins::SERVO_PWM_RESOLUTION_BITS) - 1;

pub fn pulse_us(degrees: u8) -> u32 {
    let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    pins::SERVO_MIN_PULSE_US + span * u32::from(degrees.min(180)) / 180
}

/// LEDC duty for a pulse of `us` microseconds within one frame.
pub fn duty_for_pulse(us: u32) -> u32 {
    us.min(FRAME_US) * DUTY_MAX / FRAME_US
}

pub struct Servo {
    angle: Option<u8>,
}

impl Default for Servo {
    fn default() -> Self {
        Self::new()
    }
}

impl Servo {
    pub fn new() -> Self {
        Self { angle: None }
    }

    pub fn set_angle(&mut self, degrees: u8) -> Result<(), ActuatorError> {
        if degrees > 180 {
            return Err(ActuatorError::PwmWriteFailed);
        }
        hw_init::ledc_set(hw_init::LEDC_CH_SERVO, duty_for_pulse(pulse_us(degrees)));
        self.angle = Some(degrees);
        Ok(())
    }

    /// Last commanded angle; `None` before the first move.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }
}
