//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`], [`ActuatorPort`] and [`InputPort`].  This is
//! the only module in the system that touches actual hardware.  On
//! non-espidf targets, the underlying drivers use cfg-gated simulation
//! stubs and the buttons read from [`sim_press`] / [`sim_release`].

use crate::app::ports::{ActuatorPort, InputPort, SensorPort};
use crate::drivers::button::Button;
use crate::drivers::buzzer::Buzzer;
use crate::drivers::indicator::Indicator;
use crate::drivers::servo::Servo;
use crate::error::ActuatorError;
use crate::pins;
use crate::sensors::SensorHub;
use crate::sensors::climate::{ClimateReading, ClimateSensor};

#[cfg(not(target_os = "espidf"))]
static SIM_BUTTONS: core::sync::atomic::AtomicU8 = core::sync::atomic::AtomicU8::new(0);

/// Hold `button` down (host simulation).
#[cfg(not(target_os = "espidf"))]
pub fn sim_press(button: Button) {
    SIM_BUTTONS.fetch_or(1 << (button as u8), core::sync::atomic::Ordering::Relaxed);
}

/// Let go of `button` (host simulation).
#[cfg(not(target_os = "espidf"))]
pub fn sim_release(button: Button) {
    SIM_BUTTONS.fetch_and(!(1 << (button as u8)), core::sync::atomic::Ordering::Relaxed);
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<C> {
    sensor_hub: SensorHub<C>,
    buzzer: Buzzer,
    alarm_led: Indicator,
    warning_led: Indicator,
    servo: Servo,
}

impl<C: ClimateSensor> HardwareAdapter<C> {
    pub fn new(sensor_hub: SensorHub<C>, buzzer: Buzzer, servo: Servo) -> Self {
        Self {
            sensor_hub,
            buzzer,
            alarm_led: Indicator::new(pins::ALARM_LED_GPIO),
            warning_led: Indicator::new(pins::WARNING_LED_GPIO),
            servo,
        }
    }

    pub fn servo_angle(&self) -> Option<u8> {
        self.servo.angle()
    }

    pub fn tone(&self) -> Option<u16> {
        self.buzzer.tone()
    }

    pub fn alarm_led_on(&self) -> bool {
        self.alarm_led.is_on()
    }

    pub fn warning_led_on(&self) -> bool {
        self.warning_led.is_on()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<C: ClimateSensor> SensorPort for HardwareAdapter<C> {
    fn read_light(&mut self) -> f32 {
        self.sensor_hub.read_light()
    }

    fn read_climate(&mut self, now_ms: u64) -> Option<ClimateReading> {
        self.sensor_hub.read_climate(now_ms)
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<C: ClimateSensor> ActuatorPort for HardwareAdapter<C> {
    fn set_tone(&mut self, hz: Option<u16>) {
        self.buzzer.set_tone(hz);
    }

    fn set_alarm_indicator(&mut self, on: bool) {
        self.alarm_led.set(on);
    }

    fn set_warning_indicator(&mut self, on: bool) {
        self.warning_led.set(on);
    }

    fn set_servo_angle(&mut self, degrees: u8) -> Result<(), ActuatorError> {
        self.servo.set_angle(degrees)
    }

    fn all_off(&mut self) {
        self.buzzer.silence();
        self.alarm_led.set(false);
        self.warning_led.set(false);
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<C: ClimateSensor> InputPort for HardwareAdapter<C> {
    /// Buttons are active-low.
    #[cfg(target_os = "espidf")]
    fn is_pressed(&mut self, button: Button) -> bool {
        !crate::drivers::hw_init::gpio_read(button.gpio())
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_pressed(&mut self, button: Button) -> bool {
        SIM_BUTTONS.load(core::sync::atomic::Ordering::Relaxed) & (1 << (button as u8)) != 0
    }
}
