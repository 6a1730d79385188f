//! GPIO / peripheral pin assignments for the MediBox board (ESP32 DevKit V1).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Audible / visual alarm outputs
// ---------------------------------------------------------------------------

/// Piezo buzzer, driven by an LEDC channel whose frequency follows the tone.
pub const BUZZER_GPIO: i32 = 5;
/// Alarm indicator LED (lit while an alarm is ringing).
pub const ALARM_LED_GPIO: i32 = 15;
/// Environment warning LED (lit while temperature or humidity is out of band).
pub const WARNING_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Push buttons (active-low, external pull-ups; GPIO34/35 are input-only)
// ---------------------------------------------------------------------------

pub const CANCEL_GPIO: i32 = 34;
pub const UP_GPIO: i32 = 33;
pub const OK_GPIO: i32 = 32;
pub const DOWN_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line.
pub const DHT_GPIO: i32 = 12;
/// Light-dependent resistor divider, ADC1 channel 3 (GPIO39 / SENSOR_VN).
pub const LDR_GPIO: i32 = 39;
pub const LDR_ADC1_CHANNEL: u32 = 3;

// ---------------------------------------------------------------------------
// Servo (vent shutter)
// ---------------------------------------------------------------------------

pub const SERVO_GPIO: i32 = 18;
/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Pulse width at 0°.
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Pulse width at 180°.
pub const SERVO_MAX_PULSE_US: u32 = 2400;

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 OLED)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const OLED_I2C_ADDR: u8 = 0x3C;
pub const I2C_FREQ_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC resolution for the servo timer.  14 bits gives ~1.2 µs steps at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// LEDC resolution for the buzzer timer (50 % duty square wave).
pub const BUZZER_PWM_RESOLUTION_BITS: u32 = 10;
