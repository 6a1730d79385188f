//! System configuration parameters
//!
//! All compile-time defaults for the MediBox.  Nothing here is persisted;
//! the runtime-tunable subset ([`TuningParameters`]) is changed over MQTT
//! and lives in the application service.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::monitor::EnvironmentLimits;
use crate::tuning::TuningParameters;

/// Number of alarm slots on this board.
pub const ALARM_COUNT: usize = 2;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Identity / network ---
    /// Topic prefix for every MQTT topic.
    pub device_id: String<32>,
    /// MQTT broker URL.
    pub mqtt_broker_url: String<64>,
    /// SNTP server.
    pub ntp_server: String<32>,
    pub wifi_ssid: String<32>,
    pub wifi_password: String<64>,

    // --- Clock ---
    /// Offset added to UTC before decoding the wall clock (seconds).
    pub utc_offset_secs: i32,

    // --- Alarms ---
    /// Snooze length (minutes).
    pub snooze_minutes: u8,
    /// Length of one tone in the ring sequence (milliseconds).
    pub tone_step_ms: u32,
    /// Silence between tones (milliseconds).
    pub tone_gap_ms: u32,
    /// How long "Snoozed to:" stays on screen (milliseconds).
    pub snooze_display_ms: u32,
    /// How long the "View Alarms" page stays on screen (milliseconds).
    pub alarm_view_ms: u32,

    // --- Input ---
    /// Minimum spacing between two accepted presses of one button (milliseconds).
    pub debounce_ms: u32,

    // --- Environment ---
    pub env: EnvironmentLimits,

    // --- Light / vent ---
    pub tuning: TuningParameters,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub tick_interval_ms: u32,
    /// Climate sensor read interval (milliseconds).  The DHT22 needs ≥ 2 s.
    pub climate_read_interval_ms: u32,
    /// Fixed MQTT reconnect backoff (seconds)
    pub reconnect_backoff_secs: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,
}

fn fixed<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            device_id: fixed("medibox_220146A"),
            mqtt_broker_url: fixed("mqtt://broker.hivemq.com:1883"),
            ntp_server: fixed("pool.ntp.org"),
            wifi_ssid: fixed("Wokwi-GUEST"),
            wifi_password: String::new(),

            utc_offset_secs: 19_800, // UTC+05:30

            snooze_minutes: 5,
            tone_step_ms: 500,
            tone_gap_ms: 2,
            snooze_display_ms: 1000,
            alarm_view_ms: 3000,

            debounce_ms: 200,

            env: EnvironmentLimits::default(),
            tuning: TuningParameters::default(),

            tick_interval_ms: 50,
            climate_read_interval_ms: 2000,
            reconnect_backoff_secs: 5,
            telemetry_interval_secs: 60,
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// Reject inconsistent values before the control loop starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device_id.is_empty() {
            return Err(ConfigError::ValidationFailed("device_id must not be empty"));
        }
        if !(-12 * 3600..=14 * 3600).contains(&self.utc_offset_secs) {
            return Err(ConfigError::ValidationFailed("utc_offset_secs outside -12h..+14h"));
        }
        if self.snooze_minutes == 0 || self.snooze_minutes > 60 {
            return Err(ConfigError::ValidationFailed("snooze_minutes must be 1-60"));
        }
        if self.tick_interval_ms == 0 || self.tick_interval_ms > self.debounce_ms {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms must be non-zero and finer than debounce_ms",
            ));
        }
        if self.tone_step_ms == 0 {
            return Err(ConfigError::ValidationFailed("tone_step_ms must be non-zero"));
        }
        if self.env.temp_min_c >= self.env.temp_max_c {
            return Err(ConfigError::ValidationFailed("env temperature band is empty"));
        }
        if self.env.humidity_min_pct >= self.env.humidity_max_pct {
            return Err(ConfigError::ValidationFailed("env humidity band is empty"));
        }
        if self.watchdog_timeout_ms <= self.tick_interval_ms * 4 {
            return Err(ConfigError::ValidationFailed("watchdog_timeout_ms too close to the tick interval"));
        }
        if self.reconnect_backoff_secs == 0 {
            return Err(ConfigError::ValidationFailed("reconnect_backoff_secs must be non-zero"));
        }
        self.tuning
            .validate()
            .map_err(|_| ConfigError::ValidationFailed("tuning parameters out of range"))
    }
}
