//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `hardware` | SensorPort         | ESP32 ADC, DHT22         |
//! |            | ActuatorPort       | LEDC PWM, GPIO           |
//! |            | InputPort          | Push buttons             |
//! | `log_sink` | EventSink          | Serial log output        |
//! | `mqtt`     | PublishPort        | ESP-IDF MQTT client      |
//! | `time`     | TimeSyncPort       | SNTP / system timer      |
//! | `wifi`     | -                  | ESP-IDF WiFi STA         |
//!
//! The OLED's `DisplayPort` lives with its driver in
//! [`drivers::oled`](crate::drivers::oled).

pub mod hardware;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
