//! MQTT inbound queue and topic helpers.
//!
//! The ESP-IDF MQTT client runs its callback on its own task.  The
//! callback only copies topic and payload into an [`InboundMessage`] and
//! pushes it into a static `embassy-sync` channel; the control loop
//! drains the channel between ticks and applies the updates itself.
//!
//! ```text
//! ┌──────────────┐ InboundMessage ┌──────────────┐
//! │  MQTT task   │───────────────▶│ Control loop │
//! │  (callback)  │                │  (sync)      │
//! └──────────────┘                └──────────────┘
//! ```

use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::{String, Vec};
use log::warn;

use crate::tuning::TuningTopic;

pub const TOPIC_CAPACITY: usize = 64;
pub const PAYLOAD_CAPACITY: usize = 32;
const INBOUND_DEPTH: usize = 8;

pub const INTENSITY_SUFFIX: &str = "/intensity";
pub const CLIENT_ID_PREFIX: &str = "MediBoxClient-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String<TOPIC_CAPACITY>,
    pub payload: Vec<u8, PAYLOAD_CAPACITY>,
}

impl InboundMessage {
    /// Copy a received message.  `None` if either part does not fit.
    pub fn new(topic: &str, payload: &[u8]) -> Option<Self> {
        let mut t = String::new();
        t.push_str(topic).ok()?;
        Some(Self {
            topic: t,
            payload: Vec::from_slice(payload).ok()?,
        })
    }
}

/// Inbound tuning channel: MQTT task → control loop.
pub static INBOUND_CHANNEL: Channel<CriticalSectionRawMutex, InboundMessage, INBOUND_DEPTH> = Channel::new();

/// Queue a received message.  Oversized messages and a full queue are
/// dropped with a warning.  Safe to call from the MQTT task.
pub fn enqueue(topic: &str, payload: &[u8]) -> bool {
    let Some(msg) = InboundMessage::new(topic, payload) else {
        warn!("MQTT: message on '{}' too large ({} bytes), dropping", topic, payload.len());
        return false;
    };
    if INBOUND_CHANNEL.try_send(msg).is_err() {
        warn!("MQTT: inbound queue full, dropping '{}'", topic);
        return false;
    }
    true
}

/// Next queued message, if any.
pub fn try_next() -> Option<InboundMessage> {
    INBOUND_CHANNEL.try_receive().ok()
}

// ── Topics ────────────────────────────────────────────────────

pub fn topic(device_id: &str, suffix: &str) -> String<TOPIC_CAPACITY> {
    let mut t = String::new();
    let _ = write!(t, "{}{}", device_id, suffix);
    t
}

pub fn intensity_topic(device_id: &str) -> String<TOPIC_CAPACITY> {
    topic(device_id, INTENSITY_SUFFIX)
}

/// Every tuning topic the device subscribes to.
pub fn subscription_topics(device_id: &str) -> [String<TOPIC_CAPACITY>; 5] {
    TuningTopic::ALL.map(|t| topic(device_id, t.suffix()))
}

/// Intensity payload: two decimals.
pub fn format_intensity(avg: f32) -> String<16> {
    let mut s = String::new();
    let _ = write!(s, "{:.2}", avg);
    s
}

// ── Client id ─────────────────────────────────────────────────

pub fn client_id(suffix: u16) -> String<32> {
    let mut s = String::new();
    let _ = write!(s, "{}{:x}", CLIENT_ID_PREFIX, suffix);
    s
}

/// Fresh client id with a random suffix, drawn on every connect attempt.
pub fn random_client_id() -> String<32> {
    client_id(random_u16())
}

#[cfg(target_os = "espidf")]
fn random_u16() -> u16 {
    // SAFETY: esp_random reads the hardware RNG; no preconditions.
    (unsafe { esp_idf_svc::sys::esp_random() } & 0xFFFF) as u16
}

#[cfg(not(target_os = "espidf"))]
fn random_u16() -> u16 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    RandomState::new().build_hasher().finish() as u16
}
