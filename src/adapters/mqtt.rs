//! MQTT link adapter.
//!
//! Implements [`PublishPort`] over the ESP-IDF MQTT client and feeds
//! inbound tuning messages into the [`messaging`] queue.
//!
//! ## Connection lifecycle
//!
//! ```text
//!   Offline ──(network up, backoff elapsed)──▶ Connecting
//!   Connecting ──(CONNECTED event)──▶ Online  (subscribe on first poll)
//!   Online ──(DISCONNECTED event)──▶ Offline
//! ```
//!
//! Every attempt uses a fresh random client id.  [`poll`](MqttLink::poll)
//! is non-blocking; the control loop calls it once per iteration.
//!
//! On non-espidf targets the broker is simulated: tests flip
//! [`set_sim_broker`](MqttLink::set_sim_broker) and read back what was
//! published.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use heapless::String;
use log::{info, warn};

use crate::app::ports::PublishPort;
use crate::error::CommsError;
use crate::messaging;

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{Details, EspMqttClient, EventPayload, MqttClientConfiguration, QoS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Offline,
    Connecting,
    Online,
}

pub struct MqttLink {
    broker_url: String<64>,
    device_id: String<32>,
    backoff_ms: u64,
    state: LinkState,
    last_attempt_ms: Option<u64>,
    subscribed: bool,
    client_id: String<32>,
    /// Set from the client's event callback.
    connected: Arc<AtomicBool>,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim_broker_up: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_published: std::vec::Vec<(std::string::String, std::string::String)>,
    #[cfg(not(target_os = "espidf"))]
    sim_subscriptions: std::vec::Vec<std::string::String>,
}

impl MqttLink {
    pub fn new(broker_url: &str, device_id: &str, backoff_secs: u32) -> Self {
        let mut url = String::new();
        let _ = url.push_str(broker_url);
        let mut id = String::new();
        let _ = id.push_str(device_id);
        Self {
            broker_url: url,
            device_id: id,
            backoff_ms: u64::from(backoff_secs) * 1000,
            state: LinkState::Offline,
            last_attempt_ms: None,
            subscribed: false,
            client_id: String::new(),
            connected: Arc::new(AtomicBool::new(false)),
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sim_broker_up: true,
            #[cfg(not(target_os = "espidf"))]
            sim_published: std::vec::Vec::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_subscriptions: std::vec::Vec::new(),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// Client id of the current (or last) connection attempt.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Drive the connection state machine.  `network_up` gates reconnect
    /// attempts on WiFi being associated.
    pub fn poll(&mut self, now_ms: u64, network_up: bool) {
        let connected = self.connected.load(Ordering::Acquire);
        match (self.state, connected) {
            (LinkState::Online, true) => {}
            (LinkState::Online, false) => {
                warn!("MQTT: connection lost");
                self.state = LinkState::Offline;
                self.subscribed = false;
            }
            (LinkState::Connecting, true) => {
                info!("MQTT: connected as {}", self.client_id);
                self.state = LinkState::Online;
                if let Err(e) = self.subscribe_all() {
                    warn!("MQTT: subscribe failed: {}", e);
                }
            }
            (LinkState::Connecting | LinkState::Offline, false) => {
                let due = self
                    .last_attempt_ms
                    .is_none_or(|t| now_ms.saturating_sub(t) >= self.backoff_ms);
                if network_up && due {
                    self.last_attempt_ms = Some(now_ms);
                    self.connect();
                }
            }
            (LinkState::Offline, true) => {
                self.state = LinkState::Connecting;
            }
        }
    }

    fn subscribe_all(&mut self) -> Result<(), CommsError> {
        if self.subscribed {
            return Ok(());
        }
        for topic in messaging::subscription_topics(&self.device_id) {
            self.subscribe(&topic)?;
        }
        self.subscribed = true;
        info!("MQTT: subscribed to tuning topics under {}", self.device_id);
        Ok(())
    }

    // ── ESP-IDF client ────────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn connect(&mut self) {
        // Drop the previous client before opening a new session.
        self.client = None;
        self.connected.store(false, Ordering::Release);
        self.client_id = messaging::random_client_id();
        info!("MQTT: connecting to {} as {}", self.broker_url, self.client_id);

        let conf = MqttClientConfiguration {
            client_id: Some(self.client_id.as_str()),
            ..Default::default()
        };
        let flag = Arc::clone(&self.connected);
        let result = EspMqttClient::new_cb(self.broker_url.as_str(), &conf, move |event| match event.payload() {
            EventPayload::Connected(_) => flag.store(true, Ordering::Release),
            EventPayload::Disconnected => flag.store(false, Ordering::Release),
            EventPayload::Received { topic: Some(topic), data, details: Details::Complete, .. } => {
                messaging::enqueue(topic, data);
            }
            _ => {}
        });
        match result {
            Ok(client) => {
                self.client = Some(client);
                self.state = LinkState::Connecting;
            }
            Err(e) => {
                warn!("MQTT: client start failed: {:?}, retrying in {}ms", e, self.backoff_ms);
                self.state = LinkState::Offline;
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        let client = self.client.as_mut().ok_or(CommsError::MqttSubscribeFailed)?;
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map(|_| ())
            .map_err(|_| CommsError::MqttSubscribeFailed)
    }

    // ── Host simulation ───────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn connect(&mut self) {
        self.client_id = messaging::random_client_id();
        info!("MQTT: (sim) connecting as {}", self.client_id);
        self.state = LinkState::Connecting;
        self.connected.store(self.sim_broker_up, Ordering::Release);
    }

    #[cfg(not(target_os = "espidf"))]
    fn subscribe(&mut self, topic: &str) -> Result<(), CommsError> {
        self.sim_subscriptions.push(topic.into());
        Ok(())
    }

    /// Bring the simulated broker up or down.  Taking it down drops the
    /// current session.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_broker(&mut self, up: bool) {
        self.sim_broker_up = up;
        if !up {
            self.connected.store(false, Ordering::Release);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_published(&self) -> &[(std::string::String, std::string::String)] {
        &self.sim_published
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_subscriptions(&self) -> &[std::string::String] {
        &self.sim_subscriptions
    }
}

impl PublishPort for MqttLink {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        if self.state != LinkState::Online {
            return Err(CommsError::MqttPublishFailed);
        }
        #[cfg(target_os = "espidf")]
        {
            let client = self.client.as_mut().ok_or(CommsError::MqttPublishFailed)?;
            client
                .publish(topic, QoS::AtMostOnce, false, payload.as_bytes())
                .map(|_| ())
                .map_err(|_| CommsError::MqttPublishFailed)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.sim_published.push((topic.into(), payload.into()));
            Ok(())
        }
    }

    fn is_connected(&self) -> bool {
        self.state == LinkState::Online
    }
}
