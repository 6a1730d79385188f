//! WiFi station-mode adapter.
//!
//! Joins the configured access point without ever blocking the caller.
//!
//! ```text
//!   Disconnected ──(backoff elapsed)──▶ Connecting   (driver connect issued)
//!   Connecting ──(netif up)──▶ Connected
//!   Connecting ──(CONNECT_TIMEOUT_MS)──▶ Disconnected
//!   Connected ──(link lost)──▶ Disconnected
//! ```
//!
//! [`poll`](WifiLink::poll) only issues the driver's non-blocking connect
//! and checks the link state, so the control loop keeps ticking (and
//! feeding the watchdog) through any outage.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.

use core::fmt;
use log::{debug, info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

/// How long one association may take before it is abandoned.
pub const CONNECT_TIMEOUT_MS: u64 = 10_000;

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connecting,
    Connected,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

/// Empty means an open network.
fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi link
// ───────────────────────────────────────────────────────────────

pub struct WifiLink {
    state: WifiState,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff_ms: u64,
    /// When the current or last association was issued or abandoned.
    last_attempt_ms: Option<u64>,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    driver: EspWifi<'static>,
    #[cfg(target_os = "espidf")]
    configured: bool,
    #[cfg(not(target_os = "espidf"))]
    sim_ap_up: bool,
}

impl WifiLink {
    #[cfg(target_os = "espidf")]
    pub fn new(
        driver: EspWifi<'static>,
        ssid: &str,
        password: &str,
        backoff_secs: u32,
    ) -> Result<Self, ConnectivityError> {
        let (ssid, password) = credentials(ssid, password)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid,
            password,
            backoff_ms: u64::from(backoff_secs) * 1000,
            last_attempt_ms: None,
            attempts: 0,
            driver,
            configured: false,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(ssid: &str, password: &str, backoff_secs: u32) -> Result<Self, ConnectivityError> {
        let (ssid, password) = credentials(ssid, password)?;
        Ok(Self {
            state: WifiState::Disconnected,
            ssid,
            password,
            backoff_ms: u64::from(backoff_secs) * 1000,
            last_attempt_ms: None,
            attempts: 0,
            sim_ap_up: true,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Association attempts since the last success.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }

    /// Advance the connection state machine.  Never waits on the driver.
    /// Returns whether the link is up.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.state {
            WifiState::Connected => {
                if !self.platform_is_up() {
                    warn!("WiFi: connection to '{}' lost", self.ssid);
                    self.state = WifiState::Disconnected;
                }
            }
            WifiState::Connecting => {
                if self.platform_is_up() {
                    info!("WiFi: connected to '{}' after {} attempt(s)", self.ssid, self.attempts);
                    self.attempts = 0;
                    self.state = WifiState::Connected;
                } else if self.elapsed_since_attempt(now_ms) >= CONNECT_TIMEOUT_MS {
                    warn!(
                        "WiFi: '{}' did not come up within {}ms, retrying in {}ms",
                        self.ssid, CONNECT_TIMEOUT_MS, self.backoff_ms
                    );
                    self.platform_abort();
                    self.last_attempt_ms = Some(now_ms);
                    self.state = WifiState::Disconnected;
                }
            }
            WifiState::Disconnected => {
                let due = self.last_attempt_ms.is_none() || self.elapsed_since_attempt(now_ms) >= self.backoff_ms;
                if due {
                    self.begin(now_ms);
                }
            }
        }
        self.is_connected()
    }

    fn begin(&mut self, now_ms: u64) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_attempt_ms = Some(now_ms);
        match self.platform_begin() {
            Ok(()) => {
                debug!("WiFi: associating with '{}' (attempt {})", self.ssid, self.attempts);
                self.state = WifiState::Connecting;
            }
            Err(e) => warn!("WiFi: {}, retrying in {}ms", e, self.backoff_ms),
        }
    }

    fn elapsed_since_attempt(&self, now_ms: u64) -> u64 {
        self.last_attempt_ms.map_or(u64::MAX, |t| now_ms.saturating_sub(t))
    }

    // ── Platform-specific ─────────────────────────────────────

    /// Configure once, then issue a non-blocking connect.
    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        if !self.configured {
            let auth_method = if self.password.is_empty() { AuthMethod::None } else { AuthMethod::WPA2Personal };
            let conf = Configuration::Client(ClientConfiguration {
                ssid: self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
                password: self.password.as_str().try_into().map_err(|_| ConnectivityError::InvalidPassword)?,
                auth_method,
                ..Default::default()
            });
            self.driver.set_configuration(&conf).map_err(|e| {
                warn!("WiFi: set_configuration failed: {:?}", e);
                ConnectivityError::ConnectionFailed
            })?;
            self.driver.start().map_err(|e| {
                warn!("WiFi: start failed: {:?}", e);
                ConnectivityError::ConnectionFailed
            })?;
            self.configured = true;
        }
        self.driver.connect().map_err(|e| {
            warn!("WiFi: connect failed: {:?}", e);
            ConnectivityError::ConnectionFailed
        })
    }

    #[cfg(target_os = "espidf")]
    fn platform_abort(&mut self) {
        if let Err(e) = self.driver.disconnect() {
            debug!("WiFi: disconnect after timeout failed: {:?}", e);
        }
    }

    /// Associated and the station interface has an address.
    #[cfg(target_os = "espidf")]
    fn platform_is_up(&self) -> bool {
        self.driver.is_up().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self) -> Result<(), ConnectivityError> {
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_abort(&mut self) {}

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_up(&self) -> bool {
        self.sim_ap_up
    }

    /// Bring the simulated access point up or down.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_ap(&mut self, up: bool) {
        self.sim_ap_up = up;
    }
}

fn credentials(
    ssid: &str,
    password: &str,
) -> Result<(heapless::String<32>, heapless::String<64>), ConnectivityError> {
    validate_ssid(ssid)?;
    validate_password(password)?;
    let mut s = heapless::String::new();
    s.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
    let mut p = heapless::String::new();
    p.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
    Ok((s, p))
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
