//! ESP32 time adapters.
//!
//! - [`MonotonicClock`]: milliseconds since boot for the control loop
//!   timers.
//! - [`SntpTime`]: wall-clock UTC via SNTP, implementing
//!   [`TimeSyncPort`].
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` and
//!   `gettimeofday()` (set by the SNTP service).
//! - **`not(target_os = "espidf")`**: `std::time` for host-side testing
//!   and simulation.

use log::info;

use crate::app::ports::TimeSyncPort;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sntp::{EspSntp, SntpConf};

/// Anything earlier than 2020-01-01 means SNTP has not synced yet.
pub const EPOCH_2020: i64 = 1_577_836_800;

// ───────────────────────────────────────────────────────────────
// Monotonic clock
// ───────────────────────────────────────────────────────────────

pub struct MonotonicClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

// ───────────────────────────────────────────────────────────────
// SNTP wall clock
// ───────────────────────────────────────────────────────────────

pub struct SntpTime {
    server: heapless::String<32>,
    resyncs: u32,
    #[cfg(target_os = "espidf")]
    sntp: Option<EspSntp<'static>>,
}

impl SntpTime {
    /// Start the SNTP service against `server`.
    pub fn new(server: &str) -> Self {
        let mut s = heapless::String::new();
        let _ = s.push_str(server);
        let mut this = Self {
            server: s,
            resyncs: 0,
            #[cfg(target_os = "espidf")]
            sntp: None,
        };
        this.start_service();
        this
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn resync_count(&self) -> u32 {
        self.resyncs
    }

    #[cfg(target_os = "espidf")]
    fn start_service(&mut self) {
        // Only one SNTP instance may exist at a time.
        self.sntp = None;
        let mut conf = SntpConf::default();
        conf.servers[0] = self.server.as_str();
        match EspSntp::new(&conf) {
            Ok(sntp) => {
                info!("SNTP: started against {}", self.server);
                self.sntp = Some(sntp);
            }
            Err(e) => log::warn!("SNTP: start failed: {:?}", e),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn start_service(&mut self) {
        info!("SNTP(sim): using host clock for {}", self.server);
    }
}

impl TimeSyncPort for SntpTime {
    #[cfg(target_os = "espidf")]
    fn utc_epoch_secs(&self) -> Option<i64> {
        let mut tv = esp_idf_svc::sys::timeval { tv_sec: 0, tv_usec: 0 };
        if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, core::ptr::null_mut()) } != 0 {
            return None;
        }
        let secs = tv.tv_sec as i64;
        (secs >= EPOCH_2020).then_some(secs)
    }

    #[cfg(not(target_os = "espidf"))]
    fn utc_epoch_secs(&self) -> Option<i64> {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?
            .as_secs() as i64;
        (secs >= EPOCH_2020).then_some(secs)
    }

    fn request_resync(&mut self) {
        self.resyncs = self.resyncs.saturating_add(1);
        self.start_service();
    }
}
