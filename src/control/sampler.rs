//! Light sampler: windowed average of the LDR intensity.
//!
//! Two independent timers run off the control loop clock:
//!
//! - every `sampling_interval` one intensity sample is added to the window;
//! - every `sending_interval` the window is closed.  A non-empty window
//!   yields its mean (which becomes the last average intensity) and is
//!   reset; an empty window publishes nothing.  The publish timer restarts
//!   either way.
//!
//! Both timers start at 0 ms, so the first sample lands one sampling
//! interval after boot.

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PublishOutcome {
    /// The sending interval has not elapsed yet.
    NotDue,
    /// The window closed with no samples; nothing to publish.
    SkippedEmpty,
    /// The window closed; carries the mean intensity.
    Published(f32),
}

impl PublishOutcome {
    /// True when a window closed (published or skipped).
    pub fn is_due(&self) -> bool {
        !matches!(self, Self::NotDue)
    }
}

#[derive(Debug, Default)]
pub struct LightSampler {
    sum: f32,
    count: u32,
    last_sample_ms: u64,
    last_publish_ms: u64,
    last_average: f32,
}

impl LightSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one sample via `read` if the sampling interval has elapsed.
    /// Returns whether a sample was taken.
    pub fn maybe_sample(&mut self, now_ms: u64, interval_s: u32, read: impl FnOnce() -> f32) -> bool {
        if now_ms.saturating_sub(self.last_sample_ms) < u64::from(interval_s) * 1000 {
            return false;
        }
        let intensity = read().clamp(0.0, 1.0);
        self.sum += intensity;
        self.count += 1;
        self.last_sample_ms = now_ms;
        true
    }

    /// Close the window if the sending interval has elapsed.
    pub fn maybe_publish(&mut self, now_ms: u64, interval_s: u32) -> PublishOutcome {
        if now_ms.saturating_sub(self.last_publish_ms) < u64::from(interval_s) * 1000 {
            return PublishOutcome::NotDue;
        }
        self.last_publish_ms = now_ms;

        if self.count == 0 {
            debug!("LIGHT: empty window, nothing to publish");
            return PublishOutcome::SkippedEmpty;
        }

        let avg = self.sum / self.count as f32;
        self.last_average = avg;
        self.sum = 0.0;
        self.count = 0;
        PublishOutcome::Published(avg)
    }

    /// Mean of the most recent non-empty window (0.0 before the first).
    pub fn last_average(&self) -> f32 {
        self.last_average
    }

    /// Samples collected in the current window.
    pub fn pending_samples(&self) -> u32 {
        self.count
    }
}
