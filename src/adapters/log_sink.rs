//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let (temp, hum) = t
                    .climate
                    .map_or((f32::NAN, f32::NAN), |c| (c.temperature_c, c.humidity_pct));
                info!(
                    "TELEM | {:02}:{:02}:{:02} synced={} | ringer={:?} alarms={} | \
                     T={:.1}\u{00b0}C RH={:.1}% alerts=0b{:02b} | I={:.2} vent={:?} | mqtt={}",
                    t.clock.hour,
                    t.clock.minute,
                    t.clock.second,
                    t.synced,
                    t.ringer,
                    t.active_alarms,
                    temp,
                    hum,
                    t.alerts,
                    t.last_intensity,
                    t.vent_angle,
                    if t.mqtt_connected { "up" } else { "down" },
                );
            }
            AppEvent::Started { ringer, synced } => {
                info!("START | ringer={:?} clock_synced={}", ringer, synced);
            }
            AppEvent::RingerChanged { from, to } => {
                info!("RINGER | {:?} -> {:?}", from, to);
            }
            AppEvent::AlarmRinging { index } => info!("ALARM | {} ringing", index + 1),
            AppEvent::AlarmSnoozed { index, hour, minute } => {
                info!("ALARM | {} snoozed to {}:{:02}", index + 1, hour, minute);
            }
            AppEvent::AlarmCancelled { index } => info!("ALARM | {} cancelled", index + 1),
            AppEvent::AlarmConfigured { index, hour, minute } => {
                info!("ALARM | {} set to {}:{:02}", index + 1, hour, minute);
            }
            AppEvent::AlarmDeleted { index } => info!("ALARM | {} deleted", index + 1),
            AppEvent::UtcOffsetChanged(secs) => info!("CLOCK | utc_offset={}s", secs),
            AppEvent::IntensityPublished(avg) => info!("LIGHT | published {:.2}", avg),
            AppEvent::PublishSkipped => info!("LIGHT | empty window, nothing sent"),
            AppEvent::PublishFailed(e) => warn!("LIGHT | publish failed: {}", e),
            AppEvent::VentMoved(deg) => info!("VENT | {}\u{00b0}", deg),
            AppEvent::VentHeld(reason) => info!("VENT | held ({})", reason),
            AppEvent::EnvAlertChanged(status) => {
                info!(
                    "ENV | temp_alert={} humidity_alert={}",
                    status.temperature_alert(),
                    status.humidity_alert()
                );
            }
            AppEvent::TuningApplied(update) => info!("TUNING | applied {:?}", update),
            AppEvent::TuningRejected(e) => warn!("TUNING | rejected: {}", e),
        }
    }
}
