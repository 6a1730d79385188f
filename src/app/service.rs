//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the ringer FSM, alarm registry, menu, clock,
//! environment monitor, light sampler and tuning parameters.  All I/O
//! flows through port traits injected at call sites, making the whole
//! service testable with mock adapters.
//!
//! ```text
//!   SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!    InputPort ──▶ │          AppService          │ ──▶ PublishPort
//! TimeSyncPort ──▶ │ Clock · Ringer · Menu · Env  │ ──▶ DisplayPort
//!                  │ Sampler · Vent · Tuning      │ ──▶ ActuatorPort
//!                  └──────────────────────────────┘
//! ```
//!
//! One [`tick`](AppService::tick) is one pass of the control loop; nothing
//! in it blocks.  Inbound MQTT messages are applied between ticks via
//! [`handle_command`](AppService::handle_command).

use heapless::String;
use log::{info, warn};

use crate::alarm::AlarmRegistry;
use crate::clock::{ClockReading, ClockSource};
use crate::config::{ALARM_COUNT, SystemConfig};
use crate::control::sampler::{LightSampler, PublishOutcome};
use crate::control::vent;
use crate::drivers::button::{ButtonPanel, Presses};
use crate::fsm::context::RingerContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::menu::{Menu, Page};
use crate::messaging::{self, TOPIC_CAPACITY};
use crate::monitor::{EnvironmentMonitor, EnvironmentStatus};
use crate::screen::{self, Screen};
use crate::sensors::climate::ClimateReading;
use crate::tuning::{self, TuningParameters};

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, DisplayPort, EventSink, InputPort, PublishPort, SensorPort, TimeSyncPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    config: SystemConfig,
    fsm: Fsm,
    ringer: RingerContext,
    clock: ClockSource,
    buttons: ButtonPanel,
    menu: Menu,
    monitor: EnvironmentMonitor,
    sampler: LightSampler,
    tuning: TuningParameters,
    /// Latest good climate reading.
    climate: Option<ClimateReading>,
    vent_angle: Option<u8>,
    /// Last screen successfully pushed to the display.
    shown: Option<Screen>,
    intensity_topic: String<TOPIC_CAPACITY>,
    tick_count: u64,
    last_telemetry_ms: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the ringer FSM; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let ringer = RingerContext::new(&config);
        let fsm = Fsm::new(build_state_table(), StateId::Idle);
        Self {
            fsm,
            ringer,
            clock: ClockSource::new(config.utc_offset_secs),
            buttons: ButtonPanel::new(config.debounce_ms),
            menu: Menu::new(),
            monitor: EnvironmentMonitor::new(config.env),
            sampler: LightSampler::new(),
            tuning: config.tuning,
            climate: None,
            vent_angle: None,
            shown: None,
            intensity_topic: messaging::intensity_topic(&config.device_id),
            tick_count: 0,
            last_telemetry_ms: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, now_ms: u64, time: &impl TimeSyncPort, sink: &mut impl EventSink) {
        self.ringer.now_ms = now_ms;
        self.fsm.start(&mut self.ringer);
        self.clock.refresh(time);
        self.last_telemetry_ms = now_ms;
        sink.emit(&AppEvent::Started {
            ringer: self.fsm.current_state(),
            synced: self.clock.is_synced(),
        });
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: clock → buttons → alarms → ringer → menu →
    /// environment → light/vent → outputs → screen → telemetry.
    ///
    /// `hw` satisfies the sensor, actuator and input ports at once to
    /// avoid a double mutable borrow of the hardware adapter.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort + InputPort),
        display: &mut impl DisplayPort,
        time: &mut impl TimeSyncPort,
        link: &mut impl PublishPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Clock
        self.clock.refresh(&*time);

        // 2. Buttons
        let presses = self.buttons.poll(now_ms, hw);

        // 3. Alarm match (ringer idle, time known)
        if self.fsm.current_state() == StateId::Idle && self.ringer.pending.is_none() && self.clock.is_synced() {
            self.ringer.pending = self.ringer.alarms.evaluate(self.clock.reading());
        }

        // 4. Ringer owns the buttons while an alarm is live
        let ringer_busy = self.fsm.current_state() != StateId::Idle || self.ringer.pending.is_some();
        let (ringer_presses, menu_presses) = if ringer_busy { (presses, Presses::NONE) } else { (Presses::NONE, presses) };
        self.tick_ringer(now_ms, ringer_presses, sink);

        // 5. Menu (paused while ringing)
        if self.fsm.current_state() == StateId::Idle {
            if let Some(cmd) = self.menu.handle(menu_presses, now_ms, &self.ringer.alarms, self.config.alarm_view_ms) {
                self.handle_command(cmd, time, sink);
            }
        }

        // 6. Environment
        if let Some(reading) = hw.read_climate(now_ms) {
            self.climate = Some(reading);
            let before = self.monitor.status();
            let after = self.monitor.check(&reading);
            if after != before {
                sink.emit(&AppEvent::EnvAlertChanged(after));
            }
        }

        // 7. Light sampling, publishing and the vent
        self.sampler.maybe_sample(now_ms, self.tuning.sampling_interval_s, || hw.read_light());
        let outcome = self.sampler.maybe_publish(now_ms, self.tuning.sending_interval_s);
        match outcome {
            PublishOutcome::Published(avg) => {
                let payload = messaging::format_intensity(avg);
                match link.publish(&self.intensity_topic, &payload) {
                    Ok(()) => {
                        info!("LIGHT: published {} to {}", payload, self.intensity_topic);
                        sink.emit(&AppEvent::IntensityPublished(avg));
                    }
                    Err(e) => {
                        warn!("LIGHT: publish failed ({}), window dropped", e);
                        sink.emit(&AppEvent::PublishFailed(e));
                    }
                }
            }
            PublishOutcome::SkippedEmpty => sink.emit(&AppEvent::PublishSkipped),
            PublishOutcome::NotDue => {}
        }
        if outcome.is_due() {
            self.update_vent(hw, sink);
        }

        // 8. Outputs
        self.apply_outputs(hw);

        // 9. Screen
        self.refresh_screen(display);

        // 10. Telemetry
        let interval_ms = u64::from(self.config.telemetry_interval_secs) * 1000;
        if now_ms.saturating_sub(self.last_telemetry_ms) >= interval_ms {
            self.last_telemetry_ms = now_ms;
            sink.emit(&AppEvent::Telemetry(self.build_telemetry(link.is_connected())));
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a command from the MQTT queue or the menu.
    pub fn handle_command(&mut self, cmd: AppCommand, time: &mut impl TimeSyncPort, sink: &mut impl EventSink) {
        match cmd {
            AppCommand::Tuning(msg) => {
                match tuning::parse_message(&self.config.device_id, &msg.topic, &msg.payload) {
                    Ok(update) => {
                        self.tuning.apply(update);
                        info!("TUNING: applied {:?}", update);
                        sink.emit(&AppEvent::TuningApplied(update));
                    }
                    Err(e) => {
                        warn!("TUNING: rejected message on '{}': {}", msg.topic, e);
                        sink.emit(&AppEvent::TuningRejected(e));
                    }
                }
            }
            AppCommand::SetUtcOffset(secs) => {
                self.clock.set_offset(secs, time);
                self.clock.refresh(&*time);
                sink.emit(&AppEvent::UtcOffsetChanged(secs));
            }
            AppCommand::ConfigureAlarm { index, hour, minute } => {
                if index >= ALARM_COUNT || hour > 23 || minute > 59 {
                    warn!("ALARM: ignoring invalid slot/time {} {}:{}", index, hour, minute);
                    return;
                }
                self.ringer.alarms.configure(index, hour, minute);
                info!("ALARM: {} set to {}:{:02}", index + 1, hour, minute);
                sink.emit(&AppEvent::AlarmConfigured { index, hour, minute });
            }
            AppCommand::DeleteAlarm(index) => {
                if index >= ALARM_COUNT {
                    warn!("ALARM: ignoring delete of slot {}", index);
                    return;
                }
                self.ringer.alarms.deactivate(index);
                info!("ALARM: {} deleted", index + 1);
                sink.emit(&AppEvent::AlarmDeleted { index });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self, mqtt_connected: bool) -> TelemetryData {
        TelemetryData {
            clock: *self.clock.reading(),
            synced: self.clock.is_synced(),
            climate: self.climate,
            alerts: self.monitor.status().alerts,
            last_intensity: self.sampler.last_average(),
            vent_angle: self.vent_angle,
            ringer: self.fsm.current_state(),
            active_alarms: self.ringer.alarms.active_count(),
            mqtt_connected,
        }
    }

    pub fn ringer_state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn alarms(&self) -> &AlarmRegistry<ALARM_COUNT> {
        &self.ringer.alarms
    }

    pub fn clock(&self) -> &ClockReading {
        self.clock.reading()
    }

    pub fn utc_offset_secs(&self) -> i32 {
        self.clock.utc_offset_secs()
    }

    pub fn tuning(&self) -> &TuningParameters {
        &self.tuning
    }

    pub fn env_status(&self) -> EnvironmentStatus {
        self.monitor.status()
    }

    pub fn last_intensity(&self) -> f32 {
        self.sampler.last_average()
    }

    pub fn vent_angle(&self) -> Option<u8> {
        self.vent_angle
    }

    pub fn menu_page(&self) -> Page {
        self.menu.page()
    }

    /// What the display currently shows.
    pub fn screen(&self) -> Option<&Screen> {
        self.shown.as_ref()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn tick_ringer(&mut self, now_ms: u64, presses: Presses, sink: &mut impl EventSink) {
        let prev = self.fsm.current_state();
        self.ringer.now_ms = now_ms;
        self.ringer.presses = presses;
        self.fsm.tick(&mut self.ringer);
        self.ringer.presses = Presses::NONE;

        let next = self.fsm.current_state();
        if next == prev {
            return;
        }
        sink.emit(&AppEvent::RingerChanged { from: prev, to: next });
        let Some(index) = self.ringer.ringing else {
            return;
        };
        match next {
            StateId::Ringing => sink.emit(&AppEvent::AlarmRinging { index }),
            StateId::Snoozed => {
                if let Some((hour, minute)) = self.ringer.snoozed_to {
                    sink.emit(&AppEvent::AlarmSnoozed { index, hour, minute });
                }
            }
            StateId::Cancelled => sink.emit(&AppEvent::AlarmCancelled { index }),
            StateId::Idle => {}
        }
    }

    /// Recompute the vent angle from the last average intensity and the
    /// latest temperature.  Holds the current position when no reading
    /// exists yet or the formula is undefined.
    fn update_vent(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let Some(climate) = self.climate else {
            warn!("VENT: no temperature reading yet, holding position");
            sink.emit(&AppEvent::VentHeld("no temperature reading"));
            return;
        };
        let degrees = match vent::vent_degrees(&self.tuning, self.sampler.last_average(), climate.temperature_c) {
            Ok(d) => d,
            Err(e) => {
                warn!("VENT: {}, holding position", e);
                sink.emit(&AppEvent::VentHeld("angle not finite"));
                return;
            }
        };
        match hw.set_servo_angle(degrees) {
            Ok(()) => {
                info!("VENT: servo to {}\u{00b0}", degrees);
                self.vent_angle = Some(degrees);
                sink.emit(&AppEvent::VentMoved(degrees));
            }
            Err(e) => {
                warn!("VENT: servo write failed: {}", e);
                sink.emit(&AppEvent::VentHeld("servo write failed"));
            }
        }
    }

    fn apply_outputs(&self, hw: &mut impl ActuatorPort) {
        hw.set_tone(self.ringer.outputs.tone_hz);
        hw.set_alarm_indicator(self.ringer.outputs.indicator);
        hw.set_warning_indicator(self.monitor.status().warning_on());
    }

    fn compose_screen(&self) -> Screen {
        match self.fsm.current_state() {
            StateId::Ringing => return screen::ringing(None),
            StateId::Snoozed => return screen::ringing(self.ringer.snoozed_to),
            StateId::Idle | StateId::Cancelled => {}
        }
        self.menu
            .render(&self.ringer.alarms)
            .unwrap_or_else(|| screen::clock(self.clock.reading(), self.monitor.status()))
    }

    /// Push the screen only when it changed; a failed push is retried on
    /// the next tick.
    fn refresh_screen(&mut self, display: &mut impl DisplayPort) {
        let next = self.compose_screen();
        if self.shown.as_ref() == Some(&next) {
            return;
        }
        match display.show(&next) {
            Ok(()) => self.shown = Some(next),
            Err(e) => warn!("DISPLAY: update failed: {}", e),
        }
    }
}
