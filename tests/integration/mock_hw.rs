//! Mock adapters for integration tests.
//!
//! Records every actuator call, screen and publish so tests can assert on
//! the full history without touching real GPIO/PWM registers.  [`Rig`]
//! wires them to an [`AppService`] and drives it tick by tick.

use medibox::app::events::AppEvent;
use medibox::app::ports::{
    ActuatorPort, DisplayPort, EventSink, InputPort, PublishPort, SensorPort, TimeSyncPort,
};
use medibox::app::service::AppService;
use medibox::config::SystemConfig;
use medibox::drivers::button::Button;
use medibox::error::{ActuatorError, CommsError};
use medibox::screen::Screen;
use medibox::sensors::climate::ClimateReading;

/// 2025-01-05 00:00:00 UTC.
pub const JAN_5_2025: i64 = 1_736_035_200;

pub const TICK_MS: u64 = 50;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Tone(Option<u16>),
    AlarmLed(bool),
    WarningLed(bool),
    Servo(u8),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub light: f32,
    pub climate: Option<ClimateReading>,
    pub held: [bool; 4],
    pub light_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            light: 0.5,
            climate: Some(ClimateReading { temperature_c: 28.0, humidity_pct: 70.0 }),
            held: [false; 4],
            light_reads: 0,
        }
    }

    fn last<T>(&self, f: impl Fn(&ActuatorCall) -> Option<T>) -> Option<T> {
        self.calls.iter().rev().find_map(f)
    }

    pub fn tone(&self) -> Option<u16> {
        self.last(|c| match c {
            ActuatorCall::Tone(t) => Some(*t),
            ActuatorCall::AllOff => Some(None),
            _ => None,
        })
        .flatten()
    }

    pub fn alarm_led(&self) -> bool {
        self.last(|c| match c {
            ActuatorCall::AlarmLed(on) => Some(*on),
            ActuatorCall::AllOff => Some(false),
            _ => None,
        })
        .unwrap_or(false)
    }

    pub fn warning_led(&self) -> bool {
        self.last(|c| match c {
            ActuatorCall::WarningLed(on) => Some(*on),
            ActuatorCall::AllOff => Some(false),
            _ => None,
        })
        .unwrap_or(false)
    }

    pub fn servo_moves(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Servo(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    /// Distinct tones in the order they started sounding.
    pub fn tone_sequence(&self) -> Vec<u16> {
        let mut out: Vec<u16> = Vec::new();
        let mut prev = None;
        for c in &self.calls {
            if let ActuatorCall::Tone(t) = c {
                if *t != prev {
                    if let Some(hz) = t {
                        out.push(*hz);
                    }
                    prev = *t;
                }
            }
        }
        out
    }
}

impl SensorPort for MockHardware {
    fn read_light(&mut self) -> f32 {
        self.light_reads += 1;
        self.light
    }

    fn read_climate(&mut self, _now_ms: u64) -> Option<ClimateReading> {
        self.climate
    }
}

impl ActuatorPort for MockHardware {
    fn set_tone(&mut self, hz: Option<u16>) {
        self.calls.push(ActuatorCall::Tone(hz));
    }

    fn set_alarm_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::AlarmLed(on));
    }

    fn set_warning_indicator(&mut self, on: bool) {
        self.calls.push(ActuatorCall::WarningLed(on));
    }

    fn set_servo_angle(&mut self, degrees: u8) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::Servo(degrees));
        Ok(())
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

impl InputPort for MockHardware {
    fn is_pressed(&mut self, button: Button) -> bool {
        self.held[button as usize]
    }
}

// ── MockTime ──────────────────────────────────────────────────

/// UTC follows the rig's monotonic clock once a base epoch is set.
pub struct MockTime {
    pub base: Option<i64>,
    pub now_ms: u64,
    pub resyncs: u32,
}

impl TimeSyncPort for MockTime {
    fn utc_epoch_secs(&self) -> Option<i64> {
        self.base.map(|b| b + (self.now_ms / 1000) as i64)
    }

    fn request_resync(&mut self) {
        self.resyncs += 1;
    }
}

// ── MockDisplay ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub shown: Vec<Screen>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn current(&self) -> Option<&Screen> {
        self.shown.last()
    }
}

impl DisplayPort for MockDisplay {
    fn show(&mut self, screen: &Screen) -> Result<(), ActuatorError> {
        if self.fail {
            return Err(ActuatorError::BusWriteFailed);
        }
        self.shown.push(screen.clone());
        Ok(())
    }
}

// ── MockPublisher ─────────────────────────────────────────────

pub struct MockPublisher {
    pub connected: bool,
    pub published: Vec<(String, String)>,
}

impl PublishPort for MockPublisher {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        if !self.connected {
            return Err(CommsError::MqttPublishFailed);
        }
        self.published.push((topic.to_owned(), payload.to_owned()));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ── LogSink ───────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn has(&self, pred: impl Fn(&AppEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub struct Rig {
    pub app: AppService,
    pub hw: MockHardware,
    pub display: MockDisplay,
    pub time: MockTime,
    pub link: MockPublisher,
    pub sink: LogSink,
    pub now_ms: u64,
}

#[allow(dead_code)]
impl Rig {
    /// Config with UTC+0 so wall-clock assertions read directly.
    pub fn config() -> SystemConfig {
        SystemConfig { utc_offset_secs: 0, ..SystemConfig::default() }
    }

    pub fn new() -> Self {
        Self::with_config(Self::config())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        let mut rig = Self {
            app: AppService::new(config),
            hw: MockHardware::new(),
            display: MockDisplay::default(),
            time: MockTime { base: None, now_ms: 0, resyncs: 0 },
            link: MockPublisher { connected: true, published: Vec::new() },
            sink: LogSink::default(),
            now_ms: 0,
        };
        rig.app.start(0, &rig.time, &mut rig.sink);
        rig
    }

    /// Make UTC read `hour:minute:second` on 2025-01-05 right now.
    pub fn set_wall_clock(&mut self, hour: i64, minute: i64, second: i64) {
        let target = JAN_5_2025 + hour * 3600 + minute * 60 + second;
        self.time.base = Some(target - (self.now_ms / 1000) as i64);
    }

    pub fn tick(&mut self) {
        self.now_ms += TICK_MS;
        self.time.now_ms = self.now_ms;
        self.app.tick(
            self.now_ms,
            &mut self.hw,
            &mut self.display,
            &mut self.time,
            &mut self.link,
            &mut self.sink,
        );
    }

    /// Tick until `ms` of monotonic time have passed.
    pub fn run_for(&mut self, ms: u64) {
        let end = self.now_ms + ms;
        while self.now_ms < end {
            self.tick();
        }
    }

    /// Press and release `button`, then wait out the debounce lockout.
    pub fn press(&mut self, button: Button) {
        self.hw.held[button as usize] = true;
        self.tick();
        self.hw.held[button as usize] = false;
        self.run_for(250);
    }

    pub fn screen(&self) -> &Screen {
        self.app.screen().expect("a screen has been shown")
    }
}
