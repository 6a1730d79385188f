//! MediBox Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single non-blocking control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        OledDisplay   SntpTime   MqttLink      │
//! │  (Sensor+Actuator+Input)(Display)     (TimeSync) (Publish)     │
//! │  LogEventSink           WifiLink      Watchdog                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Ringer FSM · Alarms · Menu · Env · Light · Vent       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Context, Result};
use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::{error, info, warn};

use medibox::adapters::hardware::HardwareAdapter;
use medibox::adapters::log_sink::LogEventSink;
use medibox::adapters::mqtt::MqttLink;
use medibox::adapters::time::{MonotonicClock, SntpTime};
use medibox::adapters::wifi::WifiLink;
use medibox::app::commands::AppCommand;
use medibox::app::ports::DisplayPort;
use medibox::app::service::AppService;
use medibox::config::SystemConfig;
use medibox::drivers::buzzer::Buzzer;
use medibox::drivers::oled::OledDisplay;
use medibox::drivers::servo::Servo;
use medibox::drivers::watchdog::Watchdog;
use medibox::sensors::SensorHub;
use medibox::sensors::climate::Dht22;
use medibox::sensors::light::LightSensor;
use medibox::{drivers, messaging, pins, screen};

/// Link check period while waiting for WiFi at boot.
const WIFI_POLL_MS: u64 = 250;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  MediBox v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = SystemConfig::default();
    config.validate().map_err(|e| anyhow::anyhow!("invalid default config: {e}"))?;

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Initialise hardware peripherals ────────────────────
    if let Err(e) = drivers::hw_init::init_peripherals() {
        halt(format_args!("HAL init failed: {}", e));
    }

    // ── 3. Display (fatal on failure) ─────────────────────────
    // Before the watchdog subscribes this task, so a halt stays halted.
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    );
    let mut display = match OledDisplay::open(i2c, pins::OLED_I2C_ADDR) {
        Ok(d) => d,
        Err(e) => halt(format_args!("SSD1306 allocation failed: {}", e)),
    };
    show(&mut display, &screen::banner("MediBox Ready"));
    std::thread::sleep(Duration::from_millis(2000));

    let watchdog = Watchdog::new(config.watchdog_timeout_ms);
    let clock = MonotonicClock::new();

    // ── 4. WiFi (wait for the first association) ──────────────
    let driver = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
    let mut wifi = WifiLink::new(driver, &config.wifi_ssid, &config.wifi_password, config.reconnect_backoff_secs)
        .map_err(|e| anyhow::anyhow!("WiFi credentials: {e}"))?;
    show(&mut display, &screen::connecting());
    while !wifi.poll(clock.uptime_ms()) {
        watchdog.feed();
        std::thread::sleep(Duration::from_millis(WIFI_POLL_MS));
    }
    show(&mut display, &screen::banner("Connected to WiFi"));

    // ── 5. Time, MQTT, sensors ────────────────────────────────
    let mut time = SntpTime::new(&config.ntp_server);
    let mut link = MqttLink::new(&config.mqtt_broker_url, &config.device_id, config.reconnect_backoff_secs);

    let dht_pin = PinDriver::input_output_od(peripherals.pins.gpio12)?;
    let sensor_hub = SensorHub::new(
        LightSensor::new(pins::LDR_ADC1_CHANNEL),
        Dht22::new(dht_pin, Ets),
        config.climate_read_interval_ms,
    );
    let mut hw = HardwareAdapter::new(sensor_hub, Buzzer::new(), Servo::new());

    // ── 6. Construct app service ──────────────────────────────
    let mut log_sink = LogEventSink::new();
    let mut app = AppService::new(config.clone());
    app.start(clock.uptime_ms(), &time, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    let tick = Duration::from_millis(u64::from(config.tick_interval_ms));

    loop {
        watchdog.feed();
        let now_ms = clock.uptime_ms();

        let network_up = wifi.poll(now_ms);
        link.poll(now_ms, network_up);

        while let Some(msg) = messaging::try_next() {
            app.handle_command(AppCommand::Tuning(msg), &mut time, &mut log_sink);
        }

        app.tick(now_ms, &mut hw, &mut display, &mut time, &mut link, &mut log_sink);

        std::thread::sleep(tick);
    }
}

/// Stop for good.  Sleeps rather than spins so the idle task keeps running.
fn halt(reason: core::fmt::Arguments<'_>) -> ! {
    error!("{}, halting", reason);
    loop {
        std::thread::sleep(Duration::from_secs(3600));
    }
}

/// Best-effort boot banner; the control loop retries its own screens.
fn show(display: &mut impl DisplayPort, s: &medibox::screen::Screen) {
    if let Err(e) = display.show(s) {
        warn!("DISPLAY: boot banner failed: {}", e);
    }
}
