//! MoodRelay firmware entry point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  RelayBank<GpioOutput>  LogEventSink  MonotonicClock           │
//! │  (OutputSink)           (EventSink)   (Clock)                  │
//! │  VerdictStream<stdin>                                          │
//! │  (Classifier)                                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  ActuatorController · AdaptiveRateController           │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use moodrelay::adapters::log_sink::LogEventSink;
use moodrelay::adapters::relay_bank::{Polarity, RelayBank};
use moodrelay::adapters::time::MonotonicClock;
use moodrelay::adapters::verdict_stream::{LineRules, VerdictStream};
use moodrelay::app::ports::Clock;
use moodrelay::app::service::AppService;
use moodrelay::config::SystemConfig;
use moodrelay::drivers::gpio::GpioOutput;
use moodrelay::drivers::hw_init;
use moodrelay::error::{ClassifierError, Error};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  MoodRelay v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config ─────────────────────────────────────────────
    let config = SystemConfig::default();
    config.validate()?;
    let relay_cfg = &config.relay;

    // ── 3. Relay outputs, parked released ─────────────────────
    hw_init::init_relay_outputs(
        &[relay_cfg.happy_pin, relay_cfg.not_happy_pin],
        relay_cfg.active_low,
    )?;
    let mut relays = RelayBank::new(
        GpioOutput::new(relay_cfg.happy_pin).map_err(Error::from)?,
        GpioOutput::new(relay_cfg.not_happy_pin).map_err(Error::from)?,
        Polarity::from_active_low(relay_cfg.active_low),
    );

    // ── 4. Adapters + service ─────────────────────────────────
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let stdin = std::io::stdin();
    let mut verdicts = VerdictStream::new(stdin.lock(), LineRules::from(&config.detection));

    let mut app = AppService::new(&config, clock.now());
    if let Err(e) = app.start(&mut relays, &mut sink) {
        // Re-applied on the first frame.
        warn!("Initial relay release failed: {}", e);
    }

    let frame_period = Duration::from_secs(1) / config.rate.target_fps;
    info!("Frame loop: {:?} per frame, reading verdicts from console", frame_period);

    // ── 5. Frame loop ─────────────────────────────────────────
    loop {
        let frame_start = clock.now();

        match app.process_frame(&mut verdicts, &clock, &mut relays, &mut sink) {
            Ok(_) => {}
            Err(Error::Classifier(ClassifierError::SourceClosed)) => {
                info!("Verdict source closed, shutting down");
                break;
            }
            Err(e) => warn!("Frame {}: {}", app.frame_count(), e),
        }

        let spent = clock.now().saturating_duration_since(frame_start);
        if let Some(rest) = frame_period.checked_sub(spent) {
            std::thread::sleep(rest);
        }
    }

    // ── 6. Forced release ─────────────────────────────────────
    app.shutdown(&mut relays, &mut sink);
    Ok(())
}
