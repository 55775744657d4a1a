//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device, stderr on the host).

use log::{info, warn};

use crate::app::events::{AppEvent, TelemetryData};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn relay_label(t: &TelemetryData) -> &'static str {
    match t.relay.current_output() {
        Some(crate::control::relay::Output::Happy) => "happy",
        Some(crate::control::relay::Output::NotHappy) => "not-happy",
        None => "idle",
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started => info!("START | relays released"),
            AppEvent::RelayEnergized(output) => info!("RELAY | {} energized", output),
            AppEvent::RelayReleased(reason) => info!("RELAY | released ({:?})", reason),
            AppEvent::SkipChanged { from, to } => info!("RATE  | skip {} -> {}", from, to),
            AppEvent::OutputFault(e) => warn!("FAULT | {}", e),
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | fps={:.1} | skip={} | frames={}/{} | relay={}",
                    t.fps,
                    t.skip_n,
                    t.processed_frames,
                    t.frames,
                    relay_label(t),
                );
            }
            AppEvent::Stopped(t) => {
                info!(
                    "STOP  | frames={} classified={} | final fps={:.1} skip={}",
                    t.frames, t.processed_frames, t.fps, t.skip_n,
                );
            }
        }
    }
}
