//! Mock adapters for integration tests.
//!
//! Records every relay write so tests can assert on the full write
//! history without touching real GPIO, and checks after every single
//! write that the two outputs are never energized together.

use std::cell::Cell;
use std::collections::VecDeque;
use std::time::Duration;

use embedded_hal::digital::ErrorKind;
use moodrelay::app::events::AppEvent;
use moodrelay::app::ports::{Classifier, Clock, EventSink, OutputSink};
use moodrelay::control::relay::{ClassificationEvent, Level, Output};
use moodrelay::error::{ActuatorError, ClassifierError};
use moodrelay::time::Timestamp;

// ── MockRelays ────────────────────────────────────────────────

pub struct MockRelays {
    pub writes: Vec<(Output, Level)>,
    happy: bool,
    not_happy: bool,
    /// Fail the next write matching this pair.
    pub fail_once: Option<(Output, Level)>,
}

#[allow(dead_code)]
impl MockRelays {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            happy: false,
            not_happy: false,
            fail_once: None,
        }
    }

    pub fn is_energized(&self, output: Output) -> bool {
        match output {
            Output::Happy => self.happy,
            Output::NotHappy => self.not_happy,
        }
    }

    pub fn energized(&self) -> Option<Output> {
        Output::ALL.into_iter().find(|o| self.is_energized(*o))
    }
}

impl Default for MockRelays {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for MockRelays {
    fn set_output(&mut self, output: Output, level: Level) -> Result<(), ActuatorError> {
        if self.fail_once == Some((output, level)) {
            self.fail_once = None;
            return Err(ActuatorError::OutputWriteFailed {
                output,
                kind: ErrorKind::Other,
            });
        }
        self.writes.push((output, level));
        let on = level == Level::Energized;
        match output {
            Output::Happy => self.happy = on,
            Output::NotHappy => self.not_happy = on,
        }
        assert!(
            !(self.happy && self.not_happy),
            "both relays energized after write {:?}",
            (output, level)
        );
        Ok(())
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Synthetic clock.  Every `now()` call advances it by `step`, so the
/// classifier appears to take exactly `step` per call.
pub struct ManualClock {
    micros: Cell<u64>,
    step: Duration,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn new(step: Duration) -> Self {
        Self {
            micros: Cell::new(1_000_000),
            step,
        }
    }

    pub fn advance(&self, by: Duration) {
        self.micros.set(self.micros.get() + by.as_micros() as u64);
    }

    pub fn set(&self, at: Timestamp) {
        self.micros.set(at.as_micros());
    }

    pub fn peek(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.get())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let t = self.micros.get();
        self.micros.set(t + self.step.as_micros() as u64);
        Timestamp::from_micros(t)
    }
}

// ── ScriptedClassifier ────────────────────────────────────────

/// Plays back a script, then repeats `fallback` forever.
pub struct ScriptedClassifier {
    script: VecDeque<Result<Option<ClassificationEvent>, ClassifierError>>,
    fallback: Result<Option<ClassificationEvent>, ClassifierError>,
    pub calls: usize,
}

#[allow(dead_code)]
impl ScriptedClassifier {
    pub fn new(script: impl IntoIterator<Item = Option<ClassificationEvent>>) -> Self {
        Self {
            script: script.into_iter().map(Ok).collect(),
            fallback: Err(ClassifierError::SourceClosed),
            calls: 0,
        }
    }

    pub fn repeating(verdict: Option<ClassificationEvent>) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: Ok(verdict),
            calls: 0,
        }
    }

    pub fn then_fail(mut self, err: ClassifierError) -> Self {
        self.script.push_back(Err(err));
        self
    }

    /// Return `err` on every call once the script runs out.
    pub fn then_fail_forever(mut self, err: ClassifierError) -> Self {
        self.fallback = Err(err);
        self
    }

    pub fn push(&mut self, verdict: Option<ClassificationEvent>) {
        self.script.push_back(Ok(verdict));
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&mut self) -> Result<Option<ClassificationEvent>, ClassifierError> {
        self.calls += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
