//! Fuzz target: `VerdictStream::classify`
//!
//! Feeds arbitrary bytes through the line-oriented verdict source and
//! asserts that it never panics and always terminates with
//! `SourceClosed` once the input is exhausted.
//!
//! cargo fuzz run fuzz_verdict_line

#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use moodrelay::adapters::verdict_stream::{LineRules, VerdictStream};
use moodrelay::app::ports::Classifier;
use moodrelay::config::DetectionConfig;
use moodrelay::error::ClassifierError;

fuzz_target!(|data: &[u8]| {
    let rules = LineRules::from(&DetectionConfig::default());
    let mut stream = VerdictStream::new(Cursor::new(data), rules);

    // One line per call; a non-empty input has at most `len` lines.
    for _ in 0..=data.len() {
        match stream.classify() {
            Err(ClassifierError::SourceClosed) => return,
            Ok(_) | Err(ClassifierError::Malformed) | Err(ClassifierError::Io(_)) => {}
        }
    }
    panic!("stream did not close after {} bytes", data.len());
});
