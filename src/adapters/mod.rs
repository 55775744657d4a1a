//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements  | Connects to                      |
//! |------------------|-------------|----------------------------------|
//! | `relay_bank`     | OutputSink  | Two `embedded-hal` output pins   |
//! | `log_sink`       | EventSink   | Serial log output                |
//! | `time`           | Clock       | ESP32 system timer / `Instant`   |
//! | `verdict_stream` | Classifier  | Verdict lines on any `BufRead`   |

pub mod log_sink;
pub mod relay_bank;
pub mod time;
pub mod verdict_stream;
