//! Line-oriented verdict source.
//!
//! Implements [`Classifier`] by reading one line per classified frame from
//! any [`BufRead`]: the serial console on the device, a pipe from the
//! vision process on a host, or an in-memory script in tests.
//!
//! Accepted lines (surrounding whitespace and case are ignored):
//!
//! | Line                          | Verdict            |
//! |-------------------------------|--------------------|
//! | `happy`, `h`, `1`             | Happy              |
//! | `not_happy`, `not-happy`, `n`, `0` | NotHappy      |
//! | `none`, `noface`, `-`         | NoFace             |
//! | `?`, `ambiguous`, empty       | no verdict         |
//! | `ratio=<f32>`                 | mouth-ratio rule   |
//! | `score=<f32>`                 | happy-score rule   |

use std::io::BufRead;

use log::debug;

use crate::app::ports::Classifier;
use crate::classify::mouth::MouthThresholds;
use crate::classify::score::{self, Detection};
use crate::config::DetectionConfig;
use crate::control::relay::ClassificationEvent;
use crate::error::ClassifierError;

/// Thresholds used for the numeric line forms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineRules {
    pub mouth: MouthThresholds,
    pub happy_score: f32,
}

impl From<&DetectionConfig> for LineRules {
    fn from(c: &DetectionConfig) -> Self {
        Self {
            mouth: MouthThresholds::from(c),
            happy_score: c.happy_score_threshold,
        }
    }
}

impl LineRules {
    /// Parse one verdict line.
    pub fn parse(&self, line: &str) -> Result<Option<ClassificationEvent>, ClassifierError> {
        let line = line.trim().to_ascii_lowercase();

        if let Some(value) = line.strip_prefix("ratio=") {
            return Ok(self.mouth.verdict(parse_finite(value)?));
        }
        if let Some(value) = line.strip_prefix("score=") {
            let s = parse_finite(value)?;
            return Ok(score::verdict(Detection::HappyScore(s), self.happy_score));
        }

        match line.as_str() {
            "happy" | "h" | "1" => Ok(Some(ClassificationEvent::Happy)),
            "not_happy" | "not-happy" | "n" | "0" => Ok(Some(ClassificationEvent::NotHappy)),
            "none" | "noface" | "-" => Ok(Some(ClassificationEvent::NoFace)),
            "" | "?" | "ambiguous" => Ok(None),
            _ => Err(ClassifierError::Malformed),
        }
    }
}

fn parse_finite(value: &str) -> Result<f32, ClassifierError> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(ClassifierError::Malformed)
}

/// [`Classifier`] reading verdict lines from `R`.
pub struct VerdictStream<R> {
    reader: R,
    rules: LineRules,
    buf: String,
}

impl<R: BufRead> VerdictStream<R> {
    pub fn new(reader: R, rules: LineRules) -> Self {
        Self {
            reader,
            rules,
            buf: String::with_capacity(32),
        }
    }
}

impl<R: BufRead> Classifier for VerdictStream<R> {
    fn classify(&mut self) -> Result<Option<ClassificationEvent>, ClassifierError> {
        self.buf.clear();
        let n = self
            .reader
            .read_line(&mut self.buf)
            .map_err(|e| ClassifierError::Io(e.kind()))?;
        if n == 0 {
            return Err(ClassifierError::SourceClosed);
        }
        let verdict = self.rules.parse(&self.buf)?;
        debug!("verdict: {:?} <- {:?}", verdict, self.buf.trim_end());
        Ok(verdict)
    }
}
