//! Mouth-opening verdict from face-mesh landmarks.
//!
//! The ratio of lip separation to mouth width is a cheap smile proxy:
//! a wide-open laughing mouth scores high, a closed flat mouth near zero.
//! Between the two thresholds the frame yields no verdict.

use crate::config::DetectionConfig;
use crate::control::relay::ClassificationEvent;

/// Face-mesh landmark indices (468-point topology).
pub const LEFT_MOUTH_CORNER: usize = 61;
pub const RIGHT_MOUTH_CORNER: usize = 291;
pub const TOP_LIP: usize = 13;
pub const BOTTOM_LIP: usize = 14;

/// Image-space point, y grows downwards.
pub type Point = (f32, f32);

/// The four landmarks the ratio needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthLandmarks {
    pub left_corner: Point,
    pub right_corner: Point,
    pub top_lip: Point,
    pub bottom_lip: Point,
}

impl MouthLandmarks {
    /// Pick the mouth landmarks out of a full mesh.  `None` if the mesh is
    /// too short.
    pub fn from_mesh(mesh: &[Point]) -> Option<Self> {
        Some(Self {
            left_corner: *mesh.get(LEFT_MOUTH_CORNER)?,
            right_corner: *mesh.get(RIGHT_MOUTH_CORNER)?,
            top_lip: *mesh.get(TOP_LIP)?,
            bottom_lip: *mesh.get(BOTTOM_LIP)?,
        })
    }

    /// Lip separation over mouth width.  `None` for a degenerate mouth
    /// (corners coincide or are mirrored).
    pub fn open_ratio(&self) -> Option<f32> {
        let width = self.right_corner.0 - self.left_corner.0;
        if !(width.is_finite() && width > 0.0) {
            return None;
        }
        let ratio = (self.bottom_lip.1 - self.top_lip.1) / width;
        ratio.is_finite().then_some(ratio)
    }
}

/// Verdict thresholds for the mouth ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouthThresholds {
    /// Above this the face is happy.
    pub happy: f32,
    /// Below this the face is not happy.
    pub not_happy: f32,
}

impl From<&DetectionConfig> for MouthThresholds {
    fn from(c: &DetectionConfig) -> Self {
        Self {
            happy: c.happy_mouth_ratio,
            not_happy: c.not_happy_mouth_ratio,
        }
    }
}

impl MouthThresholds {
    pub fn verdict(&self, ratio: f32) -> Option<ClassificationEvent> {
        if ratio > self.happy {
            Some(ClassificationEvent::Happy)
        } else if ratio < self.not_happy {
            Some(ClassificationEvent::NotHappy)
        } else {
            None
        }
    }

    /// Verdict straight from landmarks.  Degenerate geometry gives no verdict.
    pub fn classify(&self, mouth: &MouthLandmarks) -> Option<ClassificationEvent> {
        mouth.open_ratio().and_then(|r| self.verdict(r))
    }
}
