//! Verdict from a face detector plus an emotion-score model.

use crate::control::relay::ClassificationEvent;

/// Output of one detector + emotion-model pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection {
    /// The detector found no face.
    NoFace,
    /// A face was found but the emotion model returned nothing for it.
    FaceWithoutScores,
    /// "happy" probability of the first face, 0..=1.
    HappyScore(f32),
}

/// Map a detection to a verdict.  Anything not above `threshold` is
/// not happy; a face without scores gives no verdict.
pub fn verdict(detection: Detection, threshold: f32) -> Option<ClassificationEvent> {
    match detection {
        Detection::NoFace => Some(ClassificationEvent::NoFace),
        Detection::FaceWithoutScores => None,
        Detection::HappyScore(s) if s > threshold => Some(ClassificationEvent::Happy),
        Detection::HappyScore(_) => Some(ClassificationEvent::NotHappy),
    }
}
