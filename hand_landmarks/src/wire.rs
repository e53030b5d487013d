//! JSON-lines detection format emitted by external pose estimators.
//!
//! Each line is one camera frame:
//!
//! ```text
//! {"t": 0.033, "hands": [{"handedness": "Right", "score": 0.91, "landmarks": [...21 points...]}]}
//! {"t": 0.066, "hands": []}
//! {"error": "camera frame dropped"}
//! ```
//!
//! `t` is optional (seconds since the estimator started). `z` on each point is
//! accepted and ignored.

use std::time::Duration;

use serde::Deserialize;

use crate::error::LandmarkError;
use crate::landmark::{HandLandmarks, Landmark};

#[derive(Deserialize, Debug)]
struct PointRecord {
    x: f64,
    y: f64,
}

#[derive(Deserialize, Debug)]
struct HandRecord {
    #[serde(default)]
    handedness: Option<String>,
    #[serde(default = "full_confidence")]
    score:      f64,
    landmarks:  Vec<PointRecord>,
}

#[derive(Deserialize, Debug)]
struct DetectionRecord {
    #[serde(default)]
    t:     Option<f64>,
    #[serde(default)]
    hands: Vec<HandRecord>,
    #[serde(default)]
    error: Option<String>,
}

fn full_confidence() -> f64 { 1.0 }

// ════════════════════════════════════════════════════════════════════════════
// Decoded types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
    Unknown,
}

impl Handedness {
    fn parse(s: Option<&str>) -> Self {
        match s.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("left")  => Handedness::Left,
            Some("right") => Handedness::Right,
            _             => Handedness::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DetectedHand {
    pub landmarks:  HandLandmarks,
    pub score:      f64,
    pub handedness: Handedness,
}

/// One decoded frame: an optional timestamp and at most one hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub at:   Option<Duration>,
    pub hand: Option<DetectedHand>,
}

/// Decode one detection line.
///
/// Only the first hand scoring at least `min_confidence` is kept; hands below
/// the threshold are treated as not detected. An `error` field, a malformed
/// line, or a confident hand with a broken skeleton is an `Err`; the caller
/// should skip the frame rather than treat it as "no hand".
pub fn decode_detection(line: &str, min_confidence: f64) -> Result<Detection, LandmarkError> {
    let record: DetectionRecord = serde_json::from_str(line)?;

    if let Some(err) = record.error {
        return Err(LandmarkError::Detector(err));
    }

    let at = match record.t {
        Some(t) => Some(Duration::try_from_secs_f64(t)
            .map_err(|_| LandmarkError::InvalidTimestamp(t))?),
        None => None,
    };

    let hand = match record.hands.into_iter().find(|h| h.score >= min_confidence) {
        Some(h) => {
            let points: Vec<Landmark> = h.landmarks.iter()
                .map(|p| Landmark::new(p.x, p.y))
                .collect();
            Some(DetectedHand {
                landmarks:  HandLandmarks::from_slice(&points)?,
                score:      h.score,
                handedness: Handedness::parse(h.handedness.as_deref()),
            })
        }
        None => None,
    };

    Ok(Detection { at, hand })
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
