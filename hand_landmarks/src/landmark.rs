//! Landmark primitives and the fixed 21-point hand skeleton.

use crate::error::LandmarkError;

/// Number of points in one hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices (MediaPipe hand model ordering).
pub mod index {
    pub const WRIST:             usize = 0;
    pub const THUMB_CMC:         usize = 1;
    pub const THUMB_MCP:         usize = 2;
    pub const THUMB_IP:          usize = 3;
    pub const THUMB_TIP:         usize = 4;
    pub const INDEX_FINGER_MCP:  usize = 5;
    pub const INDEX_FINGER_PIP:  usize = 6;
    pub const INDEX_FINGER_DIP:  usize = 7;
    pub const INDEX_FINGER_TIP:  usize = 8;
    pub const MIDDLE_FINGER_MCP: usize = 9;
    pub const MIDDLE_FINGER_PIP: usize = 10;
    pub const MIDDLE_FINGER_DIP: usize = 11;
    pub const MIDDLE_FINGER_TIP: usize = 12;
    pub const RING_FINGER_MCP:   usize = 13;
    pub const RING_FINGER_PIP:   usize = 14;
    pub const RING_FINGER_DIP:   usize = 15;
    pub const RING_FINGER_TIP:   usize = 16;
    pub const PINKY_MCP:         usize = 17;
    pub const PINKY_PIP:         usize = 18;
    pub const PINKY_DIP:         usize = 19;
    pub const PINKY_TIP:         usize = 20;
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point, normalized to the camera frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub const fn new(x: f64, y: f64) -> Self {
        Landmark { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Horizontal flip, as when the camera image is mirrored for display.
    pub fn mirrored(self) -> Self {
        Landmark { x: 1.0 - self.x, y: self.y }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Finger
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// The fingers that take part in the finger-up count. The thumb never does.
    pub const COUNTED: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn tip(self) -> usize {
        match self {
            Finger::Thumb  => index::THUMB_TIP,
            Finger::Index  => index::INDEX_FINGER_TIP,
            Finger::Middle => index::MIDDLE_FINGER_TIP,
            Finger::Ring   => index::RING_FINGER_TIP,
            Finger::Pinky  => index::PINKY_TIP,
        }
    }

    /// Proximal interphalangeal joint (the thumb's IP joint for the thumb).
    pub fn pip(self) -> usize {
        match self {
            Finger::Thumb  => index::THUMB_IP,
            Finger::Index  => index::INDEX_FINGER_PIP,
            Finger::Middle => index::MIDDLE_FINGER_PIP,
            Finger::Ring   => index::RING_FINGER_PIP,
            Finger::Pinky  => index::PINKY_PIP,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb  => "thumb",
            Finger::Index  => "index",
            Finger::Middle => "middle",
            Finger::Ring   => "ring",
            Finger::Pinky  => "pinky",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandLandmarks
// ════════════════════════════════════════════════════════════════════════════

/// A complete hand skeleton for one frame. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct HandLandmarks {
    points: [Landmark; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        HandLandmarks { points }
    }

    /// Build from a slice, rejecting wrong lengths and NaN/infinite points.
    pub fn from_slice(points: &[Landmark]) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual:   points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }
        let mut out = [Landmark::default(); LANDMARK_COUNT];
        out.copy_from_slice(points);
        Ok(HandLandmarks { points: out })
    }

    pub fn get(&self, idx: usize) -> Landmark { self.points[idx] }
    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] { &self.points }
    pub fn wrist(&self) -> Landmark { self.points[index::WRIST] }
    pub fn tip(&self, finger: Finger) -> Landmark { self.points[finger.tip()] }
    pub fn pip(&self, finger: Finger) -> Landmark { self.points[finger.pip()] }

    pub fn mirrored(&self) -> Self {
        let mut points = self.points;
        for p in points.iter_mut() {
            *p = p.mirrored();
        }
        HandLandmarks { points }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
