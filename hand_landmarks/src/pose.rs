//! Static pose classification: how many non-thumb fingers are raised.

use crate::landmark::{index, Finger, HandLandmarks, Landmark, LANDMARK_COUNT};

/// A finger is "up" when its tip sits strictly higher in the image than its
/// PIP joint. Image `y` grows downward, so higher means smaller.
pub fn is_finger_up(tip: Landmark, pip: Landmark) -> bool {
    tip.y < pip.y
}

impl HandLandmarks {
    pub fn finger_up(&self, finger: Finger) -> bool {
        is_finger_up(self.tip(finger), self.pip(finger))
    }
}

/// Count raised fingers among index, middle, ring and pinky.
///
/// Always in `0..=4`. The thumb is ignored and there is no hysteresis: every
/// frame is judged on its own.
pub fn classify_pose(hand: &HandLandmarks) -> u8 {
    Finger::COUNTED
        .iter()
        .filter(|&&f| hand.finger_up(f))
        .count() as u8
}

// ════════════════════════════════════════════════════════════════════════════
// HandBuilder — synthetic upright hands
// ════════════════════════════════════════════════════════════════════════════

/// Builds a plausible upright hand around a wrist position.
///
/// Used by the simulation source (mouse + keyboard standing in for a camera)
/// and by tests. Raised fingers point up; curled fingers fold their tip back
/// below the PIP joint.
#[derive(Clone, Debug)]
pub struct HandBuilder {
    wrist:  Landmark,
    raised: [bool; 4],
    thumb:  bool,
    scale:  f64,
}

// Column offset of each digit from the wrist, thumb first.
const COLUMN_DX: [f64; 5] = [-0.07, -0.03, -0.01, 0.01, 0.03];

impl HandBuilder {
    pub fn new(wrist: Landmark) -> Self {
        HandBuilder { wrist, raised: [false; 4], thumb: false, scale: 1.0 }
    }

    /// Raise the first `n` counted fingers (index first) and curl the rest.
    pub fn raised(mut self, n: usize) -> Self {
        for (i, r) in self.raised.iter_mut().enumerate() {
            *r = i < n;
        }
        self
    }

    pub fn finger(mut self, finger: Finger, up: bool) -> Self {
        match Finger::COUNTED.iter().position(|&f| f == finger) {
            Some(i) => self.raised[i] = up,
            None    => self.thumb = up,
        }
        self
    }

    pub fn thumb(mut self, extended: bool) -> Self {
        self.thumb = extended;
        self
    }

    /// Overall hand size relative to the default (roughly 20% of frame height).
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn build(&self) -> HandLandmarks {
        let s = self.scale;
        let w = self.wrist;
        let at = |dx: f64, dy: f64| Landmark::new(w.x + dx * s, w.y + dy * s);

        let mut pts = [Landmark::default(); LANDMARK_COUNT];
        pts[index::WRIST] = w;

        // Thumb: splayed out to the side when extended, tucked otherwise.
        let tx = COLUMN_DX[0];
        pts[index::THUMB_CMC] = at(tx * 0.4, -0.03);
        pts[index::THUMB_MCP] = at(tx * 0.7, -0.06);
        pts[index::THUMB_IP]  = at(tx, -0.08);
        pts[index::THUMB_TIP] = if self.thumb { at(tx * 1.3, -0.11) } else { at(tx * 0.5, -0.07) };

        for (i, finger) in Finger::COUNTED.iter().enumerate() {
            let dx   = COLUMN_DX[i + 1];
            let base = finger.tip() - 3;
            pts[base]     = at(dx, -0.10);
            pts[base + 1] = at(dx, -0.14);
            if self.raised[i] {
                pts[base + 2] = at(dx, -0.17);
                pts[base + 3] = at(dx, -0.20);
            } else {
                pts[base + 2] = at(dx, -0.12);
                pts[base + 3] = at(dx, -0.10);
            }
        }

        HandLandmarks::new(pts)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
