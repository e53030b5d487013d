//! Dead-zone proportional cursor motion.
//!
//! The hand steers like a joystick: inside the neutral zone nothing moves;
//! outside it, the cursor drifts every frame by an amount proportional to how
//! far past the zone edge the wrist is.

use hand_landmarks::Landmark;
use serde::{Deserialize, Serialize};

use crate::config::{ScreenSize, Sensitivity};
use crate::error::ConfigError;

// ════════════════════════════════════════════════════════════════════════════
// NeutralZone
// ════════════════════════════════════════════════════════════════════════════

/// Axis-aligned rectangle in normalized frame coordinates. Edges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeutralZone {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for NeutralZone {
    fn default() -> Self {
        NeutralZone { x_min: 0.3, x_max: 0.7, y_min: 0.3, y_max: 0.7 }
    }
}

impl NeutralZone {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        NeutralZone { x_min, x_max, y_min, y_max }
    }

    pub fn contains(&self, p: Landmark) -> bool {
        (self.x_min..=self.x_max).contains(&p.x) && (self.y_min..=self.y_max).contains(&p.y)
    }

    pub fn center(&self) -> Landmark {
        Landmark::new((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let bounds = [
            ("x_min", self.x_min), ("x_max", self.x_max),
            ("y_min", self.y_min), ("y_max", self.y_max),
        ];
        for (name, v) in bounds {
            if !(0.0..=1.0).contains(&v) {
                return Err(ConfigError::InvalidZone(format!("{} = {} is outside [0, 1]", name, v)));
            }
        }
        if self.x_min >= self.x_max {
            return Err(ConfigError::InvalidZone(format!(
                "x_min ({}) must be below x_max ({})", self.x_min, self.x_max
            )));
        }
        if self.y_min >= self.y_max {
            return Err(ConfigError::InvalidZone(format!(
                "y_min ({}) must be below y_max ({})", self.y_min, self.y_max
            )));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Motion
// ════════════════════════════════════════════════════════════════════════════

/// Relative cursor displacement in screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
    pub dx: f64,
    pub dy: f64,
}

impl Motion {
    pub const ZERO: Motion = Motion { dx: 0.0, dy: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Whole-pixel step for the pointer backend.
    pub fn rounded(&self) -> (i32, i32) {
        (self.dx.round() as i32, self.dy.round() as i32)
    }

    pub fn magnitude(&self) -> f64 {
        self.dx.hypot(self.dy)
    }
}

/// Signed distance past `[min, max]`, zero inside.
fn penetration(v: f64, min: f64, max: f64) -> f64 {
    if v < min {
        v - min
    } else if v > max {
        v - max
    } else {
        0.0
    }
}

/// Relative motion for one frame given the wrist position.
///
/// Each axis is independent: `(v − crossed_edge) · sensitivity · screen_extent`.
pub fn compute_motion(
    wrist:       Landmark,
    zone:        &NeutralZone,
    sensitivity: Sensitivity,
    screen:      ScreenSize,
) -> Motion {
    let px = penetration(wrist.x, zone.x_min, zone.x_max);
    let py = penetration(wrist.y, zone.y_min, zone.y_max);
    Motion {
        dx: px * sensitivity.x * screen.width as f64,
        dy: py * sensitivity.y * screen.height as f64,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn motion_at(x: f64, y: f64) -> Motion {
        compute_motion(
            Landmark::new(x, y),
            &NeutralZone::default(),
            Sensitivity::default(),
            ScreenSize::default(),
        )
    }

    #[test]
    fn centre_is_still() {
        assert_eq!(motion_at(0.5, 0.5), Motion::ZERO);
    }

    #[test]
    fn zone_edges_are_inside() {
        assert!(motion_at(0.3, 0.7).is_zero());
        assert!(motion_at(0.7, 0.3).is_zero());
    }

    #[test]
    fn left_of_zone() {
        // (0.1 − 0.3) · 0.5 · 1920 = −192
        let m = motion_at(0.1, 0.5);
        assert!((m.dx + 192.0).abs() < 1e-9, "dx = {}", m.dx);
        assert_eq!(m.dy, 0.0);
        assert_eq!(m.rounded(), (-192, 0));
    }

    #[test]
    fn right_and_below_zone() {
        // dx = (0.9 − 0.7) · 0.5 · 1920 = 192, dy = (1.0 − 0.7) · 0.5 · 1080 = 162
        let m = motion_at(0.9, 1.0);
        assert_eq!(m.rounded(), (192, 162));
    }

    #[test]
    fn above_zone_moves_up() {
        let m = motion_at(0.5, 0.0);
        assert!(m.dy < 0.0);
        assert_eq!(m.rounded(), (0, -162));
    }

    #[test]
    fn magnitude_non_decreasing_with_distance() {
        let mut last = 0.0;
        for i in 0..=300 {
            let x = 0.7 + i as f64 / 1000.0;
            let mag = motion_at(x, 0.5).magnitude();
            assert!(mag >= last, "x={} mag={} last={}", x, mag, last);
            last = mag;
        }
        let mut last = 0.0;
        for i in 0..=300 {
            let y = 0.3 - i as f64 / 1000.0;
            let mag = motion_at(0.5, y).magnitude();
            assert!(mag >= last);
            last = mag;
        }
    }

    #[test]
    fn sensitivity_scales_linearly() {
        let zone = NeutralZone::default();
        let screen = ScreenSize::default();
        let w = Landmark::new(0.0, 0.5);
        let slow = compute_motion(w, &zone, Sensitivity { x: 0.5, y: 0.5 }, screen);
        let fast = compute_motion(w, &zone, Sensitivity { x: 1.0, y: 0.5 }, screen);
        assert!((fast.dx - 2.0 * slow.dx).abs() < 1e-9);
    }

    #[test]
    fn zero_sensitivity_freezes_axis() {
        let m = compute_motion(
            Landmark::new(0.0, 0.0),
            &NeutralZone::default(),
            Sensitivity { x: 0.0, y: 0.5 },
            ScreenSize::default(),
        );
        assert_eq!(m.dx, 0.0);
        assert!(m.dy < 0.0);
    }

    #[test]
    fn contains_and_center() {
        let z = NeutralZone::new(0.2, 0.4, 0.6, 0.8);
        assert!(z.contains(Landmark::new(0.3, 0.7)));
        assert!(!z.contains(Landmark::new(0.5, 0.7)));
        let c = z.center();
        assert!((c.x - 0.3).abs() < 1e-12 && (c.y - 0.7).abs() < 1e-12);
    }
}
