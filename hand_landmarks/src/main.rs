//! pose_probe — print the finger-up count for each detection line on stdin.
//!
//! Handy for checking an estimator's output before wiring it to the mouse:
//!
//! ```text
//! python hand_detect.py | pose_probe 0.5
//! ```

use hand_landmarks::{classify_pose, decode_detection, Finger};
use std::io::{self, BufRead};

fn main() {
    let min_confidence: f64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.7);

    eprintln!();
    eprintln!("╔══════════════════════════════════════════════════════╗");
    eprintln!("║              Hand Pose Probe (stdin)                 ║");
    eprintln!("╚══════════════════════════════════════════════════════╝");
    eprintln!("  min confidence: {:.2}", min_confidence);
    eprintln!();

    let stdin = io::stdin();
    for (n, line) in stdin.lock().lines().enumerate() {
        let line = match line {
            Ok(l)  => l,
            Err(e) => { eprintln!("  read error: {}", e); break; }
        };
        if line.trim().is_empty() { continue; }

        match decode_detection(&line, min_confidence) {
            Err(e) => println!("[{:>6}]  skipped: {}", n, e),
            Ok(det) => match det.hand {
                None => println!("[{:>6}]  no hand", n),
                Some(h) => {
                    let w = h.landmarks.wrist();
                    let fingers: String = Finger::COUNTED.iter()
                        .map(|&f| if h.landmarks.finger_up(f) { '|' } else { '.' })
                        .collect();
                    println!(
                        "[{:>6}]  {:?} score={:.2}  wrist=({:.3}, {:.3})  {}  count={}",
                        n, h.handedness, h.score, w.x, w.y, fingers,
                        classify_pose(&h.landmarks)
                    );
                }
            },
        }
    }
}
