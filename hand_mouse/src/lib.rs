//! # hand_mouse
//!
//! Hand-gesture mouse controller: steer the cursor by moving the wrist out of
//! a neutral zone, click by raising fingers.
//!
//! ## Gesture → Action mapping
//!
//! | Gesture | Action |
//! |---|---|
//! | Wrist inside the neutral zone | Cursor holds still |
//! | Wrist outside the neutral zone | Cursor drifts that way, faster the further out |
//! | 3 fingers up | Left click |
//! | 4 fingers up | Right click |
//! | Any other count, or hand lost | Release |
//!
//! ## Frame sources
//!
//! * `sim` (default) — **Simulation mode**: the overlay window stands in for
//!   a camera.
//! * `stdin` / `command` — JSON-lines detections from an external pose
//!   estimator (see `hand_landmarks::wire`).
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via LeapC
//!   (feature `leap`).
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse over the window | Wrist position |
//! | `0`–`4` | Number of raised fingers |
//! | `H` | Show / hide the hand |
//! | `T` | Extend / tuck the thumb (never counted) |
//! | `Q` / `Esc` | Quit |

pub mod app;
pub mod cli;
pub mod pointer;
pub mod source;
pub mod visualizer;
