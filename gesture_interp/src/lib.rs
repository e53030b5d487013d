//! # gesture_interp
//!
//! Turns one hand skeleton per frame into relative cursor motion and at most
//! one release plus one click.
//!
//! ## Gesture → Action mapping
//!
//! | Pose | Action |
//! |---|---|
//! | Wrist inside the neutral zone | No motion |
//! | Wrist outside the neutral zone | Move by penetration depth × sensitivity × screen size |
//! | 3 fingers up (thumb ignored) | Left click (debounced) |
//! | 4 fingers up | Right click (debounced) |
//! | Any other count | Release whichever button is held |
//! | No hand in frame | Release whichever button is held |
//!
//! ## Quick start
//!
//! ```rust
//! use std::time::Duration;
//! use gesture_interp::{ClickAction, GestureInterpreter, InterpreterConfig};
//! use hand_landmarks::{HandBuilder, Landmark};
//!
//! let mut interp = GestureInterpreter::new(InterpreterConfig::default());
//! let hand = HandBuilder::new(Landmark::new(0.5, 0.5)).raised(3).build();
//!
//! let out = interp.process(Some(&hand), Duration::from_secs(1));
//! assert!(out.motion.is_zero());
//! assert_eq!(out.clicks.press, Some(ClickAction::LeftClickPressed));
//! ```

pub mod click;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod motion;

pub use click::{Button, ButtonState, ClickAction, ClickStep, SessionState, LEFT_CLICK_FINGERS, RIGHT_CLICK_FINGERS};
pub use config::{InterpreterConfig, ScreenSize, Sensitivity};
pub use error::ConfigError;
pub use interpreter::{ActionStatus, FrameOutput, GestureInterpreter};
pub use motion::{compute_motion, Motion, NeutralZone};
