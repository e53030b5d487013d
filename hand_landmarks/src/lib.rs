//! # hand_landmarks
//!
//! Normalized hand landmarks in the 21-point MediaPipe ordering, the
//! finger-up pose classifier, and the JSON-lines format external pose
//! estimators use to hand detections to this workspace.
//!
//! Coordinates are normalized to `[0, 1]` relative to the camera frame, with
//! the vertical axis growing **downward**: a smaller `y` is higher on screen.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_landmarks::{classify_pose, HandBuilder, Landmark};
//!
//! // Upright hand, wrist at the frame centre, index+middle+ring raised.
//! let hand = HandBuilder::new(Landmark::new(0.5, 0.6)).raised(3).build();
//! assert_eq!(classify_pose(&hand), 3);
//! ```
//!
//! ## Wire format
//!
//! One detection per line:
//!
//! ```text
//! {"t": 1.25, "hands": [{"handedness": "Right", "score": 0.93,
//!                        "landmarks": [{"x": 0.51, "y": 0.62, "z": 0.0}, …]}]}
//! ```
//!
//! See [`decode_detection`].

pub mod error;
pub mod landmark;
pub mod pose;
pub mod wire;

pub use error::LandmarkError;
pub use landmark::{index, Finger, HandLandmarks, Landmark, LANDMARK_COUNT};
pub use pose::{classify_pose, is_finger_up, HandBuilder};
pub use wire::{decode_detection, DetectedHand, Detection, Handedness};
