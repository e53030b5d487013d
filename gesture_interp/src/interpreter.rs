//! Per-frame facade over motion mapping and the click state machine.

use std::fmt;
use std::time::Duration;

use hand_landmarks::{classify_pose, HandLandmarks};
use tracing::{debug, trace};

use crate::click::{ClickAction, ClickStep, SessionState};
use crate::config::InterpreterConfig;
use crate::motion::{compute_motion, Motion};

/// Short label for what the controller is doing, for overlays and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionStatus {
    WaitingForHand,
    MovingCursor,
    LeftClick,
    RightClick,
}

impl ActionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ActionStatus::WaitingForHand => "Waiting for Hand...",
            ActionStatus::MovingCursor   => "Moving Cursor",
            ActionStatus::LeftClick      => "Left Click",
            ActionStatus::RightClick     => "Right Click",
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything one frame asks of the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameOutput {
    pub motion:     Motion,
    /// `None` when no hand was seen.
    pub fingers_up: Option<u8>,
    pub clicks:     ClickStep,
    pub status:     ActionStatus,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureInterpreter
// ════════════════════════════════════════════════════════════════════════════

/// Owns the configuration and the session state for one run.
pub struct GestureInterpreter {
    config:  InterpreterConfig,
    session: SessionState,
    frames:  u64,
}

impl GestureInterpreter {
    pub fn new(config: InterpreterConfig) -> Self {
        GestureInterpreter { config, session: SessionState::new(), frames: 0 }
    }

    pub fn config(&self)  -> &InterpreterConfig { &self.config }
    pub fn session(&self) -> &SessionState      { &self.session }
    pub fn frames(&self)  -> u64                { self.frames }

    /// Interpret one frame. `now` is the frame time since session start.
    pub fn process(&mut self, hand: Option<&HandLandmarks>, now: Duration) -> FrameOutput {
        self.frames += 1;

        let Some(hand) = hand else {
            return FrameOutput {
                motion:     Motion::ZERO,
                fingers_up: None,
                clicks:     ClickStep::released(self.session.on_hand_lost()),
                status:     ActionStatus::WaitingForHand,
            };
        };

        let cfg    = &self.config;
        let wrist  = hand.wrist();
        let motion = compute_motion(wrist, &cfg.neutral_zone, cfg.sensitivity, cfg.screen);
        let count  = classify_pose(hand);
        let clicks = self.session.resolve_click(count, now, cfg.debounce());

        let status = match clicks.press {
            Some(ClickAction::LeftClickPressed)  => ActionStatus::LeftClick,
            Some(ClickAction::RightClickPressed) => ActionStatus::RightClick,
            _ => ActionStatus::MovingCursor,
        };

        trace!(frame = self.frames, x = wrist.x, y = wrist.y, count, "frame");
        if !motion.is_zero() {
            debug!(dx = motion.dx, dy = motion.dy, "outside neutral zone");
        }

        FrameOutput { motion, fingers_up: Some(count), clicks, status }
    }

    /// Release anything still held, e.g. at shutdown.
    pub fn release_all(&mut self) -> Option<ClickAction> {
        self.session.on_hand_lost()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_landmarks::{HandBuilder, Landmark};

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn hand(x: f64, y: f64, fingers: usize) -> HandLandmarks {
        HandBuilder::new(Landmark::new(x, y)).raised(fingers).build()
    }

    #[test]
    fn centre_fist_does_nothing() {
        let mut it = GestureInterpreter::new(InterpreterConfig::default());
        let out = it.process(Some(&hand(0.5, 0.5, 0)), ms(0));
        assert_eq!(out.motion, Motion::ZERO);
        assert_eq!(out.fingers_up, Some(0));
        assert!(out.clicks.is_empty());
        assert_eq!(out.status, ActionStatus::MovingCursor);
    }

    #[test]
    fn motion_and_click_in_same_frame() {
        let mut it = GestureInterpreter::new(InterpreterConfig::default());
        let out = it.process(Some(&hand(0.1, 0.5, 3)), ms(0));
        assert_eq!(out.motion.rounded(), (-192, 0));
        assert_eq!(out.clicks.press, Some(ClickAction::LeftClickPressed));
        assert_eq!(out.status, ActionStatus::LeftClick);
    }

    #[test]
    fn left_click_scenario() {
        let mut it = GestureInterpreter::new(InterpreterConfig::default());
        let clicks: Vec<_> = [(3, 0), (3, 100), (3, 200), (2, 300)]
            .iter()
            .map(|&(n, t)| it.process(Some(&hand(0.5, 0.5, n)), ms(t)).clicks)
            .collect();
        assert_eq!(clicks, vec![
            ClickStep::pressed(Some(ClickAction::LeftClickPressed)),
            ClickStep::NONE,
            ClickStep::NONE,
            ClickStep::released(Some(ClickAction::LeftReleased)),
        ]);
        assert_eq!(it.frames(), 4);
    }

    #[test]
    fn right_click_status_only_on_press_frame() {
        let mut it = GestureInterpreter::new(InterpreterConfig::default());
        assert_eq!(it.process(Some(&hand(0.5, 0.5, 4)), ms(0)).status, ActionStatus::RightClick);
        assert_eq!(it.process(Some(&hand(0.5, 0.5, 4)), ms(100)).status, ActionStatus::MovingCursor);
    }

    #[test]
    fn no_hand_releases_and_waits() {
        let mut it = GestureInterpreter::new(InterpreterConfig::default());
        it.process(Some(&hand(0.5, 0.5, 3)), ms(0));
        let out = it.process(None, ms(33));
        assert_eq!(out.clicks, ClickStep::released(Some(ClickAction::LeftReleased)));
        assert_eq!(out.motion, Motion::ZERO);
        assert_eq!(out.fingers_up, None);
        assert_eq!(out.status, ActionStatus::WaitingForHand);
        assert!(!it.session().left_button_down());
    }

    #[test]
    fn release_all_is_idempotent() {
        let mut it = GestureInterpreter::new(InterpreterConfig::default());
        it.process(Some(&hand(0.5, 0.5, 4)), ms(0));
        assert_eq!(it.release_all(), Some(ClickAction::RightReleased));
        assert_eq!(it.release_all(), None);
    }

    #[test]
    fn custom_debounce_respected() {
        let cfg = InterpreterConfig { debounce_secs: 0.05, ..InterpreterConfig::default() };
        let mut it = GestureInterpreter::new(cfg);
        let a = it.process(Some(&hand(0.5, 0.5, 3)), ms(0)).clicks;
        let b = it.process(Some(&hand(0.5, 0.5, 3)), ms(60)).clicks;
        assert_eq!(a.press, Some(ClickAction::LeftClickPressed));
        assert_eq!(b.press, Some(ClickAction::LeftClickPressed));
    }

    #[test]
    fn four_to_three_reports_left_click() {
        let mut it = GestureInterpreter::new(InterpreterConfig::default());
        it.process(Some(&hand(0.5, 0.5, 4)), ms(0));
        let out = it.process(Some(&hand(0.5, 0.5, 3)), ms(33));
        assert_eq!(out.clicks.release, Some(ClickAction::RightReleased));
        assert_eq!(out.clicks.press, Some(ClickAction::LeftClickPressed));
        assert_eq!(out.status, ActionStatus::LeftClick);
        assert!(it.session().left_button_down());
    }

    #[test]
    fn status_labels() {
        assert_eq!(ActionStatus::WaitingForHand.to_string(), "Waiting for Hand...");
        assert_eq!(ActionStatus::LeftClick.label(), "Left Click");
    }
}
