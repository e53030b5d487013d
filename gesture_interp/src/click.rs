//! Finger-count click state machine.
//!
//! ```text
//!              3 fingers (debounced)            4 fingers (debounced)
//!   ┌────────┐ ─────────────────────▶ ┌──────────┐      ┌───────────┐
//!   │  Idle  │                        │ LeftDown │      │ RightDown │
//!   └────────┘ ◀───────────────────── └──────────┘      └───────────┘
//!        ▲        any other count / hand lost                │
//!        └───────────────────────────────────────────────────┘
//! ```
//!
//! At most one button is down at any time. A frame yields at most a release
//! and a press, in that order ([`ClickStep`]). The left gesture is checked
//! before a held button is let go, so going straight from 4 fingers to 3
//! releases right and presses left on the same frame. Going from 3 to 4 only
//! releases left; the right press waits for the next frame.

use std::time::Duration;

use tracing::{debug, info};

/// Finger count that triggers a left click.
pub const LEFT_CLICK_FINGERS:  u8 = 3;
/// Finger count that triggers a right click.
pub const RIGHT_CLICK_FINGERS: u8 = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
}

impl Button {
    pub fn name(self) -> &'static str {
        match self {
            Button::Left  => "left",
            Button::Right => "right",
        }
    }

    fn for_fingers(count: u8) -> Option<Button> {
        match count {
            LEFT_CLICK_FINGERS  => Some(Button::Left),
            RIGHT_CLICK_FINGERS => Some(Button::Right),
            _ => None,
        }
    }
}

/// The one command the state machine can emit for a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickAction {
    LeftClickPressed,
    RightClickPressed,
    LeftReleased,
    RightReleased,
}

impl ClickAction {
    pub fn pressed(button: Button) -> Self {
        match button {
            Button::Left  => ClickAction::LeftClickPressed,
            Button::Right => ClickAction::RightClickPressed,
        }
    }

    pub fn released(button: Button) -> Self {
        match button {
            Button::Left  => ClickAction::LeftReleased,
            Button::Right => ClickAction::RightReleased,
        }
    }

    pub fn button(self) -> Button {
        match self {
            ClickAction::LeftClickPressed | ClickAction::LeftReleased   => Button::Left,
            ClickAction::RightClickPressed | ClickAction::RightReleased => Button::Right,
        }
    }

    pub fn is_press(self) -> bool {
        matches!(self, ClickAction::LeftClickPressed | ClickAction::RightClickPressed)
    }
}

/// What one frame does to the buttons: an optional release of the held
/// button, then an optional press.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClickStep {
    pub release: Option<ClickAction>,
    pub press:   Option<ClickAction>,
}

impl ClickStep {
    pub const NONE: ClickStep = ClickStep { release: None, press: None };

    pub fn released(release: Option<ClickAction>) -> Self {
        ClickStep { release, press: None }
    }

    pub fn pressed(press: Option<ClickAction>) -> Self {
        ClickStep { release: None, press }
    }

    pub fn is_empty(&self) -> bool {
        self.release.is_none() && self.press.is_none()
    }

    /// Actions in dispatch order: release first.
    pub fn actions(&self) -> impl Iterator<Item = ClickAction> {
        self.release.into_iter().chain(self.press)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ButtonState {
    #[default]
    Idle,
    LeftDown,
    RightDown,
}

impl ButtonState {
    pub fn held(self) -> Option<Button> {
        match self {
            ButtonState::Idle      => None,
            ButtonState::LeftDown  => Some(Button::Left),
            ButtonState::RightDown => Some(Button::Right),
        }
    }

    fn down(button: Button) -> Self {
        match button {
            Button::Left  => ButtonState::LeftDown,
            Button::Right => ButtonState::RightDown,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SessionState
// ════════════════════════════════════════════════════════════════════════════

/// Mutable click state carried from frame to frame.
///
/// Timestamps are offsets from the start of the session. `None` means the
/// button was never clicked, so the first gesture is never debounced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    button:           ButtonState,
    last_left_click:  Option<Duration>,
    last_right_click: Option<Duration>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn button_state(&self) -> ButtonState { self.button }
    pub fn left_button_down(&self) -> bool { self.button == ButtonState::LeftDown }
    pub fn right_button_down(&self) -> bool { self.button == ButtonState::RightDown }

    pub fn last_click(&self, button: Button) -> Option<Duration> {
        match button {
            Button::Left  => self.last_left_click,
            Button::Right => self.last_right_click,
        }
    }

    /// Advance the state machine by one frame.
    ///
    /// `fingers_up` of 3 asks for a left click, 4 for a right click; anything
    /// else releases whatever is held. A press is accepted only if strictly
    /// more than `debounce` has passed since the same button's last accepted
    /// press; a debounced press leaves the button flag as it was, apart from
    /// a right button that the left gesture lets go of.
    pub fn resolve_click(&mut self, fingers_up: u8, now: Duration, debounce: Duration) -> ClickStep {
        match (self.button.held(), Button::for_fingers(fingers_up)) {
            (held, Some(Button::Left)) => {
                let release = if held == Some(Button::Right) { self.release_held() } else { None };
                ClickStep { release, press: self.try_press(Button::Left, now, debounce) }
            }
            (Some(Button::Left), Some(Button::Right)) => ClickStep::released(self.release_held()),
            (_, Some(wanted)) => ClickStep::pressed(self.try_press(wanted, now, debounce)),
            (Some(_), None)   => ClickStep::released(self.release_held()),
            (None, None)      => ClickStep::NONE,
        }
    }

    /// No hand this frame: release anything held. Timestamps are kept.
    pub fn on_hand_lost(&mut self) -> Option<ClickAction> {
        let action = self.release_held();
        if action.is_some() {
            debug!("hand lost while a button was held");
        }
        action
    }

    fn try_press(&mut self, button: Button, now: Duration, debounce: Duration) -> Option<ClickAction> {
        if let Some(last) = self.last_click(button) {
            // saturating_sub: a timestamp earlier than the last click reads as
            // zero elapsed, so stamps never move backward.
            let elapsed = now.saturating_sub(last);
            if elapsed <= debounce {
                debug!(button = button.name(), ?elapsed, "click debounced");
                return None;
            }
        }

        match button {
            Button::Left  => self.last_left_click  = Some(now),
            Button::Right => self.last_right_click = Some(now),
        }
        self.button = ButtonState::down(button);
        info!(button = button.name(), at = ?now, "click");
        Some(ClickAction::pressed(button))
    }

    fn release_held(&mut self) -> Option<ClickAction> {
        let held = self.button.held()?;
        self.button = ButtonState::Idle;
        debug!(button = held.name(), "release");
        Some(ClickAction::released(held))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
