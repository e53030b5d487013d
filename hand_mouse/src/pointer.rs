//! Pointer output, the OS-facing end of the controller.
//!
//! Commands are fire-and-forget: a failed injection is logged and the frame
//! loop carries on.

use enigo::{Button as MouseButton, Coordinate, Direction, Enigo, Mouse, Settings};
use gesture_interp::{Button, ClickAction, FrameOutput, Motion};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum PointerError {
    #[error("cannot connect to the OS input system: {0}")]
    Connect(String),

    #[error("pointer injection failed: {0}")]
    Input(String),
}

/// One thing to do to the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerCommand {
    MoveBy { dx: i32, dy: i32 },
    MoveTo { x: i32, y: i32 },
    Click(Button),
    Press(Button),
    Release(Button),
}

// ════════════════════════════════════════════════════════════════════════════
// PointerOutput — abstraction over enigo / null / recording
// ════════════════════════════════════════════════════════════════════════════

pub trait PointerOutput {
    fn name(&self) -> &'static str;
    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), PointerError>;
    fn set_position(&mut self, x: i32, y: i32) -> Result<(), PointerError>;
    fn click(&mut self, button: Button) -> Result<(), PointerError>;
    fn press(&mut self, button: Button) -> Result<(), PointerError>;
    fn release(&mut self, button: Button) -> Result<(), PointerError>;
}

impl<P: PointerOutput + ?Sized> PointerOutput for Box<P> {
    fn name(&self) -> &'static str { (**self).name() }
    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), PointerError> { (**self).move_by(dx, dy) }
    fn set_position(&mut self, x: i32, y: i32) -> Result<(), PointerError> { (**self).set_position(x, y) }
    fn click(&mut self, b: Button) -> Result<(), PointerError> { (**self).click(b) }
    fn press(&mut self, b: Button) -> Result<(), PointerError> { (**self).press(b) }
    fn release(&mut self, b: Button) -> Result<(), PointerError> { (**self).release(b) }
}

impl PointerCommand {
    pub fn send_to<P: PointerOutput + ?Sized>(self, out: &mut P) -> Result<(), PointerError> {
        match self {
            PointerCommand::MoveBy { dx, dy } => out.move_by(dx, dy),
            PointerCommand::MoveTo { x, y }   => out.set_position(x, y),
            PointerCommand::Click(b)          => out.click(b),
            PointerCommand::Press(b)          => out.press(b),
            PointerCommand::Release(b)        => out.release(b),
        }
    }
}

/// Fractional pixels not yet sent, carried from frame to frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SubPixel {
    dx: f64,
    dy: f64,
}

impl SubPixel {
    /// Whole pixels to move this frame; the remainder stays for the next one.
    pub fn step(&mut self, motion: Motion) -> (i32, i32) {
        let (x, y) = (self.dx + motion.dx, self.dy + motion.dy);
        let (px, py) = (x.round(), y.round());
        self.dx = x - px;
        self.dy = y - py;
        (px as i32, py as i32)
    }

    pub fn remainder(&self) -> Motion {
        Motion { dx: self.dx, dy: self.dy }
    }

    pub fn reset(&mut self) {
        *self = SubPixel::default();
    }
}

/// Translate one interpreted frame into pointer commands: motion first, then
/// the release, then the click. Fractions of a pixel accumulate in `carry`
/// until they add up to a whole one; losing the hand clears them.
pub fn commands_for(frame: &FrameOutput, carry: &mut SubPixel) -> Vec<PointerCommand> {
    let mut cmds = Vec::with_capacity(3);
    if frame.fingers_up.is_none() {
        carry.reset();
    }
    let (dx, dy) = carry.step(frame.motion);
    if dx != 0 || dy != 0 {
        cmds.push(PointerCommand::MoveBy { dx, dy });
    }
    for action in frame.clicks.actions() {
        cmds.push(match action {
            ClickAction::LeftClickPressed | ClickAction::RightClickPressed => {
                PointerCommand::Click(action.button())
            }
            ClickAction::LeftReleased | ClickAction::RightReleased => {
                PointerCommand::Release(action.button())
            }
        });
    }
    cmds
}

/// Send every command; failures are logged and skipped.
pub fn send_all<P: PointerOutput + ?Sized>(out: &mut P, cmds: &[PointerCommand]) {
    for &cmd in cmds {
        if let Err(e) = cmd.send_to(out) {
            warn!(backend = out.name(), ?cmd, error = %e, "pointer command dropped");
        }
    }
}

// ── enigo backend ─────────────────────────────────────────────────────────

pub struct EnigoPointer {
    enigo: Enigo,
}

impl EnigoPointer {
    pub fn new() -> Result<Self, PointerError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| PointerError::Connect(format!("{:?}", e)))?;
        Ok(EnigoPointer { enigo })
    }

    fn button(&mut self, button: Button, direction: Direction) -> Result<(), PointerError> {
        let b = match button {
            Button::Left  => MouseButton::Left,
            Button::Right => MouseButton::Right,
        };
        self.enigo
            .button(b, direction)
            .map_err(|e| PointerError::Input(format!("{:?}", e)))
    }
}

impl PointerOutput for EnigoPointer {
    fn name(&self) -> &'static str { "enigo" }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), PointerError> {
        self.enigo
            .move_mouse(dx, dy, Coordinate::Rel)
            .map_err(|e| PointerError::Input(format!("{:?}", e)))
    }

    fn set_position(&mut self, x: i32, y: i32) -> Result<(), PointerError> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| PointerError::Input(format!("{:?}", e)))
    }

    fn click(&mut self, b: Button) -> Result<(), PointerError>   { self.button(b, Direction::Click) }
    fn press(&mut self, b: Button) -> Result<(), PointerError>   { self.button(b, Direction::Press) }
    fn release(&mut self, b: Button) -> Result<(), PointerError> { self.button(b, Direction::Release) }
}

// ── null backend (dry runs, or when no input system is reachable) ─────────

pub struct NullPointer;

impl PointerOutput for NullPointer {
    fn name(&self) -> &'static str { "null" }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), PointerError> {
        debug!(dx, dy, "move (dry run)");
        Ok(())
    }
    fn set_position(&mut self, x: i32, y: i32) -> Result<(), PointerError> {
        debug!(x, y, "set position (dry run)");
        Ok(())
    }
    fn click(&mut self, b: Button) -> Result<(), PointerError> {
        debug!(button = b.name(), "click (dry run)");
        Ok(())
    }
    fn press(&mut self, b: Button) -> Result<(), PointerError> {
        debug!(button = b.name(), "press (dry run)");
        Ok(())
    }
    fn release(&mut self, b: Button) -> Result<(), PointerError> {
        debug!(button = b.name(), "release (dry run)");
        Ok(())
    }
}

// ── recording backend ─────────────────────────────────────────────────────

/// Keeps every command it receives, in order.
#[derive(Debug, Default)]
pub struct RecordingPointer {
    pub commands: Vec<PointerCommand>,
}

impl PointerOutput for RecordingPointer {
    fn name(&self) -> &'static str { "recording" }

    fn move_by(&mut self, dx: i32, dy: i32) -> Result<(), PointerError> {
        self.commands.push(PointerCommand::MoveBy { dx, dy });
        Ok(())
    }
    fn set_position(&mut self, x: i32, y: i32) -> Result<(), PointerError> {
        self.commands.push(PointerCommand::MoveTo { x, y });
        Ok(())
    }
    fn click(&mut self, b: Button) -> Result<(), PointerError> {
        self.commands.push(PointerCommand::Click(b));
        Ok(())
    }
    fn press(&mut self, b: Button) -> Result<(), PointerError> {
        self.commands.push(PointerCommand::Press(b));
        Ok(())
    }
    fn release(&mut self, b: Button) -> Result<(), PointerError> {
        self.commands.push(PointerCommand::Release(b));
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_pointer_output — real backend, falling back to null
// ════════════════════════════════════════════════════════════════════════════

pub fn open_pointer_output(dry_run: bool) -> Box<dyn PointerOutput> {
    if dry_run {
        info!("dry run: pointer commands are logged, not injected");
        return Box::new(NullPointer);
    }
    match EnigoPointer::new() {
        Ok(p) => {
            info!("pointer output: enigo");
            Box::new(p)
        }
        Err(e) => {
            warn!(error = %e, "falling back to null pointer output");
            Box::new(NullPointer)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_interp::{ActionStatus, ClickStep};

    fn frame(dx: f64, dy: f64, clicks: ClickStep) -> FrameOutput {
        FrameOutput {
            motion:     Motion { dx, dy },
            fingers_up: Some(0),
            clicks,
            status:     ActionStatus::MovingCursor,
        }
    }

    fn once(f: &FrameOutput) -> Vec<PointerCommand> {
        commands_for(f, &mut SubPixel::default())
    }

    #[test]
    fn still_frame_sends_nothing() {
        assert!(once(&frame(0.0, 0.0, ClickStep::NONE)).is_empty());
    }

    #[test]
    fn sub_pixel_motion_waits_for_a_whole_pixel() {
        let mut carry = SubPixel::default();
        assert!(commands_for(&frame(0.4, -0.3, ClickStep::NONE), &mut carry).is_empty());
        assert_eq!(
            commands_for(&frame(0.4, -0.3, ClickStep::NONE), &mut carry),
            vec![PointerCommand::MoveBy { dx: 1, dy: -1 }]
        );
        let rest = carry.remainder();
        assert!((rest.dx + 0.2).abs() < 1e-9 && (rest.dy - 0.4).abs() < 1e-9);
    }

    #[test]
    fn slow_drift_adds_up() {
        // 0.384 px per frame: a wrist just past the zone edge.
        let mut carry = SubPixel::default();
        let moved: i32 = (0..10)
            .flat_map(|_| commands_for(&frame(-0.384, 0.0, ClickStep::NONE), &mut carry))
            .map(|c| match c {
                PointerCommand::MoveBy { dx, .. } => dx,
                other => panic!("unexpected {:?}", other),
            })
            .sum();
        assert_eq!(moved, -4);
    }

    #[test]
    fn hand_lost_clears_carry() {
        let mut carry = SubPixel::default();
        commands_for(&frame(0.4, 0.0, ClickStep::NONE), &mut carry);
        let lost = FrameOutput { fingers_up: None, ..frame(0.0, 0.0, ClickStep::NONE) };
        assert!(commands_for(&lost, &mut carry).is_empty());
        assert_eq!(carry, SubPixel::default());
        assert!(commands_for(&frame(0.4, 0.0, ClickStep::NONE), &mut carry).is_empty());
    }

    #[test]
    fn motion_before_click() {
        let cmds = once(&frame(-191.999, 0.0, ClickStep::pressed(Some(ClickAction::LeftClickPressed))));
        assert_eq!(cmds, vec![
            PointerCommand::MoveBy { dx: -192, dy: 0 },
            PointerCommand::Click(Button::Left),
        ]);
    }

    #[test]
    fn release_maps_to_release() {
        assert_eq!(
            once(&frame(0.0, 0.0, ClickStep::released(Some(ClickAction::RightReleased)))),
            vec![PointerCommand::Release(Button::Right)]
        );
        assert_eq!(
            once(&frame(0.0, 0.0, ClickStep::pressed(Some(ClickAction::RightClickPressed)))),
            vec![PointerCommand::Click(Button::Right)]
        );
    }

    #[test]
    fn release_goes_out_before_press() {
        let step = ClickStep {
            release: Some(ClickAction::RightReleased),
            press:   Some(ClickAction::LeftClickPressed),
        };
        assert_eq!(once(&frame(5.0, 0.0, step)), vec![
            PointerCommand::MoveBy { dx: 5, dy: 0 },
            PointerCommand::Release(Button::Right),
            PointerCommand::Click(Button::Left),
        ]);
    }

    #[test]
    fn recording_pointer_keeps_order() {
        let mut rec = RecordingPointer::default();
        send_all(&mut rec, &[
            PointerCommand::MoveTo { x: 960, y: 540 },
            PointerCommand::Press(Button::Left),
            PointerCommand::Release(Button::Left),
        ]);
        assert_eq!(rec.commands.len(), 3);
        assert_eq!(rec.commands[0], PointerCommand::MoveTo { x: 960, y: 540 });
    }

    struct FailingPointer(u32);

    impl PointerOutput for FailingPointer {
        fn name(&self) -> &'static str { "failing" }
        fn move_by(&mut self, _: i32, _: i32) -> Result<(), PointerError> {
            self.0 += 1;
            Err(PointerError::Input("unplugged".into()))
        }
        fn set_position(&mut self, _: i32, _: i32) -> Result<(), PointerError> { Ok(()) }
        fn click(&mut self, _: Button) -> Result<(), PointerError> {
            self.0 += 1;
            Err(PointerError::Input("unplugged".into()))
        }
        fn press(&mut self, _: Button) -> Result<(), PointerError> { Ok(()) }
        fn release(&mut self, _: Button) -> Result<(), PointerError> { Ok(()) }
    }

    #[test]
    fn failures_do_not_stop_the_batch() {
        let mut p = FailingPointer(0);
        send_all(&mut p, &[
            PointerCommand::MoveBy { dx: 1, dy: 1 },
            PointerCommand::Click(Button::Left),
        ]);
        assert_eq!(p.0, 2);
    }

    #[test]
    fn dry_run_uses_null_backend() {
        assert_eq!(open_pointer_output(true).name(), "null");
    }

    #[test]
    fn boxed_pointer_forwards() {
        let mut boxed: Box<RecordingPointer> = Box::new(RecordingPointer::default());
        PointerCommand::Click(Button::Right).send_to(&mut boxed).unwrap();
        assert_eq!(boxed.commands, vec![PointerCommand::Click(Button::Right)]);
    }
}
