//! Top-level run loop.
//!
//! `Controller` owns the `GestureInterpreter` and the pointer backend and
//! turns each frame into pointer commands. `run()` wires a frame source, the
//! controller and (optionally) the overlay window together and pulls frames
//! until the source ends or the user quits.

use std::io;
use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::ValueEnum;
use gesture_interp::{ActionStatus, ClickAction, FrameOutput, GestureInterpreter, InterpreterConfig};
use hand_landmarks::HandLandmarks;
use tracing::{debug, info};

use crate::pointer::{commands_for, open_pointer_output, send_all, PointerCommand, PointerOutput, SubPixel};
use crate::source::{CommandSource, FrameSource, JsonLinesSource, SimFrameSource, SimInput};
use crate::visualizer::{OverlayView, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where hand frames come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Mouse and keyboard over the overlay window.
    Sim,
    /// JSON-lines detections on standard input.
    Stdin,
    /// Spawn an estimator command and read its stdout.
    Command,
    /// LeapMotion controller (needs the `leap` feature).
    Leap,
}

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub interpreter:     InterpreterConfig,
    pub source:          SourceKind,
    /// Estimator command line for [`SourceKind::Command`].
    pub command:         Option<String>,
    pub min_confidence:  f64,
    /// Flip x → 1 − x before interpreting. A raw selfie camera feed needs
    /// this for the cursor to follow the hand; estimators that already
    /// mirror their output do not.
    pub mirror:          bool,
    pub show_window:     bool,
    pub center_on_start: bool,
    pub dry_run:         bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            interpreter:     InterpreterConfig::default(),
            source:          SourceKind::Sim,
            command:         None,
            min_confidence:  0.7,
            mirror:          false,
            show_window:     true,
            center_on_start: true,
            dry_run:         false,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.interpreter.validate().context("invalid interpreter configuration")?;

        if !(0.0..=1.0).contains(&self.min_confidence) {
            bail!("min confidence must be within [0, 1], got {}", self.min_confidence);
        }
        match self.source {
            SourceKind::Sim if !self.show_window => {
                bail!("the simulation source needs the overlay window (drop --no-window)")
            }
            SourceKind::Command if self.command.as_deref().map_or(true, |c| c.trim().is_empty()) => {
                bail!("--source command needs --command <cmdline>")
            }
            SourceKind::Leap if !cfg!(feature = "leap") => {
                bail!("built without LeapMotion support (rebuild with --features leap)")
            }
            _ => Ok(()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Controller
// ════════════════════════════════════════════════════════════════════════════

/// Interpreter plus pointer: everything between a hand and the OS cursor.
pub struct Controller<P> {
    interpreter: GestureInterpreter,
    pointer:     P,
    mirror:      bool,
    carry:       SubPixel,
    last:        Option<FrameOutput>,
    hand:        Option<HandLandmarks>,
}

impl<P: PointerOutput> Controller<P> {
    pub fn new(config: InterpreterConfig, pointer: P, mirror: bool) -> Self {
        Controller {
            interpreter: GestureInterpreter::new(config),
            pointer,
            mirror,
            carry: SubPixel::default(),
            last: None,
            hand: None,
        }
    }

    pub fn interpreter(&self) -> &GestureInterpreter { &self.interpreter }
    pub fn pointer(&self) -> &P { &self.pointer }
    pub fn last_output(&self) -> Option<&FrameOutput> { self.last.as_ref() }

    /// Put the cursor at the screen centre before the first frame.
    pub fn start(&mut self, center: bool) {
        if !center { return; }
        let (x, y) = self.interpreter.config().screen.center();
        send_all(&mut self.pointer, &[PointerCommand::MoveTo { x, y }]);
        info!(x, y, backend = self.pointer.name(), "cursor centred");
    }

    /// Interpret one frame and send the resulting pointer commands.
    pub fn handle_frame(&mut self, hand: Option<HandLandmarks>, now: Duration) -> &FrameOutput {
        self.hand = hand.map(|h| if self.mirror { h.mirrored() } else { h });

        let out = self.interpreter.process(self.hand.as_ref(), now);
        let cmds = commands_for(&out, &mut self.carry);
        if !cmds.is_empty() {
            debug!(?cmds, "dispatch");
        }
        send_all(&mut self.pointer, &cmds);
        self.last.insert(out)
    }

    /// Release anything still held. Safe to call more than once.
    pub fn shutdown(&mut self) -> Option<ClickAction> {
        let action = self.interpreter.release_all();
        if let Some(a) = action {
            send_all(&mut self.pointer, &[PointerCommand::Release(a.button())]);
            info!(button = a.button().name(), "released on shutdown");
        }
        action
    }

    /// Snapshot for the overlay.
    pub fn view(&self, sim: bool) -> OverlayView<'_> {
        let (status, fingers_up) = match &self.last {
            Some(out) => (out.status, out.fingers_up),
            None      => (ActionStatus::WaitingForHand, None),
        };
        OverlayView {
            hand:   self.hand.as_ref(),
            zone:   self.interpreter.config().neutral_zone,
            status,
            fingers_up,
            button: self.interpreter.session().button_state(),
            sim,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// drive() / run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Pull frames until the source ends or the window asks to quit, then release
/// any held button. Returns the number of frames processed.
///
/// Frames without a source timestamp are stamped with the time since `drive`
/// started.
pub fn drive<S, P>(
    source:  &mut S,
    ctl:     &mut Controller<P>,
    mut vis: Option<&mut Visualizer>,
) -> anyhow::Result<u64>
where
    S: FrameSource + ?Sized,
    P: PointerOutput,
{
    let started = Instant::now();
    let mut frames = 0u64;

    let result = loop {
        if let Some(v) = vis.as_deref_mut() {
            if !v.poll_input() {
                info!("quit requested");
                break Ok(());
            }
        }

        let frame = match source.next_frame() {
            Ok(Some(f)) => f,
            Ok(None)    => { info!("frame source ended"); break Ok(()); }
            Err(e)      => break Err(e),
        };
        let now = frame.at.unwrap_or_else(|| started.elapsed());
        ctl.handle_frame(frame.hand, now);
        frames += 1;

        if let Some(v) = vis.as_deref_mut() {
            let sim = v.is_sim();
            v.render(&ctl.view(sim));
        }
    };

    ctl.shutdown();
    result.context("frame source failed")?;
    Ok(frames)
}

/// Run the full application.
///
/// This is the entry point called from `main.rs`.
pub fn run(cfg: AppConfig) -> anyhow::Result<()> {
    cfg.validate()?;

    let (sim_tx, mut source): (Option<Sender<SimInput>>, Box<dyn FrameSource>) = match cfg.source {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel::<SimInput>();
            (Some(tx), Box::new(SimFrameSource::new(rx)))
        }
        SourceKind::Stdin => {
            info!("reading detections from stdin");
            (None, Box::new(JsonLinesSource::new(io::stdin().lock(), cfg.min_confidence)))
        }
        SourceKind::Command => {
            let cmd = cfg.command.as_deref().unwrap_or_default();
            let src = CommandSource::spawn(cmd, cfg.min_confidence)
                .with_context(|| format!("cannot start estimator `{}`", cmd))?;
            (None, Box::new(src))
        }
        SourceKind::Leap => (None, open_leap()?),
    };

    let mut vis = if cfg.show_window {
        Some(Visualizer::new(sim_tx).context("cannot open overlay window")?)
    } else {
        None
    };

    let pointer = open_pointer_output(cfg.dry_run);
    let mut ctl = Controller::new(cfg.interpreter.clone(), pointer, cfg.mirror);
    ctl.start(cfg.center_on_start);

    let frames = drive(&mut source, &mut ctl, vis.as_mut())?;
    info!(frames, "session ended");
    Ok(())
}

#[cfg(feature = "leap")]
fn open_leap() -> anyhow::Result<Box<dyn FrameSource>> {
    let src = crate::source::LeapFrameSource::open().context("cannot open LeapMotion")?;
    Ok(Box::new(src))
}

#[cfg(not(feature = "leap"))]
fn open_leap() -> anyhow::Result<Box<dyn FrameSource>> {
    bail!("built without LeapMotion support (rebuild with --features leap)")
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointer::RecordingPointer;
    use crate::source::tests::line_for;
    use gesture_interp::Button;
    use hand_landmarks::{HandBuilder, Landmark};
    use std::io::Cursor;

    fn controller(mirror: bool) -> Controller<RecordingPointer> {
        Controller::new(InterpreterConfig::default(), RecordingPointer::default(), mirror)
    }

    fn hand(x: f64, y: f64, fingers: usize) -> HandLandmarks {
        HandBuilder::new(Landmark::new(x, y)).raised(fingers).build()
    }

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    fn source(lines: &[String]) -> JsonLinesSource<Cursor<String>> {
        JsonLinesSource::new(Cursor::new(lines.join("\n")), 0.7)
    }

    #[test]
    fn start_centres_cursor() {
        let mut ctl = controller(false);
        ctl.start(true);
        assert_eq!(ctl.pointer().commands, vec![PointerCommand::MoveTo { x: 960, y: 540 }]);

        let mut ctl = controller(false);
        ctl.start(false);
        assert!(ctl.pointer().commands.is_empty());
    }

    #[test]
    fn centre_fist_sends_nothing() {
        let mut ctl = controller(false);
        let out = ctl.handle_frame(Some(hand(0.5, 0.5, 0)), ms(0)).clone();
        assert!(out.motion.is_zero());
        assert!(out.clicks.is_empty());
        assert!(ctl.pointer().commands.is_empty());
    }

    #[test]
    fn wrist_just_past_zone_edge_still_drifts() {
        // 0.0004 past x_min is 0.384 px per frame at the default settings.
        let mut ctl = controller(false);
        for i in 0..10 {
            ctl.handle_frame(Some(hand(0.2996, 0.5, 0)), ms(i * 33));
        }
        let moved: i32 = ctl.pointer().commands.iter()
            .map(|c| match *c {
                PointerCommand::MoveBy { dx, dy: 0 } => dx,
                other => panic!("unexpected {:?}", other),
            })
            .sum();
        assert_eq!(moved, -4);
    }

    #[test]
    fn four_then_three_releases_right_and_clicks_left_together() {
        let lines: Vec<String> = [(4, 0.0), (3, 0.033), (2, 0.066)]
            .iter()
            .map(|&(n, t)| line_for(0.5, 0.5, n, Some(t)))
            .collect();
        let mut ctl = controller(false);
        drive(&mut source(&lines), &mut ctl, None).unwrap();
        assert_eq!(ctl.pointer().commands, vec![
            PointerCommand::Click(Button::Right),
            PointerCommand::Release(Button::Right),
            PointerCommand::Click(Button::Left),
            PointerCommand::Release(Button::Left),
        ]);
    }

    #[test]
    fn wrist_left_of_zone_moves_left() {
        let mut ctl = controller(false);
        ctl.handle_frame(Some(hand(0.1, 0.5, 0)), ms(0));
        assert_eq!(ctl.pointer().commands, vec![PointerCommand::MoveBy { dx: -192, dy: 0 }]);
    }

    #[test]
    fn mirror_flips_horizontal_motion() {
        let mut ctl = controller(true);
        ctl.handle_frame(Some(hand(0.9, 0.5, 0)), ms(0));
        assert_eq!(ctl.pointer().commands, vec![PointerCommand::MoveBy { dx: -192, dy: 0 }]);
    }

    #[test]
    fn left_click_scenario_through_stream() {
        let lines: Vec<String> = [(3, 0.0), (3, 0.1), (3, 0.2), (2, 0.3)]
            .iter()
            .map(|&(n, t)| line_for(0.5, 0.5, n, Some(t)))
            .collect();
        let mut src = source(&lines);
        let mut ctl = controller(false);

        let frames = drive(&mut src, &mut ctl, None).unwrap();
        assert_eq!(frames, 4);
        assert_eq!(ctl.pointer().commands, vec![
            PointerCommand::Click(Button::Left),
            PointerCommand::Release(Button::Left),
        ]);
    }

    #[test]
    fn right_click_held_refires_after_debounce() {
        let lines: Vec<String> = [0.0, 0.25, 0.5]
            .iter()
            .map(|&t| line_for(0.5, 0.5, 4, Some(t)))
            .collect();
        let mut ctl = controller(false);
        drive(&mut source(&lines), &mut ctl, None).unwrap();

        // Two presses, then the shutdown release.
        assert_eq!(ctl.pointer().commands, vec![
            PointerCommand::Click(Button::Right),
            PointerCommand::Click(Button::Right),
            PointerCommand::Release(Button::Right),
        ]);
    }

    #[test]
    fn hand_lost_mid_stream_releases() {
        let lines = vec![
            line_for(0.5, 0.5, 3, Some(0.0)),
            r#"{"t":0.1,"hands":[]}"#.to_string(),
            line_for(0.5, 0.5, 0, Some(0.2)),
        ];
        let mut ctl = controller(false);
        drive(&mut source(&lines), &mut ctl, None).unwrap();
        assert_eq!(ctl.pointer().commands, vec![
            PointerCommand::Click(Button::Left),
            PointerCommand::Release(Button::Left),
        ]);
        assert_eq!(ctl.last_output().unwrap().fingers_up, Some(0));
    }

    #[test]
    fn malformed_lines_do_not_release() {
        let lines = vec![
            line_for(0.5, 0.5, 4, Some(0.0)),
            "not json".to_string(),
            line_for(0.5, 0.5, 4, Some(0.1)),
        ];
        let mut ctl = controller(false);
        let frames = drive(&mut source(&lines), &mut ctl, None).unwrap();
        assert_eq!(frames, 2);
        // Only the press and the final shutdown release.
        assert_eq!(ctl.pointer().commands, vec![
            PointerCommand::Click(Button::Right),
            PointerCommand::Release(Button::Right),
        ]);
    }

    #[test]
    fn shutdown_releases_once() {
        let mut ctl = controller(false);
        ctl.handle_frame(Some(hand(0.5, 0.5, 3)), ms(0));
        assert_eq!(ctl.shutdown(), Some(ClickAction::LeftReleased));
        assert_eq!(ctl.shutdown(), None);
        assert_eq!(ctl.pointer().commands, vec![
            PointerCommand::Click(Button::Left),
            PointerCommand::Release(Button::Left),
        ]);
    }

    #[test]
    fn view_tracks_last_frame() {
        let mut ctl = controller(false);
        let v = ctl.view(true);
        assert_eq!(v.status, ActionStatus::WaitingForHand);
        assert!(v.hand.is_none());

        ctl.handle_frame(Some(hand(0.5, 0.5, 4)), ms(0));
        let v = ctl.view(false);
        assert_eq!(v.status, ActionStatus::RightClick);
        assert_eq!(v.fingers_up, Some(4));
        assert_eq!(v.button.held(), Some(Button::Right));
        assert!(v.hand.is_some());
    }

    #[test]
    fn config_validation() {
        assert!(AppConfig::default().validate().is_ok());

        let cfg = AppConfig { show_window: false, ..AppConfig::default() };
        assert!(cfg.validate().is_err());

        let cfg = AppConfig { source: SourceKind::Command, ..AppConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = AppConfig {
            source:  SourceKind::Command,
            command: Some("estimator --json".into()),
            ..AppConfig::default()
        };
        assert!(cfg.validate().is_ok());

        let cfg = AppConfig { min_confidence: 1.5, ..AppConfig::default() };
        assert!(cfg.validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.interpreter.neutral_zone.x_min = 0.9;
        assert!(cfg.validate().is_err());
    }

    #[cfg(not(feature = "leap"))]
    #[test]
    fn leap_requires_feature() {
        let cfg = AppConfig { source: SourceKind::Leap, ..AppConfig::default() };
        assert!(cfg.validate().is_err());
    }
}
