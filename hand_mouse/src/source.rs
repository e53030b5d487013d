//! Frame sources: where hand skeletons come from.
//!
//! Every source is pulled synchronously by the run loop: one frame is read,
//! interpreted and acted on before the next is requested. Consumers don't
//! need to know whether frames came from a window simulation, a piped
//! estimator, or real hardware.

use std::io::{self, BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use hand_landmarks::{decode_detection, HandBuilder, HandLandmarks, Landmark};
use thiserror::Error;
use tracing::{info, warn};

/// One camera frame: optional source timestamp, at most one hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub at:   Option<Duration>,
    pub hand: Option<HandLandmarks>,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read frames: {0}")]
    Io(#[from] io::Error),

    #[error("failed to start estimator `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source:  io::Error,
    },

    #[error("estimator command is empty")]
    EmptyCommand,

    #[error("LeapMotion: {0}")]
    Leap(String),
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait — unified interface for sim, piped and hw input
// ════════════════════════════════════════════════════════════════════════════

pub trait FrameSource {
    /// Next frame, or `Ok(None)` once the source has ended.
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        (**self).next_frame()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource — detections as newline-delimited JSON
// ════════════════════════════════════════════════════════════════════════════

/// Reads one detection per line from any buffered reader (stdin, a pipe, a
/// file). Malformed lines are skipped with a warning rather than treated as
/// "no hand", so a glitching estimator does not release held buttons.
pub struct JsonLinesSource<R> {
    reader:         R,
    min_confidence: f64,
    line:           String,
    line_no:        u64,
    skipped:        u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R, min_confidence: f64) -> Self {
        JsonLinesSource { reader, min_confidence, line: String::new(), line_no: 0, skipped: 0 }
    }

    /// Lines rejected so far.
    pub fn skipped(&self) -> u64 { self.skipped }
}

impl<R: BufRead> FrameSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let text = self.line.trim();
            // Estimators may announce themselves before the first frame.
            if text.is_empty() || (self.line_no == 1 && text == "READY") {
                continue;
            }

            match decode_detection(text, self.min_confidence) {
                Ok(det) => {
                    return Ok(Some(Frame { at: det.at, hand: det.hand.map(|h| h.landmarks) }));
                }
                Err(e) => {
                    self.skipped += 1;
                    warn!(line = self.line_no, error = %e, "skipping frame");
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CommandSource — spawn an external estimator, read its stdout
// ════════════════════════════════════════════════════════════════════════════

/// Runs a pose-estimator process and consumes its JSON-lines stdout.
///
/// The command line is split on whitespace (no shell quoting). The child is
/// killed when the source is dropped.
pub struct CommandSource {
    child: Child,
    lines: JsonLinesSource<BufReader<ChildStdout>>,
}

impl CommandSource {
    pub fn spawn(command_line: &str, min_confidence: f64) -> Result<Self, SourceError> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or(SourceError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SourceError::Spawn { command: command_line.to_string(), source })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SourceError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "estimator stdout not captured"))
        })?;

        info!(command = command_line, pid = child.id(), "estimator started");
        Ok(CommandSource { child, lines: JsonLinesSource::new(BufReader::new(stdout), min_confidence) })
    }
}

impl FrameSource for CommandSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        self.lines.next_frame()
    }
}

impl Drop for CommandSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimFrameSource — keyboard/mouse simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Debug, PartialEq)]
pub enum SimInput {
    /// Mouse position over the window, normalized to the frame.
    Pointer { x: f64, y: f64 },
    KeyDown(SimKey),
}

/// Simulated key codes (mapped from minifb Key).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Fingers(u8),    // 0–4
    ToggleHand,     // H
    ToggleThumb,    // T
    Quit,           // Q / Escape
}

/// Synthesizes an upright hand from [`SimInput`] events sent by the
/// visualizer: the mouse is the wrist, number keys pick the raised fingers.
pub struct SimFrameSource {
    rx:      Receiver<SimInput>,
    wrist:   Landmark,
    fingers: u8,
    thumb:   bool,
    visible: bool,
    quit:    bool,
}

impl SimFrameSource {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimFrameSource {
            rx,
            wrist:   Landmark::new(0.5, 0.5),
            fingers: 0,
            thumb:   false,
            visible: true,
            quit:    false,
        }
    }

    fn apply(&mut self, input: SimInput) {
        match input {
            SimInput::Pointer { x, y }             => self.wrist = Landmark::new(x, y),
            SimInput::KeyDown(SimKey::Fingers(n))  => self.fingers = n.min(4),
            SimInput::KeyDown(SimKey::ToggleHand)  => self.visible = !self.visible,
            SimInput::KeyDown(SimKey::ToggleThumb) => self.thumb = !self.thumb,
            SimInput::KeyDown(SimKey::Quit)        => self.quit = true,
        }
    }
}

impl FrameSource for SimFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        loop {
            match self.rx.try_recv() {
                Ok(input)                       => self.apply(input),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => { self.quit = true; break; }
            }
        }
        if self.quit {
            return Ok(None);
        }

        let hand = self.visible.then(|| {
            HandBuilder::new(self.wrist)
                .raised(self.fingers as usize)
                .thumb(self.thumb)
                .build()
        });
        Ok(Some(Frame { at: None, hand }))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand frames from a LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// Leap reports millimetres above the device with `y` pointing up; the
/// interaction box below is mapped onto the normalized camera frame with `y`
/// flipped. Only metacarpal and distal bones are read: the distal bone's base
/// joint stands in for both interphalangeal joints, which keeps the tip-above-
/// joint finger test meaningful.
#[cfg(feature = "leap")]
pub struct LeapFrameSource {
    connection: leaprs::Connection,
}

#[cfg(feature = "leap")]
const LEAP_X_SPAN_MM:  f32 = 400.0;   // −200 … +200 across the device
#[cfg(feature = "leap")]
const LEAP_Y_FLOOR_MM: f32 = 100.0;   // lowest usable height
#[cfg(feature = "leap")]
const LEAP_Y_SPAN_MM:  f32 = 300.0;

#[cfg(feature = "leap")]
fn leap_to_frame(x: f32, y: f32) -> Landmark {
    Landmark::new(
        ((x + LEAP_X_SPAN_MM / 2.0) / LEAP_X_SPAN_MM) as f64,
        (1.0 - (y - LEAP_Y_FLOOR_MM) / LEAP_Y_SPAN_MM) as f64,
    )
}

#[cfg(feature = "leap")]
impl LeapFrameSource {
    pub fn open() -> Result<Self, SourceError> {
        use leaprs::{Connection, ConnectionConfig};

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| SourceError::Leap(format!("cannot create connection: {:?}", e)))?;
        connection.open()
            .map_err(|e| SourceError::Leap(format!("cannot open device: {:?}", e)))?;
        info!("LeapMotion connection open");
        Ok(LeapFrameSource { connection })
    }
}

#[cfg(feature = "leap")]
fn project_hand(hand: &leaprs::Hand) -> Option<HandLandmarks> {
    use hand_landmarks::{index, LANDMARK_COUNT};

    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 { return None; }

    let mut pts = [Landmark::default(); LANDMARK_COUNT];
    let carpal = digits[2].metacarpal().prev_joint();
    pts[index::WRIST] = leap_to_frame(carpal.x, carpal.y);

    for (d, digit) in digits.iter().take(5).enumerate() {
        let base = 1 + d * 4;
        let knuckle = digit.metacarpal().next_joint();
        let joint   = digit.distal().prev_joint();
        let tip     = digit.distal().next_joint();
        pts[base]     = leap_to_frame(knuckle.x, knuckle.y);
        pts[base + 1] = leap_to_frame(joint.x, joint.y);
        pts[base + 2] = leap_to_frame(joint.x, joint.y);
        pts[base + 3] = leap_to_frame(tip.x, tip.y);
    }
    Some(HandLandmarks::new(pts))
}

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        use leaprs::Event;

        loop {
            let msg = match self.connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };
            if let Event::Tracking(frame) = msg.event() {
                let hand = frame.hands().next().and_then(|h| project_hand(&h));
                return Ok(Some(Frame { at: None, hand }));
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use hand_landmarks::classify_pose;
    use std::io::Cursor;
    use std::sync::mpsc;

    /// One JSON-lines detection holding an upright hand.
    pub(crate) fn line_for(x: f64, y: f64, fingers: usize, t: Option<f64>) -> String {
        let hand = HandBuilder::new(Landmark::new(x, y)).raised(fingers).build();
        let pts: Vec<String> = hand.points().iter()
            .map(|p| format!(r#"{{"x":{},"y":{},"z":0.0}}"#, p.x, p.y))
            .collect();
        let t = t.map(|t| format!(r#""t":{},"#, t)).unwrap_or_default();
        format!(r#"{{{}"hands":[{{"handedness":"Right","score":0.95,"landmarks":[{}]}}]}}"#,
                t, pts.join(","))
    }

    #[test]
    fn json_lines_in_order() {
        let input = format!(
            "READY\n{}\n\n{}\n{{\"hands\":[]}}\n",
            line_for(0.5, 0.5, 3, Some(0.0)),
            line_for(0.1, 0.5, 4, Some(0.1)),
        );
        let mut src = JsonLinesSource::new(Cursor::new(input), 0.7);

        let f1 = src.next_frame().unwrap().unwrap();
        assert_eq!(f1.at, Some(Duration::ZERO));
        assert_eq!(classify_pose(f1.hand.as_ref().unwrap()), 3);

        let f2 = src.next_frame().unwrap().unwrap();
        assert_eq!(f2.at, Some(Duration::from_millis(100)));
        assert_eq!(f2.hand.unwrap().wrist(), Landmark::new(0.1, 0.5));

        let f3 = src.next_frame().unwrap().unwrap();
        assert!(f3.hand.is_none());

        assert!(src.next_frame().unwrap().is_none());
        assert_eq!(src.skipped(), 0);
    }

    #[test]
    fn malformed_lines_are_skipped_not_lost() {
        let input = format!(
            "{{broken\n{{\"error\":\"camera\"}}\n{}\n",
            line_for(0.5, 0.5, 0, None),
        );
        let mut src = JsonLinesSource::new(Cursor::new(input), 0.7);
        let f = src.next_frame().unwrap().unwrap();
        assert!(f.hand.is_some());
        assert_eq!(f.at, None);
        assert_eq!(src.skipped(), 2);
    }

    #[test]
    fn ready_only_honoured_on_first_line() {
        let input = format!("{}\nREADY\n", line_for(0.5, 0.5, 0, None));
        let mut src = JsonLinesSource::new(Cursor::new(input), 0.7);
        assert!(src.next_frame().unwrap().is_some());
        assert!(src.next_frame().unwrap().is_none());
        assert_eq!(src.skipped(), 1);
    }

    #[test]
    fn sim_source_follows_inputs() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimFrameSource::new(rx);

        let f = src.next_frame().unwrap().unwrap();
        let hand = f.hand.unwrap();
        assert_eq!(hand.wrist(), Landmark::new(0.5, 0.5));
        assert_eq!(classify_pose(&hand), 0);

        tx.send(SimInput::Pointer { x: 0.9, y: 0.2 }).unwrap();
        tx.send(SimInput::KeyDown(SimKey::Fingers(4))).unwrap();
        let hand = src.next_frame().unwrap().unwrap().hand.unwrap();
        assert_eq!(hand.wrist(), Landmark::new(0.9, 0.2));
        assert_eq!(classify_pose(&hand), 4);

        tx.send(SimInput::KeyDown(SimKey::ToggleHand)).unwrap();
        assert!(src.next_frame().unwrap().unwrap().hand.is_none());

        tx.send(SimInput::KeyDown(SimKey::Quit)).unwrap();
        assert!(src.next_frame().unwrap().is_none());
    }

    #[test]
    fn sim_source_clamps_finger_count() {
        let (tx, rx) = mpsc::channel();
        let mut src = SimFrameSource::new(rx);
        tx.send(SimInput::KeyDown(SimKey::Fingers(9))).unwrap();
        let hand = src.next_frame().unwrap().unwrap().hand.unwrap();
        assert_eq!(classify_pose(&hand), 4);
    }

    #[test]
    fn sim_source_ends_when_window_gone() {
        let (tx, rx) = mpsc::channel::<SimInput>();
        let mut src = SimFrameSource::new(rx);
        drop(tx);
        assert!(src.next_frame().unwrap().is_none());
    }

    #[test]
    fn empty_command_rejected() {
        assert!(matches!(CommandSource::spawn("   ", 0.7), Err(SourceError::EmptyCommand)));
    }

    #[test]
    fn missing_program_is_spawn_error() {
        let err = CommandSource::spawn("definitely-not-a-real-estimator-binary", 0.7);
        assert!(matches!(err, Err(SourceError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn command_source_reads_child_stdout() {
        use std::io::Write;

        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "READY").unwrap();
        writeln!(f, "{}", line_for(0.2, 0.8, 3, Some(0.5))).unwrap();
        let path = f.path().to_str().unwrap().to_string();

        let mut src = CommandSource::spawn(&format!("cat {}", path), 0.7).unwrap();
        let frame = src.next_frame().unwrap().unwrap();
        assert_eq!(frame.at, Some(Duration::from_millis(500)));
        assert_eq!(classify_pose(frame.hand.as_ref().unwrap()), 3);
        assert!(src.next_frame().unwrap().is_none());
    }
}
