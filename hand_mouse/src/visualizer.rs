//! Software-rendered overlay using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ ACTION: MOVING CURSOR         FINGERS: 3     │
//! │                                              │
//! │          ┌ ─ ─ ─ ─ ─ ─ ─ ─ ─ ┐               │
//! │          │   neutral zone    │   (magenta)   │
//! │          │       ✋ skeleton  │               │
//! │          └ ─ ─ ─ ─ ─ ─ ─ ─ ─ ┘               │
//! │                                              │
//! │ 0-4=FINGERS  H=HAND  T=THUMB  Q=QUIT         │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! All drawing goes through [`Canvas`] so it can be tested without a window;
//! [`Visualizer`] only presents the buffer and reads the keyboard and mouse.

use std::sync::mpsc::Sender;
use std::time::Duration;

use gesture_interp::{ActionStatus, ButtonState, NeutralZone};
use hand_landmarks::{index, Finger, HandLandmarks, Landmark};
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use tracing::warn;

use crate::source::{SimInput, SimKey};

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W:      usize = 640;
pub const WIN_H:      usize = 480;
const BG_COLOR:       u32   = 0xFF101018;
const ZONE_COLOR:     u32   = 0xFFFF00FF;  // magenta
const BONE_COLOR:     u32   = 0xFF3A7BD5;
const JOINT_COLOR:    u32   = 0xFFE0E0E0;
const TIP_UP_COLOR:   u32   = 0xFF00E676;
const WRIST_COLOR:    u32   = 0xFFFF5252;
const TEXT_COLOR:     u32   = 0xFFEEEEEE;
const LEGEND_COLOR:   u32   = 0xFF888888;
const HELD_COLOR:     u32   = 0xFFFFD700;  // gold
const TEXT_BG:        u32   = 0xFF0F3460;
const STATUS_H:       usize = 28;

/// Bones of the 21-point hand, as landmark index pairs.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (index::WRIST, index::THUMB_CMC),
    (index::THUMB_CMC, index::THUMB_MCP),
    (index::THUMB_MCP, index::THUMB_IP),
    (index::THUMB_IP, index::THUMB_TIP),
    (index::WRIST, index::INDEX_FINGER_MCP),
    (index::INDEX_FINGER_MCP, index::INDEX_FINGER_PIP),
    (index::INDEX_FINGER_PIP, index::INDEX_FINGER_DIP),
    (index::INDEX_FINGER_DIP, index::INDEX_FINGER_TIP),
    (index::INDEX_FINGER_MCP, index::MIDDLE_FINGER_MCP),
    (index::MIDDLE_FINGER_MCP, index::MIDDLE_FINGER_PIP),
    (index::MIDDLE_FINGER_PIP, index::MIDDLE_FINGER_DIP),
    (index::MIDDLE_FINGER_DIP, index::MIDDLE_FINGER_TIP),
    (index::MIDDLE_FINGER_MCP, index::RING_FINGER_MCP),
    (index::RING_FINGER_MCP, index::RING_FINGER_PIP),
    (index::RING_FINGER_PIP, index::RING_FINGER_DIP),
    (index::RING_FINGER_DIP, index::RING_FINGER_TIP),
    (index::RING_FINGER_MCP, index::PINKY_MCP),
    (index::PINKY_MCP, index::PINKY_PIP),
    (index::PINKY_PIP, index::PINKY_DIP),
    (index::PINKY_DIP, index::PINKY_TIP),
    (index::WRIST, index::PINKY_MCP),
];

/// What one overlay frame shows.
#[derive(Clone, Debug)]
pub struct OverlayView<'a> {
    pub hand:       Option<&'a HandLandmarks>,
    pub zone:       NeutralZone,
    pub status:     ActionStatus,
    pub fingers_up: Option<u8>,
    pub button:     ButtonState,
    /// Show the simulation key legend.
    pub sim:        bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

/// ARGB framebuffer with the handful of primitives the overlay needs.
pub struct Canvas {
    w:   usize,
    h:   usize,
    buf: Vec<u32>,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Canvas { w, h, buf: vec![BG_COLOR; w * h] }
    }

    pub fn width(&self)  -> usize  { self.w }
    pub fn height(&self) -> usize  { self.h }
    pub fn buffer(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.w && y < self.h).then(|| self.buf[y * self.w + x])
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    /// Normalized frame coordinates to pixels, clamped to the canvas.
    pub fn to_px(&self, p: Landmark) -> (usize, usize) {
        let sx = (p.x.clamp(0.0, 1.0) * (self.w - 1) as f64).round() as usize;
        let sy = (p.y.clamp(0.0, 1.0) * (self.h - 1) as f64).round() as usize;
        (sx, sy)
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.w && y < self.h {
            self.buf[y * self.w + x] = color;
        }
    }

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.h) {
            for col in x..(x + w).min(self.w) {
                self.buf[row * self.w + col] = color;
            }
        }
    }

    pub fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        if w == 0 || h == 0 { return; }
        for col in x..x + w {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    pub fn draw_disc(&mut self, cx: usize, cy: usize, r: usize, color: u32) {
        let r = r as isize;
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    let (sx, sy) = (cx as isize + dx, cy as isize + dy);
                    if sx >= 0 && sy >= 0 {
                        self.set_pixel(sx as usize, sy as usize, color);
                    }
                }
            }
        }
    }

    /// Bresenham line.
    pub fn draw_line(&mut self, from: (usize, usize), to: (usize, usize), color: u32) {
        let (mut x, mut y) = (from.0 as isize, from.1 as isize);
        let (x1, y1) = (to.0 as isize, to.1 as isize);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x as usize, y as usize, color);
            if x == x1 && y == y1 { break; }
            let e2 = 2 * err;
            if e2 >= dy { err += dy; x += sx; }
            if e2 <= dx { err += dx; y += sy; }
        }
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`×`scale` block.
    pub fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32, scale: usize) {
        let mut cx = x;
        for ch in text.chars() {
            if cx + 3 * scale > self.w { break; }
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
        }
    }

    // ── Overlay ───────────────────────────────────────────────────────────

    pub fn draw_overlay(&mut self, view: &OverlayView<'_>) {
        self.clear(BG_COLOR);

        // Neutral zone, two pixels thick.
        let (x0, y0) = self.to_px(Landmark::new(view.zone.x_min, view.zone.y_min));
        let (x1, y1) = self.to_px(Landmark::new(view.zone.x_max, view.zone.y_max));
        let (w, h) = (x1 - x0 + 1, y1 - y0 + 1);
        self.draw_border(x0, y0, w, h, ZONE_COLOR);
        if w > 2 && h > 2 {
            self.draw_border(x0 + 1, y0 + 1, w - 2, h - 2, ZONE_COLOR);
        }

        if let Some(hand) = view.hand {
            self.draw_hand(hand);
        }

        // Status bar
        self.fill_rect(0, 0, self.w, STATUS_H, TEXT_BG);
        self.draw_label(&format!("Action: {}", view.status), 8, 8, TEXT_COLOR, 2);
        let fingers = match view.fingers_up {
            Some(n) => format!("Fingers: {}", n),
            None    => "Fingers: -".to_string(),
        };
        let fx = self.w.saturating_sub(8 + fingers.len() * 8);
        self.draw_label(&fingers, fx, 8, TEXT_COLOR, 2);

        if let Some(b) = view.button.held() {
            self.draw_label(&format!("{} held", b.name()), 8, STATUS_H + 6, HELD_COLOR, 2);
        }

        let legend = if view.sim {
            "mouse=wrist  0-4=fingers  H=hand  T=thumb  Q=quit"
        } else {
            "Q=quit"
        };
        self.draw_label(legend, 8, self.h.saturating_sub(12), LEGEND_COLOR, 1);
    }

    fn draw_hand(&mut self, hand: &HandLandmarks) {
        for &(a, b) in HAND_CONNECTIONS.iter() {
            let (pa, pb) = (self.to_px(hand.get(a)), self.to_px(hand.get(b)));
            self.draw_line(pa, pb, BONE_COLOR);
        }
        for p in hand.points().iter().skip(1) {
            let (x, y) = self.to_px(*p);
            self.draw_disc(x, y, 3, JOINT_COLOR);
        }
        for finger in Finger::COUNTED {
            if hand.finger_up(finger) {
                let (x, y) = self.to_px(hand.tip(finger));
                self.draw_disc(x, y, 5, TIP_UP_COLOR);
            }
        }
        let (wx, wy) = self.to_px(hand.wrist());
        self.draw_disc(wx, wy, 6, WRIST_COLOR);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer — the window
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:     Window,
    canvas:     Canvas,
    sim_tx:     Option<Sender<SimInput>>,
    last_mouse: Option<(f32, f32)>,
}

impl Visualizer {
    /// Open the overlay. With `sim_tx`, mouse and keys feed the simulated hand.
    pub fn new(sim_tx: Option<Sender<SimInput>>) -> Result<Self, minifb::Error> {
        let mut window = Window::new(
            "Hand Mouse (press q to quit)",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(Duration::from_millis(16))); // ~60fps

        Ok(Visualizer { window, canvas: Canvas::new(WIN_W, WIN_H), sim_tx, last_mouse: None })
    }

    pub fn is_sim(&self) -> bool { self.sim_tx.is_some() }

    /// Poll keyboard and mouse. Returns false when the user asked to quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        let send = |input: SimInput| {
            if let Some(tx) = &self.sim_tx {
                let _ = tx.send(input);
            }
        };

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            send(SimInput::KeyDown(SimKey::Quit));
            return false;
        }
        if self.sim_tx.is_none() {
            return true;
        }

        let digits = [Key::Key0, Key::Key1, Key::Key2, Key::Key3, Key::Key4];
        for (n, &k) in digits.iter().enumerate() {
            if one_shot(k) {
                send(SimInput::KeyDown(SimKey::Fingers(n as u8)));
            }
        }
        if one_shot(Key::H) { send(SimInput::KeyDown(SimKey::ToggleHand)); }
        if one_shot(Key::T) { send(SimInput::KeyDown(SimKey::ToggleThumb)); }

        let mouse = self.window.get_mouse_pos(MouseMode::Clamp);
        if let Some((mx, my)) = mouse {
            if self.last_mouse != mouse {
                send(SimInput::Pointer {
                    x: mx as f64 / (WIN_W - 1) as f64,
                    y: my as f64 / (WIN_H - 1) as f64,
                });
            }
        }
        self.last_mouse = mouse;

        true
    }

    /// Render one frame.
    pub fn render(&mut self, view: &OverlayView<'_>) {
        self.canvas.draw_overlay(view);
        if let Err(e) = self.window.update_with_buffer(self.canvas.buffer(), WIN_W, WIN_H) {
            warn!(error = %e, "overlay update failed");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
