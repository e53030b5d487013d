//! Command-line interface.
//!
//! Flags override values from `--config`; the merged result is validated
//! before anything touches the pointer.

use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser};
use gesture_interp::InterpreterConfig;

use crate::app::{AppConfig, SourceKind};

/// Steer the mouse cursor with one hand.
#[derive(Parser, Debug)]
#[command(name = "hand_mouse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML file with screen, neutral zone, sensitivity and debounce settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where hand frames come from
    #[arg(short, long, value_enum, default_value_t = SourceKind::Sim)]
    pub source: SourceKind,

    /// Estimator command line for `--source command` (prints JSON lines)
    #[arg(long)]
    pub command: Option<String>,

    /// Flip frames horizontally before interpreting. Needed for a raw selfie
    /// camera feed, where moving the hand right otherwise moves the cursor left
    #[arg(long)]
    pub mirror: bool,

    /// Run without the overlay window
    #[arg(long)]
    pub no_window: bool,

    /// Log pointer commands instead of injecting them
    #[arg(long)]
    pub dry_run: bool,

    /// Do not move the cursor to the screen centre on start
    #[arg(long)]
    pub no_center: bool,

    #[arg(long)]
    pub screen_width: Option<u32>,

    #[arg(long)]
    pub screen_height: Option<u32>,

    /// Horizontal sensitivity (fraction of screen width per unit outside the zone)
    #[arg(long)]
    pub sensitivity_x: Option<f64>,

    /// Vertical sensitivity
    #[arg(long)]
    pub sensitivity_y: Option<f64>,

    /// Minimum seconds between two clicks of the same button
    #[arg(long)]
    pub debounce: Option<f64>,

    /// Minimum detection score for a hand to count
    #[arg(long, default_value_t = 0.7)]
    pub min_confidence: f64,

    /// Print the effective interpreter config as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Log level used when `RUST_LOG` is not set.
    pub fn default_log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Interpreter config: file (or defaults), then flag overrides, validated.
    pub fn interpreter_config(&self) -> anyhow::Result<InterpreterConfig> {
        let mut cfg = match &self.config {
            Some(path) => InterpreterConfig::load(path)
                .with_context(|| format!("cannot load config {}", path.display()))?,
            None => InterpreterConfig::default(),
        };

        if let Some(w) = self.screen_width  { cfg.screen.width  = w; }
        if let Some(h) = self.screen_height { cfg.screen.height = h; }
        if let Some(x) = self.sensitivity_x { cfg.sensitivity.x = x; }
        if let Some(y) = self.sensitivity_y { cfg.sensitivity.y = y; }
        if let Some(d) = self.debounce      { cfg.debounce_secs = d; }

        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }

    pub fn app_config(&self) -> anyhow::Result<AppConfig> {
        let cfg = AppConfig {
            interpreter:     self.interpreter_config()?,
            source:          self.source,
            command:         self.command.clone(),
            min_confidence:  self.min_confidence,
            mirror:          self.mirror,
            show_window:     !self.no_window,
            center_on_start: !self.no_center,
            dry_run:         self.dry_run,
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
