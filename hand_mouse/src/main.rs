//! hand_mouse — interactive entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hand_mouse::app::{run, AppConfig, SourceKind};
use hand_mouse::cli::Cli;

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.default_log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = start(&cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn start(cli: &Cli) -> anyhow::Result<()> {
    if cli.print_config {
        print!("{}", cli.interpreter_config()?.to_toml_string()?);
        return Ok(());
    }

    let cfg = cli.app_config()?;
    banner(&cfg);
    run(cfg)
}

fn banner(cfg: &AppConfig) {
    let it = &cfg.interpreter;
    let z  = &it.neutral_zone;

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              Hand Mouse — gesture cursor control             ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Screen:       {}x{}", it.screen.width, it.screen.height);
    println!("  Neutral zone: x {:.2}–{:.2}, y {:.2}–{:.2}", z.x_min, z.x_max, z.y_min, z.y_max);
    println!("  Sensitivity:  x {:.2}, y {:.2}", it.sensitivity.x, it.sensitivity.y);
    println!("  Debounce:     {:.2} s", it.debounce_secs);
    match cfg.source {
        SourceKind::Sim     => println!("  Source:       keyboard + mouse simulation"),
        SourceKind::Stdin   => println!("  Source:       JSON lines on stdin"),
        SourceKind::Command => println!("  Source:       {}", cfg.command.as_deref().unwrap_or_default()),
        SourceKind::Leap    => println!("  Source:       LeapMotion hardware"),
    }
    if cfg.dry_run {
        println!("  Dry run: the pointer is not moved");
    }
    println!();
    println!("  Controls:");
    println!("    - Move the hand out of the central box to steer the cursor");
    println!("    - 3 fingers up: left click");
    println!("    - 4 fingers up: right click");
    if cfg.source == SourceKind::Sim {
        println!("    - In the window: mouse = wrist, 0-4 = raised fingers, H = hide hand");
    }
    println!();
    println!("  Press 'q' to quit.");
    println!();
}
