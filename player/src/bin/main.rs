//! redview - Standalone Player
//!
//! Runs the demo core through the frame pipeline in the selected 3D mode.
//!
//! # Usage
//!
//! ```bash
//! redview --list-modes
//! redview --mode red_cyan --frames 500 --screenshot
//! redview --mode side_by_side --scale 2 --debug --screenshot out.png
//! redview --mode red_blue --save-config
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use redview::{PlayerConfig, ScreenshotTarget, run};
use redview_core::{Config, ModeCatalog, config};

const MAX_SCALE: i64 = 16;

#[derive(Parser)]
#[command(name = "redview")]
#[command(author, version, about = "redview - stereoscopic 3D frame pipeline player")]
struct Args {
    /// 3D mode key (see --list-modes)
    #[arg(long, short = 'm')]
    mode: Option<String>,

    /// Print the available 3D modes and exit
    #[arg(long)]
    list_modes: bool,

    /// Enable the frame rate overlay
    #[arg(long, short = 'd')]
    debug: bool,

    /// Emulated frames to run (0 = run until the process is killed)
    #[arg(long, default_value = "300")]
    frames: u64,

    /// Save a PNG of the last refresh (optionally to PATH)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    screenshot: Option<Option<PathBuf>>,

    /// Write the effective settings to the config file
    #[arg(long)]
    save_config: bool,

    /// Integer scaling factor for the window (overrides configured sizes)
    #[arg(long, short = 's', value_parser = clap::value_parser!(u32).range(1..=MAX_SCALE))]
    scale: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.list_modes {
        for mode in ModeCatalog::iter() {
            let default = if mode.key == redview_core::DEFAULT_MODE_KEY {
                " (default)"
            } else {
                ""
            };
            println!("{:<18} {}{}", mode.key, mode.name, default);
        }
        return Ok(());
    }

    let save_config = args.save_config;
    let player = player_config(args, config::load())?;

    if save_config {
        let path = config::save(&player.config).context("Failed to save config")?;
        tracing::info!("Config saved: {}", path.display());
    }

    let outcome = run(player)?;
    if let Some(path) = outcome.screenshot {
        println!("{}", path.display());
    }
    Ok(())
}

/// Apply command-line overrides to the loaded settings.
fn player_config(args: Args, mut settings: Config) -> Result<PlayerConfig> {
    if let Some(mode) = args.mode {
        if ModeCatalog::index_of(&mode).is_none() {
            anyhow::bail!("Unknown 3D mode '{}' (see --list-modes)", mode);
        }
        settings.video.mode = mode;
    }
    if args.debug {
        settings.debug.show_fps = true;
    }
    if args.frames == 0 && args.screenshot.is_some() {
        anyhow::bail!("--screenshot needs a frame count (--frames 0 never finishes)");
    }

    let mut player = PlayerConfig {
        config: settings,
        frames: (args.frames > 0).then_some(args.frames),
        screenshot: args.screenshot.map(|target| match target {
            Some(path) => ScreenshotTarget::Path(path),
            None => ScreenshotTarget::Default,
        }),
    };
    if let Some(scale) = args.scale {
        player.apply_scale(scale);
    }
    Ok(player)
}
