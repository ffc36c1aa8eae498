//! Standalone player: demo core + software display + session

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;

use redview_core::{
    Config, ProducerExit, Session, SessionConfig, SessionReport, VB_HEIGHT, VB_WIDTH,
};

use crate::capture;
use crate::display::SoftwareDisplay;
use crate::pattern::PatternCore;

/// Where to write a screenshot of the last refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenshotTarget {
    /// Timestamped file in the screenshots directory
    Default,
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub config: Config,
    /// Stop after this many emulated frames; `None` runs until the core halts.
    pub frames: Option<u64>,
    pub screenshot: Option<ScreenshotTarget>,
}

impl PlayerConfig {
    /// Size the window and screen quad to `scale` times the native resolution.
    pub fn apply_scale(&mut self, scale: u32) {
        let scale = scale.max(1);
        let video = &mut self.config.video;
        video.screen_width = VB_WIDTH.saturating_mul(scale);
        video.screen_height = VB_HEIGHT.saturating_mul(scale);
        video.window_width = video.screen_width;
        video.window_height = video.screen_height;
    }
}

/// What a finished player run produced.
pub struct PlayerOutcome {
    pub report: SessionReport,
    pub display: Option<SoftwareDisplay>,
    pub screenshot: Option<PathBuf>,
}

/// Run one session with the demo core.
pub fn run(config: PlayerConfig) -> Result<PlayerOutcome> {
    let video = &config.config.video;
    let display = SoftwareDisplay::new(video.window_width, video.window_height);

    let mut session_config = SessionConfig::from(&config.config);
    session_config.frame_limit = config.frames;
    let mut session = Session::new(session_config);

    let outcome = session
        .run(PatternCore::new(), display)
        .context("Failed to start emulation session")?;
    let report = outcome.report;

    info!(
        "{} frames emulated, {} drawn, {} refreshes ({})",
        report.frames_produced,
        report.frames_consumed,
        report.refreshes,
        report.rates
    );

    if let ProducerExit::Failed(e) = &report.exit {
        bail!("Emulation failed: {}", e);
    }
    if report.exit == ProducerExit::Panicked {
        bail!("Emulation thread panicked");
    }

    let screenshot = match (&config.screenshot, &outcome.display) {
        (Some(ScreenshotTarget::Default), Some(display)) => {
            Some(capture::save_screenshot(display, report.mode)?)
        }
        (Some(ScreenshotTarget::Path(path)), Some(display)) => {
            capture::save_png(display, path)?;
            Some(path.clone())
        }
        (Some(_), None) => bail!("Display was not returned; cannot save screenshot"),
        (None, _) => None,
    };

    Ok(PlayerOutcome {
        report,
        display: outcome.display,
        screenshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast(mode: &str, frames: u64) -> PlayerConfig {
        let mut config = Config::default();
        config.video.mode = mode.to_string();
        config.video.refresh_rate = 240;
        config.emulation.tick_rate = 200;
        PlayerConfig {
            config,
            frames: Some(frames),
            screenshot: None,
        }
    }

    #[test]
    fn test_apply_scale() {
        let mut player = fast("white_black", 1);
        player.apply_scale(2);
        let video = &player.config.video;
        assert_eq!((video.screen_width, video.screen_height), (768, 448));
        assert_eq!((video.window_width, video.window_height), (768, 448));

        player.apply_scale(u32::MAX);
        assert_eq!(player.config.video.screen_width, u32::MAX);
        assert_eq!(player.config.video.window_height, u32::MAX);
    }

    #[test]
    fn test_run_draws_pattern() {
        let outcome = run(fast("red_blue", 20)).unwrap();
        assert_eq!(outcome.report.exit, ProducerExit::FrameLimit);
        assert_eq!(outcome.report.frames_produced, 20);

        assert!(outcome.report.frames_consumed > 0);

        let display = outcome.display.unwrap();
        assert_eq!(display.presented(), outcome.report.refreshes);
        // Something inside the centered quad is lit
        let lit = (0..display.height() as i32)
            .flat_map(|y| (0..display.width() as i32).map(move |x| (x, y)))
            .any(|(x, y)| display.pixel(x, y) != redview_core::Rgb::BLACK);
        assert!(lit);
    }

    #[test]
    fn test_run_writes_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut player = fast("side_by_side", 10);
        player.screenshot = Some(ScreenshotTarget::Path(path.clone()));

        let outcome = run(player).unwrap();
        assert_eq!(outcome.screenshot, Some(path.clone()));
        assert!(path.exists());
    }
}
