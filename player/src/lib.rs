//! redview - standalone player for the stereoscopic frame pipeline
//!
//! Pairs the pipeline in `redview-core` with a demo emulation core and a
//! software display, so every 3D mode can be exercised without a game or a
//! GPU.

pub mod capture;
pub mod display;
pub mod font;
pub mod pattern;
pub mod player;

pub use display::SoftwareDisplay;
pub use pattern::PatternCore;
pub use player::{PlayerConfig, PlayerOutcome, ScreenshotTarget, run};
