//! Emulation session runner
//!
//! One [`Session::run`] is one emulation session: the pipeline is built, the
//! consumer is installed into the render callback slot, the producer runs to
//! completion, and everything is torn down in dependency order. The 3D mode
//! is resolved at the start of each run, so a mode change applies on the next
//! run only.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::config::Config;
use crate::consumer::{Display, RenderConsumer};
use crate::error::PipelineError;
use crate::modes::ModeCatalog;
use crate::pipeline::Pipeline;
use crate::platform::{RenderCallbackSlot, VsyncDriver};
use crate::producer::{
    EmulationCore, EmulationProducer, PacerConfig, ProducerExit, ProducerHandle, StopToken,
};
use crate::stats::RateSnapshot;

/// Settings for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub mode: String,
    pub screen: (u32, u32),
    pub refresh_rate: u32,
    pub pacing: PacerConfig,
    pub show_fps: bool,
    /// Stop after this many emulated frames.
    pub frame_limit: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.video.mode.clone(),
            screen: (config.video.screen_width, config.video.screen_height),
            refresh_rate: config.video.refresh_rate,
            pacing: PacerConfig::from(&config.emulation),
            show_fps: config.debug.show_fps,
            frame_limit: None,
        }
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Key of the mode that was actually used.
    pub mode: &'static str,
    pub exit: ProducerExit,
    pub frames_produced: u64,
    pub frames_consumed: u64,
    pub frames_superseded: u64,
    pub frames_stale: u64,
    pub refreshes: u64,
    pub rates: RateSnapshot,
}

/// What [`Session::run`] hands back.
pub struct SessionOutcome<C, D> {
    pub report: SessionReport,
    /// The core, unless the emulation thread panicked.
    pub core: Option<C>,
    pub display: Option<D>,
}

pub struct Session {
    config: SessionConfig,
    slot: Arc<RenderCallbackSlot>,
    stop: StopToken,
    runs: u32,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_slot(config, Arc::new(RenderCallbackSlot::new()))
    }

    /// Use a platform-provided callback slot.
    pub fn with_slot(config: SessionConfig, slot: Arc<RenderCallbackSlot>) -> Self {
        Self {
            config,
            slot,
            stop: StopToken::new(),
            runs: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Select a mode for the next run. A running session is unaffected.
    pub fn set_mode(&mut self, key: impl Into<String>) {
        self.config.mode = key.into();
    }

    /// Token that ends the current run at the next frame boundary.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn slot(&self) -> &Arc<RenderCallbackSlot> {
        &self.slot
    }

    /// Number of completed runs.
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// Run one emulation session to completion.
    ///
    /// Fails only if the pipeline cannot be allocated or a thread cannot be
    /// started. Any stop request made before this call is cleared.
    pub fn run<C, D>(&mut self, core: C, display: D) -> Result<SessionOutcome<C, D>, PipelineError>
    where
        C: EmulationCore + 'static,
        D: Display + Send + 'static,
    {
        self.stop.reset();

        let pipeline = Arc::new(Pipeline::initialize()?);
        pipeline.clear_all()?;

        let mode = ModeCatalog::resolve(&self.config.mode);
        info!("Starting session {} in 3D mode '{}' ({})", self.runs + 1, mode.key, mode.name);

        let producer = EmulationProducer::new(
            core,
            Arc::clone(&pipeline),
            mode,
            self.config.pacing.clone(),
            self.config.frame_limit,
        );

        let consumer = Arc::new(Mutex::new(RenderConsumer::new(
            Arc::clone(&pipeline),
            display,
            mode,
            self.config.screen,
            self.config.show_fps,
        )));
        let callback_consumer = Arc::clone(&consumer);
        self.slot.install(move || {
            let mut consumer = callback_consumer.lock().unwrap_or_else(|e| e.into_inner());
            consumer.on_refresh();
        });

        let started = VsyncDriver::start(Arc::clone(&self.slot), self.config.refresh_rate)
            .and_then(|vsync| {
                ProducerHandle::spawn(producer, self.stop.clone()).map(|producer| (vsync, producer))
            });
        let (vsync, producer) = match started {
            Ok(threads) => threads,
            Err(e) => {
                self.slot.uninstall();
                pipeline.teardown();
                return Err(e);
            }
        };

        let report = producer.join();
        let refreshes = vsync.stop();
        self.slot.uninstall();
        // Producer joined and callback gone: nothing references the buffers now
        pipeline.teardown();

        let (display, rates) = match Arc::try_unwrap(consumer) {
            Ok(consumer) => {
                let consumer = consumer.into_inner().unwrap_or_else(|e| e.into_inner());
                let rates = consumer.overlay().rates();
                (Some(consumer.into_display()), rates)
            }
            Err(_) => {
                warn!("Render consumer still shared after uninstall; display not returned");
                (None, RateSnapshot::default())
            }
        };

        let stats = pipeline.channel.stats();
        let report_summary = SessionReport {
            mode: mode.key,
            exit: report.exit,
            frames_produced: report.frames,
            frames_consumed: stats.consumed,
            frames_superseded: stats.superseded,
            frames_stale: stats.stale,
            refreshes,
            rates,
        };
        self.runs += 1;
        info!(
            "Session ended ({:?}): {} produced, {} consumed, {} superseded",
            report_summary.exit,
            report_summary.frames_produced,
            report_summary.frames_consumed,
            report_summary.frames_superseded
        );

        Ok(SessionOutcome {
            report: report_summary,
            core: report.core,
            display,
        })
    }
}
